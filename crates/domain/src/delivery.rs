//! Delivery date scheduling.
//!
//! A delivery lands a random 2 to 5 days after the order date, pushed one
//! more day when it would fall on the no-delivery weekday. The random source
//! and the current date are injected so the schedule can be pinned in tests.

use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deliveries never happen on this day.
pub const NO_DELIVERY_WEEKDAY: Weekday = Weekday::Sun;

/// Range the random delivery offset is drawn from, in days.
pub const DELIVERY_OFFSET_DAYS: RangeInclusive<u32> = 2..=5;

/// Source of the random delivery offset.
pub trait DeliveryRng: Send + Sync {
    /// Draws a day offset uniformly from `range`.
    fn offset_days(&self, range: RangeInclusive<u32>) -> u32;
}

/// Draws from the thread-local system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRng;

impl DeliveryRng for SystemRng {
    fn offset_days(&self, range: RangeInclusive<u32>) -> u32 {
        rand::rng().random_range(range)
    }
}

/// Reproducible RNG for tests and benchmarks.
#[derive(Debug)]
pub struct SeededRng(Mutex<StdRng>);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl DeliveryRng for SeededRng {
    fn offset_days(&self, range: RangeInclusive<u32>) -> u32 {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(range)
    }
}

/// Always returns the same offset, clamped into the requested range.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffset(pub u32);

impl DeliveryRng for FixedOffset {
    fn offset_days(&self, range: RangeInclusive<u32>) -> u32 {
        self.0.clamp(*range.start(), *range.end())
    }
}

/// Source of the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Adds `offset_days` to `order_date`, skipping the no-delivery weekday.
///
/// Shifting by one day off that weekday can never land on it again, so a
/// single adjustment is enough. Returns None past the end of the calendar.
pub fn delivery_date(order_date: NaiveDate, offset_days: u32) -> Option<NaiveDate> {
    let candidate = order_date.checked_add_days(Days::new(u64::from(offset_days)))?;
    if candidate.weekday() == NO_DELIVERY_WEEKDAY {
        candidate.checked_add_days(Days::new(1))
    } else {
        Some(candidate)
    }
}

/// A computed delivery for a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub date: NaiveDate,
    /// True when the delivery date is not after today.
    pub complete: bool,
}

/// Schedules deliveries from an injected RNG and clock.
#[derive(Clone)]
pub struct DeliveryPolicy {
    rng: Arc<dyn DeliveryRng>,
    clock: Arc<dyn Clock>,
}

impl DeliveryPolicy {
    pub fn new(rng: impl DeliveryRng + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            rng: Arc::new(rng),
            clock: Arc::new(clock),
        }
    }

    /// Uses the system RNG and the host's local date.
    pub fn system() -> Self {
        Self::new(SystemRng, SystemClock)
    }

    pub fn schedule(&self, order_date: NaiveDate) -> Option<Delivery> {
        let offset = self.rng.offset_days(DELIVERY_OFFSET_DAYS);
        let date = delivery_date(order_date, offset)?;
        Some(Delivery {
            date,
            complete: date <= self.clock.today(),
        })
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for DeliveryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryPolicy")
            .field("today", &self.clock.today())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monday_plus_five_is_saturday() {
        // 2024-01-01 is a Monday
        assert_eq!(delivery_date(date(2024, 1, 1), 5), Some(date(2024, 1, 6)));
    }

    #[test]
    fn test_sunday_is_pushed_to_monday() {
        // 2024-01-05 is a Friday; +2 lands on Sunday the 7th
        assert_eq!(delivery_date(date(2024, 1, 5), 2), Some(date(2024, 1, 8)));
    }

    #[test]
    fn test_every_offset_and_weekday_stays_in_bounds() {
        for start in 1..=7 {
            let order_date = date(2024, 1, start);
            for offset in DELIVERY_OFFSET_DAYS {
                let delivered = delivery_date(order_date, offset).unwrap();
                let days = (delivered - order_date).num_days();
                assert!((2..=6).contains(&days), "{order_date} +{offset} -> {days}");
                assert_ne!(delivered.weekday(), NO_DELIVERY_WEEKDAY);
            }
        }
    }

    #[test]
    fn test_end_of_calendar_returns_none() {
        assert_eq!(delivery_date(NaiveDate::MAX, 2), None);
    }

    #[test]
    fn test_fixed_offset_is_clamped() {
        assert_eq!(FixedOffset(9).offset_days(DELIVERY_OFFSET_DAYS), 5);
        assert_eq!(FixedOffset(0).offset_days(DELIVERY_OFFSET_DAYS), 2);
        assert_eq!(FixedOffset(3).offset_days(DELIVERY_OFFSET_DAYS), 3);
    }

    #[test]
    fn test_random_offsets_stay_in_range() {
        let rng = SeededRng::new(7);
        for _ in 0..200 {
            assert!(DELIVERY_OFFSET_DAYS.contains(&rng.offset_days(DELIVERY_OFFSET_DAYS)));
            assert!(DELIVERY_OFFSET_DAYS.contains(&SystemRng.offset_days(DELIVERY_OFFSET_DAYS)));
        }
    }

    #[test]
    fn test_schedule_marks_past_deliveries_complete() {
        let policy = DeliveryPolicy::new(FixedOffset(5), FixedClock(date(2024, 1, 6)));

        let on_today = policy.schedule(date(2024, 1, 1)).unwrap();
        assert_eq!(on_today.date, date(2024, 1, 6));
        assert!(on_today.complete);

        let future = policy.schedule(date(2024, 1, 2)).unwrap();
        assert_eq!(future.date, date(2024, 1, 8));
        assert!(!future.complete);
    }
}
