//! Field-level validation of JSON request bodies.
//!
//! Every problem in a body is collected before failing, so a client gets the
//! complete per-field message map in one response.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

pub const MISSING: &str = "Missing data for required field.";
pub const UNKNOWN: &str = "Unknown field.";
pub const BLANK: &str = "Field may not be blank.";

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Returns the messages recorded for one field.
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed:")?;
        for (field, messages) in &self.fields {
            write!(f, " {field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Reads typed fields out of a JSON object, recording a message for every
/// field that is missing or malformed.
///
/// Fields not listed as known when the reader is created are reported as
/// unknown. Known fields that are never read are accepted and ignored, which
/// lets clients send back read-only fields such as ids.
pub struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(body: &'a Value, known: &[&str]) -> Self {
        let mut errors = ValidationErrors::new();
        let object = body.as_object();
        match object {
            Some(object) => {
                for key in object.keys() {
                    if !known.contains(&key.as_str()) {
                        errors.add(key.as_str(), UNKNOWN);
                    }
                }
            }
            None => errors.add("_schema", "Invalid input type."),
        }
        Self { object, errors }
    }

    /// Returns true if no problem has been recorded so far.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// Returns the raw value of a field, recording a missing-field message
    /// when absent or null.
    pub fn required(&mut self, field: &str) -> Option<&'a Value> {
        let object = self.object?;
        match object.get(field) {
            Some(Value::Null) | None => {
                self.errors.add(field, MISSING);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Reads a non-blank string of at most `max_len` characters.
    pub fn required_string(&mut self, field: &str, max_len: usize) -> Option<String> {
        let value = self.required(field)?;
        let Some(s) = value.as_str() else {
            self.errors.add(field, "Not a valid string.");
            return None;
        };
        if s.trim().is_empty() {
            self.errors.add(field, BLANK);
            return None;
        }
        if s.chars().count() > max_len {
            self.errors
                .add(field, format!("Longer than maximum length {max_len}."));
            return None;
        }
        Some(s.to_string())
    }

    pub fn required_integer(&mut self, field: &str) -> Option<i64> {
        let value = self.required(field)?;
        match value.as_i64() {
            Some(n) => Some(n),
            None => {
                self.errors.add(field, "Not a valid integer.");
                None
            }
        }
    }

    pub fn required_number(&mut self, field: &str) -> Option<f64> {
        let value = self.required(field)?;
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                self.errors.add(field, "Not a valid number.");
                None
            }
        }
    }

    /// Reads an ISO 8601 calendar date (`YYYY-MM-DD`).
    pub fn required_date(&mut self, field: &str) -> Option<NaiveDate> {
        let value = self.required(field)?;
        match value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        {
            Some(date) => Some(date),
            None => {
                self.errors.add(field, "Not a valid date.");
                None
            }
        }
    }

    /// Reads a list of integers. Bad elements are reported as `field.index`.
    pub fn required_integer_list(&mut self, field: &str) -> Option<Vec<i64>> {
        let value = self.required(field)?;
        let Some(items) = value.as_array() else {
            self.errors.add(field, "Not a valid list.");
            return None;
        };

        let mut ints = Vec::with_capacity(items.len());
        let mut valid = true;
        for (index, item) in items.iter().enumerate() {
            match item.as_i64() {
                Some(n) => ints.push(n),
                None => {
                    self.errors
                        .add(format!("{field}.{index}"), "Not a valid integer.");
                    valid = false;
                }
            }
        }
        valid.then_some(ints)
    }
}
