//! JSON response shapes, versioned independently of the store records.

pub mod v1;
