//! Request validation for student write payloads.

mod validation;
pub use validation::{FieldKind, FieldRule, RequestValidator, STUDENT_SCHEMA};
