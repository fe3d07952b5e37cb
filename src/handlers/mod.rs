//! HTTP handlers for student records and service probes.

pub mod common;
pub mod students;
