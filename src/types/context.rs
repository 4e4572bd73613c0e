//! Per-execution environment

use chrono::NaiveDate;

/// Ambient values a query evaluation can read.
///
/// The current date is supplied explicitly by the caller rather than read
/// from the wall clock, so every execution is a pure function of its inputs.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionContext {
    pub current_date: NaiveDate,
}

impl ExecutionContext {
    pub fn new(current_date: NaiveDate) -> Self {
        Self { current_date }
    }
}
