//! Log date codec

use crate::error::{KlogError, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date of a log entry, written as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogDate(NaiveDate);

impl LogDate {
    /// Current local date
    pub fn today() -> Self {
        LogDate(Local::now().date_naive())
    }

    /// Parse the canonical `YYYY-MM-DD` form.
    ///
    /// chrono accepts unpadded fields such as `2023-5-1`; those are rejected
    /// here so that every accepted text formats back to itself.
    pub fn parse(text: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|_| KlogError::InvalidDate(text.to_string()))?;

        let date = LogDate(date);
        if date.to_string() != text {
            return Err(KlogError::InvalidDate(text.to_string()));
        }

        Ok(date)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for LogDate {
    type Err = KlogError;

    fn from_str(s: &str) -> Result<Self> {
        LogDate::parse(s)
    }
}
