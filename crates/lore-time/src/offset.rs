//! Relative time offsets such as `+3D` or `-90m`.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDateTime, TimeDelta};

use crate::error::{TimeError, TimeResult};

/// The unit of a relative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// Calendar years (`Y`).
    Years,
    /// Calendar months (`M`).
    Months,
    /// Days (`D`).
    Days,
    /// Hours (`h`).
    Hours,
    /// Minutes (`m`).
    Minutes,
}

impl TimeUnit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'Y' => Some(Self::Years),
            'M' => Some(Self::Months),
            'D' => Some(Self::Days),
            'h' => Some(Self::Hours),
            'm' => Some(Self::Minutes),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Years => 'Y',
            Self::Months => 'M',
            Self::Days => 'D',
            Self::Hours => 'h',
            Self::Minutes => 'm',
        }
    }
}

/// A signed amount of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOffset {
    /// Signed amount.
    pub amount: i64,
    /// Unit of the amount.
    pub unit: TimeUnit,
}

impl TimeOffset {
    /// Create an offset.
    pub fn new(amount: i64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    /// Apply the offset to a timestamp.
    ///
    /// Month and year offsets are calendar-aware: adding one month to
    /// January 31st lands on the last day of February.
    pub fn apply(self, to: NaiveDateTime) -> TimeResult<NaiveDateTime> {
        let out_of_range = || TimeError::OutOfRange(self.to_string());
        let shifted = match self.unit {
            TimeUnit::Years | TimeUnit::Months => {
                let months = if self.unit == TimeUnit::Years {
                    self.amount.checked_mul(12).ok_or_else(out_of_range)?
                } else {
                    self.amount
                };
                let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| out_of_range())?;
                if months >= 0 {
                    to.checked_add_months(Months::new(magnitude))
                } else {
                    to.checked_sub_months(Months::new(magnitude))
                }
            }
            TimeUnit::Days => {
                TimeDelta::try_days(self.amount).and_then(|d| to.checked_add_signed(d))
            }
            TimeUnit::Hours => {
                TimeDelta::try_hours(self.amount).and_then(|d| to.checked_add_signed(d))
            }
            TimeUnit::Minutes => {
                TimeDelta::try_minutes(self.amount).and_then(|d| to.checked_add_signed(d))
            }
        };
        shifted.ok_or_else(out_of_range)
    }
}

impl FromStr for TimeOffset {
    type Err = TimeError;

    /// Parse `[+-]<digits><unit>`. The sign is required.
    fn from_str(s: &str) -> TimeResult<Self> {
        let invalid = || TimeError::InvalidOffset(s.to_string());
        let mut chars = s.chars();
        let negative = match chars.next() {
            Some('+') => false,
            Some('-') => true,
            _ => return Err(invalid()),
        };
        let unit = chars
            .next_back()
            .and_then(TimeUnit::from_char)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude: i64 = digits.parse().map_err(|_| invalid())?;
        Ok(Self::new(if negative { -magnitude } else { magnitude }, unit))
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}{}", self.amount, self.unit.symbol())
    }
}
