//! Idle tracking and humanized durations.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// A before/after timestamp pair.
///
/// Rolling moves `after` into `before` and records the new instant as
/// `after`, so the pair always spans the latest interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdlePair {
    /// Start of the latest interval.
    pub before: NaiveDateTime,
    /// End of the latest interval.
    pub after: NaiveDateTime,
}

impl IdlePair {
    /// A zero-length pair at `at`.
    pub fn new(at: NaiveDateTime) -> Self {
        Self {
            before: at,
            after: at,
        }
    }

    /// Start a new interval ending at `now`.
    pub fn roll(&mut self, now: NaiveDateTime) {
        self.before = self.after;
        self.after = now;
    }

    /// The interval in words, see [`humanize`].
    pub fn humanize(&self) -> String {
        humanize(self.before, self.after)
    }
}

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Describe the interval from `before` to `after` in words.
///
/// Forward intervals read as `"... from now"`, backward ones (a clock turned
/// back) as `"... ago"`. Magnitudes are bucketed: under a minute is
/// `"just now"`, then whole minutes, hours, days (under 30), calendar
/// months (under 365 days) and calendar years.
pub fn humanize(before: NaiveDateTime, after: NaiveDateTime) -> String {
    let seconds = (after - before).num_seconds();
    let (earlier, later) = if seconds >= 0 {
        (before, after)
    } else {
        (after, before)
    };
    let suffix = if seconds >= 0 { "from now" } else { "ago" };
    let seconds = seconds.abs();

    if seconds < MINUTE {
        return "just now".to_string();
    }
    let (amount, unit) = if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else if seconds < 30 * DAY {
        (seconds / DAY, "day")
    } else if seconds < 365 * DAY {
        (whole_months(earlier, later).max(1), "month")
    } else {
        ((whole_months(earlier, later) / 12).max(1), "year")
    };

    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} {suffix}")
}

/// Complete calendar months from `earlier` to `later`.
fn whole_months(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month())
        - i64::from(earlier.month());
    let later_in_month = (later.day(), later.num_seconds_from_midnight());
    let earlier_in_month = (earlier.day(), earlier.num_seconds_from_midnight());
    if later_in_month < earlier_in_month {
        months -= 1;
    }
    months
}
