//! The in-world clock behind `buildin::time(...)`.

use chrono::{Local, NaiveDateTime};

use crate::error::TimeResult;
use crate::idle::IdlePair;
use crate::offset::TimeOffset;

/// Format of full timestamps, both rendered and parsed.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A formatted part of the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// `YYYY-MM-DD`.
    Date,
    /// `HH:MM`.
    Time,
    /// Four-digit year.
    Year,
    /// Two-digit month.
    Month,
    /// Two-digit day of month.
    Day,
    /// Two-digit hour.
    Hour,
    /// Two-digit minute.
    Minute,
}

impl Component {
    /// Look up a component by its macro argument name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            "hour" => Some(Self::Hour),
            "minute" => Some(Self::Minute),
            _ => None,
        }
    }

    /// The strftime pattern for this component.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Date => "%Y-%m-%d",
            Self::Time => "%H:%M",
            Self::Year => "%Y",
            Self::Month => "%m",
            Self::Day => "%d",
            Self::Hour => "%H",
            Self::Minute => "%M",
        }
    }
}

/// Parse a full `YYYY-MM-DD HH:MM` timestamp.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIME_FORMAT).ok()
}

/// The current wall-clock time in the local zone.
pub fn wall_clock() -> NaiveDateTime {
    Local::now().naive_local()
}

/// In-world time plus the two idle pairs.
///
/// `real_idle` tracks wall-clock time between trigger passes and is rolled
/// by [`WorldClock::mark_real_activity`]. `world_idle` tracks in-fiction time
/// and is rolled by every relative adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    current: NaiveDateTime,
    real_idle: IdlePair,
    world_idle: IdlePair,
}

impl WorldClock {
    /// Create a clock showing `start`, with the real-idle pair anchored at `now`.
    pub fn new(start: NaiveDateTime, now: NaiveDateTime) -> Self {
        Self {
            current: start,
            real_idle: IdlePair::new(now),
            world_idle: IdlePair::new(start),
        }
    }

    /// Create a clock from a stored `world_time` value, falling back to `now`
    /// when there is none or it does not parse.
    pub fn from_stored(stored: Option<&str>, now: NaiveDateTime) -> Self {
        let start = match stored {
            Some(text) => parse_timestamp(text).unwrap_or_else(|| {
                tracing::warn!(world_time = text, "unparsable stored world time, using wall clock");
                now
            }),
            None => now,
        };
        Self::new(start, now)
    }

    /// The current in-world time.
    pub fn current(&self) -> NaiveDateTime {
        self.current
    }

    /// The current in-world time as `YYYY-MM-DD HH:MM`.
    pub fn formatted(&self) -> String {
        self.current.format(TIME_FORMAT).to_string()
    }

    /// One component of the current time.
    pub fn component(&self, component: Component) -> String {
        self.current.format(component.pattern()).to_string()
    }

    /// Jump to an absolute time. The world-idle pair is left alone.
    pub fn set(&mut self, to: NaiveDateTime) {
        self.current = to;
    }

    /// Move the clock by a relative offset and roll the world-idle pair.
    pub fn advance(&mut self, offset: TimeOffset) -> TimeResult<NaiveDateTime> {
        self.current = offset.apply(self.current)?;
        self.world_idle.roll(self.current);
        Ok(self.current)
    }

    /// Record a trigger pass happening at wall-clock time `now`.
    pub fn mark_real_activity(&mut self, now: NaiveDateTime) {
        self.real_idle.roll(now);
    }

    /// The wall-clock idle pair.
    pub fn real_idle(&self) -> &IdlePair {
        &self.real_idle
    }

    /// The in-fiction idle pair.
    pub fn world_idle(&self) -> &IdlePair {
        &self.world_idle
    }

    /// Evaluate the arguments of a `time(...)` call.
    ///
    /// Only the first argument is read. With none, the full current time is
    /// returned. Idle keys and component names are rendered; `[+-]<n><unit>`
    /// moves the clock; anything else is tried as an absolute timestamp and
    /// otherwise ignored. Every successful branch that does not render a
    /// component or idle duration returns the (possibly new) current time.
    pub fn evaluate(&mut self, args: &[String]) -> TimeResult<String> {
        let Some(arg) = args.first().map(|a| a.trim()) else {
            return Ok(self.formatted());
        };

        match arg {
            "real_idle" => return Ok(self.real_idle.humanize()),
            "world_idle" => return Ok(self.world_idle.humanize()),
            _ => {}
        }
        if let Some(component) = Component::from_name(arg) {
            return Ok(self.component(component));
        }
        if let Ok(offset) = arg.parse::<TimeOffset>() {
            self.advance(offset)?;
        } else if let Some(to) = parse_timestamp(arg) {
            self.set(to);
        }
        Ok(self.formatted())
    }
}
