//! Time engine for lorebook.
//!
//! A mutable in-world clock, `[+-]<n><unit>` offsets with calendar-aware
//! months and years, and the real/world idle pairs rendered as humanized
//! durations such as `"5 minutes ago"`.

pub mod clock;
pub mod error;
pub mod idle;
pub mod offset;

pub use clock::{Component, TIME_FORMAT, WorldClock, parse_timestamp, wall_clock};
pub use error::{TimeError, TimeResult};
pub use idle::{IdlePair, humanize};
pub use offset::{TimeOffset, TimeUnit};
