use chrono::{DateTime, Datelike, Local, Timelike, Utc, Weekday};

/// Snapshot of the wall clock taken once at the top of a scoring pass.
///
/// Hotspot scoring depends on the local hour and weekday; freezing them in
/// a value keeps the analyzers pure functions of their inputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocalMoment {
    pub hour: u32,
    pub weekday: Weekday,
    pub timestamp: DateTime<Utc>,
}

impl LocalMoment {
    #[must_use]
    pub fn now() -> Self {
        let local = Local::now();
        Self {
            hour: local.hour(),
            weekday: local.weekday(),
            timestamp: local.with_timezone(&Utc),
        }
    }

    #[must_use]
    pub const fn fixed(hour: u32, weekday: Weekday, timestamp: DateTime<Utc>) -> Self {
        Self { hour, weekday, timestamp }
    }

    #[must_use]
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }
}
