use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Maps instants onto the user's calendar days.
///
/// `Host` follows the host time zone per instant, so attempts made on either
/// side of a DST change land on their true local date. `Fixed` pins one UTC
/// offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalCalendar {
    #[default]
    Host,
    Fixed(FixedOffset),
}

impl LocalCalendar {
    /// Calendar using the host time zone.
    #[must_use]
    pub fn host() -> Self {
        Self::Host
    }

    #[must_use]
    pub fn fixed(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }

    #[must_use]
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Calendar for an offset given in minutes east of UTC.
    ///
    /// Returns `None` if the offset is out of range (beyond ±24h).
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::Fixed)
    }

    /// Local calendar date of an instant.
    #[must_use]
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            LocalCalendar::Host => at.with_timezone(&Local).date_naive(),
            LocalCalendar::Fixed(offset) => at.with_timezone(offset).date_naive(),
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), fixed_now() + Duration::hours(2));
    }

    #[test]
    fn local_date_follows_offset() {
        // 22:13 UTC is already the next day at UTC+3.
        let utc = LocalCalendar::utc();
        let east = LocalCalendar::from_offset_minutes(180).unwrap();
        assert_eq!(east.date_of(fixed_now()), utc.date_of(fixed_now()).succ_opt().unwrap());
    }

    #[test]
    fn host_calendar_resolves_each_instant_in_its_own_season() {
        let winter = DateTime::<Utc>::from_timestamp(1_736_465_400, 0).unwrap(); // 2025-01-09T23:30Z
        let summer = DateTime::<Utc>::from_timestamp(1_752_103_800, 0).unwrap(); // 2025-07-09T23:30Z
        let host = LocalCalendar::host();
        for at in [winter, summer] {
            assert_eq!(host.date_of(at), at.with_timezone(&Local).date_naive());
        }
        assert_eq!(LocalCalendar::default(), LocalCalendar::Host);
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        assert!(LocalCalendar::from_offset_minutes(24 * 60).is_none());
        assert!(LocalCalendar::from_offset_minutes(-330).is_some());
    }
}
