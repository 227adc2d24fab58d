use time::{Duration, PrimitiveDateTime};

/// Countdown over a fixed absolute deadline. The deadline is computed once
/// from the session's start instant and never recomputed from "now", so a
/// clock rebuilt after a reload continues the original countdown.
#[derive(Debug, Clone)]
pub(crate) struct SessionClock {
    started_at: PrimitiveDateTime,
    ends_at: PrimitiveDateTime,
    expired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Urgency {
    Calm,
    Warning,
    Danger,
}

impl Urgency {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Urgency::Calm => "calm",
            Urgency::Warning => "warning",
            Urgency::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ClockState {
    pub(crate) remaining: Duration,
    pub(crate) urgency: Urgency,
    /// Fraction of the session still ahead, in [0, 1].
    pub(crate) progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ClockTick {
    pub(crate) state: ClockState,
    /// True exactly once, on the tick that crosses the deadline.
    pub(crate) expired_now: bool,
}

impl SessionClock {
    pub(crate) fn for_duration(
        started_at: PrimitiveDateTime,
        duration_minutes: i64,
    ) -> Self {
        let ends_at = started_at + Duration::minutes(duration_minutes);
        Self::from_deadline(started_at, ends_at)
    }

    pub(crate) fn from_deadline(started_at: PrimitiveDateTime, ends_at: PrimitiveDateTime) -> Self {
        Self { started_at, ends_at, expired: false }
    }

    pub(crate) fn ends_at(&self) -> PrimitiveDateTime {
        self.ends_at
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.expired
    }

    pub(crate) fn total(&self) -> Duration {
        self.ends_at - self.started_at
    }

    pub(crate) fn state(&self, now: PrimitiveDateTime) -> ClockState {
        let remaining = (self.ends_at - now).max(Duration::ZERO);
        let total = self.total().max(Duration::ZERO);

        let progress = if total.is_zero() {
            0.0
        } else {
            (remaining.as_seconds_f64() / total.as_seconds_f64()).clamp(0.0, 1.0)
        };

        let urgency = if progress <= 0.10 {
            Urgency::Danger
        } else if progress <= 0.25 {
            Urgency::Warning
        } else {
            Urgency::Calm
        };

        ClockState { remaining, urgency, progress }
    }

    /// Advances the clock. `expired_now` is guarded by a one-shot flag: the
    /// first tick at or past the deadline reports it, every later tick does
    /// not.
    pub(crate) fn tick(&mut self, now: PrimitiveDateTime) -> ClockTick {
        let state = self.state(now);
        let expired_now = state.remaining.is_zero() && !self.expired;
        if expired_now {
            self.expired = true;
        }

        ClockTick { state, expired_now }
    }
}

/// `M:SS` under an hour, `H:MM:SS` above.
pub(crate) fn format_remaining(remaining: Duration) -> String {
    let total_seconds = remaining.whole_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    fn at(hour: u8, minute: u8, second: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2026, time::Month::April, 7).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
    }

    #[test]
    fn reconstruction_preserves_the_original_deadline() {
        let started = at(10, 0, 0);
        let mut clock = SessionClock::for_duration(started, 30);

        // Simulated reload ten minutes in: rebuilt from the persisted start.
        let rebuilt = SessionClock::for_duration(started, 30);
        assert_eq!(rebuilt.ends_at(), clock.ends_at());

        let tick = clock.tick(at(10, 10, 0));
        assert_eq!(tick.state.remaining, Duration::minutes(20));
        assert!(!tick.expired_now);
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut clock = SessionClock::for_duration(at(10, 0, 0), 30);

        assert!(!clock.tick(at(10, 29, 59)).expired_now);

        let first = clock.tick(at(10, 30, 0));
        assert!(first.expired_now);
        assert!(first.state.remaining.is_zero());

        // Ticks keep arriving after expiry; the flag stays down.
        assert!(!clock.tick(at(10, 30, 1)).expired_now);
        assert!(!clock.tick(at(10, 31, 0)).expired_now);
        assert!(clock.is_expired());
    }

    #[test]
    fn remaining_never_goes_negative() {
        let clock = SessionClock::for_duration(at(10, 0, 0), 5);
        let state = clock.state(at(11, 0, 0));
        assert_eq!(state.remaining, Duration::ZERO);
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn urgency_tiers_at_quarter_and_tenth() {
        let clock = SessionClock::for_duration(at(10, 0, 0), 100);

        assert_eq!(clock.state(at(10, 30, 0)).urgency, Urgency::Calm);
        // 25 of 100 minutes left.
        assert_eq!(clock.state(at(11, 15, 0)).urgency, Urgency::Warning);
        // 10 of 100 minutes left.
        assert_eq!(clock.state(at(11, 30, 0)).urgency, Urgency::Danger);
    }

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_remaining(Duration::seconds(65)), "1:05");
        assert_eq!(format_remaining(Duration::seconds(9)), "0:09");
        assert_eq!(format_remaining(Duration::minutes(90) + Duration::seconds(3)), "1:30:03");
        assert_eq!(format_remaining(Duration::seconds(-5)), "0:00");
    }
}
