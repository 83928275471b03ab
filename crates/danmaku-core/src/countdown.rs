//! Countdown arithmetic for the launch banner.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remaining time split into display units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownParts {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl CountdownParts {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: ((total % 86_400) / 3_600) as u8,
            minutes: ((total % 3_600) / 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for CountdownParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Countdown towards a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub target: DateTime<Utc>,
}

impl Countdown {
    pub fn new(target: DateTime<Utc>) -> Self {
        Self { target }
    }

    /// Remaining whole seconds, clamped at zero once the target has passed.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.target - now).num_seconds()).unwrap_or(0)
    }

    pub fn parts(&self, now: DateTime<Utc>) -> CountdownParts {
        CountdownParts::from_seconds(self.remaining_seconds(now))
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        now >= self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn target() -> Countdown {
        Countdown::new(Utc.with_ymd_and_hms(2026, 12, 25, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_parts_split() {
        let now = Utc.with_ymd_and_hms(2026, 12, 23, 21, 58, 30).unwrap();
        let parts = target().parts(now);
        assert_eq!(
            parts,
            CountdownParts {
                days: 1,
                hours: 2,
                minutes: 1,
                seconds: 30
            }
        );
        assert_eq!(parts.to_string(), "1d 02:01:30");
    }

    #[test]
    fn test_clamps_after_target() {
        let now = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        assert!(target().is_finished(now));
        assert!(target().parts(now).is_zero());
    }

    #[test]
    fn test_exact_target() {
        let countdown = target();
        assert!(countdown.is_finished(countdown.target));
        assert_eq!(countdown.remaining_seconds(countdown.target), 0);
    }
}
