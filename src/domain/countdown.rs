//! Offer and PIX expiry timers.
//!
//! The shopper's page decrements the number locally once per second; the
//! service only reports how much is left at a given instant.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    started_at: DateTime<Utc>,
    duration: Duration,
}

/// Wire form of a countdown as seen at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountdownSnapshot {
    pub expira_em: DateTime<Utc>,
    pub segundos_restantes: i64,
    pub exibicao: String,
    pub expirado: bool,
}

impl Countdown {
    pub fn new(started_at: DateTime<Utc>, duration: Duration) -> Self {
        Self { started_at, duration: duration.max(Duration::zero()) }
    }

    pub fn minutes(started_at: DateTime<Utc>, minutes: i64) -> Self { Self::new(started_at, Duration::minutes(minutes)) }

    pub fn expires_at(&self) -> DateTime<Utc> { self.started_at + self.duration }

    /// Whole seconds left, never negative.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> i64 { (self.expires_at() - now).num_seconds().max(0) }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.remaining_at(now) == 0 }

    /// `MM:SS`; minutes keep counting past 59 rather than rolling into hours.
    pub fn display_at(&self, now: DateTime<Utc>) -> String {
        let left = self.remaining_at(now);
        format!("{:02}:{:02}", left / 60, left % 60)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> CountdownSnapshot {
        CountdownSnapshot {
            expira_em: self.expires_at(),
            segundos_restantes: self.remaining_at(now),
            exibicao: self.display_at(now),
            expirado: self.is_expired_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap() }

    #[test]
    fn test_remaining_and_display() {
        let c = Countdown::minutes(t0(), 15);
        assert_eq!(c.remaining_at(t0()), 900);
        assert_eq!(c.display_at(t0()), "15:00");
        assert_eq!(c.display_at(t0() + Duration::seconds(61)), "13:59");
        assert_eq!(c.display_at(t0() + Duration::milliseconds(899_500)), "00:00");
    }

    #[test]
    fn test_expired_never_negative() {
        let c = Countdown::minutes(t0(), 1);
        let later = t0() + Duration::minutes(5);
        assert_eq!(c.remaining_at(later), 0);
        assert!(c.is_expired_at(later));
        assert_eq!(c.display_at(later), "00:00");
        assert!(!c.is_expired_at(t0()));
    }

    #[test]
    fn test_long_and_negative_durations() {
        assert_eq!(Countdown::minutes(t0(), 90).display_at(t0()), "90:00");
        assert!(Countdown::minutes(t0(), -5).is_expired_at(t0()));
    }
}
