//! Timestamp helpers for record mutations.
//!
//! PostgreSQL stores microseconds, so every timestamp the domain produces is
//! truncated to that precision before it is compared or persisted. That keeps
//! the in-memory and database adapters observably identical.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use mockable::Clock;

/// Current time from `clock`, truncated to microseconds.
#[must_use]
pub fn now_micros(clock: &dyn Clock) -> DateTime<Utc> {
    truncate_micros(clock.utc())
}

/// Truncate `at` to microsecond precision.
#[must_use]
pub fn truncate_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(at)
}

/// Next `updated_at` value: the clock reading, bumped past `previous` when the
/// clock has not advanced.
#[must_use]
pub fn next_updated_at(clock: &dyn Clock, previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros(clock);
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}
