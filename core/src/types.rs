//! Shared primitive types used across the bot core.

use chrono::{DateTime, Utc};

/// Stable platform identifier for a member.
pub type UserId = u64;

/// Platform identifier for a text channel.
pub type ChannelId = u64;

/// Every instant the core sees is UTC.
pub type Timestamp = DateTime<Utc>;

/// Whole seconds from `since` to `now`, clamped at zero when the
/// clocks disagree.
pub fn elapsed_seconds(since: Timestamp, now: Timestamp) -> u64 {
    (now - since).num_seconds().max(0) as u64
}
