//! Plain-text rendering helpers for bot replies.

/// `H:M:S` with unpadded fields, e.g. 4340 → `1:12:20`.
pub fn seconds_to_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes}:{seconds}")
}

/// One leaderboard row: `" 1: 5    | name"`.
pub fn leaderboard_row(rank: usize, metric: &str, name: &str) -> String {
    format!("{rank:2}: {metric:<4} | {name}")
}
