//! Timeout ledger: per-user count and cumulative duration of timeouts.
//!
//! Each user is either `Clear` or `InTimeout { since }`. Only `enter` and
//! `leave` mutate a record, and only `enter` creates one. `restore` undoes
//! a mutation whose write to the store failed.
//!
//! Entry times are held at whole-second precision, the same as the store.
//!
//! RULE: re-entering while already in timeout is ignored. The count does
//! not move and `since` keeps its original value.

use crate::{
    error::{BotError, BotResult},
    types::{elapsed_seconds, Timestamp, UserId},
};
use chrono::SubsecRound;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutRecord {
    pub user_id:            UserId,
    pub count:              u64,
    /// Closed intervals only; an open timeout is not folded in until `leave`.
    pub cumulative_seconds: u64,
    pub open_since:         Option<Timestamp>,
    pub display_name:       String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutState {
    Clear,
    InTimeout { since: Timestamp },
}

impl TimeoutRecord {
    pub fn new(user_id: UserId, display_name: &str) -> Self {
        Self {
            user_id,
            count: 0,
            cumulative_seconds: 0,
            open_since: None,
            display_name: display_name.to_string(),
        }
    }

    pub fn state(&self) -> TimeoutState {
        match self.open_since {
            Some(since) => TimeoutState::InTimeout { since },
            None => TimeoutState::Clear,
        }
    }

    /// Closed duration plus any interval still open at `now`.
    pub fn effective_duration(&self, now: Timestamp) -> u64 {
        match self.state() {
            TimeoutState::Clear => self.cumulative_seconds,
            TimeoutState::InTimeout { since } => {
                self.cumulative_seconds + elapsed_seconds(since, now)
            }
        }
    }
}

/// Two independent top-N rankings taken at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutLeaderboard {
    pub by_count:    Vec<(u64, UserId)>,
    pub by_duration: Vec<(u64, UserId)>,
}

#[derive(Debug, Default)]
pub struct TimeoutLedger {
    /// First-seen order; ranking ties resolve by position here.
    records: Vec<TimeoutRecord>,
    index:   HashMap<UserId, usize>,
}

impl TimeoutLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records, keeping their order.
    pub fn from_records(records: Vec<TimeoutRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.user_id, i))
            .collect();
        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TimeoutRecord] {
        &self.records
    }

    pub fn record(&self, user_id: UserId) -> Option<&TimeoutRecord> {
        self.index.get(&user_id).map(|&i| &self.records[i])
    }

    /// The stored record, or a zero-valued one for an unseen user.
    pub fn record_or_default(&self, user_id: UserId, display_name: &str) -> TimeoutRecord {
        self.record(user_id)
            .cloned()
            .unwrap_or_else(|| TimeoutRecord::new(user_id, display_name))
    }

    fn record_mut(&mut self, user_id: UserId, display_name: &str) -> &mut TimeoutRecord {
        let idx = match self.index.get(&user_id) {
            Some(&i) => i,
            None => {
                self.records.push(TimeoutRecord::new(user_id, display_name));
                let i = self.records.len() - 1;
                self.index.insert(user_id, i);
                i
            }
        };
        &mut self.records[idx]
    }

    /// Put `user_id` into timeout at `now`, truncated to whole seconds.
    ///
    /// Returns the record and whether a transition happened; a re-entry
    /// leaves everything but the display name untouched.
    pub fn enter(
        &mut self,
        user_id: UserId,
        display_name: &str,
        now: Timestamp,
    ) -> (TimeoutRecord, bool) {
        let record = self.record_mut(user_id, display_name);
        record.display_name = display_name.to_string();
        let changed = match record.state() {
            TimeoutState::Clear => {
                record.open_since = Some(now.trunc_subsecs(0));
                record.count += 1;
                true
            }
            TimeoutState::InTimeout { since } => {
                log::debug!("user {user_id} re-entered timeout; open since {since} kept");
                false
            }
        };
        (record.clone(), changed)
    }

    /// Take `user_id` out of timeout at `now`, folding the closed interval
    /// into the cumulative total.
    ///
    /// A user who is not in timeout yields `InconsistentState`; the record
    /// is left as it was and an unseen user gets none.
    pub fn leave(
        &mut self,
        user_id: UserId,
        display_name: &str,
        now: Timestamp,
    ) -> BotResult<TimeoutRecord> {
        let Some(&idx) = self.index.get(&user_id) else {
            return Err(BotError::InconsistentState { user_id });
        };
        let record = &mut self.records[idx];
        match record.state() {
            TimeoutState::InTimeout { since } => {
                record.cumulative_seconds += elapsed_seconds(since, now);
                record.open_since = None;
                record.display_name = display_name.to_string();
                Ok(record.clone())
            }
            TimeoutState::Clear => Err(BotError::InconsistentState { user_id }),
        }
    }

    /// Put back the record `user_id` had before a failed write. `None`
    /// drops a record that the failed mutation created.
    pub fn restore(&mut self, user_id: UserId, previous: Option<TimeoutRecord>) {
        match (previous, self.index.get(&user_id).copied()) {
            (Some(record), Some(idx)) => self.records[idx] = record,
            (Some(record), None) => {
                self.index.insert(user_id, self.records.len());
                self.records.push(record);
            }
            (None, Some(idx)) => {
                self.records.remove(idx);
                self.index.remove(&user_id);
                for i in self.index.values_mut() {
                    if *i > idx {
                        *i -= 1;
                    }
                }
            }
            (None, None) => {}
        }
    }

    /// Point-in-time duration; includes an open timeout. Unknown users are 0.
    pub fn effective_duration(&self, user_id: UserId, now: Timestamp) -> u64 {
        self.record(user_id)
            .map(|r| r.effective_duration(now))
            .unwrap_or(0)
    }

    /// Top `top_n` by count and by effective duration, both evaluated at `now`.
    pub fn leaderboard(&self, now: Timestamp, top_n: usize) -> TimeoutLeaderboard {
        let counts: Vec<(u64, UserId)> =
            self.records.iter().map(|r| (r.count, r.user_id)).collect();
        let durations: Vec<(u64, UserId)> = self
            .records
            .iter()
            .map(|r| (r.effective_duration(now), r.user_id))
            .collect();
        TimeoutLeaderboard {
            by_count:    rank_descending(counts, top_n),
            by_duration: rank_descending(durations, top_n),
        }
    }
}

/// Stable descending sort on the metric, truncated to `top_n`.
pub(crate) fn rank_descending(mut rows: Vec<(u64, UserId)>, top_n: usize) -> Vec<(u64, UserId)> {
    // sort_by is stable, so equal metrics keep first-seen order.
    rows.sort_by(|a, b| b.0.cmp(&a.0));
    rows.truncate(top_n);
    rows
}
