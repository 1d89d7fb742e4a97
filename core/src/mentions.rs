//! Keyword mention counter.

use crate::{ledger::rank_descending, types::UserId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MentionCounter {
    /// (user, count) in first-seen order.
    records: Vec<(UserId, u64)>,
    index:   HashMap<UserId, usize>,
}

impl MentionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<(UserId, u64)>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, (user, _))| (*user, i))
            .collect();
        Self { records, index }
    }

    pub fn count(&self, user_id: UserId) -> u64 {
        self.get(user_id).unwrap_or(0)
    }

    /// Add `increment` mentions; returns the previous total plus one.
    pub fn record_mention(&mut self, user_id: UserId, increment: u64) -> u64 {
        let idx = match self.index.get(&user_id) {
            Some(&i) => i,
            None => {
                self.records.push((user_id, 0));
                let i = self.records.len() - 1;
                self.index.insert(user_id, i);
                i
            }
        };
        let previous = self.records[idx].1;
        self.records[idx].1 = previous + increment;
        previous + 1
    }

    /// Put back the count `user_id` had before a failed write. `None`
    /// drops a user that the failed mutation added.
    pub fn restore(&mut self, user_id: UserId, previous: Option<u64>) {
        match (previous, self.index.get(&user_id).copied()) {
            (Some(count), Some(idx)) => self.records[idx].1 = count,
            (Some(count), None) => {
                self.index.insert(user_id, self.records.len());
                self.records.push((user_id, count));
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

    /// The stored count, or `None` for a user never counted.
    pub fn get(&self, user_id: UserId) -> Option<u64> {
        self.index.get(&user_id).map(|&i| self.records[i].1)
    }

    pub fn leaderboard(&self, top_n: usize) -> Vec<(u64, UserId)> {
        let rows = self.records.iter().map(|(user, n)| (*n, *user)).collect();
        rank_descending(rows, top_n)
    }
}

/// Case-insensitive, non-overlapping occurrences of every keyword in `text`.
pub fn count_keywords<S: AsRef<str>>(text: &str, keywords: &[S]) -> u64 {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| haystack.matches(k.as_str()).count() as u64)
        .sum()
}
