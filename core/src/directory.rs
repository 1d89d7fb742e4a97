//! Resolving user ids to display names.

use crate::types::UserId;
use std::collections::HashMap;

pub const USER_NOT_FOUND: &str = "User not found";

/// Live member lookup supplied by the platform layer.
pub trait Directory {
    fn display_name(&self, user_id: UserId) -> Option<String>;
}

/// No live directory; every lookup misses.
pub struct NoDirectory;

impl Directory for NoDirectory {
    fn display_name(&self, _user_id: UserId) -> Option<String> {
        None
    }
}

/// Fixed id → name table, used by the runner and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    names: HashMap<UserId, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: UserId, name: &str) {
        self.names.insert(user_id, name.to_string());
    }
}

impl Directory for StaticDirectory {
    fn display_name(&self, user_id: UserId) -> Option<String> {
        self.names.get(&user_id).cloned()
    }
}
