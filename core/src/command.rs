use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Every user-issued bot command.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BotCommand {
    // ── Team building ─────────────────────────────
    /// One role-constrained team.
    Team,
    /// Two role-constrained teams.
    Teams,
    /// Two fully random teams.
    Chaos,

    // ── Counters ──────────────────────────────────
    /// Timeout totals for the named users, or both leaderboards.
    Jailtime {
        #[serde(default)]
        users: Vec<UserId>,
    },
    Mistborn,

    // ── Names ─────────────────────────────────────
    History { user: UserId },
}

impl BotCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Team            => "team",
            Self::Teams           => "teams",
            Self::Chaos           => "chaos",
            Self::Jailtime { .. } => "jailtime",
            Self::Mistborn        => "mistborn",
            Self::History { .. }  => "history",
        }
    }
}
