use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Everything the bot needs at process entry. Built once, then passed by
/// reference; the core keeps no global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub roster_path: String,
    pub db_path: String,
    /// Master seed for team draws. `None` picks one from the wall clock.
    pub seed: Option<u64>,
    /// The bot's own account; its messages never count as mentions.
    pub bot_user_id: Option<UserId>,
    pub mention_keywords: Vec<String>,
    /// The leaderboard command itself is not a mention.
    pub mention_command: String,
    pub mention_reply_cooldown_secs: u64,
    /// Always shown on the mention leaderboard, even outside the top list.
    pub honorary_user_id: Option<UserId>,
    pub timeout_leaderboard_size: usize,
    pub mention_leaderboard_size: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            roster_path: "data/roster.json".into(),
            db_path: "dadbot.db".into(),
            seed: None,
            bot_user_id: None,
            mention_keywords: vec!["sanderson".into(), "mistborn".into()],
            mention_command: "!mistborn".into(),
            mention_reply_cooldown_secs: 600,
            honorary_user_id: None,
            timeout_leaderboard_size: 5,
            mention_leaderboard_size: 10,
        }
    }
}

impl BotConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: BotConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::info!("config loaded from {path}");
        Ok(config)
    }

    /// Config with fixed values for tests: seeded, in-memory friendly.
    pub fn default_test() -> Self {
        Self {
            seed: Some(0xDAD_B07),
            db_path: ":memory:".into(),
            bot_user_id: Some(999),
            ..Self::default()
        }
    }
}
