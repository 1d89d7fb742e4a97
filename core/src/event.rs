//! Events the platform layer delivers to the bot.
//!
//! RULE: the platform layer never touches ledgers directly.
//! It translates what it sees into BotEvents (or calls the
//! PlatformEvents methods) one at a time.

use crate::{
    command::BotCommand,
    types::{ChannelId, Timestamp, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotEvent {
    /// A member's timeout role was granted or removed.
    MemberRoleChanged {
        user_id:        UserId,
        display_name:   String,
        now_in_timeout: bool,
        at:             Timestamp,
    },
    MessageReceived {
        author_id:    UserId,
        display_name: String,
        channel_id:   ChannelId,
        text:         String,
        at:           Timestamp,
    },
    DisplayNameChanged {
        user_id: UserId,
        before:  String,
        after:   String,
        at:      Timestamp,
    },
    Command {
        command: BotCommand,
        at:      Timestamp,
    },
}

impl BotEvent {
    /// Stable name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MemberRoleChanged { .. }  => "member_role_changed",
            Self::MessageReceived { .. }    => "message_received",
            Self::DisplayNameChanged { .. } => "display_name_changed",
            Self::Command { .. }            => "command",
        }
    }
}
