//! dadbot-core: team building and member counters for a community chat bot.
//!
//! Leaf to root: `roster` → `team`; `ledger`, `mentions` → `store` → `bot`.

pub mod bot;
pub mod command;
pub mod config;
pub mod directory;
pub mod error;
pub mod event;
pub mod format;
pub mod ledger;
pub mod mentions;
pub mod rng;
pub mod roster;
pub mod store;
pub mod team;
pub mod types;
