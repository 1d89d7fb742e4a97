//! The bot facade: what the platform layer talks to.
//!
//! RULES:
//!   - The platform layer delivers one event at a time through
//!     `PlatformEvents` or `handle_event`; every method takes `&mut self`,
//!     so updates to the ledgers are serialized by construction. A caller
//!     that shares the bot across tasks wraps it in a single `Mutex`.
//!   - Each ledger mutation is written through to the store before the
//!     call returns. If the write fails, the in-memory change is rolled
//!     back and the error is returned.
//!   - All randomness flows through the RngBank streams.

use crate::{
    command::BotCommand,
    config::BotConfig,
    directory::{Directory, USER_NOT_FOUND},
    error::{BotError, BotResult},
    event::BotEvent,
    format::{leaderboard_row, seconds_to_hms},
    ledger::{TimeoutLedger, TimeoutRecord},
    mentions::{count_keywords, MentionCounter},
    rng::{BotRng, RngBank, RngSlot},
    roster::{RoleIndex, Roster},
    store::BotStore,
    team::{make_chaos, make_team, render_sides},
    types::{elapsed_seconds, ChannelId, Timestamp, UserId},
};
use std::collections::HashMap;

const RULE_WIDTH: usize = 30;

/// The calls the platform integration makes into the bot.
pub trait PlatformEvents {
    /// The member's timeout flag flipped to `now_in_timeout` at `at`.
    fn on_role_changed(
        &mut self,
        user_id: UserId,
        display_name: &str,
        now_in_timeout: bool,
        at: Timestamp,
    ) -> BotResult<()>;

    /// A message was posted. Returns a reply to send, if any.
    fn on_message(
        &mut self,
        author_id: UserId,
        display_name: &str,
        channel_id: ChannelId,
        text: &str,
        at: Timestamp,
    ) -> BotResult<Option<String>>;
}

pub struct DadBot<'a> {
    config:      &'a BotConfig,
    entry_names: Vec<String>,
    role_index:  RoleIndex,
    team_rng:    BotRng,
    chaos_rng:   BotRng,
    timeouts:    TimeoutLedger,
    mentions:    MentionCounter,
    /// Last mention reply per channel, for the reply cooldown.
    last_mention_reply: HashMap<ChannelId, Timestamp>,
    store:       BotStore,
}

impl<'a> DadBot<'a> {
    /// Wire the bot from its collaborators and load persisted ledger state.
    /// `store` must already be migrated.
    pub fn new(
        config: &'a BotConfig,
        roster: &Roster,
        store: BotStore,
        seed: u64,
    ) -> BotResult<Self> {
        let (entry_names, role_index) = roster.split();
        let bank = RngBank::new(seed);
        let timeouts = TimeoutLedger::from_records(store.load_timeout_records()?);
        let mentions = MentionCounter::from_records(store.load_mention_records()?);
        log::info!(
            "bot ready: {} roster entries, {} timeout records, seed {}",
            entry_names.len(),
            timeouts.len(),
            bank.master_seed()
        );
        Ok(Self {
            config,
            entry_names,
            role_index,
            team_rng: bank.for_slot(RngSlot::Team),
            chaos_rng: bank.for_slot(RngSlot::Chaos),
            timeouts,
            mentions,
            last_mention_reply: HashMap::new(),
            store,
        })
    }

    pub fn timeouts(&self) -> &TimeoutLedger {
        &self.timeouts
    }

    pub fn mentions(&self) -> &MentionCounter {
        &self.mentions
    }

    pub fn store(&self) -> &BotStore {
        &self.store
    }

    /// Dispatch one wire event. Returns the reply text, if any.
    pub fn handle_event(
        &mut self,
        event: &BotEvent,
        directory: &dyn Directory,
    ) -> BotResult<Option<String>> {
        log::debug!("event: {}", event.type_name());
        match event {
            BotEvent::MemberRoleChanged { user_id, display_name, now_in_timeout, at } => {
                self.on_role_changed(*user_id, display_name, *now_in_timeout, *at)?;
                Ok(None)
            }
            BotEvent::MessageReceived { author_id, display_name, channel_id, text, at } => {
                self.on_message(*author_id, display_name, *channel_id, text, *at)
            }
            BotEvent::DisplayNameChanged { user_id, before, after, at } => {
                self.on_display_name_changed(*user_id, before, after, *at)?;
                Ok(None)
            }
            BotEvent::Command { command, at } => {
                self.handle_command(command, *at, directory).map(Some)
            }
        }
    }

    /// Keep both the old and the new name in the user's history.
    pub fn on_display_name_changed(
        &mut self,
        user_id: UserId,
        before: &str,
        after: &str,
        at: Timestamp,
    ) -> BotResult<()> {
        if before == after {
            return Ok(());
        }
        self.store.record_display_name(user_id, before, at)?;
        self.store.record_display_name(user_id, after, at)?;
        Ok(())
    }

    pub fn handle_command(
        &mut self,
        command: &BotCommand,
        at: Timestamp,
        directory: &dyn Directory,
    ) -> BotResult<String> {
        log::debug!("command: {}", command.name());
        match command {
            BotCommand::Team => {
                Ok(make_team(&self.role_index, &mut self.team_rng)?.join("\n"))
            }
            BotCommand::Teams => {
                render_sides(|| make_team(&self.role_index, &mut self.team_rng))
            }
            BotCommand::Chaos => {
                render_sides(|| make_chaos(&self.entry_names, &mut self.chaos_rng))
            }
            BotCommand::Jailtime { users } if users.is_empty() => {
                Ok(self.render_jail_leaderboard(at, directory))
            }
            BotCommand::Jailtime { users } => {
                Ok(self.render_jail_users(users, at, directory))
            }
            BotCommand::Mistborn => Ok(self.render_mention_leaderboard(directory)),
            BotCommand::History { user } => self.render_history(*user, at, directory),
        }
    }

    /// Directory first, then the name the ledger last saw, then a placeholder.
    fn resolve_name(&self, user_id: UserId, directory: &dyn Directory) -> String {
        directory
            .display_name(user_id)
            .or_else(|| {
                self.timeouts
                    .record(user_id)
                    .map(|r| r.display_name.clone())
                    .filter(|n| !n.is_empty())
            })
            .unwrap_or_else(|| USER_NOT_FOUND.to_string())
    }

    fn render_jail_users(
        &self,
        users: &[UserId],
        at: Timestamp,
        directory: &dyn Directory,
    ) -> String {
        users
            .iter()
            .map(|&user_id| {
                let name = self.resolve_name(user_id, directory);
                let record = self.timeouts.record_or_default(user_id, &name);
                format!(
                    "{name} has been in timeout {} times for {}.",
                    record.count,
                    seconds_to_hms(record.effective_duration(at))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_jail_leaderboard(&self, at: Timestamp, directory: &dyn Directory) -> String {
        if self.timeouts.is_empty() {
            return "No timeouts yet.".to_string();
        }
        let board = self.timeouts.leaderboard(at, self.config.timeout_leaderboard_size);
        let rule = "-".repeat(RULE_WIDTH);
        let rows = |ranked: &[(u64, UserId)], metric: &dyn Fn(u64) -> String| -> String {
            ranked
                .iter()
                .enumerate()
                .map(|(i, (value, user_id))| {
                    leaderboard_row(i + 1, &metric(*value), &self.resolve_name(*user_id, directory))
                })
                .collect::<Vec<_>>()
                .join("\n")
        };
        [
            "```Most timed out:".to_string(),
            rule.clone(),
            rows(&board.by_count, &|n: u64| n.to_string()),
            rule.clone(),
            "Longest timed out:".to_string(),
            rule.clone(),
            rows(&board.by_duration, &seconds_to_hms),
            "```".to_string(),
        ]
        .join("\n")
    }

    fn render_mention_leaderboard(&self, directory: &dyn Directory) -> String {
        let size = self.config.mention_leaderboard_size;
        let board = self.mentions.leaderboard(size);
        let mut lines = vec![format!("```Mistborn / Sanderson Top {size} Leaderboard")];
        for (i, (count, user_id)) in board.iter().enumerate() {
            lines.push(leaderboard_row(
                i + 1,
                &count.to_string(),
                &self.resolve_name(*user_id, directory),
            ));
        }
        if let Some(honorary) = self.config.honorary_user_id {
            if !board.iter().any(|(_, user_id)| *user_id == honorary) {
                lines.push(format!(
                    "\nHonorary Mention: {} with {}",
                    self.resolve_name(honorary, directory),
                    self.mentions.count(honorary)
                ));
            }
        }
        lines.push("```".to_string());
        lines.join("\n")
    }

    /// Newest name first. The directory's current name is recorded first.
    fn render_history(
        &mut self,
        user_id: UserId,
        at: Timestamp,
        directory: &dyn Directory,
    ) -> BotResult<String> {
        if let Some(current) = directory.display_name(user_id) {
            self.store.record_display_name(user_id, &current, at)?;
        }
        let mut history = self.store.display_name_history(user_id)?;
        if history.is_empty() {
            return Ok(format!(
                "No name history for {}.",
                self.resolve_name(user_id, directory)
            ));
        }
        history.reverse();
        Ok(history.join("\n"))
    }

    /// Write `record` through; on failure put `previous` back in the ledger.
    fn persist_timeout(
        &mut self,
        record: &TimeoutRecord,
        previous: Option<TimeoutRecord>,
    ) -> BotResult<()> {
        if let Err(e) = self.store.save_timeout_record(record) {
            log::warn!("timeout record for {} not saved; rolled back: {e}", record.user_id);
            self.timeouts.restore(record.user_id, previous);
            return Err(e);
        }
        Ok(())
    }

    fn mention_reply_allowed(&self, channel_id: ChannelId, at: Timestamp) -> bool {
        match self.last_mention_reply.get(&channel_id) {
            Some(&last) => elapsed_seconds(last, at) >= self.config.mention_reply_cooldown_secs,
            None => true,
        }
    }
}

impl PlatformEvents for DadBot<'_> {
    fn on_role_changed(
        &mut self,
        user_id: UserId,
        display_name: &str,
        now_in_timeout: bool,
        at: Timestamp,
    ) -> BotResult<()> {
        let previous = self.timeouts.record(user_id).cloned();
        if now_in_timeout {
            let (record, changed) = self.timeouts.enter(user_id, display_name, at);
            if changed {
                log::info!("{display_name} entered timeout (#{})", record.count);
            }
            return self.persist_timeout(&record, previous);
        }
        match self.timeouts.leave(user_id, display_name, at) {
            Ok(record) => {
                log::info!(
                    "{display_name} left timeout; total {}s",
                    record.cumulative_seconds
                );
                self.persist_timeout(&record, previous)
            }
            Err(BotError::InconsistentState { .. }) => {
                log::error!("{display_name} ({user_id}) left timeout when not in it");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn on_message(
        &mut self,
        author_id: UserId,
        display_name: &str,
        channel_id: ChannelId,
        text: &str,
        at: Timestamp,
    ) -> BotResult<Option<String>> {
        if Some(author_id) == self.config.bot_user_id
            || text.trim().eq_ignore_ascii_case(&self.config.mention_command)
        {
            return Ok(None);
        }
        let hits = count_keywords(text, &self.config.mention_keywords);
        if hits == 0 {
            return Ok(None);
        }
        let previous = self.mentions.get(author_id);
        let running = self.mentions.record_mention(author_id, hits);
        if let Err(e) = self
            .store
            .save_mention_count(author_id, self.mentions.count(author_id))
        {
            log::warn!("mention count for {author_id} not saved; rolled back: {e}");
            self.mentions.restore(author_id, previous);
            return Err(e);
        }

        if !self.mention_reply_allowed(channel_id, at) {
            return Ok(None);
        }
        self.last_mention_reply.insert(channel_id, at);
        Ok(Some(format!(
            "{display_name} has mentioned Mistborn or Sanderson {running} time(s)."
        )))
    }
}
