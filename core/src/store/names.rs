//! Store methods for display-name history.

use crate::{
    error::BotResult,
    types::{Timestamp, UserId},
};
use rusqlite::{params, OptionalExtension};

use super::BotStore;

impl BotStore {
    /// Append `name` unless it already is the user's latest recorded name.
    /// Returns whether a row was written.
    pub fn record_display_name(
        &mut self,
        user_id: UserId,
        name: &str,
        at: Timestamp,
    ) -> BotResult<bool> {
        let tx = self.conn.transaction()?;
        let latest: Option<String> = tx
            .query_row(
                "SELECT display_name FROM name_history
                 WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
                params![user_id as i64],
                |row| row.get(0),
            )
            .optional()?;
        if latest.as_deref() == Some(name) {
            return Ok(false);
        }
        tx.execute(
            "INSERT INTO name_history (user_id, display_name, recorded_at)
             VALUES (?1, ?2, ?3)",
            params![user_id as i64, name, at.timestamp()],
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// Every recorded name for `user_id`, oldest first.
    pub fn display_name_history(&self, user_id: UserId) -> BotResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT display_name FROM name_history WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let names = stmt
            .query_map(params![user_id as i64], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}
