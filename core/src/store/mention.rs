//! Store methods for the mention counter.

use crate::{error::BotResult, types::UserId};
use rusqlite::params;

use super::BotStore;

impl BotStore {
    /// (user, count) pairs in first-seen order.
    pub fn load_mention_records(&self) -> BotResult<Vec<(UserId, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, count FROM mention_record ORDER BY seen_order ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn save_mention_count(&mut self, user_id: UserId, count: u64) -> BotResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO mention_record (user_id, count, seen_order)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(seen_order), 0) + 1 FROM mention_record))
             ON CONFLICT(user_id) DO UPDATE SET count = excluded.count",
            params![user_id as i64, count as i64],
        )?;
        tx.commit()?;
        Ok(())
    }
}
