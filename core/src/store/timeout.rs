//! Store methods for the timeout ledger.

use crate::{error::BotResult, ledger::TimeoutRecord};
use rusqlite::params;

use super::{timestamp_from_secs, BotStore};

impl BotStore {
    /// Every timeout record, in first-seen order.
    pub fn load_timeout_records(&self) -> BotResult<Vec<TimeoutRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, count, cumulative_seconds, open_since, display_name
             FROM timeout_record
             ORDER BY seen_order ASC",
        )?;
        let records = stmt
            .query_map([], |row| {
                let open_since = match row.get::<_, Option<i64>>(3)? {
                    Some(secs) => Some(timestamp_from_secs(3, secs)?),
                    None => None,
                };
                Ok(TimeoutRecord {
                    user_id:            row.get::<_, i64>(0)? as u64,
                    count:              row.get::<_, i64>(1)? as u64,
                    cumulative_seconds: row.get::<_, i64>(2)? as u64,
                    open_since,
                    display_name:       row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Insert or overwrite one record inside a transaction.
    /// A new user is appended to the end of the first-seen order.
    pub fn save_timeout_record(&mut self, record: &TimeoutRecord) -> BotResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO timeout_record (
                user_id, count, cumulative_seconds, open_since, display_name, seen_order
             ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                (SELECT COALESCE(MAX(seen_order), 0) + 1 FROM timeout_record)
             )
             ON CONFLICT(user_id) DO UPDATE SET
                count              = excluded.count,
                cumulative_seconds = excluded.cumulative_seconds,
                open_since         = excluded.open_since,
                display_name       = excluded.display_name",
            params![
                record.user_id as i64,
                record.count as i64,
                record.cumulative_seconds as i64,
                record.open_since.map(|t| t.timestamp()),
                &record.display_name,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ── Test / summary helpers ────────────────────────────────────────

    pub fn timeout_record_count(&self) -> BotResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM timeout_record",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
