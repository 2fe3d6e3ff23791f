use quiz_core::model::{LeaderboardEntry, NewLeaderboardEntry, UserId};

use super::SqliteRepository;
use super::mapping::{entry_id_from_i64, id_i64, map_entry_row};
use crate::repository::{LeaderboardRepository, StorageError};

const ENTRY_COLUMNS: &str = "id, name, score, difficulty, recorded_at, user_id";

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<LeaderboardEntry>, StorageError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(map_entry_row(row)?);
    }
    Ok(out)
}

#[async_trait::async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn append_entry(
        &self,
        entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, StorageError> {
        let owner = entry
            .owner
            .map(|id| id_i64("user_id", id.value()))
            .transpose()?;

        let res = sqlx::query(
            r"
                INSERT INTO leaderboard_entries (name, score, difficulty, recorded_at, user_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(entry.name.as_str())
        .bind(i64::from(entry.score))
        .bind(entry.difficulty.as_code())
        .bind(entry.recorded_at)
        .bind(owner)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let id = entry_id_from_i64(res.last_insert_rowid())?;
        Ok(LeaderboardEntry::from_new(id, entry))
    }

    async fn top_entries(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries ORDER BY score DESC, id ASC LIMIT ?1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        map_rows(&rows)
    }

    async fn all_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let sql =
            format!("SELECT {ENTRY_COLUMNS} FROM leaderboard_entries ORDER BY score DESC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        map_rows(&rows)
    }

    async fn entries_for_owner(
        &self,
        owner: UserId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries \
             WHERE user_id = ?1 ORDER BY score DESC, id ASC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(id_i64("user_id", owner.value())?)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        map_rows(&rows)
    }

    async fn clear(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM leaderboard_entries")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(res.rows_affected())
    }
}
