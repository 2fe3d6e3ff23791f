use chrono::{DateTime, Utc};
use quiz_core::model::{PlayerName, User, UserId};

use super::SqliteRepository;
use super::mapping::{id_i64, map_user_row, user_id_from_i64};
use crate::repository::{StorageError, UserRepository};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(
        &self,
        username: &PlayerName,
        created_at: DateTime<Utc>,
    ) -> Result<User, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO users (username, created_at)
                VALUES (?1, ?2)
            ",
        )
        .bind(username.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict
            } else {
                StorageError::Connection(e.to_string())
            }
        })?;

        Ok(User {
            id: user_id_from_i64(res.last_insert_rowid())?,
            username: username.clone(),
            created_at,
        })
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query("SELECT id, username, created_at FROM users WHERE id = ?1")
            .bind(id_i64("user_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        row.as_ref().map(map_user_row).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query("SELECT id, username, created_at FROM users WHERE username = ?1")
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        row.as_ref().map(map_user_row).transpose()
    }
}
