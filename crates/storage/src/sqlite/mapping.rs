use quiz_core::model::{
    Difficulty, EntryId, LeaderboardEntry, PlayerName, User, UserId,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn entry_id_from_i64(v: i64) -> Result<EntryId, StorageError> {
    Ok(EntryId::new(i64_to_u64("entry_id", v)?))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

/// Exact `as_code` match only; unlike `FromStr`, stored rows are never trimmed or case-folded.
pub(crate) fn parse_difficulty(s: &str) -> Result<Difficulty, StorageError> {
    Difficulty::ALL
        .into_iter()
        .find(|d| d.as_code() == s)
        .ok_or_else(|| StorageError::Serialization(format!("invalid difficulty: {s}")))
}

pub(crate) fn map_entry_row(row: &sqlx::sqlite::SqliteRow) -> Result<LeaderboardEntry, StorageError> {
    let id = entry_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let name = PlayerName::parse(row.try_get::<String, _>("name").map_err(ser)?).map_err(ser)?;
    let score_i64: i64 = row.try_get("score").map_err(ser)?;
    let score = u32::try_from(score_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid score: {score_i64}")))?;
    let difficulty_str: String = row.try_get("difficulty").map_err(ser)?;
    let difficulty = parse_difficulty(difficulty_str.as_str())?;
    let recorded_at = row.try_get("recorded_at").map_err(ser)?;
    let owner = row
        .try_get::<Option<i64>, _>("user_id")
        .map_err(ser)?
        .map(user_id_from_i64)
        .transpose()?;

    Ok(LeaderboardEntry {
        id,
        name,
        score,
        difficulty,
        recorded_at,
        owner,
    })
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: user_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        username: PlayerName::parse(row.try_get::<String, _>("username").map_err(ser)?)
            .map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
