use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    EntryId, LeaderboardEntry, NewLeaderboardEntry, PlayerName, User, UserId, top_entries,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for persisted scores.
///
/// Every listing is ordered by score descending, then by arrival.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Store a new score and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_entry(&self, entry: NewLeaderboardEntry)
    -> Result<LeaderboardEntry, StorageError>;

    /// Highest `limit` scores.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn top_entries(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Every stored score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn all_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Highest `limit` scores saved by one account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn entries_for_owner(
        &self,
        owner: UserId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Remove every score. Returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn clear(&self) -> Result<u64, StorageError>;
}

/// Repository contract for player accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn create_user(
        &self,
        username: &PlayerName,
        created_at: DateTime<Utc>,
    ) -> Result<User, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
}

#[derive(Default)]
struct LeaderboardTable {
    next_id: u64,
    rows: Vec<LeaderboardEntry>,
}

#[derive(Default)]
struct UserTable {
    next_id: u64,
    rows: HashMap<UserId, User>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    leaderboard: Arc<Mutex<LeaderboardTable>>,
    users: Arc<Mutex<UserTable>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ranked<F>(&self, keep: F, limit: Option<u32>) -> Result<Vec<LeaderboardEntry>, StorageError>
    where
        F: Fn(&LeaderboardEntry) -> bool,
    {
        let guard = self
            .leaderboard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let kept: Vec<LeaderboardEntry> =
            guard.rows.iter().filter(|e| keep(e)).cloned().collect();
        Ok(top_entries(&kept, limit.unwrap_or(u32::MAX)))
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn append_entry(
        &self,
        entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, StorageError> {
        let mut guard = self
            .leaderboard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let stored = LeaderboardEntry::from_new(EntryId::new(guard.next_id), entry);
        guard.rows.push(stored.clone());
        Ok(stored)
    }

    async fn top_entries(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        self.ranked(|_| true, Some(limit))
    }

    async fn all_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        self.ranked(|_| true, None)
    }

    async fn entries_for_owner(
        &self,
        owner: UserId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        self.ranked(|e| e.owner == Some(owner), Some(limit))
    }

    async fn clear(&self) -> Result<u64, StorageError> {
        let mut guard = self
            .leaderboard
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let removed = guard.rows.len() as u64;
        guard.rows.clear();
        Ok(removed)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(
        &self,
        username: &PlayerName,
        created_at: DateTime<Utc>,
    ) -> Result<User, StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.rows.values().any(|u| u.username == *username) {
            return Err(StorageError::Conflict);
        }
        guard.next_id += 1;
        let user = User {
            id: UserId::new(guard.next_id),
            username: username.clone(),
            created_at,
        };
        guard.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.rows.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let wanted = username.trim();
        Ok(guard
            .rows
            .values()
            .find(|u| u.username.as_str() == wanted)
            .cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo.clone());
        let users: Arc<dyn UserRepository> = Arc::new(repo);
        Self { leaderboard, users }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Difficulty;
    use quiz_core::time::fixed_now;

    fn submission(name: &str, score: u32, owner: Option<UserId>) -> NewLeaderboardEntry {
        NewLeaderboardEntry {
            name: PlayerName::parse(name).unwrap(),
            score,
            difficulty: Difficulty::Medium,
            recorded_at: fixed_now(),
            owner,
        }
    }

    #[tokio::test]
    async fn top_entries_rank_by_score_then_arrival() {
        let repo = InMemoryRepository::new();
        for (name, score) in [("a", 30), ("b", 50), ("c", 30), ("d", 10), ("e", 50), ("f", 5)] {
            repo.append_entry(submission(name, score, None)).await.unwrap();
        }

        let top = repo.top_entries(5).await.unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "e", "a", "c", "d"]);

        assert_eq!(repo.all_entries().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn owner_filter_and_clear() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new(9);
        repo.append_entry(submission("mine", 10, Some(owner))).await.unwrap();
        repo.append_entry(submission("other", 99, None)).await.unwrap();

        let mine = repo.entries_for_owner(owner, 10).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name.as_str(), "mine");

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert!(repo.all_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let repo = InMemoryRepository::new();
        let name = PlayerName::parse("ada").unwrap();
        let user = repo.create_user(&name, fixed_now()).await.unwrap();
        assert!(matches!(
            repo.create_user(&name, fixed_now()).await,
            Err(StorageError::Conflict)
        ));
        assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(repo.get_user_by_username(" ada ").await.unwrap(), Some(user));
        assert_eq!(repo.get_user_by_username("bob").await.unwrap(), None);
    }
}
