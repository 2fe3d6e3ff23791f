use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{Difficulty, EntryId, LeaderboardEntry, TOP_LEADERBOARD_SIZE};
use storage::repository::LeaderboardRepository;

use crate::account_service::Identity;
use crate::error::LeaderboardServiceError;

/// Presentation-agnostic leaderboard row.
///
/// No pre-formatted strings; the UI decides how to render names and dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// 1-based position in the listing.
    pub rank: usize,
    pub id: EntryId,
    pub name: String,
    pub score: u32,
    pub difficulty: Difficulty,
    pub recorded_at: DateTime<Utc>,
    pub is_registered: bool,
}

impl RankedEntry {
    fn from_entry(rank: usize, entry: LeaderboardEntry) -> Self {
        Self {
            rank,
            id: entry.id,
            name: entry.name.into(),
            score: entry.score,
            difficulty: entry.difficulty,
            recorded_at: entry.recorded_at,
            is_registered: entry.owner.is_some(),
        }
    }
}

fn ranked(entries: Vec<LeaderboardEntry>) -> Vec<RankedEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankedEntry::from_entry(i + 1, entry))
        .collect()
}

/// Read side of the leaderboard.
#[derive(Clone)]
pub struct LeaderboardService {
    leaderboard: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(leaderboard: Arc<dyn LeaderboardRepository>) -> Self {
        Self { leaderboard }
    }

    /// The default top-five view.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` on backend failures.
    pub async fn top(&self) -> Result<Vec<RankedEntry>, LeaderboardServiceError> {
        self.top_n(TOP_LEADERBOARD_SIZE).await
    }

    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` on backend failures.
    pub async fn top_n(&self, limit: u32) -> Result<Vec<RankedEntry>, LeaderboardServiceError> {
        Ok(ranked(self.leaderboard.top_entries(limit).await?))
    }

    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` on backend failures.
    pub async fn all(&self) -> Result<Vec<RankedEntry>, LeaderboardServiceError> {
        Ok(ranked(self.leaderboard.all_entries().await?))
    }

    /// Best scores saved under one account, ranked among themselves.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` on backend failures.
    pub async fn for_player(
        &self,
        identity: &Identity,
        limit: u32,
    ) -> Result<Vec<RankedEntry>, LeaderboardServiceError> {
        Ok(ranked(
            self.leaderboard
                .entries_for_owner(identity.user_id, limit)
                .await?,
        ))
    }

    /// Delete every saved score.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardServiceError::Storage` on backend failures.
    pub async fn reset(&self) -> Result<u64, LeaderboardServiceError> {
        let removed = self.leaderboard.clear().await?;
        tracing::warn!(removed, "leaderboard cleared");
        Ok(removed)
    }
}
