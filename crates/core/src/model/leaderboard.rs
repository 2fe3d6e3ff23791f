use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::GameSummary;
use crate::model::{Difficulty, EntryId, PlayerName, UserId};

/// Size of the default "top" leaderboard view.
pub const TOP_LEADERBOARD_SIZE: u32 = 5;

/// Score submission before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaderboardEntry {
    pub name: PlayerName,
    pub score: u32,
    pub difficulty: Difficulty,
    pub recorded_at: DateTime<Utc>,
    pub owner: Option<UserId>,
}

impl NewLeaderboardEntry {
    /// Build a submission from a finished game.
    ///
    /// The recorded difficulty is the highest level reached, not the level
    /// the game ended on.
    #[must_use]
    pub fn from_summary(
        name: PlayerName,
        summary: &GameSummary,
        recorded_at: DateTime<Utc>,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            name,
            score: summary.score,
            difficulty: summary.highest_difficulty,
            recorded_at,
            owner,
        }
    }
}

/// Persisted leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: EntryId,
    pub name: PlayerName,
    pub score: u32,
    pub difficulty: Difficulty,
    pub recorded_at: DateTime<Utc>,
    pub owner: Option<UserId>,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn from_new(id: EntryId, entry: NewLeaderboardEntry) -> Self {
        Self {
            id,
            name: entry.name,
            score: entry.score,
            difficulty: entry.difficulty,
            recorded_at: entry.recorded_at,
            owner: entry.owner,
        }
    }

    /// ISO-8601 timestamp with millisecond precision.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.recorded_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Order entries by score descending; equal scores keep arrival order.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
}

/// Ranked copy truncated to `limit` entries.
#[must_use]
pub fn top_entries(entries: &[LeaderboardEntry], limit: u32) -> Vec<LeaderboardEntry> {
    let mut ranked = entries.to_vec();
    rank_entries(&mut ranked);
    ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn entry(id: u64, name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            id: EntryId::new(id),
            name: PlayerName::parse(name).unwrap(),
            score,
            difficulty: Difficulty::Easy,
            recorded_at: fixed_now(),
            owner: None,
        }
    }

    #[test]
    fn ties_keep_arrival_order() {
        let entries = vec![
            entry(1, "first", 40),
            entry(2, "second", 90),
            entry(3, "third", 40),
            entry(4, "fourth", 90),
        ];
        let ranked = top_entries(&entries, 10);
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["second", "fourth", "first", "third"]);
    }

    #[test]
    fn top_truncates() {
        let entries: Vec<_> = (1..=8).map(|i| entry(i, "p", u32::try_from(i).unwrap())).collect();
        let ranked = top_entries(&entries, TOP_LEADERBOARD_SIZE);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].score, 8);
        assert_eq!(ranked[4].score, 4);
    }

    #[test]
    fn summary_records_highest_difficulty() {
        let summary = GameSummary {
            score: 120,
            correct_count: 8,
            wrong_count: 2,
            highest_difficulty: Difficulty::Hard,
            elapsed_seconds: 95,
        };
        let new = NewLeaderboardEntry::from_summary(
            PlayerName::parse("Ada").unwrap(),
            &summary,
            fixed_now(),
            Some(UserId::new(3)),
        );
        assert_eq!(new.difficulty, Difficulty::Hard);
        assert_eq!(new.score, 120);
        assert_eq!(new.owner, Some(UserId::new(3)));
    }

    #[test]
    fn timestamp_is_iso8601() {
        let e = entry(1, "Ada", 10);
        assert_eq!(e.timestamp(), "2023-11-14T22:13:20.000Z");
    }
}
