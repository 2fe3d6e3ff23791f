mod difficulty;
mod ids;
pub mod leaderboard;
mod player;
mod question;

pub use difficulty::{Difficulty, DifficultyShift, Operation, ParseDifficultyError};
pub use ids::{EntryId, QuestionTicket, UserId};
pub use leaderboard::{
    LeaderboardEntry, NewLeaderboardEntry, TOP_LEADERBOARD_SIZE, rank_entries, top_entries,
};
pub use player::{MAX_PLAYER_NAME_CHARS, PlayerName, PlayerNameError, User};
pub use question::Question;
