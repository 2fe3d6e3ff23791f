#![forbid(unsafe_code)]

pub mod account_service;
pub mod app_services;
pub mod error;
pub mod game;
pub mod leaderboard_service;

pub use quiz_core::Clock;

pub use account_service::{AccountService, Identity};
pub use app_services::AppServices;
pub use error::{AccountError, AppServicesError, GameServiceError, LeaderboardServiceError};
pub use game::{GameProgress, GameService, QuestionPrompt};
pub use leaderboard_service::{LeaderboardService, RankedEntry};
