use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::account_service::AccountService;
use crate::error::AppServicesError;
use crate::game::GameService;
use crate::leaderboard_service::LeaderboardService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    game: Arc<GameService>,
    leaderboard: Arc<LeaderboardService>,
    accounts: Arc<AccountService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or migrations fail.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over throwaway in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            game: Arc::new(GameService::new(clock, Arc::clone(&storage.leaderboard))),
            leaderboard: Arc::new(LeaderboardService::new(Arc::clone(&storage.leaderboard))),
            accounts: Arc::new(AccountService::new(clock, Arc::clone(&storage.users))),
        }
    }

    #[must_use]
    pub fn game(&self) -> Arc<GameService> {
        Arc::clone(&self.game)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn accounts(&self) -> Arc<AccountService> {
        Arc::clone(&self.accounts)
    }
}
