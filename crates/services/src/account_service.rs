use std::sync::Arc;

use tracing::info;

use quiz_core::model::{PlayerName, User, UserId};
use storage::repository::{StorageError, UserRepository};

use crate::Clock;
use crate::error::AccountError;

/// Identity supplied by the account layer and attached to saved scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: PlayerName,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
        }
    }
}

/// Minimal account registry. There are no credentials; a username is the identity.
#[derive(Clone)]
pub struct AccountService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Register a new username.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Username` for invalid names,
    /// `AccountError::UsernameTaken` for duplicates, or `AccountError::Storage`.
    pub async fn register(&self, username: &str) -> Result<Identity, AccountError> {
        let name = PlayerName::parse(username)?;
        let user = match self.users.create_user(&name, self.clock.now()).await {
            Ok(user) => user,
            Err(StorageError::Conflict) => {
                return Err(AccountError::UsernameTaken(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %user.id, "account registered");
        Ok(user.into())
    }

    /// Look up an existing username.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` on backend failures.
    pub async fn identify(&self, username: &str) -> Result<Option<Identity>, AccountError> {
        Ok(self
            .users
            .get_user_by_username(username)
            .await?
            .map(Identity::from))
    }

    /// Look up an identity by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` on backend failures.
    pub async fn identity(&self, id: UserId) -> Result<Option<Identity>, AccountError> {
        Ok(self.users.get_user(id).await?.map(Identity::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> AccountService {
        AccountService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn register_then_identify() {
        let accounts = service();
        let identity = accounts.register("  neo ").await.unwrap();
        assert_eq!(identity.username.as_str(), "neo");

        assert_eq!(accounts.identify("neo").await.unwrap(), Some(identity.clone()));
        assert_eq!(
            accounts.identity(identity.user_id).await.unwrap(),
            Some(identity)
        );
        assert_eq!(accounts.identify("trinity").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_and_invalid_names_fail() {
        let accounts = service();
        accounts.register("neo").await.unwrap();
        assert!(matches!(
            accounts.register("neo").await,
            Err(AccountError::UsernameTaken(name)) if name == "neo"
        ));
        assert!(matches!(
            accounts.register("").await,
            Err(AccountError::Username(_))
        ));
    }
}
