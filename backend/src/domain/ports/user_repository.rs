//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserDraft, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The e-mail address is already registered.
        Conflict { message: String } => "user already exists: {message}",
        /// A referenced label does not exist.
        InvalidReference { message: String } => "user references a missing row: {message}",
    }
}

/// User storage. Users are returned with roles, labels and the linked
/// colleague resolved.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user, ordered by name.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by e-mail, ignoring case.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Insert a user with roles and labels.
    async fn create(&self, draft: &UserDraft, is_superuser: bool)
    -> Result<User, UserRepositoryError>;

    /// Replace names, e-mail, roles and labels; `None` when missing.
    async fn update(
        &self,
        id: UserId,
        draft: &UserDraft,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Remove a user; `false` when missing.
    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError>;
}
