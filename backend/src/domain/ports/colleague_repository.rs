//! Port for colleague persistence.

use async_trait::async_trait;

use crate::domain::{Colleague, ColleagueDraft, ColleagueId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by colleague repository adapters.
    pub enum ColleagueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "colleague repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "colleague repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } =>
            "colleague conflicts with existing data: {message}",
        /// A referenced skill or label does not exist.
        InvalidReference { message: String } =>
            "colleague references a missing row: {message}",
    }
}

/// Colleague storage, skills and labels included.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ColleagueRepository: Send + Sync {
    /// Every colleague, ordered by name.
    async fn list(&self) -> Result<Vec<Colleague>, ColleagueRepositoryError>;

    /// Colleague by id.
    async fn find(&self, id: ColleagueId) -> Result<Option<Colleague>, ColleagueRepositoryError>;

    /// Insert a colleague created in this application.
    async fn create(&self, draft: &ColleagueDraft) -> Result<Colleague, ColleagueRepositoryError>;

    /// Replace the editable fields; `None` when missing.
    async fn update(
        &self,
        id: ColleagueId,
        draft: &ColleagueDraft,
    ) -> Result<Option<Colleague>, ColleagueRepositoryError>;

    /// Remove a colleague with their placements.
    async fn delete(&self, id: ColleagueId) -> Result<bool, ColleagueRepositoryError>;
}
