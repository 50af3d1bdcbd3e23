//! Port for organisation persistence.
//!
//! Hierarchy questions are answered in memory from [`list_all`], so the
//! port stays a plain row store.
//!
//! [`list_all`]: OrganizationRepository::list_all

use async_trait::async_trait;

use crate::domain::{Organization, OrganizationDraft, OrganizationId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by organisation repository adapters.
    pub enum OrganizationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "organization repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "organization repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } =>
            "organization conflicts with existing data: {message}",
        /// A referenced row does not exist.
        InvalidReference { message: String } =>
            "organization references a missing row: {message}",
    }
}

/// Organisation storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Every organisation, dissolved ones included.
    async fn list_all(&self) -> Result<Vec<Organization>, OrganizationRepositoryError>;

    /// Insert an active organisation.
    async fn create(
        &self,
        draft: &OrganizationDraft,
    ) -> Result<Organization, OrganizationRepositoryError>;

    /// Overwrite every stored field of `organization`.
    async fn save(&self, organization: &Organization) -> Result<(), OrganizationRepositoryError>;

    /// Remove an organisation; `false` when it did not exist.
    async fn delete(&self, id: OrganizationId) -> Result<bool, OrganizationRepositoryError>;

    /// Number of assignments linked to the organisation.
    async fn count_assignment_links(
        &self,
        id: OrganizationId,
    ) -> Result<usize, OrganizationRepositoryError>;
}
