//! Port for skills and ministries.

use async_trait::async_trait;

use crate::domain::{Ministry, MinistryId, Skill, SkillId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue repository adapters.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "catalogue repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } =>
            "catalogue entry already exists: {message}",
    }
}

/// Skill and ministry storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Skills ordered by name.
    async fn list_skills(&self) -> Result<Vec<Skill>, CatalogueRepositoryError>;

    /// Skill with exactly this name.
    async fn find_skill_by_name(&self, name: &str)
    -> Result<Option<Skill>, CatalogueRepositoryError>;

    /// Insert a skill.
    async fn create_skill(&self, name: &str) -> Result<Skill, CatalogueRepositoryError>;

    /// Remove a skill; services asking for it lose their skill.
    async fn delete_skill(&self, id: SkillId) -> Result<bool, CatalogueRepositoryError>;

    /// Ministries ordered by name.
    async fn list_ministries(&self) -> Result<Vec<Ministry>, CatalogueRepositoryError>;

    /// Ministry by id.
    async fn find_ministry(
        &self,
        id: MinistryId,
    ) -> Result<Option<Ministry>, CatalogueRepositoryError>;
}
