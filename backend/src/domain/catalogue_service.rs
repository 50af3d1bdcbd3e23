//! Skill and ministry use cases.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{Error, Ministry, MinistryId, Permission, Skill, SkillId, User, skill_name};

/// Result of a get-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLookup {
    /// The skill.
    pub skill: Skill,
    /// Whether it was created by this call.
    pub created: bool,
}

/// Skill and ministry service.
#[derive(Clone)]
pub struct CatalogueService {
    repo: Arc<dyn CatalogueRepository>,
}

impl CatalogueService {
    /// Create the service over `repo`.
    pub fn new(repo: Arc<dyn CatalogueRepository>) -> Self {
        Self { repo }
    }

    fn map_error(error: CatalogueRepositoryError) -> Error {
        match error {
            CatalogueRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("catalogue repository unavailable: {message}"))
            }
            CatalogueRepositoryError::Query { message } => {
                Error::internal(format!("catalogue repository error: {message}"))
            }
            CatalogueRepositoryError::Conflict { message } => Error::conflict(message),
        }
    }

    /// Skills whose name contains `search`, case-insensitively.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn search_skills(&self, search: Option<&str>) -> Result<Vec<Skill>, Error> {
        let skills = self.repo.list_skills().await.map_err(Self::map_error)?;
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Ok(match needle {
            Some(needle) => skills
                .into_iter()
                .filter(|skill| skill.name.to_lowercase().contains(&needle))
                .collect(),
            None => skills,
        })
    }

    /// Skill with `raw_name`, created when missing.
    ///
    /// # Errors
    /// Rejects invalid names and propagates repository failures.
    pub async fn get_or_create_skill(&self, raw_name: &str) -> Result<SkillLookup, Error> {
        let name = skill_name(raw_name)?;
        if let Some(skill) = self
            .repo
            .find_skill_by_name(&name)
            .await
            .map_err(Self::map_error)?
        {
            return Ok(SkillLookup {
                skill,
                created: false,
            });
        }
        let skill = self.repo.create_skill(&name).await.map_err(Self::map_error)?;
        info!(id = skill.id, name = %skill.name, "created skill");
        Ok(SkillLookup {
            skill,
            created: true,
        })
    }

    /// Delete a skill.
    ///
    /// # Errors
    /// Requires `manage_skills`; unknown ids are not found.
    pub async fn delete_skill(&self, user: &User, id: SkillId) -> Result<(), Error> {
        user.require(Permission::ManageSkills)?;
        if self.repo.delete_skill(id).await.map_err(Self::map_error)? {
            info!(id, "deleted skill");
            Ok(())
        } else {
            Err(Error::not_found(format!("skill {id} not found")))
        }
    }

    /// Every ministry.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn ministries(&self) -> Result<Vec<Ministry>, Error> {
        self.repo.list_ministries().await.map_err(Self::map_error)
    }

    /// One ministry.
    ///
    /// # Errors
    /// Unknown ids are not found.
    pub async fn ministry(&self, id: MinistryId) -> Result<Ministry, Error> {
        self.repo
            .find_ministry(id)
            .await
            .map_err(Self::map_error)?
            .ok_or_else(|| Error::not_found(format!("ministry {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockCatalogueRepository;
    use crate::domain::testing::{member, superuser};
    use crate::domain::Role;

    fn skill(id: SkillId, name: &str) -> Skill {
        Skill {
            id,
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn search_filters_case_insensitively() {
        let mut repo = MockCatalogueRepository::new();
        repo.expect_list_skills()
            .returning(|| Ok(vec![skill(1, "Architect"), skill(2, "Data engineer")]));
        let service = CatalogueService::new(Arc::new(repo));

        let found = service.search_skills(Some(" ARCH ")).await.expect("search");
        assert_eq!(found, [skill(1, "Architect")]);
        let all = service.search_skills(None).await.expect("list");
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn get_or_create_reuses_existing_skill() {
        let mut repo = MockCatalogueRepository::new();
        repo.expect_find_skill_by_name()
            .withf(|name| name == "Architect")
            .times(1)
            .returning(|_| Ok(Some(skill(1, "Architect"))));
        repo.expect_create_skill().never();
        let service = CatalogueService::new(Arc::new(repo));

        let lookup = service.get_or_create_skill("  Architect ").await.expect("lookup");
        assert!(!lookup.created);
    }

    #[tokio::test]
    async fn get_or_create_creates_missing_skill() {
        let mut repo = MockCatalogueRepository::new();
        repo.expect_find_skill_by_name().returning(|_| Ok(None));
        repo.expect_create_skill()
            .times(1)
            .returning(|name| Ok(skill(9, name)));
        let service = CatalogueService::new(Arc::new(repo));

        let lookup = service.get_or_create_skill("Tester").await.expect("lookup");
        assert!(lookup.created);
        assert_eq!(lookup.skill.id, 9);
    }

    #[tokio::test]
    async fn delete_requires_permission_and_existing_skill() {
        let mut repo = MockCatalogueRepository::new();
        repo.expect_delete_skill().returning(|id| Ok(id == 1));
        let service = CatalogueService::new(Arc::new(repo));

        let forbidden = service
            .delete_skill(&member(&[Role::Beheerder], None), 1)
            .await
            .expect_err("beheerder cannot manage skills");
        assert_eq!(forbidden.code(), ErrorCode::Forbidden);
        service.delete_skill(&superuser(), 1).await.expect("deleted");
        let missing = service.delete_skill(&superuser(), 2).await.expect_err("missing");
        assert_eq!(missing.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut repo = MockCatalogueRepository::new();
        repo.expect_list_ministries()
            .returning(|| Err(CatalogueRepositoryError::connection("down")));
        let service = CatalogueService::new(Arc::new(repo));
        let err = service.ministries().await.expect_err("down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
