//! CSV imports.
//!
//! Files are parsed and validated completely before anything is written;
//! the repository then applies each plan in one transaction.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{ImportRepository, ImportRepositoryError};
use crate::domain::{
    AllowedEmailDomains, Error, Permission, PlacementImportPlan, PlacementImportReport, User,
    UserImportPlan, UserImportReport,
};

const PLACEMENT_IMPORT_PERMISSIONS: [Permission; 4] = [
    Permission::AddAssignment,
    Permission::AddService,
    Permission::AddPlacement,
    Permission::AddColleague,
];

/// Import service.
#[derive(Clone)]
pub struct ImportService {
    repo: Arc<dyn ImportRepository>,
    domains: AllowedEmailDomains,
}

fn map_error(error: ImportRepositoryError) -> Error {
    match error {
        ImportRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("import repository unavailable: {message}"))
        }
        ImportRepositoryError::Query { message } => {
            Error::internal(format!("import failed: {message}"))
        }
    }
}

impl ImportService {
    /// Create the service; imported users must match `domains`.
    pub fn new(repo: Arc<dyn ImportRepository>, domains: AllowedEmailDomains) -> Self {
        Self { repo, domains }
    }

    /// Import placements on behalf of `user`.
    ///
    /// # Errors
    /// Requires the add permissions for assignments, services, placements
    /// and colleagues; rejects invalid files with every problem listed.
    pub async fn import_placements(
        &self,
        user: &User,
        content: &str,
    ) -> Result<PlacementImportReport, Error> {
        for permission in PLACEMENT_IMPORT_PERMISSIONS {
            user.require(permission)?;
        }
        self.placements(content).await
    }

    /// Import placements without a permission check, for management commands.
    ///
    /// # Errors
    /// Rejects invalid files with every problem listed.
    pub async fn placements(&self, content: &str) -> Result<PlacementImportReport, Error> {
        let plan = PlacementImportPlan::parse(content)?;
        let report = self
            .repo
            .import_placements(&plan)
            .await
            .map_err(map_error)?;
        info!(
            rows = plan.rows.len(),
            placements = report.placements_created,
            warnings = report.warnings.len(),
            "imported placements"
        );
        Ok(report)
    }

    /// Import users on behalf of `user`.
    ///
    /// # Errors
    /// Requires `add_user`; rejects invalid files with every problem listed.
    pub async fn import_users(&self, user: &User, content: &str) -> Result<UserImportReport, Error> {
        user.require(Permission::AddUser)?;
        self.users(content).await
    }

    /// Import users without a permission check, for management commands.
    ///
    /// # Errors
    /// Rejects invalid files with every problem listed.
    pub async fn users(&self, content: &str) -> Result<UserImportReport, Error> {
        let plan = UserImportPlan::parse(content, &self.domains)?;
        let report = self.repo.import_users(&plan).await.map_err(map_error)?;
        info!(
            rows = plan.rows.len(),
            users = report.users_created,
            warnings = report.warnings.len(),
            "imported users"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockImportRepository;
    use crate::domain::testing::{member, superuser};
    use crate::domain::{ErrorCode, Role};
    use rstest::rstest;

    const USERS: &str = "first_name,last_name,email\nEls,Smit,els@rijksoverheid.nl\n";

    fn service(repo: MockImportRepository) -> ImportService {
        ImportService::new(Arc::new(repo), AllowedEmailDomains::parse("@rijksoverheid.nl"))
    }

    #[rstest]
    #[case(&[Role::BusinessDevelopmentManager], true)]
    #[case(&[Role::Beheerder], false)]
    #[case(&[Role::Consultant], false)]
    #[tokio::test]
    async fn placement_import_needs_every_add_permission(
        #[case] roles: &[Role],
        #[case] allowed: bool,
    ) {
        let mut repo = MockImportRepository::new();
        repo.expect_import_placements()
            .returning(|_| Ok(PlacementImportReport::default()));
        let content = "assignment_name,assignment_description,assignment_owner,assignment_owner_email,\
                       assignment_organization,assignment_ministry,assignment_start_date,assignment_end_date,\
                       service_skill,placement_colleague_name,placement_colleague_email\n\
                       Opdracht,,,,,,01-01-2026,31-12-2026,Architect,Anna,anna@rijksoverheid.nl\n";
        let result = service(repo)
            .import_placements(&member(roles, None), content)
            .await;
        match result {
            Ok(_) => assert!(allowed),
            Err(err) => {
                assert!(!allowed);
                assert_eq!(err.code(), ErrorCode::Forbidden);
            }
        }
    }

    #[tokio::test]
    async fn invalid_files_never_reach_the_repository() {
        let mut repo = MockImportRepository::new();
        repo.expect_import_users().never();
        let err = service(repo)
            .import_users(&superuser(), "first_name,last_name,email\nEls,Smit,els@example.com\n")
            .await
            .expect_err("invalid domain");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn user_import_reports_counts() {
        let mut repo = MockImportRepository::new();
        repo.expect_import_users()
            .withf(|plan| plan.rows.len() == 1)
            .returning(|_| {
                Ok(UserImportReport {
                    users_created: 1,
                    ..UserImportReport::default()
                })
            });
        let report = service(repo)
            .import_users(&member(&[Role::Beheerder], None), USERS)
            .await
            .expect("imported");
        assert_eq!(report.users_created, 1);
    }
}
