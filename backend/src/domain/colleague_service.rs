//! Colleague use cases.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::assignment_service::map_assignment_error;
use crate::domain::ports::{AssignmentRepository, ColleagueRepository, ColleagueRepositoryError};
use crate::domain::{
    Colleague, ColleagueDraft, ColleagueId, Error, LabelId, Permission, PlacementRecord, SkillId,
    User,
};

/// Filters for `GET /colleagues`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::IntoParams)]
pub struct ColleagueListQuery {
    /// Case-insensitive text matched against name and e-mail.
    #[serde(default, rename = "zoeken")]
    pub search: Option<String>,
    /// Only colleagues offering this skill.
    #[serde(default, rename = "rol")]
    pub skill_id: Option<SkillId>,
    /// Only colleagues carrying this label.
    #[serde(default, rename = "label")]
    pub label_id: Option<LabelId>,
}

impl ColleagueListQuery {
    fn matches(&self, colleague: &Colleague) -> bool {
        if self
            .skill_id
            .is_some_and(|id| !colleague.skill_ids.contains(&id))
        {
            return false;
        }
        if self
            .label_id
            .is_some_and(|id| !colleague.label_ids.contains(&id))
        {
            return false;
        }
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .is_none_or(|needle| {
                colleague.name.to_lowercase().contains(&needle)
                    || colleague.email.to_lowercase().contains(&needle)
            })
    }
}

/// Colleague with every placement they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ColleagueDetail {
    /// Stored colleague.
    pub colleague: Colleague,
    /// Placements, newest assignment first.
    pub placements: Vec<PlacementRecord>,
}

/// Colleague service.
#[derive(Clone)]
pub struct ColleagueService {
    repo: Arc<dyn ColleagueRepository>,
    assignments: Arc<dyn AssignmentRepository>,
}

fn map_error(error: ColleagueRepositoryError) -> Error {
    match error {
        ColleagueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("colleague repository unavailable: {message}"))
        }
        ColleagueRepositoryError::Query { message } => {
            Error::internal(format!("colleague repository error: {message}"))
        }
        ColleagueRepositoryError::Conflict { message } => Error::conflict(message),
        ColleagueRepositoryError::InvalidReference { message } => Error::invalid_request(message),
    }
}

impl ColleagueService {
    /// Create the service.
    pub fn new(
        repo: Arc<dyn ColleagueRepository>,
        assignments: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self { repo, assignments }
    }

    /// Colleagues matching `query`, by name.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self, query: &ColleagueListQuery) -> Result<Vec<Colleague>, Error> {
        let mut colleagues: Vec<Colleague> = self
            .repo
            .list()
            .await
            .map_err(map_error)?
            .into_iter()
            .filter(|colleague| query.matches(colleague))
            .collect();
        colleagues.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(colleagues)
    }

    /// Colleague with placements.
    ///
    /// # Errors
    /// Unknown ids are not found.
    pub async fn detail(&self, id: ColleagueId) -> Result<ColleagueDetail, Error> {
        let colleague = self
            .repo
            .find(id)
            .await
            .map_err(map_error)?
            .ok_or_else(|| Error::not_found(format!("colleague {id} not found")))?;
        let aggregates = self
            .assignments
            .list_aggregates()
            .await
            .map_err(map_assignment_error)?;
        let mut placements: Vec<PlacementRecord> = PlacementRecord::flatten(&aggregates)
            .into_iter()
            .filter(|record| record.colleague.id == id)
            .collect();
        placements.sort_by(|a, b| {
            b.assignment_start_date
                .cmp(&a.assignment_start_date)
                .then(a.placement_id.cmp(&b.placement_id))
        });
        Ok(ColleagueDetail {
            colleague,
            placements,
        })
    }

    /// Create a colleague.
    ///
    /// # Errors
    /// Requires `add_colleague`; rejects invalid fields.
    pub async fn create(&self, user: &User, draft: ColleagueDraft) -> Result<Colleague, Error> {
        user.require(Permission::AddColleague)?;
        let draft = draft.normalised()?;
        let colleague = self.repo.create(&draft).await.map_err(map_error)?;
        info!(id = colleague.id, "created colleague");
        Ok(colleague)
    }

    /// Replace a colleague's editable fields.
    ///
    /// # Errors
    /// Requires `change_colleague`; unknown ids are not found.
    pub async fn update(
        &self,
        user: &User,
        id: ColleagueId,
        draft: ColleagueDraft,
    ) -> Result<Colleague, Error> {
        user.require(Permission::ChangeColleague)?;
        let draft = draft.normalised()?;
        let colleague = self
            .repo
            .update(id, &draft)
            .await
            .map_err(map_error)?
            .ok_or_else(|| Error::not_found(format!("colleague {id} not found")))?;
        info!(id, "updated colleague");
        Ok(colleague)
    }

    /// Delete a colleague.
    ///
    /// # Errors
    /// Requires `delete_colleague`; unknown ids are not found.
    pub async fn delete(&self, user: &User, id: ColleagueId) -> Result<(), Error> {
        user.require(Permission::DeleteColleague)?;
        if self.repo.delete(id).await.map_err(map_error)? {
            info!(id, "deleted colleague");
            Ok(())
        } else {
            Err(Error::not_found(format!("colleague {id} not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment_view::fixtures::{
        aggregate, assignment, colleague, placement, service,
    };
    use crate::domain::ports::{MockAssignmentRepository, MockColleagueRepository};
    use crate::domain::testing::member;
    use crate::domain::{
        AssignmentStatus, ErrorCode, PlacementAggregate, Role, ServiceAggregate, SourceRef,
    };
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn stored(id: ColleagueId, name: &str, skills: &[SkillId]) -> Colleague {
        Colleague {
            id,
            user_id: None,
            name: name.to_owned(),
            email: format!("{}@rijksoverheid.nl", name.to_lowercase()),
            skill_ids: skills.iter().copied().collect(),
            label_ids: BTreeSet::new(),
            source: SourceRef::default(),
        }
    }

    fn repo() -> MockColleagueRepository {
        let mut repo = MockColleagueRepository::new();
        repo.expect_list().returning(|| {
            Ok(vec![
                stored(1, "Zoë", &[3]),
                stored(2, "anna", &[]),
                stored(3, "Bram", &[3]),
            ])
        });
        repo.expect_find()
            .returning(|id| Ok((id == 2).then(|| stored(2, "anna", &[]))));
        repo
    }

    #[rstest]
    #[case(ColleagueListQuery::default(), &[2, 3, 1])]
    #[case(ColleagueListQuery { skill_id: Some(3), ..ColleagueListQuery::default() }, &[3, 1])]
    #[case(ColleagueListQuery { search: Some("BRAM@".to_owned()), ..ColleagueListQuery::default() }, &[3])]
    #[tokio::test]
    async fn list_filters_and_sorts(#[case] query: ColleagueListQuery, #[case] expected: &[i32]) {
        let service = ColleagueService::new(Arc::new(repo()), Arc::new(MockAssignmentRepository::new()));
        let listed = service.list(&query).await.expect("list");
        let ids: Vec<_> = listed.iter().map(|colleague| colleague.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn detail_collects_own_placements() {
        let mut assignments = MockAssignmentRepository::new();
        assignments.expect_list_aggregates().returning(|| {
            Ok(vec![aggregate(
                assignment(1, "Opdracht", AssignmentStatus::Ingevuld),
                vec![ServiceAggregate {
                    service: service(10, 1, None),
                    skill: None,
                    placements: vec![
                        PlacementAggregate {
                            placement: placement(100, 10, 2),
                            colleague: colleague(2, "anna"),
                        },
                        PlacementAggregate {
                            placement: placement(101, 10, 3),
                            colleague: colleague(3, "Bram"),
                        },
                    ],
                }],
            )])
        });
        let service = ColleagueService::new(Arc::new(repo()), Arc::new(assignments));

        let detail = service.detail(2).await.expect("detail");
        let ids: Vec<_> = detail.placements.iter().map(|p| p.placement_id).collect();
        assert_eq!(ids, [100]);
        let missing = service.detail(9).await.expect_err("missing");
        assert_eq!(missing.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn consultants_cannot_add_colleagues() {
        let service = ColleagueService::new(
            Arc::new(MockColleagueRepository::new()),
            Arc::new(MockAssignmentRepository::new()),
        );
        let err = service
            .create(
                &member(&[Role::Consultant], None),
                ColleagueDraft {
                    name: "Piet".to_owned(),
                    ..ColleagueDraft::default()
                },
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
