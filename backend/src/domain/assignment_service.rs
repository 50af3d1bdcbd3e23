//! Assignment, service and board use cases.

use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::domain::ports::{AssignmentRepository, AssignmentRepositoryError};
use crate::domain::{
    AssignmentAggregate, AssignmentDraft, AssignmentEdit, AssignmentId, AssignmentStatus,
    AssignmentView, Error, KanbanCard, KanbanColumn, MoveCard, Permission, Service, ServiceDraft,
    ServiceId, User, authorize_move, board,
};

/// Filters for `GET /assignments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::IntoParams)]
pub struct AssignmentListQuery {
    /// Only this status.
    #[serde(default)]
    pub status: Option<AssignmentStatus>,
    /// Case-insensitive text matched against the name and organisations.
    #[serde(default, rename = "zoeken")]
    pub search: Option<String>,
}

impl AssignmentListQuery {
    fn matches(&self, aggregate: &AssignmentAggregate) -> bool {
        if self
            .status
            .is_some_and(|status| aggregate.assignment.status != status)
        {
            return false;
        }
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
        else {
            return true;
        };
        aggregate.assignment.name.to_lowercase().contains(&needle)
            || aggregate.organizations.iter().any(|org| {
                org.name.to_lowercase().contains(&needle)
                    || org.abbreviation.to_lowercase().contains(&needle)
            })
    }
}

pub(crate) fn map_assignment_error(error: AssignmentRepositoryError) -> Error {
    match error {
        AssignmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("assignment repository unavailable: {message}"))
        }
        AssignmentRepositoryError::Query { message } => {
            Error::internal(format!("assignment repository error: {message}"))
        }
        AssignmentRepositoryError::Conflict { message } => Error::conflict(message),
        AssignmentRepositoryError::InvalidReference { message } => Error::invalid_request(message),
    }
}

fn require_edit(aggregate: &AssignmentAggregate, user: &User) -> Result<(), Error> {
    if aggregate.editable_by(user) {
        Ok(())
    } else {
        Err(Error::forbidden("not allowed to edit this assignment"))
    }
}

/// Assignment service.
#[derive(Clone)]
pub struct AssignmentService {
    repo: Arc<dyn AssignmentRepository>,
    clock: Arc<dyn Clock>,
}

impl AssignmentService {
    /// Create the service.
    pub fn new(repo: Arc<dyn AssignmentRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn today(&self) -> chrono::NaiveDate {
        self.clock.local().date_naive()
    }

    async fn aggregate(&self, id: AssignmentId) -> Result<AssignmentAggregate, Error> {
        self.repo
            .find_aggregate(id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found(format!("assignment {id} not found")))
    }

    async fn service_with_assignment(
        &self,
        id: ServiceId,
    ) -> Result<(Service, AssignmentAggregate), Error> {
        let service = self.service(id).await?;
        let aggregate = self.aggregate(service.assignment_id).await?;
        Ok((service, aggregate))
    }

    /// Assignment cards matching `query`, by name.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self, query: &AssignmentListQuery) -> Result<Vec<KanbanCard>, Error> {
        let today = self.today();
        let mut cards: Vec<KanbanCard> = self
            .repo
            .list_aggregates()
            .await
            .map_err(map_assignment_error)?
            .iter()
            .filter(|aggregate| query.matches(aggregate))
            .map(|aggregate| KanbanCard::new(aggregate, today))
            .collect();
        cards.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(cards)
    }

    /// Detail view of one assignment.
    ///
    /// # Errors
    /// Unknown ids are not found.
    pub async fn detail(&self, viewer: &User, id: AssignmentId) -> Result<AssignmentView, Error> {
        Ok(self.aggregate(id).await?.view(self.today(), viewer))
    }

    /// Create an assignment with its organisation links.
    ///
    /// # Errors
    /// Requires `add_assignment`; rejects invalid fields.
    pub async fn create(&self, user: &User, draft: AssignmentDraft) -> Result<AssignmentView, Error> {
        user.require(Permission::AddAssignment)?;
        let draft = draft.normalised()?;
        let id = self
            .repo
            .create(&draft)
            .await
            .map_err(map_assignment_error)?;
        info!(id, name = %draft.name, "created assignment");
        self.detail(user, id).await
    }

    /// Change one attribute from an inline edit form.
    ///
    /// # Errors
    /// Only users allowed to edit the assignment may change it; rejects
    /// unknown attributes and invalid values.
    pub async fn edit_attribute(
        &self,
        user: &User,
        id: AssignmentId,
        attribute: &str,
        body: Value,
    ) -> Result<AssignmentView, Error> {
        let aggregate = self.aggregate(id).await?;
        require_edit(&aggregate, user)?;
        let edit = AssignmentEdit::parse(attribute, body)?;
        let mut draft = AssignmentDraft::from_stored(&aggregate.assignment, aggregate.links());
        edit.apply(&mut draft);
        let draft = draft.normalised()?;
        if !self
            .repo
            .update(id, &draft)
            .await
            .map_err(map_assignment_error)?
        {
            return Err(Error::not_found(format!("assignment {id} not found")));
        }
        info!(id, attribute, "edited assignment");
        self.detail(user, id).await
    }

    /// Delete an assignment with its services and placements.
    ///
    /// # Errors
    /// Requires `delete_assignment`; unknown ids are not found.
    pub async fn delete(&self, user: &User, id: AssignmentId) -> Result<(), Error> {
        user.require(Permission::DeleteAssignment)?;
        if self.repo.delete(id).await.map_err(map_assignment_error)? {
            info!(id, "deleted assignment");
            Ok(())
        } else {
            Err(Error::not_found(format!("assignment {id} not found")))
        }
    }

    /// Kanban board over every assignment.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn board(&self) -> Result<Vec<KanbanColumn>, Error> {
        let aggregates = self
            .repo
            .list_aggregates()
            .await
            .map_err(map_assignment_error)?;
        Ok(board(&aggregates, self.today()))
    }

    /// Move a card to another column.
    ///
    /// # Errors
    /// Only users allowed to edit the assignment may move it.
    pub async fn move_card(
        &self,
        user: &User,
        id: AssignmentId,
        target: MoveCard,
    ) -> Result<KanbanCard, Error> {
        let mut aggregate = self.aggregate(id).await?;
        authorize_move(&aggregate, user)?;
        if aggregate.assignment.status != target.status {
            self.repo
                .set_status(id, target.status)
                .await
                .map_err(map_assignment_error)?;
            info!(id, status = %target.status, "moved assignment");
            aggregate.assignment.status = target.status;
        }
        Ok(KanbanCard::new(&aggregate, self.today()))
    }

    /// One service.
    ///
    /// # Errors
    /// Unknown ids are not found.
    pub async fn service(&self, id: ServiceId) -> Result<Service, Error> {
        self.repo
            .find_service(id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found(format!("service {id} not found")))
    }

    /// Add a service to an assignment.
    ///
    /// # Errors
    /// Requires `add_service` or edit rights on the assignment.
    pub async fn create_service(
        &self,
        user: &User,
        assignment_id: AssignmentId,
        draft: ServiceDraft,
    ) -> Result<Service, Error> {
        let aggregate = self.aggregate(assignment_id).await?;
        if !user.has_permission(Permission::AddService) {
            require_edit(&aggregate, user)?;
        }
        let draft = draft.normalised()?;
        let service = self
            .repo
            .create_service(assignment_id, &draft)
            .await
            .map_err(map_assignment_error)?;
        info!(id = service.id, assignment_id, "created service");
        Ok(service)
    }

    /// Replace a service's fields.
    ///
    /// # Errors
    /// Only users allowed to edit the assignment may change it.
    pub async fn update_service(
        &self,
        user: &User,
        id: ServiceId,
        draft: ServiceDraft,
    ) -> Result<Service, Error> {
        let (_, aggregate) = self.service_with_assignment(id).await?;
        require_edit(&aggregate, user)?;
        let draft = draft.normalised()?;
        let service = self
            .repo
            .update_service(id, &draft)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found(format!("service {id} not found")))?;
        info!(id, "updated service");
        Ok(service)
    }

    /// Delete a service and its placements.
    ///
    /// # Errors
    /// Only users allowed to edit the assignment may delete it.
    pub async fn delete_service(&self, user: &User, id: ServiceId) -> Result<(), Error> {
        let (_, aggregate) = self.service_with_assignment(id).await?;
        require_edit(&aggregate, user)?;
        self.repo
            .delete_service(id)
            .await
            .map_err(map_assignment_error)?;
        info!(id, "deleted service");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment_view::fixtures::{
        aggregate, assignment, colleague, placement, service,
    };
    use crate::domain::ports::MockAssignmentRepository;
    use crate::domain::testing::{fixture_clock, member, superuser};
    use crate::domain::{ErrorCode, PlacementAggregate, Role, ServiceAggregate};
    use serde_json::json;

    fn with_placement(colleague_id: i32) -> AssignmentAggregate {
        aggregate(
            assignment(1, "Basisregistratie", AssignmentStatus::Vacature),
            vec![ServiceAggregate {
                service: service(10, 1, Some(36)),
                skill: None,
                placements: vec![PlacementAggregate {
                    placement: placement(100, 10, colleague_id),
                    colleague: colleague(colleague_id, "Anna"),
                }],
            }],
        )
    }

    fn repo_with(aggregate: AssignmentAggregate) -> MockAssignmentRepository {
        let mut repo = MockAssignmentRepository::new();
        repo.expect_find_aggregate()
            .returning(move |id| Ok((id == aggregate.assignment.id).then(|| aggregate.clone())));
        repo
    }

    fn service_under_test(repo: MockAssignmentRepository) -> AssignmentService {
        AssignmentService::new(Arc::new(repo), fixture_clock())
    }

    #[tokio::test]
    async fn placed_colleague_may_move_the_card() {
        let mut repo = repo_with(with_placement(5));
        repo.expect_set_status()
            .withf(|id, status| *id == 1 && *status == AssignmentStatus::Ingevuld)
            .times(1)
            .returning(|_, _| Ok(true));

        let card = service_under_test(repo)
            .move_card(
                &member(&[Role::Consultant], Some(5)),
                1,
                MoveCard {
                    status: AssignmentStatus::Ingevuld,
                },
            )
            .await
            .expect("moved");
        assert_eq!(card.placement_count, 1);
    }

    #[tokio::test]
    async fn other_consultants_may_not_move_the_card() {
        let mut repo = repo_with(with_placement(5));
        repo.expect_set_status().never();
        let err = service_under_test(repo)
            .move_card(
                &member(&[Role::Consultant], Some(6)),
                1,
                MoveCard {
                    status: AssignmentStatus::Lead,
                },
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn attribute_edit_keeps_other_fields() {
        let mut repo = repo_with(with_placement(5));
        repo.expect_update()
            .withf(|id, draft| {
                *id == 1
                    && draft.name == "Nieuwe naam"
                    && draft.status == AssignmentStatus::Vacature
            })
            .times(1)
            .returning(|_, _| Ok(true));

        service_under_test(repo)
            .edit_attribute(&superuser(), 1, "name", json!({"value": "Nieuwe naam"}))
            .await
            .expect("edited");
    }

    #[tokio::test]
    async fn unknown_attribute_is_rejected() {
        let repo = repo_with(with_placement(5));
        let err = service_under_test(repo)
            .edit_attribute(&superuser(), 1, "colour", json!({"value": "red"}))
            .await
            .expect_err("unknown attribute");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn missing_assignment_is_not_found() {
        let repo = repo_with(with_placement(5));
        let err = service_under_test(repo)
            .detail(&superuser(), 2)
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_search() {
        let mut repo = MockAssignmentRepository::new();
        repo.expect_list_aggregates().returning(|| {
            Ok(vec![
                aggregate(assignment(1, "Zaaksysteem", AssignmentStatus::Lead), Vec::new()),
                aggregate(assignment(2, "basisregistratie", AssignmentStatus::Lead), Vec::new()),
                aggregate(assignment(3, "Archief", AssignmentStatus::Historisch), Vec::new()),
            ])
        });
        let service = service_under_test(repo);

        let leads = service
            .list(&AssignmentListQuery {
                status: Some(AssignmentStatus::Lead),
                search: None,
            })
            .await
            .expect("list");
        let ids: Vec<_> = leads.iter().map(|card| card.id).collect();
        assert_eq!(ids, [2, 1]);

        let searched = service
            .list(&AssignmentListQuery {
                status: None,
                search: Some("ARCH".to_owned()),
            })
            .await
            .expect("list");
        assert_eq!(searched.len(), 1);
    }

    #[tokio::test]
    async fn bdm_may_add_services_anywhere() {
        let mut repo = repo_with(with_placement(5));
        repo.expect_create_service()
            .returning(|assignment_id, _| Ok(service(11, assignment_id, None)));
        let draft = ServiceDraft {
            description: "Ontwikkelaar".to_owned(),
            ..ServiceDraft::default()
        };
        let created = service_under_test(repo)
            .create_service(
                &member(&[Role::BusinessDevelopmentManager], None),
                1,
                draft,
            )
            .await
            .expect("created");
        assert_eq!(created.id, 11);
    }
}
