//! Placement listing and editing.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::assignment_service::map_assignment_error;
use crate::domain::ports::AssignmentRepository;
use crate::domain::{
    AssignmentAggregate, CatalogueService, Error, FilterCatalog, FilterOrderService, LabelService,
    OrganizationService, Permission, Placement, PlacementDraft, PlacementFilters, PlacementId,
    PlacementListing, PlacementQueryContext, ServiceId, User,
};

/// Collaborators the listing reads from.
#[derive(Clone)]
pub struct PlacementListingSources {
    /// Skills and ministries.
    pub catalogue: CatalogueService,
    /// Label categories and labels.
    pub labels: LabelService,
    /// Organisation hierarchy.
    pub organizations: OrganizationService,
    /// Order of the filter panel.
    pub filter_order: FilterOrderService,
}

/// Placement service.
#[derive(Clone)]
pub struct PlacementService {
    repo: Arc<dyn AssignmentRepository>,
    sources: PlacementListingSources,
    clock: Arc<dyn Clock>,
}

impl PlacementService {
    /// Create the service.
    pub fn new(
        repo: Arc<dyn AssignmentRepository>,
        sources: PlacementListingSources,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            sources,
            clock,
        }
    }

    /// Filtered, ordered and paged placement table for a raw query string.
    ///
    /// # Errors
    /// Propagates repository failures and an invalid stored filter order.
    pub async fn listing(&self, query: &str) -> Result<PlacementListing, Error> {
        let filters = PlacementFilters::parse(query);
        let organizations = self.sources.organizations.index().await?;
        let categories = self.sources.labels.categories().await?;
        let labels: Vec<_> = categories
            .iter()
            .flat_map(|category| category.labels.iter().cloned())
            .collect();
        let skills = self.sources.catalogue.search_skills(None).await?;
        let ministries = self.sources.catalogue.ministries().await?;
        let order = self.sources.filter_order.current().await?;

        let compiled = filters.compile(&PlacementQueryContext {
            organizations: &organizations,
            labels: &labels,
            today: self.clock.local().date_naive(),
        });
        let slice = self
            .repo
            .list_placements(&compiled)
            .await
            .map_err(map_assignment_error)?;
        let client_ids = self
            .repo
            .client_organization_ids()
            .await
            .map_err(map_assignment_error)?;
        let catalog = FilterCatalog {
            ministries: &ministries,
            skills: &skills,
            categories: &categories,
            organizations: &organizations,
            client_ids: &client_ids,
        };
        Ok(PlacementListing::build(
            &filters,
            &order,
            &catalog,
            filters.page_of(slice),
        ))
    }

    /// One placement.
    ///
    /// # Errors
    /// Unknown ids are not found.
    pub async fn placement(&self, id: PlacementId) -> Result<Placement, Error> {
        self.repo
            .find_placement(id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found(format!("placement {id} not found")))
    }

    async fn assignment_of(&self, service_id: ServiceId) -> Result<AssignmentAggregate, Error> {
        let service = self
            .repo
            .find_service(service_id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| {
                Error::invalid_field("service_id", "unknown_service", "service not found")
            })?;
        self.repo
            .find_aggregate(service.assignment_id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found(format!("assignment {} not found", service.assignment_id)))
    }

    async fn require_edit(&self, user: &User, service_id: ServiceId) -> Result<(), Error> {
        if self.assignment_of(service_id).await?.editable_by(user) {
            Ok(())
        } else {
            Err(Error::forbidden("not allowed to edit this assignment"))
        }
    }

    /// Place a colleague on a service.
    ///
    /// # Errors
    /// Requires `add_placement` or edit rights on the assignment; rejects
    /// unknown services and invalid hours or dates.
    pub async fn create(&self, user: &User, draft: PlacementDraft) -> Result<Placement, Error> {
        draft.validate()?;
        if user.has_permission(Permission::AddPlacement) {
            self.assignment_of(draft.service_id).await?;
        } else {
            self.require_edit(user, draft.service_id).await?;
        }
        let placement = self
            .repo
            .create_placement(&draft)
            .await
            .map_err(map_assignment_error)?;
        info!(
            id = placement.id,
            service_id = placement.service_id,
            colleague_id = placement.colleague_id,
            "created placement"
        );
        Ok(placement)
    }

    /// Replace a placement's fields.
    ///
    /// # Errors
    /// Requires edit rights on the current and, when moved, the target
    /// assignment.
    pub async fn update(
        &self,
        user: &User,
        id: PlacementId,
        draft: PlacementDraft,
    ) -> Result<Placement, Error> {
        draft.validate()?;
        let existing = self.placement(id).await?;
        self.require_edit(user, existing.service_id).await?;
        if draft.service_id != existing.service_id {
            self.require_edit(user, draft.service_id).await?;
        }
        let placement = self
            .repo
            .update_placement(id, &draft)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found(format!("placement {id} not found")))?;
        info!(id, "updated placement");
        Ok(placement)
    }

    /// Remove a placement.
    ///
    /// # Errors
    /// Requires edit rights on the assignment.
    pub async fn delete(&self, user: &User, id: PlacementId) -> Result<(), Error> {
        let existing = self.placement(id).await?;
        self.require_edit(user, existing.service_id).await?;
        self.repo
            .delete_placement(id)
            .await
            .map_err(map_assignment_error)?;
        info!(id, "deleted placement");
        Ok(())
    }
}
