//! Port for assignments with their services and placements.
//!
//! Reads return whole aggregates; the board and detail views are derived
//! from them in the domain. The placement listing is filtered, ordered and
//! paged by the adapter.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{
    AssignmentAggregate, AssignmentDraft, AssignmentId, AssignmentStatus, OrganizationId,
    Placement, PlacementDraft, PlacementId, PlacementQuery, PlacementSlice, Service, ServiceDraft,
    ServiceId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by assignment repository adapters.
    pub enum AssignmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "assignment repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } =>
            "assignment data conflicts with existing rows: {message}",
        /// A referenced row does not exist.
        InvalidReference { message: String } =>
            "assignment data references a missing row: {message}",
    }
}

/// Assignment, service and placement storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Every assignment with everything hanging off it.
    async fn list_aggregates(&self) -> Result<Vec<AssignmentAggregate>, AssignmentRepositoryError>;

    /// One page of placements on filled assignments matching `query`.
    async fn list_placements(
        &self,
        query: &PlacementQuery,
    ) -> Result<PlacementSlice, AssignmentRepositoryError>;

    /// Organisations linked to at least one filled assignment.
    async fn client_organization_ids(
        &self,
    ) -> Result<BTreeSet<OrganizationId>, AssignmentRepositoryError>;

    /// One assignment aggregate.
    async fn find_aggregate(
        &self,
        id: AssignmentId,
    ) -> Result<Option<AssignmentAggregate>, AssignmentRepositoryError>;

    /// Insert an assignment with its organisation links.
    async fn create(&self, draft: &AssignmentDraft)
    -> Result<AssignmentId, AssignmentRepositoryError>;

    /// Replace fields and organisation links; `false` when missing.
    async fn update(
        &self,
        id: AssignmentId,
        draft: &AssignmentDraft,
    ) -> Result<bool, AssignmentRepositoryError>;

    /// Change only the status.
    async fn set_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<bool, AssignmentRepositoryError>;

    /// Remove an assignment with its services and placements.
    async fn delete(&self, id: AssignmentId) -> Result<bool, AssignmentRepositoryError>;

    /// Service by id.
    async fn find_service(&self, id: ServiceId)
    -> Result<Option<Service>, AssignmentRepositoryError>;

    /// Insert a service under an assignment.
    async fn create_service(
        &self,
        assignment_id: AssignmentId,
        draft: &ServiceDraft,
    ) -> Result<Service, AssignmentRepositoryError>;

    /// Replace a service's fields.
    async fn update_service(
        &self,
        id: ServiceId,
        draft: &ServiceDraft,
    ) -> Result<Option<Service>, AssignmentRepositoryError>;

    /// Remove a service with its placements.
    async fn delete_service(&self, id: ServiceId) -> Result<bool, AssignmentRepositoryError>;

    /// Placement by id.
    async fn find_placement(
        &self,
        id: PlacementId,
    ) -> Result<Option<Placement>, AssignmentRepositoryError>;

    /// Insert a placement.
    async fn create_placement(
        &self,
        draft: &PlacementDraft,
    ) -> Result<Placement, AssignmentRepositoryError>;

    /// Replace a placement's fields.
    async fn update_placement(
        &self,
        id: PlacementId,
        draft: &PlacementDraft,
    ) -> Result<Option<Placement>, AssignmentRepositoryError>;

    /// Remove a placement.
    async fn delete_placement(&self, id: PlacementId) -> Result<bool, AssignmentRepositoryError>;
}
