//! One listing row per placement, flattened from assignment aggregates.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    AssignmentAggregate, AssignmentId, AssignmentStatus, ColleagueSummary, LinkedOrganization,
    Ministry, Period, PlacementId, ServiceId, Skill,
};

/// Placement with the assignment and service fields the listing needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlacementRecord {
    /// Placement id.
    pub placement_id: PlacementId,
    /// Placed colleague.
    pub colleague: ColleagueSummary,
    /// Assignment id.
    pub assignment_id: AssignmentId,
    /// Assignment name.
    pub assignment_name: String,
    /// Assignment status.
    pub assignment_status: AssignmentStatus,
    /// Assignment start, used for the default ordering.
    pub assignment_start_date: Option<NaiveDate>,
    /// Issuing ministry.
    pub ministry: Option<Ministry>,
    /// Client organisations.
    pub organizations: Vec<LinkedOrganization>,
    /// Service id.
    pub service_id: ServiceId,
    /// Service description.
    pub service_description: String,
    /// Service skill.
    pub skill: Option<Skill>,
    /// Resolved placement period.
    pub period: Period,
    /// Weekly hours.
    pub hours_per_week: Option<i32>,
}

impl PlacementRecord {
    /// Rows for every placement in `aggregates`.
    #[must_use]
    pub fn flatten(aggregates: &[AssignmentAggregate]) -> Vec<Self> {
        let mut rows = Vec::new();
        for aggregate in aggregates {
            let assignment = &aggregate.assignment;
            let assignment_period = assignment.period();
            for service in &aggregate.services {
                let service_period = service.period(assignment_period);
                rows.extend(service.placements.iter().map(|placement| Self {
                    placement_id: placement.placement.id,
                    colleague: placement.colleague.clone(),
                    assignment_id: assignment.id,
                    assignment_name: assignment.name.clone(),
                    assignment_status: assignment.status,
                    assignment_start_date: assignment.start_date,
                    ministry: aggregate.ministry.clone(),
                    organizations: aggregate.organizations.clone(),
                    service_id: service.service.id,
                    service_description: service.service.description.clone(),
                    skill: service.skill.clone(),
                    period: placement.placement.period(service_period),
                    hours_per_week: placement.placement.hours_per_week,
                }));
            }
        }
        rows
    }
}
