//! Assignment read models: the assignment with everything hanging off it,
//! and the derived detail view with resolved periods and costs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    Assignment, AssignmentOrganization, AssignmentOrganizationRole, Cents, ColleagueId,
    ColleagueSummary, Ministry, OrganizationId, Period, Phase, Placement, Service, Skill, User,
    assignment_total, service_cost, weeks_remaining,
};

/// Organisation linked to an assignment, with its display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LinkedOrganization {
    /// Organisation id.
    pub organization_id: OrganizationId,
    /// Organisation name.
    pub name: String,
    /// Organisation abbreviation.
    pub abbreviation: String,
    /// Relationship.
    pub role: AssignmentOrganizationRole,
    /// First day the link applies.
    pub effective_from: Option<NaiveDate>,
    /// Last day the link applies.
    pub effective_until: Option<NaiveDate>,
}

/// Placement with its colleague.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementAggregate {
    /// The placement.
    pub placement: Placement,
    /// Placed colleague.
    pub colleague: ColleagueSummary,
}

/// Service with its skill and placements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAggregate {
    /// The service.
    pub service: Service,
    /// Requested skill.
    pub skill: Option<Skill>,
    /// Placements, by id.
    pub placements: Vec<PlacementAggregate>,
}

/// Assignment with ministry, owner, organisations, services and placements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentAggregate {
    /// The assignment.
    pub assignment: Assignment,
    /// Issuing ministry.
    pub ministry: Option<Ministry>,
    /// Responsible colleague.
    pub owner: Option<ColleagueSummary>,
    /// Linked organisations, primary first.
    pub organizations: Vec<LinkedOrganization>,
    /// Services, by id.
    pub services: Vec<ServiceAggregate>,
}

/// Placement as shown on the assignment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlacementView {
    /// The placement.
    #[serde(flatten)]
    pub placement: Placement,
    /// Placed colleague.
    pub colleague: ColleagueSummary,
    /// Resolved period.
    pub period: Period,
}

/// Service as shown on the assignment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ServiceView {
    /// The service.
    #[serde(flatten)]
    pub service: Service,
    /// Requested skill.
    pub skill: Option<Skill>,
    /// Resolved period.
    pub period: Period,
    /// Estimated cost in cents.
    pub cost: Option<Cents>,
    /// Placements.
    pub placements: Vec<PlacementView>,
}

/// Assignment detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct AssignmentView {
    /// The assignment.
    #[serde(flatten)]
    pub assignment: Assignment,
    /// Issuing ministry.
    pub ministry: Option<Ministry>,
    /// Responsible colleague.
    pub owner: Option<ColleagueSummary>,
    /// Linked organisations.
    pub organizations: Vec<LinkedOrganization>,
    /// Phase relative to today.
    pub phase: Option<Phase>,
    /// Weeks until the end date.
    pub weeks_remaining: Option<i64>,
    /// Sum of service costs, in cents.
    pub total_cost: Cents,
    /// Services.
    pub services: Vec<ServiceView>,
    /// Whether the viewer may edit the assignment.
    pub can_edit: bool,
}

impl ServiceAggregate {
    /// Resolved period given the owning assignment's dates.
    #[must_use]
    pub const fn period(&self, assignment_period: Period) -> Period {
        self.service.period(assignment_period)
    }

    /// Estimated cost given the owning assignment's dates.
    #[must_use]
    pub fn cost(&self, assignment_period: Period) -> Option<Cents> {
        service_cost(
            self.service.cost_type,
            self.service.fixed_cost,
            self.service.hours_per_week,
            self.period(assignment_period),
        )
    }
}

impl AssignmentAggregate {
    /// Colleagues placed on any service, without duplicates.
    #[must_use]
    pub fn placed_colleagues(&self) -> Vec<ColleagueId> {
        let mut ids: Vec<ColleagueId> = self
            .services
            .iter()
            .flat_map(|service| service.placements.iter().map(|p| p.colleague.id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Whether `user` may edit this assignment.
    #[must_use]
    pub fn editable_by(&self, user: &User) -> bool {
        user.can_edit_assignment(self.assignment.owner_id, &self.placed_colleagues())
    }

    /// The primary organisation, if linked.
    #[must_use]
    pub fn primary_organization(&self) -> Option<&LinkedOrganization> {
        self.organizations
            .iter()
            .find(|link| link.role == AssignmentOrganizationRole::Primary)
    }

    /// Organisation links without display fields.
    #[must_use]
    pub fn links(&self) -> Vec<AssignmentOrganization> {
        self.organizations
            .iter()
            .map(|link| AssignmentOrganization {
                organization_id: link.organization_id,
                role: link.role,
                effective_from: link.effective_from,
                effective_until: link.effective_until,
            })
            .collect()
    }

    /// Number of placements over all services.
    #[must_use]
    pub fn placement_count(&self) -> usize {
        self.services.iter().map(|s| s.placements.len()).sum()
    }

    /// Services nobody is placed on.
    #[must_use]
    pub fn open_service_count(&self) -> usize {
        self.services
            .iter()
            .filter(|s| s.placements.is_empty())
            .count()
    }

    /// Sum of all service costs.
    #[must_use]
    pub fn total_cost(&self) -> Cents {
        let period = self.assignment.period();
        assignment_total(self.services.iter().map(|service| service.cost(period)))
    }

    /// Detail view for `viewer` on `today`.
    #[must_use]
    pub fn view(&self, today: NaiveDate, viewer: &User) -> AssignmentView {
        let period = self.assignment.period();
        let services = self
            .services
            .iter()
            .map(|service| {
                let service_period = service.period(period);
                ServiceView {
                    service: service.service.clone(),
                    skill: service.skill.clone(),
                    period: service_period,
                    cost: service.cost(period),
                    placements: service
                        .placements
                        .iter()
                        .map(|placement| PlacementView {
                            placement: placement.placement.clone(),
                            colleague: placement.colleague.clone(),
                            period: placement.placement.period(service_period),
                        })
                        .collect(),
                }
            })
            .collect();
        AssignmentView {
            assignment: self.assignment.clone(),
            ministry: self.ministry.clone(),
            owner: self.owner.clone(),
            organizations: self.organizations.clone(),
            phase: period.phase(today),
            weeks_remaining: weeks_remaining(period.end, today),
            total_cost: self.total_cost(),
            services,
            can_edit: self.editable_by(viewer),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by aggregate-based tests.
    use std::collections::BTreeSet;

    use super::*;
    use crate::domain::{
        AssignmentStatus, CostType, PlacementPeriodSource, ServicePeriodSource, SourceRef,
    };

    pub(crate) fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).expect("valid date")
    }

    pub(crate) fn colleague(id: ColleagueId, name: &str) -> ColleagueSummary {
        ColleagueSummary {
            id,
            name: name.to_owned(),
            label_ids: BTreeSet::new(),
        }
    }

    pub(crate) fn assignment(id: i32, name: &str, status: AssignmentStatus) -> Assignment {
        Assignment {
            id,
            name: name.to_owned(),
            start_date: Some(d(1, 1)),
            end_date: Some(d(12, 31)),
            status,
            ministry_id: None,
            owner_id: None,
            extra_info: String::new(),
            source: SourceRef::default(),
        }
    }

    pub(crate) fn service(id: i32, assignment_id: i32, hours: Option<i32>) -> Service {
        Service {
            id,
            assignment_id,
            description: format!("service {id}"),
            skill_id: None,
            cost_type: CostType::PerHour,
            fixed_cost: None,
            hours_per_week: hours,
            period_source: ServicePeriodSource::Assignment,
            specific_start_date: None,
            specific_end_date: None,
            source: SourceRef::default(),
        }
    }

    pub(crate) fn placement(id: i32, service_id: i32, colleague_id: ColleagueId) -> Placement {
        Placement {
            id,
            colleague_id,
            service_id,
            hours_per_week: Some(36),
            period_source: PlacementPeriodSource::Service,
            specific_start_date: None,
            specific_end_date: None,
            source: SourceRef::default(),
        }
    }

    pub(crate) fn aggregate(assignment: Assignment, services: Vec<ServiceAggregate>) -> AssignmentAggregate {
        AssignmentAggregate {
            assignment,
            ministry: None,
            owner: None,
            organizations: Vec::new(),
            services,
        }
    }
}
