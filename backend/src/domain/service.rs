//! Services: work packages within an assignment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cost::validate_hours_per_week;
use super::{
    AssignmentId, CostType, Error, Period, ServicePeriodSource, SkillId, SourceRef,
    resolve_service_period,
};

/// Service identifier.
pub type ServiceId = i32;

const DESCRIPTION_MAX: usize = 500;

/// Stored service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Service {
    /// Stable identifier.
    pub id: ServiceId,
    /// Owning assignment.
    pub assignment_id: AssignmentId,
    /// What the work package is about.
    pub description: String,
    /// Skill asked for.
    pub skill_id: Option<SkillId>,
    /// Pricing model.
    pub cost_type: CostType,
    /// Agreed amount in euros for fixed-price services.
    pub fixed_cost: Option<i32>,
    /// Weekly hours for per-hour services.
    pub hours_per_week: Option<i32>,
    /// Where the dates come from.
    pub period_source: ServicePeriodSource,
    /// Own first day, used when `period_source` is `SERVICE`.
    pub specific_start_date: Option<NaiveDate>,
    /// Own last day, used when `period_source` is `SERVICE`.
    pub specific_end_date: Option<NaiveDate>,
    /// Origin.
    #[serde(flatten)]
    pub source: SourceRef,
}

impl Service {
    /// Own dates, regardless of the period source.
    #[must_use]
    pub const fn specific_period(&self) -> Period {
        Period::new(self.specific_start_date, self.specific_end_date)
    }

    /// Effective dates given the assignment's.
    #[must_use]
    pub const fn period(&self, assignment_period: Period) -> Period {
        resolve_service_period(self.period_source, self.specific_period(), assignment_period)
    }
}

/// Editable service fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct ServiceDraft {
    /// Description.
    pub description: String,
    /// Skill asked for.
    #[serde(default)]
    pub skill_id: Option<SkillId>,
    /// Pricing model.
    #[serde(default)]
    pub cost_type: CostType,
    /// Fixed amount in euros.
    #[serde(default)]
    pub fixed_cost: Option<i32>,
    /// Weekly hours.
    #[serde(default)]
    pub hours_per_week: Option<i32>,
    /// Date source.
    #[serde(default)]
    pub period_source: ServicePeriodSource,
    /// Own first day.
    #[serde(default)]
    pub specific_start_date: Option<NaiveDate>,
    /// Own last day.
    #[serde(default)]
    pub specific_end_date: Option<NaiveDate>,
}

impl ServiceDraft {
    /// Check description, amounts and own dates.
    ///
    /// # Errors
    /// Returns a field error for a blank or over-long description, negative
    /// amounts, weekly hours above 168 or reversed own dates.
    pub fn normalised(self) -> Result<Self, Error> {
        let description = self.description.trim().to_owned();
        if description.is_empty() {
            return Err(Error::invalid_field(
                "description",
                "required",
                "description is required",
            ));
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(Error::invalid_field(
                "description",
                "too_long",
                format!("description must be at most {DESCRIPTION_MAX} characters"),
            ));
        }
        if self.fixed_cost.is_some_and(|cost| cost < 0) {
            return Err(Error::invalid_field(
                "fixed_cost",
                "negative",
                "fixed cost must not be negative",
            ));
        }
        validate_hours_per_week(self.hours_per_week)?;
        Period::new(self.specific_start_date, self.specific_end_date).validate()?;
        Ok(Self {
            description,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ServiceDraft { description: "  ".to_owned(), ..ServiceDraft::default() })]
    #[case(ServiceDraft { description: "x".to_owned(), hours_per_week: Some(-1), ..ServiceDraft::default() })]
    #[case(ServiceDraft { description: "x".to_owned(), hours_per_week: Some(i32::MAX), ..ServiceDraft::default() })]
    #[case(ServiceDraft { description: "x".to_owned(), fixed_cost: Some(-5), ..ServiceDraft::default() })]
    #[case(ServiceDraft {
        description: "x".to_owned(),
        specific_start_date: NaiveDate::from_ymd_opt(2026, 2, 1),
        specific_end_date: NaiveDate::from_ymd_opt(2026, 1, 1),
        ..ServiceDraft::default()
    })]
    fn rejects_invalid_drafts(#[case] draft: ServiceDraft) {
        assert!(draft.normalised().is_err());
    }

    #[rstest]
    fn defaults_to_per_hour_following_assignment() {
        let draft = ServiceDraft {
            description: " Architect ".to_owned(),
            ..ServiceDraft::default()
        }
        .normalised()
        .expect("valid draft");
        assert_eq!(draft.description, "Architect");
        assert_eq!(draft.cost_type, CostType::PerHour);
        assert_eq!(draft.period_source, ServicePeriodSource::Assignment);
    }
}
