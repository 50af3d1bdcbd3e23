//! Placements: a colleague on a service for a period and weekly hours.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::cost::validate_hours_per_week;
use super::{
    ColleagueId, Error, Period, PlacementPeriodSource, ServiceId, SourceRef,
    resolve_placement_period,
};

/// Placement identifier.
pub type PlacementId = i32;

/// Stored placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Placement {
    /// Stable identifier.
    pub id: PlacementId,
    /// Placed colleague.
    pub colleague_id: ColleagueId,
    /// Service worked on.
    pub service_id: ServiceId,
    /// Weekly hours.
    pub hours_per_week: Option<i32>,
    /// Where the dates come from.
    pub period_source: PlacementPeriodSource,
    /// Own first day, used when `period_source` is `PLACEMENT`.
    pub specific_start_date: Option<NaiveDate>,
    /// Own last day, used when `period_source` is `PLACEMENT`.
    pub specific_end_date: Option<NaiveDate>,
    /// Origin.
    #[serde(flatten)]
    pub source: SourceRef,
}

impl Placement {
    /// Own dates, regardless of the period source.
    #[must_use]
    pub const fn specific_period(&self) -> Period {
        Period::new(self.specific_start_date, self.specific_end_date)
    }

    /// Effective dates given the service's resolved period.
    #[must_use]
    pub const fn period(&self, service_period: Period) -> Period {
        resolve_placement_period(self.period_source, self.specific_period(), service_period)
    }
}

/// Editable placement fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct PlacementDraft {
    /// Colleague to place.
    pub colleague_id: ColleagueId,
    /// Service to place on.
    pub service_id: ServiceId,
    /// Weekly hours.
    #[serde(default)]
    pub hours_per_week: Option<i32>,
    /// Date source.
    #[serde(default)]
    pub period_source: PlacementPeriodSource,
    /// Own first day.
    #[serde(default)]
    pub specific_start_date: Option<NaiveDate>,
    /// Own last day.
    #[serde(default)]
    pub specific_end_date: Option<NaiveDate>,
}

impl PlacementDraft {
    /// Check hours and own dates.
    ///
    /// # Errors
    /// Rejects weekly hours outside `0..=168` and reversed own dates.
    pub fn validate(&self) -> Result<(), Error> {
        validate_hours_per_week(self.hours_per_week)?;
        Period::new(self.specific_start_date, self.specific_end_date).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).expect("valid date")
    }

    fn placement(period_source: PlacementPeriodSource) -> Placement {
        Placement {
            id: 1,
            colleague_id: 1,
            service_id: 1,
            hours_per_week: Some(32),
            period_source,
            specific_start_date: Some(d(3, 1)),
            specific_end_date: Some(d(3, 31)),
            source: SourceRef::default(),
        }
    }

    #[rstest]
    #[case(PlacementPeriodSource::Service, Period::between(d(1, 1), d(6, 30)))]
    #[case(PlacementPeriodSource::Placement, Period::between(d(3, 1), d(3, 31)))]
    fn period_follows_source(#[case] source: PlacementPeriodSource, #[case] expected: Period) {
        let service_period = Period::between(d(1, 1), d(6, 30));
        assert_eq!(placement(source).period(service_period), expected);
    }

    #[rstest]
    #[case(-4)]
    #[case(169)]
    #[case(i32::MAX)]
    fn draft_rejects_impossible_hours(#[case] hours: i32) {
        let draft = PlacementDraft {
            hours_per_week: Some(hours),
            ..PlacementDraft::default()
        };
        assert!(draft.validate().is_err());
    }
}
