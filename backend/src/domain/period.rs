//! Date ranges and their inheritance along assignment → service → placement.
//!
//! A service either carries its own dates or follows its assignment; a
//! placement either carries its own dates or follows its (already resolved)
//! service. Every date is optional, so most predicates treat a missing date
//! explicitly rather than guessing.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Error;
use super::text_enum::string_enum;

const ISO_FORMAT: &str = "%Y-%m-%d";
const DMY_FORMAT: &str = "%d-%m-%Y";

/// Optional start and end date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Period {
    /// First day, inclusive.
    pub start: Option<NaiveDate>,
    /// Last day, inclusive.
    pub end: Option<NaiveDate>,
}

/// Where an assignment sits in time relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Starts after today.
    Planned,
    /// Runs today.
    Active,
    /// Ended before today.
    Completed,
}

impl Period {
    /// Build a period from optional bounds.
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Period with both bounds set.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Reject periods whose end lies before their start.
    ///
    /// # Errors
    /// Returns an invalid-request error naming the end date field.
    pub fn validate(&self) -> Result<(), Error> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => Err(Error::invalid_field(
                "end_date",
                "end_before_start",
                "end date must not be before start date",
            )),
            _ => Ok(()),
        }
    }

    /// True only when both bounds are known and the period intersects `range`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use wies::domain::{DateRange, Period};
    ///
    /// let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day).unwrap();
    /// let period = Period::between(d(3, 1), d(5, 31));
    /// assert!(period.overlaps(&DateRange::new(d(5, 31), d(6, 30)).unwrap()));
    /// assert!(!Period::new(Some(d(3, 1)), None).overlaps(&DateRange::new(d(1, 1), d(12, 31)).unwrap()));
    /// ```
    #[must_use]
    pub fn overlaps(&self, range: &DateRange) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= range.to && end >= range.from,
            _ => false,
        }
    }

    /// True when the period has no end or ends on or after `date`.
    #[must_use]
    pub fn ends_on_or_after(&self, date: NaiveDate) -> bool {
        self.end.is_none_or(|end| end >= date)
    }

    /// Phase relative to `today`; `None` while either bound is unknown.
    #[must_use]
    pub fn phase(&self, today: NaiveDate) -> Option<Phase> {
        let (start, end) = (self.start?, self.end?);
        Some(if start > today {
            Phase::Planned
        } else if end < today {
            Phase::Completed
        } else {
            Phase::Active
        })
    }

    /// Number of calendar days from start to end, when both are known.
    #[must_use]
    pub fn days(&self) -> Option<i64> {
        Some((self.end? - self.start?).num_days())
    }
}

/// Whole weeks left until `end`, rounded to the nearest week.
///
/// Returns `Some(0)` once the end date has been reached and `None` when no
/// end date is known.
#[must_use]
pub fn weeks_remaining(end: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    let days = (end? - today).num_days();
    if days <= 0 {
        return Some(0);
    }
    Some((days * 2 + 7).div_euclid(14))
}

/// Closed date interval used by the period filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DateRange {
    /// First day, inclusive.
    pub from: NaiveDate,
    /// Last day, inclusive.
    pub to: NaiveDate,
}

impl DateRange {
    /// Build a range; `None` when `from` is after `to`.
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    /// Parse `YYYY-MM-DD_YYYY-MM-DD`. Anything else yields `None`.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::DateRange;
    ///
    /// assert!(DateRange::parse("2026-01-01_2026-03-31").is_some());
    /// assert!(DateRange::parse("2026-01-01").is_none());
    /// assert!(DateRange::parse("2026-13-01_2026-03-31").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (from_raw, to_raw) = raw.trim().split_once('_')?;
        let from = NaiveDate::parse_from_str(from_raw, ISO_FORMAT).ok()?;
        let to = NaiveDate::parse_from_str(to_raw, ISO_FORMAT).ok()?;
        Self::new(from, to)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.from.format(ISO_FORMAT),
            self.to.format(ISO_FORMAT)
        )
    }
}

/// Parse a `DD-MM-YYYY` date as used in spreadsheet exports.
#[must_use]
pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DMY_FORMAT).ok()
}

/// Where a service takes its dates from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServicePeriodSource {
    /// Follow the assignment's dates.
    #[default]
    Assignment,
    /// Use the service's own dates.
    Service,
}

/// Where a placement takes its dates from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementPeriodSource {
    /// Follow the service's resolved dates.
    #[default]
    Service,
    /// Use the placement's own dates.
    Placement,
}

/// Resolve a service's effective period.
#[must_use]
pub const fn resolve_service_period(
    source: ServicePeriodSource,
    specific: Period,
    assignment: Period,
) -> Period {
    match source {
        ServicePeriodSource::Assignment => assignment,
        ServicePeriodSource::Service => specific,
    }
}

/// Resolve a placement's effective period from its service's resolved one.
#[must_use]
pub const fn resolve_placement_period(
    source: PlacementPeriodSource,
    specific: Period,
    service: Period,
) -> Period {
    match source {
        PlacementPeriodSource::Service => service,
        PlacementPeriodSource::Placement => specific,
    }
}

string_enum!(ServicePeriodSource, "service period source", {
    Assignment => "ASSIGNMENT",
    Service => "SERVICE",
});

string_enum!(PlacementPeriodSource, "placement period source", {
    Service => "SERVICE",
    Placement => "PLACEMENT",
});
