//! Service and assignment cost estimates.
//!
//! Amounts are whole cents. Per-hour services are priced at a flat hourly
//! rate over the number of weeks in their resolved period.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use super::text_enum::string_enum;
use super::{Error, Period};

/// Hourly rate in cents (€100).
pub const HOURLY_RATE_CENTS: i64 = 10_000;

/// Hours in a week; the upper bound for `hours_per_week`.
pub const HOURS_PER_WEEK_MAX: i32 = 168;

/// Reject weekly hours outside `0..=168`.
pub(crate) fn validate_hours_per_week(hours_per_week: Option<i32>) -> Result<(), Error> {
    match hours_per_week {
        Some(hours) if !(0..=HOURS_PER_WEEK_MAX).contains(&hours) => Err(Error::invalid_field(
            "hours_per_week",
            "out_of_range",
            format!("hours per week must be between 0 and {HOURS_PER_WEEK_MAX}"),
        )),
        _ => Ok(()),
    }
}

/// Amount of money in euro cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    /// Whole euros.
    #[must_use]
    pub const fn from_euros(euros: i64) -> Self {
        Self(euros.saturating_mul(100))
    }

    /// Sum, or `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl Add for Cents {
    type Output = Self;

    /// Saturates at the `i64` bounds.
    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}€{}.{:02}", abs.div_euclid(100), abs.rem_euclid(100))
    }
}

/// How a service is priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostType {
    /// Agreed amount regardless of duration.
    FixedPrice,
    /// Hours per week over the service period.
    #[default]
    PerHour,
}

string_enum!(CostType, "cost type", {
    FixedPrice => "FIXED_PRICE",
    PerHour => "PER_HOUR",
});

/// Per-hour cost: `days / 7 × hours_per_week × €100`, rounded to cents.
///
/// `None` when either date or the weekly hours are missing (or zero hours),
/// and when the amount does not fit in an `i64`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use wies::domain::{per_hour_cost, Cents, Period};
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2026, m, day).unwrap();
/// let period = Period::between(d(1, 1), d(1, 15));
/// assert_eq!(per_hour_cost(period, Some(36)), Some(Cents(720_000)));
/// ```
#[must_use]
pub fn per_hour_cost(period: Period, hours_per_week: Option<i32>) -> Option<Cents> {
    let hours = i64::from(hours_per_week.filter(|hours| *hours != 0)?);
    let days = period.days()?;
    let numerator = days.checked_mul(hours)?.checked_mul(HOURLY_RATE_CENTS)?;
    // Round half away from zero.
    let doubled = numerator.unsigned_abs().checked_mul(2)?.checked_add(7)?;
    let magnitude = i64::try_from(doubled.div_euclid(14)).ok()?;
    Some(Cents(if numerator < 0 { -magnitude } else { magnitude }))
}

/// Cost of one service given its resolved period.
#[must_use]
pub fn service_cost(
    cost_type: CostType,
    fixed_cost_euros: Option<i32>,
    hours_per_week: Option<i32>,
    period: Period,
) -> Option<Cents> {
    match cost_type {
        CostType::FixedPrice => fixed_cost_euros
            .filter(|euros| *euros != 0)
            .map(|euros| Cents::from_euros(i64::from(euros))),
        CostType::PerHour => per_hour_cost(period, hours_per_week),
    }
}

/// Sum of service costs; services without a cost count as zero.
#[must_use]
pub fn assignment_total(costs: impl IntoIterator<Item = Option<Cents>>) -> Cents {
    costs.into_iter().flatten().sum()
}
