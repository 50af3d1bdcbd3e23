//! Placement listing: query-string filters, their compiled query and paging.
//!
//! Filters arrive as a query string where every multi-valued key may repeat
//! or carry comma-separated ids. Unparseable values are dropped rather than
//! rejected so that stale bookmarks keep working.

mod compile;
mod listing;
mod record;

use std::collections::BTreeSet;

pub use compile::{
    PAGE_SIZE, PeriodWindow, PlacementPage, PlacementQuery, PlacementQueryContext, PlacementSlice,
};
pub use listing::{ActiveFilter, FilterCatalog, FilterGroup, FilterKind, FilterOption, PlacementListing};
pub use record::PlacementRecord;

use super::{DateRange, LabelId, MinistryId, OrganizationId, SkillId};

const SEARCH_KEY: &str = "zoeken";
const SKILL_KEY: &str = "rol";
const LABEL_KEY: &str = "labels";
const ORGANIZATION_KEY: &str = "opdrachtgever";
const MINISTRY_KEY: &str = "ministerie";
const PERIOD_KEY: &str = "periode";
const ORDER_KEY: &str = "volgorde";
const PAGE_KEY: &str = "pagina";

/// Row ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementOrder {
    /// Assignment start date, newest first.
    #[default]
    StartDate,
    /// Colleague name.
    ColleagueName,
    /// Assignment name.
    AssignmentName,
    /// Skill name.
    SkillName,
}

impl PlacementOrder {
    fn parse(raw: &str) -> Self {
        match raw {
            "name" => Self::ColleagueName,
            "assignment" => Self::AssignmentName,
            "skill" => Self::SkillName,
            _ => Self::StartDate,
        }
    }

    const fn key(self) -> Option<&'static str> {
        match self {
            Self::StartDate => None,
            Self::ColleagueName => Some("name"),
            Self::AssignmentName => Some("assignment"),
            Self::SkillName => Some("skill"),
        }
    }
}

/// Parsed placement filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementFilters {
    /// Free text.
    pub search: Option<String>,
    /// Service skills.
    pub skill_ids: BTreeSet<SkillId>,
    /// Colleague labels.
    pub label_ids: BTreeSet<LabelId>,
    /// Client organisations; descendants match too.
    pub organization_ids: BTreeSet<OrganizationId>,
    /// Issuing ministries.
    pub ministry_ids: BTreeSet<MinistryId>,
    /// Period the placement must overlap.
    pub period: Option<DateRange>,
    /// Row ordering.
    pub order: PlacementOrder,
    /// 1-based page.
    pub page: usize,
}

impl Default for PlacementFilters {
    fn default() -> Self {
        Self {
            search: None,
            skill_ids: BTreeSet::new(),
            label_ids: BTreeSet::new(),
            organization_ids: BTreeSet::new(),
            ministry_ids: BTreeSet::new(),
            period: None,
            order: PlacementOrder::default(),
            page: 1,
        }
    }
}

impl PlacementFilters {
    /// Parse a raw query string.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::PlacementFilters;
    ///
    /// let filters = PlacementFilters::parse("rol=1,2&rol=3&labels=x&pagina=2");
    /// assert_eq!(filters.skill_ids.len(), 3);
    /// assert!(filters.label_ids.is_empty());
    /// assert_eq!(filters.page, 2);
    /// ```
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut filters = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                SEARCH_KEY => {
                    let text = value.trim();
                    if !text.is_empty() {
                        filters.search = Some(text.to_owned());
                    }
                }
                SKILL_KEY => extend_ids(&mut filters.skill_ids, &value),
                LABEL_KEY => extend_ids(&mut filters.label_ids, &value),
                ORGANIZATION_KEY => extend_ids(&mut filters.organization_ids, &value),
                MINISTRY_KEY => extend_ids(&mut filters.ministry_ids, &value),
                PERIOD_KEY => filters.period = DateRange::parse(&value),
                ORDER_KEY => filters.order = PlacementOrder::parse(value.trim()),
                PAGE_KEY => {
                    filters.page = value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|page| *page >= 1)
                        .unwrap_or(1);
                }
                _ => {}
            }
        }
        filters
    }

    /// Query string for these filters on `page`; page 1 is left out.
    #[must_use]
    pub fn to_query(&self, page: usize) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        if let Some(search) = &self.search {
            out.append_pair(SEARCH_KEY, search);
        }
        for (key, ids) in [
            (SKILL_KEY, &self.skill_ids),
            (LABEL_KEY, &self.label_ids),
            (ORGANIZATION_KEY, &self.organization_ids),
            (MINISTRY_KEY, &self.ministry_ids),
        ] {
            for id in ids {
                out.append_pair(key, &id.to_string());
            }
        }
        if let Some(period) = &self.period {
            out.append_pair(PERIOD_KEY, &period.to_string());
        }
        if let Some(order) = self.order.key() {
            out.append_pair(ORDER_KEY, order);
        }
        if page > 1 {
            out.append_pair(PAGE_KEY, &page.to_string());
        }
        out.finish()
    }

    /// True when no narrowing filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.skill_ids.is_empty()
            && self.label_ids.is_empty()
            && self.organization_ids.is_empty()
            && self.ministry_ids.is_empty()
            && self.period.is_none()
    }
}

fn extend_ids(target: &mut BTreeSet<i32>, raw: &str) {
    target.extend(
        raw.split(',')
            .filter_map(|part| part.trim().parse::<i32>().ok())
            .filter(|id| *id > 0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    fn parses_every_key() {
        let filters = PlacementFilters::parse(
            "zoeken=%20data%20&rol=1&labels=2,3&opdrachtgever=4&ministerie=5&periode=2026-01-01_2026-06-30&volgorde=skill&pagina=3",
        );
        assert_eq!(filters.search.as_deref(), Some("data"));
        assert_eq!(filters.skill_ids, BTreeSet::from([1]));
        assert_eq!(filters.label_ids, BTreeSet::from([2, 3]));
        assert_eq!(filters.organization_ids, BTreeSet::from([4]));
        assert_eq!(filters.ministry_ids, BTreeSet::from([5]));
        assert_eq!(
            filters.period,
            DateRange::new(
                NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"),
                NaiveDate::from_ymd_opt(2026, 6, 30).expect("date"),
            )
        );
        assert_eq!(filters.order, PlacementOrder::SkillName);
        assert_eq!(filters.page, 3);
    }

    #[rstest]
    #[case("pagina=0", 1)]
    #[case("pagina=abc", 1)]
    #[case("", 1)]
    #[case("pagina=7", 7)]
    fn page_falls_back_to_one(#[case] query: &str, #[case] expected: usize) {
        assert_eq!(PlacementFilters::parse(query).page, expected);
    }

    #[rstest]
    fn drops_invalid_values() {
        let filters = PlacementFilters::parse("rol=-1,0,x&periode=2026-06-30_2026-01-01&zoeken=+&volgorde=bogus");
        assert!(filters.is_empty());
        assert_eq!(filters.order, PlacementOrder::StartDate);
    }

    #[rstest]
    fn query_round_trips_filters() {
        let filters = PlacementFilters::parse("zoeken=a b&labels=3,2&volgorde=name");
        let query = filters.to_query(2);
        assert_eq!(query, "zoeken=a+b&labels=2&labels=3&volgorde=name&pagina=2");
        let reparsed = PlacementFilters::parse(&query);
        assert_eq!(reparsed.label_ids, filters.label_ids);
        assert_eq!(reparsed.search, filters.search);
        assert_eq!(reparsed.page, 2);
        assert_eq!(filters.to_query(1), "zoeken=a+b&labels=2&labels=3&volgorde=name");
    }
}
