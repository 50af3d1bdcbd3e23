//! Compilation of parsed filters into a repository query, and paging.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::{PlacementFilters, PlacementOrder, PlacementRecord};
use crate::domain::{
    DateRange, Label, LabelCategoryId, LabelId, MinistryId, OrganizationId, OrganizationIndex,
    SkillId,
};

/// Rows per page.
pub const PAGE_SIZE: usize = 50;

/// Lookups the filters need to be compiled.
#[derive(Debug, Clone, Copy)]
pub struct PlacementQueryContext<'a> {
    /// Organisation forest for descendant expansion.
    pub organizations: &'a OrganizationIndex,
    /// Every label, to group selected labels by category.
    pub labels: &'a [Label],
    /// Reference date for hiding ended placements.
    pub today: NaiveDate,
}

/// Dates a placement's resolved period must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodWindow {
    /// Both bounds known and overlapping the range.
    Overlapping(DateRange),
    /// No end, or an end on or after the date.
    EndingFrom(NaiveDate),
}

/// Placement listing as the repository executes it.
///
/// Only placements on filled assignments are ever returned. Every set that
/// is empty leaves its dimension unconstrained, except `organization_ids`,
/// where `Some` of an empty set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementQuery {
    /// Case-insensitive text matched against colleague, assignment,
    /// organisation and ministry text.
    pub search: Option<String>,
    /// Service skills.
    pub skill_ids: BTreeSet<SkillId>,
    /// Colleague labels: any label within a group, every group.
    pub label_groups: Vec<BTreeSet<LabelId>>,
    /// Linked organisations, already expanded with descendants.
    pub organization_ids: Option<BTreeSet<OrganizationId>>,
    /// Issuing ministries.
    pub ministry_ids: BTreeSet<MinistryId>,
    /// Period constraint.
    pub window: PeriodWindow,
    /// Row ordering; ties go to the lower placement id.
    pub order: PlacementOrder,
    /// Rows to skip.
    pub offset: usize,
    /// Rows to return.
    pub limit: usize,
}

/// Rows of one page with the total over all pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementSlice {
    /// Rows in query order.
    pub records: Vec<PlacementRecord>,
    /// Matching rows over all pages.
    pub total: usize,
}

/// One page of filtered rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlacementPage {
    /// Rows on this page.
    pub rows: Vec<PlacementRecord>,
    /// Matching rows over all pages.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    /// Query string of the next page, when there is one.
    pub next_page: Option<String>,
}

impl PlacementFilters {
    /// Resolve label categories and organisation descendants, and turn the
    /// page number into an offset.
    #[must_use]
    pub fn compile(&self, ctx: &PlacementQueryContext<'_>) -> PlacementQuery {
        let mut groups: BTreeMap<LabelCategoryId, BTreeSet<LabelId>> = BTreeMap::new();
        for label in ctx.labels {
            if self.label_ids.contains(&label.id) {
                groups.entry(label.category_id).or_default().insert(label.id);
            }
        }
        let organization_ids = (!self.organization_ids.is_empty()).then(|| {
            let selected: Vec<OrganizationId> = self.organization_ids.iter().copied().collect();
            ctx.organizations
                .with_descendants(&selected)
                .into_iter()
                .collect()
        });
        PlacementQuery {
            search: self.search.clone(),
            skill_ids: self.skill_ids.clone(),
            label_groups: groups.into_values().collect(),
            organization_ids,
            ministry_ids: self.ministry_ids.clone(),
            window: self
                .period
                .map_or(PeriodWindow::EndingFrom(ctx.today), PeriodWindow::Overlapping),
            order: self.order,
            offset: self.page.saturating_sub(1).saturating_mul(PAGE_SIZE),
            limit: PAGE_SIZE,
        }
    }

    /// Wrap a fetched slice, linking the next page when rows remain.
    #[must_use]
    pub fn page_of(&self, slice: PlacementSlice) -> PlacementPage {
        let seen = self
            .page
            .saturating_sub(1)
            .saturating_mul(PAGE_SIZE)
            .saturating_add(PAGE_SIZE);
        PlacementPage {
            next_page: (seen < slice.total).then(|| self.to_query(self.page.saturating_add(1))),
            rows: slice.records,
            total: slice.total,
            page: self.page,
        }
    }
}
