//! Filter panel and active-filter chips around a page of placements.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{PlacementFilters, PlacementPage};
use crate::domain::{
    FilterItem, FilterOrder, LabelCategoryId, LabelCategoryWithLabels, Ministry, OrganizationId,
    OrganizationIndex, SimpleFilter, Skill,
};

/// Control used to render a filter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Pick any number of options.
    MultiSelect,
    /// From/to dates.
    DateRange,
}

/// Selectable value within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FilterOption {
    /// Value sent back in the query string.
    pub id: i32,
    /// Display text.
    pub label: String,
    /// Currently selected.
    pub selected: bool,
}

/// One group in the filter panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FilterGroup {
    /// Query key, or `label_category` for label groups.
    pub key: String,
    /// Category id for label groups.
    pub id: Option<LabelCategoryId>,
    /// Heading.
    pub label: String,
    /// Control type.
    pub kind: FilterKind,
    /// Options for multi-select groups.
    pub options: Vec<FilterOption>,
    /// Current value for date ranges.
    pub value: Option<String>,
}

/// A selected value with the query string that clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ActiveFilter {
    /// Query key.
    pub key: String,
    /// Selected id, for id-valued filters.
    pub id: Option<i32>,
    /// Display text.
    pub label: String,
    /// Query string without this value.
    pub remove_query: String,
}

/// Everything the filter panel offers.
#[derive(Debug, Clone, Copy)]
pub struct FilterCatalog<'a> {
    /// Every ministry.
    pub ministries: &'a [Ministry],
    /// Every skill.
    pub skills: &'a [Skill],
    /// Label categories with their labels.
    pub categories: &'a [LabelCategoryWithLabels],
    /// Organisation forest, for names.
    pub organizations: &'a OrganizationIndex,
    /// Organisations linked to filled assignments; the client options.
    pub client_ids: &'a BTreeSet<OrganizationId>,
}

/// Placement listing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlacementListing {
    /// Selected values.
    pub active_filters: Vec<ActiveFilter>,
    /// Filter panel in the configured order.
    pub filter_groups: Vec<FilterGroup>,
    /// The page.
    #[serde(flatten)]
    pub page: PlacementPage,
}

impl FilterCatalog<'_> {
    fn skill_name(&self, id: i32) -> String {
        self.skills
            .iter()
            .find(|skill| skill.id == id)
            .map_or_else(|| format!("#{id}"), |skill| skill.name.clone())
    }

    fn ministry_name(&self, id: i32) -> String {
        self.ministries
            .iter()
            .find(|ministry| ministry.id == id)
            .map_or_else(|| format!("#{id}"), |ministry| ministry.name.clone())
    }

    fn organization_name(&self, id: i32) -> String {
        self.organizations
            .get(id)
            .map_or_else(|| format!("#{id}"), |org| org.name.clone())
    }

    fn label_name(&self, id: i32) -> String {
        self.categories
            .iter()
            .flat_map(|category| category.labels.iter())
            .find(|label| label.id == id)
            .map_or_else(|| format!("#{id}"), |label| label.name.clone())
    }
}

impl PlacementListing {
    /// Wrap `page` with the filter panel for `filters`.
    #[must_use]
    pub fn build(
        filters: &PlacementFilters,
        order: &FilterOrder,
        catalog: &FilterCatalog<'_>,
        page: PlacementPage,
    ) -> Self {
        Self {
            active_filters: active_filters(filters, catalog),
            filter_groups: order
                .items()
                .iter()
                .filter_map(|item| filter_group(*item, filters, catalog))
                .collect(),
            page,
        }
    }
}

fn filter_group(
    item: FilterItem,
    filters: &PlacementFilters,
    catalog: &FilterCatalog<'_>,
) -> Option<FilterGroup> {
    let multi = |key: &str, id, label: &str, options: Vec<FilterOption>| FilterGroup {
        key: key.to_owned(),
        id,
        label: label.to_owned(),
        kind: FilterKind::MultiSelect,
        options,
        value: None,
    };
    let group = match item {
        FilterItem::Simple(SimpleFilter::Ministerie) => {
            let mut ministries: Vec<&Ministry> = catalog.ministries.iter().collect();
            ministries.sort_by_key(|ministry| ministry.name.to_lowercase());
            let options = ministries
                .into_iter()
                .map(|ministry| FilterOption {
                    id: ministry.id,
                    label: ministry.name.clone(),
                    selected: filters.ministry_ids.contains(&ministry.id),
                })
                .collect();
            multi(SimpleFilter::Ministerie.key(), None, SimpleFilter::Ministerie.label(), options)
        }
        FilterItem::Simple(SimpleFilter::Opdrachtgever) => {
            let ids: BTreeSet<OrganizationId> = catalog
                .client_ids
                .union(&filters.organization_ids)
                .copied()
                .collect();
            let mut options: Vec<FilterOption> = ids
                .into_iter()
                .map(|id| FilterOption {
                    id,
                    label: catalog.organization_name(id),
                    selected: filters.organization_ids.contains(&id),
                })
                .collect();
            options.sort_by_key(|option| option.label.to_lowercase());
            multi(
                SimpleFilter::Opdrachtgever.key(),
                None,
                SimpleFilter::Opdrachtgever.label(),
                options,
            )
        }
        FilterItem::Simple(SimpleFilter::Rol) => {
            let mut options: Vec<FilterOption> = catalog
                .skills
                .iter()
                .map(|skill| FilterOption {
                    id: skill.id,
                    label: skill.name.clone(),
                    selected: filters.skill_ids.contains(&skill.id),
                })
                .collect();
            options.sort_by_key(|option| option.label.to_lowercase());
            multi(SimpleFilter::Rol.key(), None, SimpleFilter::Rol.label(), options)
        }
        FilterItem::Simple(SimpleFilter::Periode) => FilterGroup {
            key: SimpleFilter::Periode.key().to_owned(),
            id: None,
            label: SimpleFilter::Periode.label().to_owned(),
            kind: FilterKind::DateRange,
            options: Vec::new(),
            value: filters.period.map(|range| range.to_string()),
        },
        FilterItem::LabelCategory { label_category } => {
            let category = catalog
                .categories
                .iter()
                .find(|category| category.category.id == label_category)?;
            let options = category
                .labels
                .iter()
                .map(|label| FilterOption {
                    id: label.id,
                    label: label.name.clone(),
                    selected: filters.label_ids.contains(&label.id),
                })
                .collect();
            multi("labels", Some(label_category), &category.category.name, options)
        }
    };
    Some(group)
}

fn active_filters(filters: &PlacementFilters, catalog: &FilterCatalog<'_>) -> Vec<ActiveFilter> {
    let mut active = Vec::new();
    if let Some(search) = &filters.search {
        let mut without = filters.clone();
        without.search = None;
        active.push(chip("zoeken", None, search.clone(), &without));
    }
    for id in &filters.skill_ids {
        let mut without = filters.clone();
        without.skill_ids.remove(id);
        active.push(chip("rol", Some(*id), catalog.skill_name(*id), &without));
    }
    for id in &filters.label_ids {
        let mut without = filters.clone();
        without.label_ids.remove(id);
        active.push(chip("labels", Some(*id), catalog.label_name(*id), &without));
    }
    for id in &filters.organization_ids {
        let mut without = filters.clone();
        without.organization_ids.remove(id);
        active.push(chip(
            "opdrachtgever",
            Some(*id),
            catalog.organization_name(*id),
            &without,
        ));
    }
    for id in &filters.ministry_ids {
        let mut without = filters.clone();
        without.ministry_ids.remove(id);
        active.push(chip("ministerie", Some(*id), catalog.ministry_name(*id), &without));
    }
    if let Some(range) = &filters.period {
        let mut without = filters.clone();
        without.period = None;
        let label = format!(
            "{} t/m {}",
            range.from.format("%d-%m-%Y"),
            range.to.format("%d-%m-%Y")
        );
        active.push(chip("periode", None, label, &without));
    }
    active
}

fn chip(key: &str, id: Option<i32>, label: String, without: &PlacementFilters) -> ActiveFilter {
    ActiveFilter {
        key: key.to_owned(),
        id,
        label,
        remove_query: without.to_query(1),
    }
}
