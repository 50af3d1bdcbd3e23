//! Order of the filter groups on the placement listing.
//!
//! The order is stored as JSON in the config table. Until someone reorders
//! the filters nothing is stored and the default order, which lists every
//! label category, applies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Error, LabelCategory, LabelCategoryId};

/// Config key holding the stored order.
pub const FILTER_ORDER_KEY: &str = "filter_order_plaatsingen";

/// Built-in filter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SimpleFilter {
    /// Issuing ministry.
    Ministerie,
    /// Client organisation, including descendants.
    Opdrachtgever,
    /// Skill of the service.
    Rol,
    /// Period overlap.
    Periode,
}

impl SimpleFilter {
    /// Query-string key, which is also the stored form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ministerie => "ministerie",
            Self::Opdrachtgever => "opdrachtgever",
            Self::Rol => "rol",
            Self::Periode => "periode",
        }
    }

    /// Dutch heading.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ministerie => "Ministerie",
            Self::Opdrachtgever => "Opdrachtgever",
            Self::Rol => "Rollen",
            Self::Periode => "Periode",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        [Self::Ministerie, Self::Opdrachtgever, Self::Rol, Self::Periode]
            .into_iter()
            .find(|filter| filter.key() == raw)
    }
}

/// One entry in the filter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum FilterItem {
    /// A built-in filter.
    Simple(SimpleFilter),
    /// The labels of one category.
    LabelCategory {
        /// Category id.
        label_category: LabelCategoryId,
    },
}

/// Direction of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards position 1.
    Up,
    /// Towards the end.
    Down,
}

impl FromStr for MoveDirection {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(Error::invalid_request(format!("Invalid direction: {other}"))),
        }
    }
}

/// Filter order row for the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FilterDisplay {
    /// `ministerie`, `opdrachtgever`, `rol`, `periode` or `label_category`.
    pub filter_key: String,
    /// Category id for label filters.
    pub id: Option<LabelCategoryId>,
    /// Heading.
    pub label: String,
    /// 1-based position.
    pub position: usize,
    /// First in the list.
    pub is_first: bool,
    /// Last in the list.
    pub is_last: bool,
}

/// Ordered list of filter items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct FilterOrder(Vec<FilterItem>);

impl FilterOrder {
    /// `ministerie, opdrachtgever, rol`, every category, then `periode`.
    #[must_use]
    pub fn default_for(categories: impl IntoIterator<Item = LabelCategoryId>) -> Self {
        let mut items = vec![
            FilterItem::Simple(SimpleFilter::Ministerie),
            FilterItem::Simple(SimpleFilter::Opdrachtgever),
            FilterItem::Simple(SimpleFilter::Rol),
        ];
        items.extend(
            categories
                .into_iter()
                .map(|label_category| FilterItem::LabelCategory { label_category }),
        );
        items.push(FilterItem::Simple(SimpleFilter::Periode));
        Self(items)
    }

    /// Parse the stored JSON array.
    ///
    /// # Errors
    /// Returns an internal error listing every invalid item.
    pub fn from_stored(value: &Value) -> Result<Self, Error> {
        let Some(raw_items) = value.as_array() else {
            return Err(Error::internal(format!(
                "Invalid filter order in config: {value}"
            )));
        };
        let mut items = Vec::with_capacity(raw_items.len());
        let mut invalid = Vec::new();
        for raw in raw_items {
            match parse_item(raw) {
                Some(item) => items.push(item),
                None => invalid.push(raw.to_string()),
            }
        }
        if invalid.is_empty() {
            Ok(Self(items))
        } else {
            Err(Error::internal(format!(
                "Invalid filter items in config: [{}]",
                invalid.join(", ")
            )))
        }
    }

    /// JSON form for storage.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }

    /// Items in order.
    #[must_use]
    pub fn items(&self) -> &[FilterItem] {
        &self.0
    }

    /// Insert a new category just before `periode` (or at the end).
    pub fn insert_category(&mut self, label_category: LabelCategoryId) {
        let item = FilterItem::LabelCategory { label_category };
        if self.0.contains(&item) {
            return;
        }
        let at = self
            .0
            .iter()
            .position(|existing| *existing == FilterItem::Simple(SimpleFilter::Periode))
            .unwrap_or(self.0.len());
        self.0.insert(at, item);
    }

    /// Drop a deleted category.
    pub fn remove_category(&mut self, label_category: LabelCategoryId) {
        self.0
            .retain(|item| *item != FilterItem::LabelCategory { label_category });
    }

    /// Swap the item at 1-based `position` with its neighbour.
    ///
    /// Moving the first item up or the last item down changes nothing.
    /// Returns the moved item's new position and the position it left, both
    /// 1-based.
    ///
    /// # Errors
    /// Rejects positions outside the list.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::{FilterOrder, MoveDirection};
    ///
    /// let mut order = FilterOrder::default_for([]);
    /// assert_eq!(order.move_item(2, MoveDirection::Up).unwrap(), (1, 2));
    /// assert_eq!(order.move_item(1, MoveDirection::Up).unwrap(), (1, 1));
    /// assert!(order.move_item(9, MoveDirection::Down).is_err());
    /// ```
    pub fn move_item(
        &mut self,
        position: usize,
        direction: MoveDirection,
    ) -> Result<(usize, usize), Error> {
        let len = self.0.len();
        let idx = position
            .checked_sub(1)
            .filter(|idx| *idx < len)
            .ok_or_else(|| Error::invalid_request(format!("Invalid position: {position}")))?;
        let new_idx = match direction {
            MoveDirection::Up if idx > 0 => idx - 1,
            MoveDirection::Down if idx + 1 < len => idx + 1,
            _ => idx,
        };
        self.0.swap(idx, new_idx);
        Ok((new_idx + 1, idx + 1))
    }

    /// Rows for display, resolving category names.
    #[must_use]
    pub fn display(&self, categories: &[LabelCategory]) -> Vec<FilterDisplay> {
        let last = self.0.len().saturating_sub(1);
        self.0
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let (filter_key, id, label) = match item {
                    FilterItem::Simple(filter) => {
                        (filter.key().to_owned(), None, filter.label().to_owned())
                    }
                    FilterItem::LabelCategory { label_category } => {
                        let label = categories
                            .iter()
                            .find(|category| category.id == *label_category)
                            .map_or_else(
                                || format!("label_category:{label_category}"),
                                |category| category.name.clone(),
                            );
                        ("label_category".to_owned(), Some(*label_category), label)
                    }
                };
                FilterDisplay {
                    filter_key,
                    id,
                    label,
                    position: idx + 1,
                    is_first: idx == 0,
                    is_last: idx == last,
                }
            })
            .collect()
    }
}

fn parse_item(raw: &Value) -> Option<FilterItem> {
    match raw {
        Value::String(key) => SimpleFilter::parse(key).map(FilterItem::Simple),
        Value::Object(map) => map
            .get("label_category")
            .and_then(Value::as_i64)
            .filter(|id| *id > 0)
            .and_then(|id| LabelCategoryId::try_from(id).ok())
            .map(|label_category| FilterItem::LabelCategory { label_category }),
        _ => None,
    }
}
