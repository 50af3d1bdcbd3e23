//! In-memory view of the organisation forest.
//!
//! The full table is small (a few thousand rows), so hierarchy questions are
//! answered from an index loaded once per request instead of recursive SQL.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::{Organization, OrganizationId, OrganizationType};
use crate::domain::Error;

const SEARCH_LIMIT: usize = 50;

/// Organisations keyed by id with a parent → children adjacency list.
#[derive(Debug, Clone, Default)]
pub struct OrganizationIndex {
    by_id: HashMap<OrganizationId, Organization>,
    children: HashMap<Option<OrganizationId>, Vec<OrganizationId>>,
}

/// Listing filters for `GET /organizations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::IntoParams)]
pub struct OrganizationListQuery {
    /// Case-insensitive text matched against names and abbreviations.
    #[serde(default, rename = "zoeken")]
    pub search: Option<String>,
    /// Restrict to one type.
    #[serde(default, rename = "type")]
    pub organization_type: Option<OrganizationType>,
    /// Include dissolved organisations.
    #[serde(default, rename = "inactief")]
    pub include_inactive: bool,
}

/// Root type with the number of organisations of that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct CategoryNode {
    /// Type key.
    pub organization_type: OrganizationType,
    /// Dutch label.
    pub label: &'static str,
    /// Number of root organisations of the type.
    pub count: usize,
}

/// One organisation as shown in the tree browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct TreeNode {
    /// Organisation id.
    pub id: OrganizationId,
    /// Name.
    pub name: String,
    /// Abbreviation.
    pub abbreviation: String,
    /// Kind.
    pub organization_type: OrganizationType,
    /// False once dissolved.
    pub is_active: bool,
    /// Whether expanding the node yields anything.
    pub has_children: bool,
}

/// Search match with its ancestors, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct TreeSearchHit {
    /// Matching organisation.
    pub node: TreeNode,
    /// Ancestors from the root down to the direct parent.
    pub path: Vec<TreeNode>,
}

impl OrganizationIndex {
    /// Build the index. Children are kept in case-insensitive name order.
    #[must_use]
    pub fn new(organizations: Vec<Organization>) -> Self {
        let mut children: HashMap<Option<OrganizationId>, Vec<OrganizationId>> = HashMap::new();
        let mut by_id = HashMap::with_capacity(organizations.len());
        for org in organizations {
            children.entry(org.parent_id).or_default().push(org.id);
            by_id.insert(org.id, org);
        }
        for ids in children.values_mut() {
            ids.sort_by_cached_key(|id| {
                by_id
                    .get(id)
                    .map(|org| (org.name.to_lowercase(), org.id))
                    .unwrap_or_default()
            });
        }
        Self { by_id, children }
    }

    /// Look up one organisation.
    #[must_use]
    pub fn get(&self, id: OrganizationId) -> Option<&Organization> {
        self.by_id.get(&id)
    }

    /// Number of indexed organisations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Direct children of `parent` (`None` for roots), in name order.
    pub fn children(&self, parent: Option<OrganizationId>) -> impl Iterator<Item = &Organization> {
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    /// True when `id` has at least one child.
    #[must_use]
    pub fn has_children(&self, id: OrganizationId) -> bool {
        self.children
            .get(&Some(id))
            .is_some_and(|ids| !ids.is_empty())
    }

    /// Ancestors from the direct parent upwards.
    #[must_use]
    pub fn ancestors(&self, id: OrganizationId) -> Vec<&Organization> {
        let mut seen = HashSet::from([id]);
        let mut out = Vec::new();
        let mut current = self.get(id).and_then(|org| org.parent_id);
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            out.push(parent);
            current = parent.parent_id;
        }
        out
    }

    /// Topmost ancestor, or the organisation itself when it is a root.
    #[must_use]
    pub fn root(&self, id: OrganizationId) -> Option<&Organization> {
        self.ancestors(id).pop().or_else(|| self.get(id))
    }

    /// All descendants in depth-first order.
    #[must_use]
    pub fn descendants(&self, id: OrganizationId) -> Vec<&Organization> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut stack: Vec<&Organization> = self.children(Some(id)).collect();
        stack.reverse();
        while let Some(org) = stack.pop() {
            if !seen.insert(org.id) {
                continue;
            }
            out.push(org);
            let mut below: Vec<&Organization> = self.children(Some(org.id)).collect();
            below.reverse();
            stack.extend(below);
        }
        out
    }

    /// `root_ids` together with every descendant, expanded level by level.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::{Organization, OrganizationIndex, OrganizationType};
    ///
    /// let org = |id, parent| Organization {
    ///     id,
    ///     name: format!("org {id}"),
    ///     abbreviation: String::new(),
    ///     organization_type: OrganizationType::Organisatieonderdeel,
    ///     parent_id: parent,
    ///     is_active: true,
    ///     tooi_identifier: None,
    ///     oin_number: None,
    ///     previous_names: Vec::new(),
    ///     successor_id: None,
    ///     source_url: None,
    /// };
    /// let index = OrganizationIndex::new(vec![org(1, None), org(2, Some(1)), org(3, Some(2)), org(4, None)]);
    /// let ids = index.with_descendants(&[1]);
    /// assert!(ids.contains(&3) && !ids.contains(&4));
    /// ```
    #[must_use]
    pub fn with_descendants(&self, root_ids: &[OrganizationId]) -> HashSet<OrganizationId> {
        let mut all: HashSet<OrganizationId> = root_ids.iter().copied().collect();
        let mut queue: VecDeque<OrganizationId> = root_ids.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            for child in self.children.get(&Some(id)).into_iter().flatten() {
                if all.insert(*child) {
                    queue.push_back(*child);
                }
            }
        }
        all
    }

    /// Breadcrumb such as `BZK > DGDOO > Directie XYZ`.
    #[must_use]
    pub fn full_path(&self, id: OrganizationId) -> Option<String> {
        let org = self.get(id)?;
        let mut parts: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .map(Organization::short_label)
            .collect();
        parts.reverse();
        parts.push(org.short_label());
        Some(parts.join(" > "))
    }

    /// Successors following `id`, ending at the current organisation.
    #[must_use]
    pub fn successor_chain(&self, id: OrganizationId) -> Vec<&Organization> {
        let mut seen = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|org| org.successor_id);
        while let Some(next_id) = current {
            if !seen.insert(next_id) {
                break;
            }
            let Some(next) = self.get(next_id) else {
                break;
            };
            chain.push(next);
            current = next.successor_id;
        }
        chain
    }

    /// Last organisation in the successor chain.
    #[must_use]
    pub fn current_successor(&self, id: OrganizationId) -> Option<&Organization> {
        self.successor_chain(id).pop()
    }

    /// Every organisation that (transitively) had `id` as successor.
    #[must_use]
    pub fn predecessors(&self, id: OrganizationId) -> Vec<&Organization> {
        let mut seen = HashSet::from([id]);
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(target) = queue.pop_front() {
            let mut direct: Vec<&Organization> = self
                .by_id
                .values()
                .filter(|org| org.successor_id == Some(target))
                .collect();
            direct.sort_by_key(|org| org.id);
            for org in direct {
                if seen.insert(org.id) {
                    out.push(org);
                    queue.push_back(org.id);
                }
            }
        }
        out
    }

    /// Check a (possibly new) organisation's placement in the hierarchy.
    ///
    /// # Errors
    /// Rejects, in order: root types with a parent, an unknown parent, a
    /// parent chain leading back to `id`, and parents of a disallowed type.
    pub fn validate_parent(
        &self,
        id: Option<OrganizationId>,
        kind: OrganizationType,
        requested_parent: Option<OrganizationId>,
    ) -> Result<(), Error> {
        let Some(parent_id) = requested_parent else {
            return Ok(());
        };
        if kind.is_root() {
            return Err(Error::invalid_field(
                "parent_id",
                "root_with_parent",
                format!("{} mag geen bovenliggende organisatie hebben.", kind.label()),
            ));
        }
        let parent = self.get(parent_id).ok_or_else(|| {
            Error::invalid_field("parent_id", "unknown_parent", "parent organization not found")
        })?;
        if let Some(own_id) = id {
            let mut seen = HashSet::new();
            let mut current = Some(parent);
            while let Some(org) = current {
                if org.id == own_id {
                    return Err(Error::invalid_field(
                        "parent_id",
                        "circular_parent",
                        "Circulaire referentie: organisatie kan niet zijn eigen voorouder zijn.",
                    ));
                }
                if !seen.insert(org.id) {
                    break;
                }
                current = org.parent_id.and_then(|next| self.get(next));
            }
        }
        if let Some(allowed) = kind.allowed_parents() {
            if !allowed.contains(&parent.organization_type) {
                return Err(Error::invalid_field(
                    "parent_id",
                    "invalid_parent_type",
                    format!(
                        "{} kan niet onder {} vallen.",
                        kind.label(),
                        parent.organization_type.label()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Organisations matching `query`, in name order.
    #[must_use]
    pub fn list(&self, query: &OrganizationListQuery) -> Vec<&Organization> {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let mut out: Vec<&Organization> = self
            .by_id
            .values()
            .filter(|org| query.include_inactive || org.is_active)
            .filter(|org| {
                query
                    .organization_type
                    .is_none_or(|kind| org.organization_type == kind)
            })
            .filter(|org| needle.as_deref().is_none_or(|n| org.matches_search(n)))
            .collect();
        out.sort_by_cached_key(|org| (org.name.to_lowercase(), org.id));
        out
    }

    /// Root types that have at least one active root organisation.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryNode> {
        OrganizationType::ALL
            .into_iter()
            .filter(|kind| kind.is_root())
            .filter_map(|kind| {
                let count = self
                    .children(None)
                    .filter(|org| org.is_active && org.organization_type == kind)
                    .count();
                (count > 0).then_some(CategoryNode {
                    organization_type: kind,
                    label: kind.label(),
                    count,
                })
            })
            .collect()
    }

    /// Active root organisations of one type.
    #[must_use]
    pub fn category_roots(&self, kind: OrganizationType) -> Vec<TreeNode> {
        self.children(None)
            .filter(|org| org.is_active && org.organization_type == kind)
            .map(|org| self.node(org))
            .collect()
    }

    /// Active children of a node.
    #[must_use]
    pub fn tree_children(&self, id: OrganizationId) -> Vec<TreeNode> {
        self.children(Some(id))
            .filter(|org| org.is_active)
            .map(|org| self.node(org))
            .collect()
    }

    /// Active organisations matching `query` with their ancestor path.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<TreeSearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let list_query = OrganizationListQuery {
            search: Some(needle),
            ..OrganizationListQuery::default()
        };
        self.list(&list_query)
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(|org| {
                let mut path: Vec<TreeNode> = self
                    .ancestors(org.id)
                    .into_iter()
                    .map(|ancestor| self.node(ancestor))
                    .collect();
                path.reverse();
                TreeSearchHit {
                    node: self.node(org),
                    path,
                }
            })
            .collect()
    }

    fn node(&self, org: &Organization) -> TreeNode {
        TreeNode {
            id: org.id,
            name: org.name.clone(),
            abbreviation: org.abbreviation.clone(),
            organization_type: org.organization_type,
            is_active: org.is_active,
            has_children: self
                .children(Some(org.id))
                .any(|child| child.is_active),
        }
    }
}
