//! Synchronise organisations with the public government registry.
//!
//! The registry export is a forest of entries. Each entry is matched to a
//! stored organisation by TOOI identifier or, below a known parent, by name.
//! Matches are updated when any synchronised field differs; everything else
//! is created. A dry run walks the same path without writing.

use std::collections::HashMap;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::{Organization, OrganizationDraft, OrganizationId, OrganizationType};
use crate::domain::Error;
use crate::domain::ports::{OrganizationRepository, OrganizationRepositoryError};

const SOURCE_BASE_URL: &str = "https://organisaties.overheid.nl";
const MINISTRY_PREFIX: &str = "Ministerie";

/// One organisation in the registry export, with nested children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Official name.
    pub name: String,
    /// Registry system id, used to build the public page URL.
    pub system_id: String,
    /// Registry classifications such as `Ministerie` or `Agentschap`.
    pub types: Vec<String>,
    /// TOOI identifier.
    pub tooi: Option<String>,
    /// Known abbreviations; the first one is stored.
    pub abbreviations: Vec<String>,
    /// TOOI of the ministry this organisation reports to.
    pub related_ministry_tooi: Option<String>,
    /// Nested organisations.
    pub children: Vec<RegistryEntry>,
}

impl RegistryEntry {
    /// Display name, with `Ministerie van` prepended for ministries.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::RegistryEntry;
    ///
    /// let entry = RegistryEntry {
    ///     name: "Financiën".to_owned(),
    ///     types: vec!["Ministerie".to_owned()],
    ///     ..RegistryEntry::default()
    /// };
    /// assert_eq!(entry.label(), "Ministerie van Financiën");
    /// ```
    #[must_use]
    pub fn label(&self) -> String {
        let name = self.name.trim();
        let is_ministry = self
            .types
            .iter()
            .any(|kind| kind.eq_ignore_ascii_case("ministerie"));
        if is_ministry && !name.starts_with(MINISTRY_PREFIX) {
            format!("{MINISTRY_PREFIX} van {name}")
        } else {
            name.to_owned()
        }
    }

    /// Type to store. Nested entries fall back to `organisatieonderdeel`;
    /// top-level entries without a root type are not importable.
    #[must_use]
    pub fn organization_type(&self, nested: bool) -> Option<OrganizationType> {
        let mut mapped = self
            .types
            .iter()
            .filter_map(|name| OrganizationType::from_registry_name(name));
        if nested {
            mapped
                .find(|kind| !kind.is_root())
                .or(Some(OrganizationType::Organisatieonderdeel))
        } else {
            mapped.find(|kind| kind.is_root())
        }
    }

    fn tooi(&self) -> Option<String> {
        self.tooi
            .as_deref()
            .map(str::trim)
            .filter(|tooi| !tooi.is_empty())
            .map(str::to_owned)
    }
}

/// Public registry page for an organisation, if it has a system id.
///
/// # Examples
/// ```
/// use wies::domain::organization::sync::build_source_url;
///
/// assert_eq!(
///     build_source_url("12345", "Ministerie van Financiën (FIN)").as_deref(),
///     Some("https://organisaties.overheid.nl/12345/Ministerie_van_Financiën_FIN/")
/// );
/// assert_eq!(build_source_url("", "x"), None);
/// ```
#[must_use]
pub fn build_source_url(system_id: &str, name: &str) -> Option<String> {
    let id = system_id.trim();
    if id.is_empty() {
        return None;
    }
    let mut slug = String::with_capacity(name.len());
    for raw in name.chars() {
        let keep = raw.is_alphanumeric() || raw == '_' || raw == '-';
        let c = if keep { raw } else { '_' };
        if c == '_' && slug.ends_with('_') {
            continue;
        }
        slug.push(c);
    }
    Some(format!("{SOURCE_BASE_URL}/{id}/{}/", slug.trim_matches('_')))
}

/// Outcome counts of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct SyncResult {
    /// Organisations created (or that would be created).
    pub created: usize,
    /// Organisations changed.
    pub updated: usize,
    /// Organisations already up to date.
    pub unchanged: usize,
    /// Entries that could not be processed.
    pub errors: Vec<String>,
}

impl AddAssign for SyncResult {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.errors.extend(other.errors);
    }
}

impl Add for SyncResult {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

/// Options for a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Report what would change without writing.
    pub dry_run: bool,
    /// Only sync top-level entries carrying this registry type.
    pub filter_type: Option<String>,
}

/// Fields compared and written by the sync.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyncedFields {
    name: String,
    abbreviation: String,
    organization_type: OrganizationType,
    parent_id: Option<OrganizationId>,
    tooi_identifier: Option<String>,
    source_url: Option<String>,
}

impl SyncedFields {
    fn of(org: &Organization) -> Self {
        Self {
            name: org.name.clone(),
            abbreviation: org.abbreviation.clone(),
            organization_type: org.organization_type,
            parent_id: org.parent_id,
            tooi_identifier: org.tooi_identifier.clone(),
            source_url: org.source_url.clone(),
        }
    }

    fn apply(self, org: &mut Organization) {
        org.name = self.name;
        org.abbreviation = self.abbreviation;
        org.organization_type = self.organization_type;
        org.parent_id = self.parent_id;
        org.tooi_identifier = self.tooi_identifier;
        org.source_url = self.source_url;
    }

    fn into_draft(self) -> OrganizationDraft {
        OrganizationDraft {
            name: self.name,
            abbreviation: self.abbreviation,
            organization_type: self.organization_type,
            parent_id: self.parent_id,
            tooi_identifier: self.tooi_identifier,
            oin_number: None,
            source_url: self.source_url,
        }
    }
}

/// Lookup tables over the stored organisations, kept current while walking.
#[derive(Debug, Default)]
struct SyncIndex {
    by_id: HashMap<OrganizationId, Organization>,
    by_tooi: HashMap<String, OrganizationId>,
    by_parent_and_name: HashMap<(OrganizationId, String), OrganizationId>,
}

impl SyncIndex {
    fn new(mut organizations: Vec<Organization>) -> Self {
        organizations.sort_by_key(|org| org.id);
        let mut index = Self::default();
        for org in organizations {
            index.insert(org);
        }
        index
    }

    fn insert(&mut self, org: Organization) {
        if let Some(tooi) = &org.tooi_identifier {
            self.by_tooi.entry(tooi.clone()).or_insert(org.id);
        }
        if let Some(parent_id) = org.parent_id {
            self.by_parent_and_name
                .entry((parent_id, org.name.clone()))
                .or_insert(org.id);
        }
        self.by_id.insert(org.id, org);
    }

    fn find_match(
        &self,
        tooi: Option<&str>,
        name: &str,
        parent: Option<OrganizationId>,
    ) -> Option<&Organization> {
        if let Some(found) = tooi
            .and_then(|key| self.by_tooi.get(key))
            .and_then(|id| self.by_id.get(id))
        {
            return Some(found);
        }
        let parent_id = parent?;
        let candidate = self
            .by_parent_and_name
            .get(&(parent_id, name.to_owned()))
            .and_then(|id| self.by_id.get(id))?;
        // A stored record with a TOOI is a different organisation than an
        // incoming entry without one.
        if tooi.is_none() && candidate.tooi_identifier.is_some() {
            return None;
        }
        Some(candidate)
    }
}

/// Runs registry syncs against the organisation repository.
#[derive(Clone)]
pub struct OrganizationSyncService {
    repo: Arc<dyn OrganizationRepository>,
}

impl OrganizationSyncService {
    /// Create a sync service over `repo`.
    pub fn new(repo: Arc<dyn OrganizationRepository>) -> Self {
        Self { repo }
    }

    /// Sync `entries` into the repository.
    ///
    /// Per-entry failures are collected in [`SyncResult::errors`] and skip
    /// that entry's subtree.
    ///
    /// # Errors
    /// Fails when the repository cannot be reached.
    pub async fn sync(
        &self,
        entries: Vec<RegistryEntry>,
        options: &SyncOptions,
    ) -> Result<SyncResult, Error> {
        let existing = self.repo.list_all().await.map_err(map_sync_error)?;
        let mut index = SyncIndex::new(existing);
        let mut result = SyncResult::default();

        let roots: Vec<RegistryEntry> = entries
            .into_iter()
            .filter(|entry| {
                options
                    .filter_type
                    .as_deref()
                    .is_none_or(|wanted| entry.types.iter().any(|kind| kind == wanted))
            })
            .collect();
        info!(roots = roots.len(), dry_run = options.dry_run, "syncing organizations");

        let mut stack: Vec<(RegistryEntry, Option<OrganizationId>, bool)> =
            roots.into_iter().rev().map(|entry| (entry, None, false)).collect();
        while let Some((mut entry, parent_id, nested)) = stack.pop() {
            let children = std::mem::take(&mut entry.children);
            match self
                .sync_entry(&mut index, &entry, parent_id, nested, options.dry_run)
                .await
            {
                Ok((outcome, own_id)) => {
                    result += outcome;
                    stack.extend(children.into_iter().rev().map(|child| (child, own_id, true)));
                }
                Err(EntryFailure::Fatal(error)) => return Err(error),
                Err(EntryFailure::Skipped(message)) => {
                    warn!(%message, "organization sync skipped entry");
                    result.errors.push(message);
                }
            }
        }
        Ok(result)
    }

    async fn sync_entry(
        &self,
        index: &mut SyncIndex,
        entry: &RegistryEntry,
        parent_id: Option<OrganizationId>,
        nested: bool,
        dry_run: bool,
    ) -> Result<(SyncResult, Option<OrganizationId>), EntryFailure> {
        let name = entry.label();
        if name.is_empty() {
            return Err(EntryFailure::Skipped(
                "Error processing unknown: missing name".to_owned(),
            ));
        }
        let organization_type = entry.organization_type(nested).ok_or_else(|| {
            EntryFailure::Skipped(format!(
                "Error processing {name}: no supported organization type in {:?}",
                entry.types
            ))
        })?;
        let tooi = entry.tooi();
        let wanted = SyncedFields {
            name: name.clone(),
            abbreviation: entry
                .abbreviations
                .first()
                .map(|abbr| abbr.trim().to_owned())
                .unwrap_or_default(),
            organization_type,
            parent_id,
            tooi_identifier: tooi.clone(),
            source_url: build_source_url(&entry.system_id, entry.name.trim()),
        };

        let mut outcome = SyncResult::default();
        if let Some(existing) = index.find_match(tooi.as_deref(), &name, parent_id).cloned() {
            if SyncedFields::of(&existing) == wanted {
                outcome.unchanged = 1;
                return Ok((outcome, Some(existing.id)));
            }
            outcome.updated = 1;
            if !dry_run {
                let mut updated = existing;
                wanted.apply(&mut updated);
                self.repo
                    .save(&updated)
                    .await
                    .map_err(|err| EntryFailure::from_repo(&name, err))?;
                info!(id = updated.id, name = %updated.name, "updated organization");
                let id = updated.id;
                index.insert(updated);
                return Ok((outcome, Some(id)));
            }
            return Ok((outcome, Some(existing.id)));
        }

        outcome.created = 1;
        if dry_run {
            return Ok((outcome, None));
        }
        let created = self
            .repo
            .create(&wanted.into_draft())
            .await
            .map_err(|err| EntryFailure::from_repo(&name, err))?;
        info!(id = created.id, name = %created.name, "created organization");
        let id = created.id;
        index.insert(created);
        Ok((outcome, Some(id)))
    }
}

enum EntryFailure {
    Fatal(Error),
    Skipped(String),
}

impl EntryFailure {
    fn from_repo(name: &str, error: OrganizationRepositoryError) -> Self {
        match error {
            OrganizationRepositoryError::Connection { .. } => Self::Fatal(map_sync_error(error)),
            other => Self::Skipped(format!("Error processing {name}: {other}")),
        }
    }
}

fn map_sync_error(error: OrganizationRepositoryError) -> Error {
    match error {
        OrganizationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("organization repository unavailable: {message}"))
        }
        other => Error::internal(format!("organization repository error: {other}")),
    }
}
