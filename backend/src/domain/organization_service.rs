//! Organisation listing, tree browsing and editing.

use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use tracing::info;

use crate::domain::ports::{OrganizationRepository, OrganizationRepositoryError};
use crate::domain::{
    CategoryNode, Error, Organization, OrganizationDraft, OrganizationId, OrganizationIndex,
    OrganizationListQuery, OrganizationType, Permission, TreeNode, TreeSearchHit, User,
};

/// Body of `PUT /organizations/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct OrganizationUpdate {
    /// New field values; a changed name is recorded in the rename history.
    #[serde(flatten)]
    pub fields: OrganizationDraft,
    /// Mark the organisation as dissolved.
    #[serde(default)]
    pub dissolve: bool,
    /// Organisation taking over after dissolution.
    #[serde(default)]
    pub successor_id: Option<OrganizationId>,
}

/// Organisation service.
#[derive(Clone)]
pub struct OrganizationService {
    repo: Arc<dyn OrganizationRepository>,
    clock: Arc<dyn Clock>,
}

pub(crate) fn map_organization_error(error: OrganizationRepositoryError) -> Error {
    match error {
        OrganizationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("organization repository unavailable: {message}"))
        }
        OrganizationRepositoryError::Query { message } => {
            Error::internal(format!("organization repository error: {message}"))
        }
        OrganizationRepositoryError::Conflict { message } => Error::conflict(message),
        OrganizationRepositoryError::InvalidReference { message } => {
            Error::invalid_request(message)
        }
    }
}

impl OrganizationService {
    /// Create the service.
    pub fn new(repo: Arc<dyn OrganizationRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Load the whole hierarchy.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn index(&self) -> Result<OrganizationIndex, Error> {
        let all = self.repo.list_all().await.map_err(map_organization_error)?;
        Ok(OrganizationIndex::new(all))
    }

    /// Organisations matching `query`.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self, query: &OrganizationListQuery) -> Result<Vec<Organization>, Error> {
        let index = self.index().await?;
        Ok(index.list(query).into_iter().cloned().collect())
    }

    /// Root types with counts.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn categories(&self) -> Result<Vec<CategoryNode>, Error> {
        Ok(self.index().await?.categories())
    }

    /// Root organisations of one type.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn category_roots(&self, kind: OrganizationType) -> Result<Vec<TreeNode>, Error> {
        Ok(self.index().await?.category_roots(kind))
    }

    /// Children of an organisation.
    ///
    /// # Errors
    /// Unknown ids are not found.
    pub async fn tree_children(&self, id: OrganizationId) -> Result<Vec<TreeNode>, Error> {
        let index = self.index().await?;
        if index.get(id).is_none() {
            return Err(Error::not_found(format!("organization {id} not found")));
        }
        Ok(index.tree_children(id))
    }

    /// Tree search with ancestor paths.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn search(&self, query: &str) -> Result<Vec<TreeSearchHit>, Error> {
        Ok(self.index().await?.search(query))
    }

    /// Create an organisation.
    ///
    /// # Errors
    /// Requires `manage_organizations`; rejects invalid fields and parents.
    pub async fn create(&self, user: &User, draft: OrganizationDraft) -> Result<Organization, Error> {
        user.require(Permission::ManageOrganizations)?;
        let draft = draft.normalised()?;
        self.index()
            .await?
            .validate_parent(None, draft.organization_type, draft.parent_id)?;
        let created = self
            .repo
            .create(&draft)
            .await
            .map_err(map_organization_error)?;
        info!(id = created.id, name = %created.name, "created organization");
        Ok(created)
    }

    /// Edit an organisation.
    ///
    /// # Errors
    /// Requires `manage_organizations`; unknown ids are not found; rejects
    /// invalid fields, parents and successors.
    pub async fn update(
        &self,
        user: &User,
        id: OrganizationId,
        update: OrganizationUpdate,
    ) -> Result<Organization, Error> {
        user.require(Permission::ManageOrganizations)?;
        let fields = update.fields.normalised()?;
        let index = self.index().await?;
        let mut organization = index
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("organization {id} not found")))?;
        index.validate_parent(Some(id), fields.organization_type, fields.parent_id)?;
        if let Some(successor) = update.successor_id {
            if index.get(successor).is_none() {
                return Err(Error::invalid_field(
                    "successor_id",
                    "unknown_successor",
                    "successor organization not found",
                ));
            }
        }

        organization.rename(&fields.name, self.clock.local().date_naive());
        organization.abbreviation = fields.abbreviation;
        organization.organization_type = fields.organization_type;
        organization.parent_id = fields.parent_id;
        organization.tooi_identifier = fields.tooi_identifier;
        organization.oin_number = fields.oin_number;
        organization.source_url = fields.source_url;
        if update.dissolve {
            organization.dissolve(update.successor_id)?;
        }
        self.repo
            .save(&organization)
            .await
            .map_err(map_organization_error)?;
        info!(id, dissolved = update.dissolve, "updated organization");
        Ok(organization)
    }

    /// Delete an organisation without children or assignment links.
    ///
    /// # Errors
    /// Requires `manage_organizations`; unknown ids are not found; linked
    /// organisations conflict.
    pub async fn delete(&self, user: &User, id: OrganizationId) -> Result<(), Error> {
        user.require(Permission::ManageOrganizations)?;
        let index = self.index().await?;
        if index.get(id).is_none() {
            return Err(Error::not_found(format!("organization {id} not found")));
        }
        if index.has_children(id) {
            return Err(Error::conflict(
                "organization has child organizations and cannot be deleted",
            ));
        }
        let links = self
            .repo
            .count_assignment_links(id)
            .await
            .map_err(map_organization_error)?;
        if links > 0 {
            return Err(Error::conflict(format!(
                "organization is linked to {links} assignment(s) and cannot be deleted"
            )));
        }
        self.repo.delete(id).await.map_err(map_organization_error)?;
        info!(id, "deleted organization");
        Ok(())
    }
}
