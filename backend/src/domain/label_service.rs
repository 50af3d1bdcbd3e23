//! Label category and label use cases.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::ports::{LabelRepository, LabelRepositoryError};
use crate::domain::{
    DEFAULT_LABELS, Error, FilterOrderService, Label, LabelCategory, LabelCategoryId,
    LabelCategoryWithLabels, LabelId, Permission, User, label_color, label_name,
};

/// Body for creating or editing a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct LabelCategoryInput {
    /// Unique name.
    pub name: String,
    /// `#RRGGBB` colour.
    pub color: String,
}

/// Body for creating or renaming a label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct LabelInput {
    /// Name, unique within its category.
    pub name: String,
}

/// Label service.
#[derive(Clone)]
pub struct LabelService {
    repo: Arc<dyn LabelRepository>,
    filters: FilterOrderService,
}

impl LabelService {
    /// Create the service; category changes are mirrored into `filters`.
    pub fn new(repo: Arc<dyn LabelRepository>, filters: FilterOrderService) -> Self {
        Self { repo, filters }
    }

    fn map_error(error: LabelRepositoryError) -> Error {
        match error {
            LabelRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("label repository unavailable: {message}"))
            }
            LabelRepositoryError::Query { message } => {
                Error::internal(format!("label repository error: {message}"))
            }
            LabelRepositoryError::Conflict { message } => Error::conflict(message),
            LabelRepositoryError::InvalidReference { message } => Error::invalid_request(message),
        }
    }

    /// Categories with their labels.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn categories(&self) -> Result<Vec<LabelCategoryWithLabels>, Error> {
        let categories = self.repo.list_categories().await.map_err(Self::map_error)?;
        let labels = self.repo.list_labels().await.map_err(Self::map_error)?;
        Ok(LabelCategoryWithLabels::group(categories, &labels))
    }

    /// Every label.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn labels(&self) -> Result<Vec<Label>, Error> {
        self.repo.list_labels().await.map_err(Self::map_error)
    }

    /// Create a category.
    ///
    /// # Errors
    /// Requires `manage_labels`; duplicate names conflict.
    pub async fn create_category(
        &self,
        user: &User,
        input: &LabelCategoryInput,
    ) -> Result<LabelCategory, Error> {
        user.require(Permission::ManageLabels)?;
        let name = label_name(&input.name)?;
        let color = label_color(&input.color)?;
        let category = self
            .repo
            .create_category(&name, &color)
            .await
            .map_err(Self::map_error)?;
        self.filters.category_created(category.id).await?;
        info!(id = category.id, name = %category.name, "created label category");
        Ok(category)
    }

    /// Edit a category.
    ///
    /// # Errors
    /// Requires `manage_labels`; unknown ids are not found.
    pub async fn update_category(
        &self,
        user: &User,
        id: LabelCategoryId,
        input: &LabelCategoryInput,
    ) -> Result<LabelCategory, Error> {
        user.require(Permission::ManageLabels)?;
        let category = LabelCategory {
            id,
            name: label_name(&input.name)?,
            color: label_color(&input.color)?,
        };
        if self
            .repo
            .update_category(&category)
            .await
            .map_err(Self::map_error)?
        {
            Ok(category)
        } else {
            Err(Error::not_found(format!("label category {id} not found")))
        }
    }

    /// Delete a category and its labels.
    ///
    /// # Errors
    /// Requires `manage_labels`; unknown ids are not found.
    pub async fn delete_category(&self, user: &User, id: LabelCategoryId) -> Result<(), Error> {
        user.require(Permission::ManageLabels)?;
        if !self.repo.delete_category(id).await.map_err(Self::map_error)? {
            return Err(Error::not_found(format!("label category {id} not found")));
        }
        self.filters.category_deleted(id).await?;
        info!(id, "deleted label category");
        Ok(())
    }

    /// Create a label in a category.
    ///
    /// # Errors
    /// Requires `manage_labels`; duplicate names conflict.
    pub async fn create_label(
        &self,
        user: &User,
        category_id: LabelCategoryId,
        input: &LabelInput,
    ) -> Result<Label, Error> {
        user.require(Permission::ManageLabels)?;
        let name = label_name(&input.name)?;
        let label = self
            .repo
            .create_label(category_id, &name)
            .await
            .map_err(Self::map_error)?;
        info!(id = label.id, category_id, "created label");
        Ok(label)
    }

    /// Rename a label.
    ///
    /// # Errors
    /// Requires `manage_labels`; unknown ids are not found.
    pub async fn update_label(
        &self,
        user: &User,
        id: LabelId,
        input: &LabelInput,
    ) -> Result<Label, Error> {
        user.require(Permission::ManageLabels)?;
        let name = label_name(&input.name)?;
        self.repo
            .rename_label(id, &name)
            .await
            .map_err(Self::map_error)?
            .ok_or_else(|| Error::not_found(format!("label {id} not found")))
    }

    /// Delete a label.
    ///
    /// # Errors
    /// Requires `manage_labels`; unknown ids are not found.
    pub async fn delete_label(&self, user: &User, id: LabelId) -> Result<(), Error> {
        user.require(Permission::ManageLabels)?;
        if self.repo.delete_label(id).await.map_err(Self::map_error)? {
            info!(id, "deleted label");
            Ok(())
        } else {
            Err(Error::not_found(format!("label {id} not found")))
        }
    }

    /// Create the default categories and labels that are missing.
    /// Returns the number of labels created.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn setup_defaults(&self) -> Result<usize, Error> {
        let mut created = 0;
        for default in DEFAULT_LABELS {
            let category = self
                .repo
                .ensure_category(default.name, default.color)
                .await
                .map_err(Self::map_error)?;
            for name in default.labels {
                let (_, was_created) = self
                    .repo
                    .ensure_label(category.id, name)
                    .await
                    .map_err(Self::map_error)?;
                if was_created {
                    created += 1;
                }
            }
        }
        info!(created, "default labels ensured");
        Ok(created)
    }
}
