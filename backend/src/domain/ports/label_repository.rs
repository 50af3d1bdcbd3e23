//! Port for label categories and labels.

use async_trait::async_trait;

use crate::domain::{Label, LabelCategory, LabelCategoryId, LabelId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by label repository adapters.
    pub enum LabelRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "label repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "label repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } =>
            "label name already in use: {message}",
        /// A referenced row does not exist.
        InvalidReference { message: String } =>
            "label references a missing row: {message}",
    }
}

/// Label storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<LabelCategory>, LabelRepositoryError>;

    /// Every label.
    async fn list_labels(&self) -> Result<Vec<Label>, LabelRepositoryError>;

    /// Insert a category.
    async fn create_category(
        &self,
        name: &str,
        color: &str,
    ) -> Result<LabelCategory, LabelRepositoryError>;

    /// Rename or recolour a category; `false` when it does not exist.
    async fn update_category(&self, category: &LabelCategory) -> Result<bool, LabelRepositoryError>;

    /// Remove a category with its labels.
    async fn delete_category(&self, id: LabelCategoryId) -> Result<bool, LabelRepositoryError>;

    /// Category by name, created with `color` when missing.
    async fn ensure_category(
        &self,
        name: &str,
        color: &str,
    ) -> Result<LabelCategory, LabelRepositoryError>;

    /// Insert a label.
    async fn create_label(
        &self,
        category_id: LabelCategoryId,
        name: &str,
    ) -> Result<Label, LabelRepositoryError>;

    /// Label by name within a category, created when missing. The flag
    /// tells whether it was created.
    async fn ensure_label(
        &self,
        category_id: LabelCategoryId,
        name: &str,
    ) -> Result<(Label, bool), LabelRepositoryError>;

    /// Rename a label; `None` when it does not exist.
    async fn rename_label(
        &self,
        id: LabelId,
        name: &str,
    ) -> Result<Option<Label>, LabelRepositoryError>;

    /// Remove a label.
    async fn delete_label(&self, id: LabelId) -> Result<bool, LabelRepositoryError>;
}
