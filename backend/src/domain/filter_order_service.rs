//! Loading and rearranging the placement filter order.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{
    ConfigRepository, ConfigRepositoryError, LabelRepository, LabelRepositoryError,
};
use crate::domain::{
    Error, FILTER_ORDER_KEY, FilterDisplay, FilterOrder, LabelCategoryId, MoveDirection,
    Permission, User,
};

/// Outcome of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct FilterMove {
    /// New position of the moved item.
    pub new_position: usize,
    /// Position it left, now held by its former neighbour.
    pub swapped_position: usize,
}

/// Filter order service.
#[derive(Clone)]
pub struct FilterOrderService {
    config: Arc<dyn ConfigRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl FilterOrderService {
    /// Create the service.
    pub fn new(config: Arc<dyn ConfigRepository>, labels: Arc<dyn LabelRepository>) -> Self {
        Self { config, labels }
    }

    fn map_config_error(error: ConfigRepositoryError) -> Error {
        match error {
            ConfigRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("config repository unavailable: {message}"))
            }
            ConfigRepositoryError::Query { message } => {
                Error::internal(format!("config repository error: {message}"))
            }
        }
    }

    fn map_label_error(error: LabelRepositoryError) -> Error {
        match error {
            LabelRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("label repository unavailable: {message}"))
            }
            other => Error::internal(format!("label repository error: {other}")),
        }
    }

    async fn stored(&self) -> Result<Option<FilterOrder>, Error> {
        self.config
            .get(FILTER_ORDER_KEY)
            .await
            .map_err(Self::map_config_error)?
            .map(|value| FilterOrder::from_stored(&value))
            .transpose()
    }

    async fn save(&self, order: &FilterOrder) -> Result<(), Error> {
        self.config
            .set(FILTER_ORDER_KEY, &order.to_value())
            .await
            .map_err(Self::map_config_error)
    }

    /// Stored order, or the default over every label category.
    ///
    /// # Errors
    /// Fails on an invalid stored order or repository failures.
    pub async fn current(&self) -> Result<FilterOrder, Error> {
        if let Some(order) = self.stored().await? {
            return Ok(order);
        }
        let categories = self
            .labels
            .list_categories()
            .await
            .map_err(Self::map_label_error)?;
        Ok(FilterOrder::default_for(
            categories.into_iter().map(|category| category.id),
        ))
    }

    /// Rows for the settings page.
    ///
    /// # Errors
    /// Requires `manage_filters`; otherwise as [`Self::current`].
    pub async fn display(&self, user: &User) -> Result<Vec<FilterDisplay>, Error> {
        user.require(Permission::ManageFilters)?;
        let order = self.current().await?;
        let categories = self
            .labels
            .list_categories()
            .await
            .map_err(Self::map_label_error)?;
        Ok(order.display(&categories))
    }

    /// Move the filter at `position` and store the result.
    ///
    /// # Errors
    /// Requires `manage_filters`; rejects positions outside the list.
    pub async fn move_filter(
        &self,
        user: &User,
        position: usize,
        direction: MoveDirection,
    ) -> Result<FilterMove, Error> {
        user.require(Permission::ManageFilters)?;
        let mut order = self.current().await?;
        let (new_position, swapped_position) = order.move_item(position, direction)?;
        self.save(&order).await?;
        info!(position, new_position, "moved filter");
        Ok(FilterMove {
            new_position,
            swapped_position,
        })
    }

    /// Add a new category to a stored order. Without a stored order the
    /// default already includes it.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn category_created(&self, id: LabelCategoryId) -> Result<(), Error> {
        if let Some(mut order) = self.stored().await? {
            order.insert_category(id);
            self.save(&order).await?;
        }
        Ok(())
    }

    /// Drop a deleted category from a stored order.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn category_deleted(&self, id: LabelCategoryId) -> Result<(), Error> {
        if let Some(mut order) = self.stored().await? {
            order.remove_category(id);
            self.save(&order).await?;
        }
        Ok(())
    }
}
