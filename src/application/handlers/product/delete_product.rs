//! DeleteProductHandler - Command handler that stops tracking a product.
//!
//! Deletion is soft: the row and its price history stay for reporting.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, ProductId, Timestamp, UserId};
use crate::ports::{ActivityLog, ProductRepository};

#[derive(Debug, Clone)]
pub struct DeleteProductCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeleteProductResult {
    pub product_id: ProductId,
}

pub struct DeleteProductHandler {
    products: Arc<dyn ProductRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl DeleteProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { products, activity }
    }

    pub async fn handle(&self, cmd: DeleteProductCommand) -> Result<DeleteProductResult, DomainError> {
        self.products
            .deactivate(&cmd.user_id, &cmd.product_id, Timestamp::now())
            .await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::ProductDeleted),
        )
        .await;

        Ok(DeleteProductResult {
            product_id: cmd.product_id,
        })
    }
}
