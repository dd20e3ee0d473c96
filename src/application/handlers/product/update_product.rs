//! UpdateProductHandler - Command handler for alert thresholds and channels.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, ErrorCode, ProductId, Timestamp, UserId};
use crate::domain::product::{ProductChanges, TrackedProduct};
use crate::ports::{ActivityLog, ProductRepository};

#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Fields left `None` stay unchanged; an empty webhook clears it.
    pub changes: ProductChanges,
}

pub type UpdateProductResult = TrackedProduct;

pub struct UpdateProductHandler {
    products: Arc<dyn ProductRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl UpdateProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { products, activity }
    }

    pub async fn handle(&self, cmd: UpdateProductCommand) -> Result<UpdateProductResult, DomainError> {
        let patch = cmd.changes.validate()?;

        let mut product = self
            .products
            .find_owned(&cmd.user_id, &cmd.product_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::ProductNotFound, "Product not found"))?;

        product.apply(patch, Timestamp::now());
        self.products.update_alerts(&product).await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::ProductUpdated)
                .with_description(format!("Updated alerts for {}", product.product_title)),
        )
        .await;

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::NewAccount;
    use crate::domain::foundation::ErrorKind;
    use crate::domain::product::NewProduct;
    use crate::domain::subscription::ProductLimit;
    use crate::ports::AccountRepository;
    use rust_decimal::Decimal;

    const WEBHOOK: &str = "https://discord.com/api/webhooks/1/token";

    async fn setup() -> (InMemoryStore, UserId, ProductId, UpdateProductHandler) {
        let store = InMemoryStore::new();
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$hash", false).unwrap();
        let user_id = store.create_account(&account, Timestamp::now()).await.unwrap().user.id;
        let new = NewProduct::new("https://www.amazon.com/dp/1", None, Some(WEBHOOK), false).unwrap();
        let product = TrackedProduct::create(user_id, new, Timestamp::now());
        store.insert_within_limit(&product, ProductLimit::Unlimited).await.unwrap();
        let handler = UpdateProductHandler::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (store, user_id, product.id, handler)
    }

    #[tokio::test]
    async fn sets_thresholds_and_keeps_untouched_fields() {
        let (store, user_id, product_id, handler) = setup().await;

        let updated = handler
            .handle(UpdateProductCommand {
                user_id,
                product_id,
                changes: ProductChanges {
                    min_price_alert: Some(Decimal::new(5000, 2)),
                    max_price_alert: Some(Decimal::new(8000, 2)),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.min_price_alert, Some(Decimal::new(5000, 2)));
        assert_eq!(updated.discord_webhook_url.as_deref(), Some(WEBHOOK));
        let stored = store.find_owned(&user_id, &product_id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn empty_webhook_clears_it() {
        let (_, user_id, product_id, handler) = setup().await;
        let updated = handler
            .handle(UpdateProductCommand {
                user_id,
                product_id,
                changes: ProductChanges {
                    discord_webhook_url: Some(String::new()),
                    sms_enabled: Some(true),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(updated.discord_webhook_url, None);
        assert!(updated.sms_enabled);
    }

    #[tokio::test]
    async fn min_not_below_max_is_rejected() {
        let (_, user_id, product_id, handler) = setup().await;
        let err = handler
            .handle(UpdateProductCommand {
                user_id,
                product_id,
                changes: ProductChanges {
                    min_price_alert: Some(Decimal::new(80, 0)),
                    max_price_alert: Some(Decimal::new(80, 0)),
                    ..Default::default()
                },
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn other_users_product_is_not_found() {
        let (_, _, product_id, handler) = setup().await;
        let err = handler
            .handle(UpdateProductCommand {
                user_id: UserId::new(),
                product_id,
                changes: ProductChanges::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }
}
