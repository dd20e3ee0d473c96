//! Tracked products and their price statistics.

use async_trait::async_trait;

use super::{InMemoryStore, MemoryState};
use crate::domain::foundation::{DomainError, ErrorCode, ProductId, Timestamp, UserId};
use crate::domain::product::{ProductSummary, TrackedProduct};
use crate::domain::subscription::ProductLimit;
use crate::ports::ProductRepository;

fn product_not_found() -> DomainError {
    DomainError::new(ErrorCode::ProductNotFound, "Product not found")
}

impl MemoryState {
    fn summarize(&self, product: &TrackedProduct) -> ProductSummary {
        let observed = self
            .price_history
            .iter()
            .filter(|o| o.product_id == product.id);
        ProductSummary {
            product: product.clone(),
            price_history_count: observed.clone().count() as i64,
            highest_price: observed.map(|o| o.price).max(),
        }
    }

    fn active_owned_mut(
        &mut self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Option<&mut TrackedProduct> {
        self.products
            .iter_mut()
            .find(|p| &p.id == product_id && &p.user_id == user_id && p.is_active)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list_active(&self, user_id: &UserId) -> Result<Vec<ProductSummary>, DomainError> {
        let state = self.state.read().await;
        let mut products: Vec<ProductSummary> = state
            .products
            .iter()
            .rev()
            .filter(|p| &p.user_id == user_id && p.is_active)
            .map(|p| state.summarize(p))
            .collect();
        products.sort_by(|a, b| b.product.created_at.cmp(&a.product.created_at));
        Ok(products)
    }

    async fn count_active(&self, user_id: &UserId) -> Result<u32, DomainError> {
        Ok(self.state.read().await.count_active_products(user_id))
    }

    async fn find_active_by_url(
        &self,
        user_id: &UserId,
        product_url: &str,
    ) -> Result<Option<TrackedProduct>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .find(|p| &p.user_id == user_id && p.is_active && p.product_url == product_url)
            .cloned())
    }

    async fn insert_within_limit(
        &self,
        product: &TrackedProduct,
        limit: ProductLimit,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        state.ensure_active_user(&product.user_id)?;
        let current = state.count_active_products(&product.user_id);
        if !limit.allows(current) {
            return Err(DomainError::new(
                ErrorCode::ProductLimitReached,
                format!(
                    "Product limit reached ({} of {}). Please upgrade your plan.",
                    current,
                    limit.reported()
                ),
            ));
        }
        if state.products.iter().any(|p| {
            p.user_id == product.user_id && p.is_active && p.product_url == product.product_url
        }) {
            return Err(DomainError::new(
                ErrorCode::DuplicateProduct,
                "You are already tracking this product",
            ));
        }

        state.products.push(product.clone());
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<TrackedProduct>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .find(|p| &p.id == product_id && &p.user_id == user_id && p.is_active)
            .cloned())
    }

    async fn update_alerts(&self, product: &TrackedProduct) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .active_owned_mut(&product.user_id, &product.id)
            .ok_or_else(product_not_found)?;
        stored.min_price_alert = product.min_price_alert;
        stored.max_price_alert = product.max_price_alert;
        stored.discord_webhook_url = product.discord_webhook_url.clone();
        stored.sms_enabled = product.sms_enabled;
        stored.updated_at = product.updated_at;
        Ok(())
    }

    async fn deactivate(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state
            .active_owned_mut(user_id, product_id)
            .ok_or_else(product_not_found)?
            .deactivate(now);
        Ok(())
    }
}
