//! CheckProductLimitHandler - Query handler answering "may this user add a product?"

use std::sync::Arc;

use crate::application::quota::QuotaResolver;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::PlanType;

#[derive(Debug, Clone)]
pub struct CheckProductLimitQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CheckProductLimitResult {
    pub can_add: bool,
    pub current_count: u32,
    /// `-1` when unlimited.
    pub max_products: i64,
    pub plan_type: PlanType,
}

pub struct CheckProductLimitHandler {
    quota: Arc<QuotaResolver>,
}

impl CheckProductLimitHandler {
    pub fn new(quota: Arc<QuotaResolver>) -> Self {
        Self { quota }
    }

    pub async fn handle(
        &self,
        query: CheckProductLimitQuery,
    ) -> Result<CheckProductLimitResult, DomainError> {
        let quota = self.quota.resolve(&query.user_id).await?;
        Ok(CheckProductLimitResult {
            can_add: quota.allowed,
            current_count: quota.current_count,
            max_products: quota.max_products(),
            plan_type: quota.plan_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::NewAccount;
    use crate::domain::foundation::{ErrorKind, Timestamp};
    use crate::domain::subscription::{SubscriptionPlan, DEFAULT_FREE_TIER_LIMIT};
    use crate::ports::AccountRepository;

    fn handler(store: &InMemoryStore) -> CheckProductLimitHandler {
        CheckProductLimitHandler::new(Arc::new(QuotaResolver::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            DEFAULT_FREE_TIER_LIMIT,
        )))
    }

    #[tokio::test]
    async fn new_free_user_can_add() {
        let store = InMemoryStore::with_default_catalogue();
        let account = NewAccount::new("Jane Doe", "jane@example.com", "$2b$12$hash", false).unwrap();
        let user_id = store.create_account(&account, Timestamp::now()).await.unwrap().user.id;

        let result = handler(&store).handle(CheckProductLimitQuery { user_id }).await.unwrap();
        assert_eq!(
            result,
            CheckProductLimitResult {
                can_add: true,
                current_count: 0,
                max_products: 2,
                plan_type: PlanType::Free,
            }
        );
    }

    #[tokio::test]
    async fn catalogue_free_limit_wins_over_fallback() {
        let store = InMemoryStore::new();
        let mut free = SubscriptionPlan::default_for(PlanType::Free);
        free.max_products = Some(7);
        store.upsert_plan(free).await;

        let result = handler(&store)
            .handle(CheckProductLimitQuery { user_id: UserId::new() })
            .await
            .unwrap();
        assert_eq!(result.max_products, 7);
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        use crate::domain::foundation::ErrorCode;
        use crate::domain::product::{ProductSummary, TrackedProduct};
        use crate::domain::foundation::ProductId;
        use crate::domain::subscription::ProductLimit;
        use crate::ports::ProductRepository;
        use async_trait::async_trait;

        struct BrokenProducts;

        #[async_trait]
        impl ProductRepository for BrokenProducts {
            async fn list_active(&self, _: &UserId) -> Result<Vec<ProductSummary>, DomainError> {
                Ok(vec![])
            }
            async fn count_active(&self, _: &UserId) -> Result<u32, DomainError> {
                Err(DomainError::new(ErrorCode::DatabaseError, "Simulated count failure"))
            }
            async fn find_active_by_url(
                &self,
                _: &UserId,
                _: &str,
            ) -> Result<Option<TrackedProduct>, DomainError> {
                Ok(None)
            }
            async fn insert_within_limit(
                &self,
                _: &TrackedProduct,
                _: ProductLimit,
            ) -> Result<(), DomainError> {
                Ok(())
            }
            async fn find_owned(
                &self,
                _: &UserId,
                _: &ProductId,
            ) -> Result<Option<TrackedProduct>, DomainError> {
                Ok(None)
            }
            async fn update_alerts(&self, _: &TrackedProduct) -> Result<(), DomainError> {
                Ok(())
            }
            async fn deactivate(
                &self,
                _: &UserId,
                _: &ProductId,
                _: Timestamp,
            ) -> Result<(), DomainError> {
                Ok(())
            }
        }

        let store = InMemoryStore::with_default_catalogue();
        let handler = CheckProductLimitHandler::new(Arc::new(QuotaResolver::new(
            Arc::new(BrokenProducts),
            Arc::new(store),
            DEFAULT_FREE_TIER_LIMIT,
        )));

        let err = handler
            .handle(CheckProductLimitQuery { user_id: UserId::new() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
