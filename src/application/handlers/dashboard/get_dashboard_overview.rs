//! GetDashboardOverviewHandler - Query handler for the dashboard landing page.
//!
//! Returns the greeting, headline product statistics and the user's login
//! streak.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::account::ActivityType;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::helpers::{days_since, display_name, initials, login_streak};
use crate::domain::product::DashboardStats;
use crate::ports::{AccountRepository, ActivityLog, ProductRepository};

/// Activity rows scanned when computing the login streak.
const STREAK_LOOKBACK: usize = 100;

#[derive(Debug, Clone)]
pub struct GetDashboardOverviewQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub display_name: String,
    pub initials: String,
    pub member_for_days: i64,
    pub login_streak: u32,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

pub type GetDashboardOverviewResult = DashboardOverview;

pub struct GetDashboardOverviewHandler {
    accounts: Arc<dyn AccountRepository>,
    products: Arc<dyn ProductRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl GetDashboardOverviewHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        products: Arc<dyn ProductRepository>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            accounts,
            products,
            activity,
        }
    }

    pub async fn handle(
        &self,
        query: GetDashboardOverviewQuery,
    ) -> Result<GetDashboardOverviewResult, DomainError> {
        let now = Timestamp::now();
        let user = self
            .accounts
            .find_by_id(&query.user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))?;

        let products = self.products.list_active(&query.user_id).await?;
        let login_days: Vec<_> = self
            .activity
            .recent_for_user(&query.user_id, STREAK_LOOKBACK)
            .await?
            .into_iter()
            .filter(|e| e.activity_type == ActivityType::Login)
            .map(|e| e.occurred_at.date())
            .collect();

        let name = display_name(Some(&user.full_name), user.email.as_str());
        Ok(DashboardOverview {
            initials: initials(&name),
            display_name: name,
            member_for_days: days_since(user.created_at, now),
            login_streak: login_streak(&login_days, now.date()),
            stats: DashboardStats::from_products(&products),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::account::{ActivityEntry, NewAccount};
    use crate::domain::product::{NewProduct, ProductStatus, TrackedProduct};
    use crate::domain::subscription::ProductLimit;
    use rust_decimal::Decimal;

    async fn setup() -> (InMemoryStore, UserId, GetDashboardOverviewHandler) {
        let store = InMemoryStore::new();
        let account = NewAccount::new("Ada Lovelace", "ada@example.com", "$2b$12$hash", false).unwrap();
        let user_id = store
            .create_account(&account, Timestamp::now().plus_days(-10))
            .await
            .unwrap()
            .user
            .id;
        let handler = GetDashboardOverviewHandler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        (store, user_id, handler)
    }

    #[tokio::test]
    async fn aggregates_products_and_greeting() {
        let (store, user_id, handler) = setup().await;
        let now = Timestamp::now();
        let product = TrackedProduct::create(
            user_id,
            NewProduct::new("https://www.amazon.com/dp/1", None, None, false).unwrap(),
            now,
        );
        store.insert_within_limit(&product, ProductLimit::Unlimited).await.unwrap();
        store
            .record_price_check(&product.id, Decimal::new(100, 0), ProductStatus::OutOfStock, now)
            .await;
        store
            .record_price_check(&product.id, Decimal::new(75, 0), ProductStatus::InStock, now)
            .await;

        let overview = handler.handle(GetDashboardOverviewQuery { user_id }).await.unwrap();
        assert_eq!(overview.display_name, "Ada Lovelace");
        assert_eq!(overview.initials, "AL");
        assert_eq!(overview.member_for_days, 10);
        assert_eq!(overview.stats.total_products, 1);
        assert_eq!(overview.stats.restocks_found, 1);
        assert_eq!(overview.stats.total_savings_potential, Decimal::new(25, 0));
    }

    #[tokio::test]
    async fn counts_consecutive_login_days() {
        let (store, user_id, handler) = setup().await;
        let now = Timestamp::now();
        for days_ago in [0, 1, 2, 4] {
            let mut entry = ActivityEntry::for_user(user_id, ActivityType::Login);
            entry.occurred_at = now.plus_days(-days_ago);
            store.record(&entry).await.unwrap();
        }

        let overview = handler.handle(GetDashboardOverviewQuery { user_id }).await.unwrap();
        assert_eq!(overview.login_streak, 3);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (_, _, handler) = setup().await;
        let err = handler
            .handle(GetDashboardOverviewQuery {
                user_id: UserId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
