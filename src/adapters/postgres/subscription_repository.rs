//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Subscription changes lock the owning user row first; the
//! `user_subscriptions_one_active_per_user` partial index backs the
//! one-active-subscription rule if anything slips past the lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{db_error, lock_active_user, lock_user, parse_column, violated_constraint};
use crate::domain::foundation::{
    AddonId, DomainError, ErrorCode, PlanId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::subscription::{
    AttachedAddon, PlanType, Subscription, SubscriptionAddon, SubscriptionDetails,
    SubscriptionPlan, SubscriptionRequest,
};
use crate::ports::SubscriptionRepository;

const ONE_ACTIVE_INDEX: &str = "user_subscriptions_one_active_per_user";
const ACTIVE_ADDON_INDEX: &str = "user_subscription_addons_active_key";

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    plan_name: String,
    plan_type: String,
    price_per_month: Decimal,
    price_per_product: Option<Decimal>,
    max_products: Option<i32>,
    stripe_price_id: Option<String>,
    is_active: bool,
}

impl TryFrom<PlanRow> for SubscriptionPlan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionPlan {
            id: PlanId::from_uuid(row.id),
            plan_name: row.plan_name,
            plan_type: parse_column("plan_type", &row.plan_type)?,
            price_per_month: row.price_per_month,
            price_per_product: row.price_per_product,
            max_products: row.max_products,
            stripe_price_id: row.stripe_price_id,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AddonRow {
    id: Uuid,
    addon_name: String,
    addon_description: Option<String>,
    price_per_month: Decimal,
    stripe_price_id: Option<String>,
    is_active: bool,
}

impl From<AddonRow> for SubscriptionAddon {
    fn from(row: AddonRow) -> Self {
        SubscriptionAddon {
            id: AddonId::from_uuid(row.id),
            addon_name: row.addon_name,
            addon_description: row.addon_description,
            price_per_month: row.price_per_month,
            stripe_price_id: row.stripe_price_id,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan_id: Uuid,
    status: String,
    custom_product_limit: Option<i32>,
    stripe_customer_id: Option<String>,
    stripe_subscription_id: Option<String>,
    stripe_session_id: Option<String>,
    current_period_start: DateTime<Utc>,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            plan_id: PlanId::from_uuid(row.plan_id),
            status: parse_column("status", &row.status)?,
            custom_product_limit: row.custom_product_limit,
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            stripe_session_id: row.stripe_session_id,
            current_period_start: Timestamp::from_datetime(row.current_period_start),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            cancel_at_period_end: row.cancel_at_period_end,
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Active subscription joined with its plan.
#[derive(Debug, sqlx::FromRow)]
struct DetailsRow {
    #[sqlx(flatten)]
    subscription: SubscriptionRow,
    plan_name: String,
    plan_type: String,
    price_per_month: Decimal,
    price_per_product: Option<Decimal>,
    plan_max_products: Option<i32>,
}

const SUBSCRIPTION_COLUMNS: &str = "s.id, s.user_id, s.plan_id, s.status, s.custom_product_limit, \
     s.stripe_customer_id, s.stripe_subscription_id, s.stripe_session_id, \
     s.current_period_start, s.current_period_end, s.cancel_at_period_end, s.cancelled_at, \
     s.created_at, s.updated_at";

fn subscription_not_found() -> DomainError {
    DomainError::new(ErrorCode::SubscriptionNotFound, "Active subscription not found")
}

async fn insert_subscription(
    conn: &mut PgConnection,
    subscription: &Subscription,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO user_subscriptions (
            id, user_id, plan_id, status, custom_product_limit, stripe_customer_id,
            stripe_subscription_id, stripe_session_id, current_period_start, current_period_end,
            cancel_at_period_end, cancelled_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(subscription.id.as_uuid())
    .bind(subscription.user_id.as_uuid())
    .bind(subscription.plan_id.as_uuid())
    .bind(subscription.status.as_str())
    .bind(subscription.custom_product_limit)
    .bind(&subscription.stripe_customer_id)
    .bind(&subscription.stripe_subscription_id)
    .bind(&subscription.stripe_session_id)
    .bind(subscription.current_period_start.as_datetime())
    .bind(subscription.current_period_end.as_ref().map(Timestamp::as_datetime))
    .bind(subscription.cancel_at_period_end)
    .bind(subscription.cancelled_at.as_ref().map(Timestamp::as_datetime))
    .bind(subscription.created_at.as_datetime())
    .bind(subscription.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| {
        if violated_constraint(&e) == Some(ONE_ACTIVE_INDEX) {
            return DomainError::new(
                ErrorCode::InvalidStateTransition,
                "User already has an active subscription",
            );
        }
        DomainError::database("Failed to create subscription", e)
    })?;
    Ok(())
}

async fn find_plan_id(
    conn: &mut PgConnection,
    plan_type: PlanType,
) -> Result<Option<PlanId>, DomainError> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM subscription_plans WHERE plan_type = $1")
        .bind(plan_type.as_str())
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to look up plan"))?;
    Ok(row.map(|(id,)| PlanId::from_uuid(id)))
}

/// Returns the plan id for a type, inserting the default catalogue row if missing.
async fn ensure_plan(conn: &mut PgConnection, plan_type: PlanType) -> Result<PlanId, DomainError> {
    if let Some(id) = find_plan_id(&mut *conn, plan_type).await? {
        return Ok(id);
    }

    let plan = SubscriptionPlan::default_for(plan_type);
    sqlx::query(
        r#"
        INSERT INTO subscription_plans (
            id, plan_name, plan_type, price_per_month, price_per_product, max_products, is_active
        ) VALUES ($1, $2, $3, $4, $5, $6, TRUE)
        ON CONFLICT (plan_type) DO NOTHING
        "#,
    )
    .bind(plan.id.as_uuid())
    .bind(&plan.plan_name)
    .bind(plan.plan_type.as_str())
    .bind(plan.price_per_month)
    .bind(plan.price_per_product)
    .bind(plan.max_products)
    .execute(&mut *conn)
    .await
    .map_err(db_error("Failed to create plan"))?;

    tracing::info!(plan_type = plan_type.as_str(), "Created missing subscription plan");

    find_plan_id(conn, plan_type)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::PlanNotFound, "Plan could not be created"))
}

/// Cancels the active add-ons of the selected subscriptions.
async fn cancel_addons(
    conn: &mut PgConnection,
    subscription_ids: &[Uuid],
    now: Timestamp,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        UPDATE user_subscription_addons
        SET status = 'cancelled', updated_at = $2
        WHERE subscription_id = ANY($1) AND status = 'active'
        "#,
    )
    .bind(subscription_ids)
    .bind(now.as_datetime())
    .execute(conn)
    .await
    .map_err(db_error("Failed to cancel add-ons"))?;
    Ok(())
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, DomainError> {
        let rows: Vec<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, plan_name, plan_type, price_per_month, price_per_product,
                   max_products, stripe_price_id, is_active
            FROM subscription_plans
            WHERE is_active
            ORDER BY price_per_month ASC, price_per_product ASC NULLS FIRST
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load plans"))?;

        rows.into_iter().map(SubscriptionPlan::try_from).collect()
    }

    async fn list_addons(&self) -> Result<Vec<SubscriptionAddon>, DomainError> {
        let rows: Vec<AddonRow> = sqlx::query_as(
            r#"
            SELECT id, addon_name, addon_description, price_per_month, stripe_price_id, is_active
            FROM subscription_addons
            WHERE is_active
            ORDER BY addon_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load add-ons"))?;

        Ok(rows.into_iter().map(SubscriptionAddon::from).collect())
    }

    async fn find_plan_by_type(
        &self,
        plan_type: PlanType,
    ) -> Result<Option<SubscriptionPlan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, plan_name, plan_type, price_per_month, price_per_product,
                   max_products, stripe_price_id, is_active
            FROM subscription_plans
            WHERE plan_type = $1
            "#,
        )
        .bind(plan_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find plan"))?;

        row.map(SubscriptionPlan::try_from).transpose()
    }

    async fn find_active(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriptionDetails>, DomainError> {
        let row: Option<DetailsRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}, p.plan_name, p.plan_type, p.price_per_month, p.price_per_product,
                   p.max_products AS plan_max_products
            FROM user_subscriptions s
            JOIN subscription_plans p ON p.id = s.plan_id
            WHERE s.user_id = $1 AND s.status = 'active'
            ORDER BY s.created_at DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load subscription"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let addons: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT a.addon_name
            FROM user_subscription_addons usa
            JOIN subscription_addons a ON a.id = usa.addon_id
            WHERE usa.subscription_id = $1 AND usa.status = 'active'
            ORDER BY a.addon_name
            "#,
        )
        .bind(row.subscription.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load subscription add-ons"))?;

        Ok(Some(SubscriptionDetails {
            plan_type: parse_column("plan_type", &row.plan_type)?,
            subscription: Subscription::try_from(row.subscription)?,
            plan_name: row.plan_name,
            price_per_month: row.price_per_month,
            price_per_product: row.price_per_product,
            plan_max_products: row.plan_max_products,
            addons: addons.into_iter().map(|(name,)| name).collect(),
        }))
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_subscriptions s WHERE s.id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find subscription"))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn replace_active(
        &self,
        user_id: &UserId,
        request: &SubscriptionRequest,
        now: Timestamp,
    ) -> Result<Subscription, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        lock_active_user(&mut tx, user_id).await?;
        let plan_id = ensure_plan(&mut tx, request.plan_type).await?;

        let replaced: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE user_subscriptions
            SET status = 'cancelled', cancelled_at = $2, updated_at = $2
            WHERE user_id = $1 AND status = 'active'
            RETURNING id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now.as_datetime())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to cancel previous subscription"))?;

        let replaced: Vec<Uuid> = replaced.into_iter().map(|(id,)| id).collect();
        cancel_addons(&mut tx, &replaced, now).await?;

        let subscription = Subscription::start(*user_id, plan_id, request, now);
        insert_subscription(&mut tx, &subscription).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit subscription"))?;

        Ok(subscription)
    }

    async fn attach_addon(
        &self,
        subscription_id: &SubscriptionId,
        addon_name: &str,
        stripe_subscription_item_id: Option<&str>,
        now: Timestamp,
    ) -> Result<AttachedAddon, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let active: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM user_subscriptions WHERE id = $1 AND status = 'active' FOR UPDATE",
        )
        .bind(subscription_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock subscription"))?;
        if active.is_none() {
            return Err(subscription_not_found());
        }

        let addon: AddonRow = sqlx::query_as(
            r#"
            SELECT id, addon_name, addon_description, price_per_month, stripe_price_id, is_active
            FROM subscription_addons
            WHERE is_active AND LOWER(addon_name) = LOWER($1)
            "#,
        )
        .bind(addon_name.trim())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to find add-on"))?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::AddonNotFound,
                format!("Add-on not found: {}", addon_name.trim()),
            )
        })?;

        let duplicate = || {
            DomainError::new(
                ErrorCode::DuplicateAddon,
                "Add-on is already active on this subscription",
            )
        };

        let (already_active,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_subscription_addons
                WHERE subscription_id = $1 AND addon_id = $2 AND status = 'active'
            )
            "#,
        )
        .bind(subscription_id.as_uuid())
        .bind(addon.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to check add-on"))?;
        if already_active {
            return Err(duplicate());
        }

        let attached = AttachedAddon::attach(
            *subscription_id,
            AddonId::from_uuid(addon.id),
            addon.addon_name,
            stripe_subscription_item_id,
            now,
        );
        sqlx::query(
            r#"
            INSERT INTO user_subscription_addons (
                id, subscription_id, addon_id, stripe_subscription_item_id, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(attached.id.as_uuid())
        .bind(attached.subscription_id.as_uuid())
        .bind(attached.addon_id.as_uuid())
        .bind(&attached.stripe_subscription_item_id)
        .bind(attached.status.as_str())
        .bind(attached.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(ACTIVE_ADDON_INDEX) {
                return duplicate();
            }
            DomainError::database("Failed to attach add-on", e)
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit add-on"))?;

        Ok(attached)
    }

    async fn cancel_immediately(
        &self,
        user_id: &UserId,
        subscription_id: &SubscriptionId,
        now: Timestamp,
    ) -> Result<Option<SubscriptionId>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        lock_user(&mut tx, user_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE user_subscriptions
            SET status = 'cancelled', cancelled_at = $3, updated_at = $3
            WHERE id = $1 AND user_id = $2 AND status = 'active'
            "#,
        )
        .bind(subscription_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(now.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to cancel subscription"))?;
        if result.rows_affected() == 0 {
            return Err(subscription_not_found());
        }

        cancel_addons(&mut tx, &[*subscription_id.as_uuid()], now).await?;

        let fallback = match find_plan_id(&mut tx, PlanType::Free).await? {
            Some(free_plan_id) => {
                let free = Subscription::free(*user_id, free_plan_id, now);
                insert_subscription(&mut tx, &free).await?;
                Some(free.id)
            }
            None => None,
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit cancellation"))?;

        Ok(fallback)
    }

    async fn save_cancellation_flag(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE user_subscriptions
            SET cancel_at_period_end = $2, updated_at = $3
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update subscription"))?;

        if result.rows_affected() == 0 {
            return Err(subscription_not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::SubscriptionStatus;

    fn subscription_row(status: &str) -> SubscriptionRow {
        let now = Utc::now();
        SubscriptionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            status: status.to_string(),
            custom_product_limit: Some(7),
            stripe_customer_id: Some("cus_1".to_string()),
            stripe_subscription_id: None,
            stripe_session_id: None,
            current_period_start: now,
            current_period_end: None,
            cancel_at_period_end: false,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn subscription_row_converts() {
        let sub = Subscription::try_from(subscription_row("past_due")).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PastDue);
        assert_eq!(sub.custom_product_limit, Some(7));
        assert!(sub.current_period_end.is_none());
    }

    #[test]
    fn subscription_row_with_unknown_status_fails() {
        let err = Subscription::try_from(subscription_row("paused")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn plan_row_converts() {
        let plan = SubscriptionPlan::try_from(PlanRow {
            id: Uuid::new_v4(),
            plan_name: "Unlimited".to_string(),
            plan_type: "unlimited".to_string(),
            price_per_month: Decimal::new(14500, 2),
            price_per_product: None,
            max_products: None,
            stripe_price_id: None,
            is_active: true,
        })
        .unwrap();
        assert_eq!(plan.plan_type, PlanType::Unlimited);
        assert_eq!(plan.max_products, None);
    }
}
