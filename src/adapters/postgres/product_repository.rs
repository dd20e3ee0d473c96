//! PostgreSQL implementation of ProductRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{db_error, lock_active_user, parse_column, violated_constraint};
use crate::domain::foundation::{DomainError, ErrorCode, ProductId, Timestamp, UserId};
use crate::domain::product::{ProductSummary, TrackedProduct};
use crate::domain::subscription::ProductLimit;
use crate::ports::ProductRepository;

const ACTIVE_URL_INDEX: &str = "user_products_active_url_key";

/// PostgreSQL implementation of the ProductRepository port.
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    user_id: Uuid,
    product_url: String,
    store_name: String,
    product_title: String,
    current_price: Option<Decimal>,
    min_price_alert: Option<Decimal>,
    max_price_alert: Option<Decimal>,
    discord_webhook_url: Option<String>,
    sms_enabled: bool,
    status: String,
    alerts_sent: i32,
    last_checked_at: Option<DateTime<Utc>>,
    last_price_change: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for TrackedProduct {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(TrackedProduct {
            id: ProductId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            product_url: row.product_url,
            store_name: row.store_name,
            product_title: row.product_title,
            current_price: row.current_price,
            min_price_alert: row.min_price_alert,
            max_price_alert: row.max_price_alert,
            discord_webhook_url: row.discord_webhook_url,
            sms_enabled: row.sms_enabled,
            status: parse_column("status", &row.status)?,
            alerts_sent: row.alerts_sent,
            last_checked_at: row.last_checked_at.map(Timestamp::from_datetime),
            last_price_change: row.last_price_change.map(Timestamp::from_datetime),
            is_active: row.is_active,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Row of the `user_product_summary` view.
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    product: ProductRow,
    price_history_count: i64,
    highest_price: Option<Decimal>,
}

impl TryFrom<SummaryRow> for ProductSummary {
    type Error = DomainError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(ProductSummary {
            product: TrackedProduct::try_from(row.product)?,
            price_history_count: row.price_history_count,
            highest_price: row.highest_price,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, user_id, product_url, store_name, product_title, \
     current_price, min_price_alert, max_price_alert, discord_webhook_url, sms_enabled, \
     status, alerts_sent, last_checked_at, last_price_change, is_active, created_at, updated_at";

fn product_not_found() -> DomainError {
    DomainError::new(ErrorCode::ProductNotFound, "Product not found")
}

fn duplicate_product() -> DomainError {
    DomainError::new(
        ErrorCode::DuplicateProduct,
        "You are already tracking this product",
    )
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn list_active(&self, user_id: &UserId) -> Result<Vec<ProductSummary>, DomainError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}, price_history_count, highest_price
            FROM user_product_summary
            WHERE user_id = $1 AND is_active
            ORDER BY created_at DESC
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load products"))?;

        rows.into_iter().map(ProductSummary::try_from).collect()
    }

    async fn count_active(&self, user_id: &UserId) -> Result<u32, DomainError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_products WHERE user_id = $1 AND is_active")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count products"))?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn find_active_by_url(
        &self,
        user_id: &UserId,
        product_url: &str,
    ) -> Result<Option<TrackedProduct>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_products WHERE user_id = $1 AND product_url = $2 AND is_active",
            PRODUCT_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(product_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find product"))?;

        row.map(TrackedProduct::try_from).transpose()
    }

    async fn insert_within_limit(
        &self,
        product: &TrackedProduct,
        limit: ProductLimit,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        lock_active_user(&mut tx, &product.user_id).await?;

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_products WHERE user_id = $1 AND is_active")
                .bind(product.user_id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to count products"))?;
        let current = u32::try_from(count).unwrap_or(u32::MAX);
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

        sqlx::query(
            r#"
            INSERT INTO user_products (
                id, user_id, product_url, store_name, product_title, discord_webhook_url,
                sms_enabled, status, alerts_sent, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, TRUE, $9, $9)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.user_id.as_uuid())
        .bind(&product.product_url)
        .bind(&product.store_name)
        .bind(&product.product_title)
        .bind(&product.discord_webhook_url)
        .bind(product.sms_enabled)
        .bind(product.status.as_str())
        .bind(product.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(ACTIVE_URL_INDEX) {
                return duplicate_product();
            }
            DomainError::database("Failed to add product", e)
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit product"))
    }

    async fn find_owned(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<TrackedProduct>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_products WHERE id = $1 AND user_id = $2 AND is_active",
            PRODUCT_COLUMNS
        ))
        .bind(product_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find product"))?;

        row.map(TrackedProduct::try_from).transpose()
    }

    async fn update_alerts(&self, product: &TrackedProduct) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE user_products SET
                min_price_alert = $3,
                max_price_alert = $4,
                discord_webhook_url = $5,
                sms_enabled = $6,
                updated_at = $7
            WHERE id = $1 AND user_id = $2 AND is_active
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.user_id.as_uuid())
        .bind(product.min_price_alert)
        .bind(product.max_price_alert)
        .bind(&product.discord_webhook_url)
        .bind(product.sms_enabled)
        .bind(product.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update product"))?;

        if result.rows_affected() == 0 {
            return Err(product_not_found());
        }
        Ok(())
    }

    async fn deactivate(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE user_products SET is_active = FALSE, updated_at = $3
            WHERE id = $1 AND user_id = $2 AND is_active
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to delete product"))?;

        if result.rows_affected() == 0 {
            return Err(product_not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductStatus;

    fn row(status: &str) -> ProductRow {
        let now = Utc::now();
        ProductRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_url: "https://www.amazon.com/dp/B0".to_string(),
            store_name: "Amazon".to_string(),
            product_title: "Amazon Product".to_string(),
            current_price: Some(Decimal::new(8999, 2)),
            min_price_alert: None,
            max_price_alert: None,
            discord_webhook_url: None,
            sms_enabled: false,
            status: status.to_string(),
            alerts_sent: 3,
            last_checked_at: Some(now),
            last_price_change: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn product_row_parses_kebab_status() {
        let product = TrackedProduct::try_from(row("out-of-stock")).unwrap();
        assert_eq!(product.status, ProductStatus::OutOfStock);
        assert_eq!(product.alerts_sent, 3);
    }

    #[test]
    fn summary_row_keeps_statistics() {
        let summary = ProductSummary::try_from(SummaryRow {
            product: row("in-stock"),
            price_history_count: 4,
            highest_price: Some(Decimal::new(10999, 2)),
        })
        .unwrap();
        assert_eq!(summary.price_history_count, 4);
        assert_eq!(summary.savings_potential(), Decimal::new(2000, 2));
    }

    #[test]
    fn product_row_with_unknown_status_fails() {
        assert!(TrackedProduct::try_from(row("sold")).is_err());
    }
}
