//! Tracked product repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProductId, Timestamp, UserId};
use crate::domain::product::{ProductSummary, TrackedProduct};
use crate::domain::subscription::ProductLimit;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Active products with price-history statistics, newest first.
    async fn list_active(&self, user_id: &UserId) -> Result<Vec<ProductSummary>, DomainError>;

    async fn count_active(&self, user_id: &UserId) -> Result<u32, DomainError>;

    /// Active product with this exact URL, if the user already tracks it.
    async fn find_active_by_url(
        &self,
        user_id: &UserId,
        product_url: &str,
    ) -> Result<Option<TrackedProduct>, DomainError>;

    /// Inserts a product if the user is still under `limit`.
    ///
    /// Locks the user row, recounts active products, and inserts in one
    /// transaction so concurrent adds cannot overshoot the quota.
    ///
    /// # Errors
    ///
    /// - `ProductLimitReached` if the recount is at or over the limit
    /// - `DuplicateProduct` if the URL is already tracked (including a lost
    ///   race on the unique index)
    async fn insert_within_limit(
        &self,
        product: &TrackedProduct,
        limit: ProductLimit,
    ) -> Result<(), DomainError>;

    /// Active product owned by the user.
    async fn find_owned(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<TrackedProduct>, DomainError>;

    /// Persists alert thresholds, webhook and SMS flag.
    ///
    /// # Errors
    ///
    /// - `ProductNotFound` if the product is missing, foreign, or inactive
    async fn update_alerts(&self, product: &TrackedProduct) -> Result<(), DomainError>;

    /// Soft delete.
    ///
    /// # Errors
    ///
    /// - `ProductNotFound` if the product is missing, foreign, or already inactive
    async fn deactivate(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        now: Timestamp,
    ) -> Result<(), DomainError>;
}
