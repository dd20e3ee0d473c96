//! AddProductHandler - Command handler for tracking a new product URL.
//!
//! The quota is checked up front for a friendly error and again inside the
//! repository insert, which holds the user's row lock while it counts.

use std::sync::Arc;

use crate::application::audit::audit;
use crate::application::quota::QuotaResolver;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::product::{NewProduct, TrackedProduct};
use crate::ports::{ActivityLog, ProductRepository};

#[derive(Debug, Clone)]
pub struct AddProductCommand {
    pub user_id: UserId,
    pub product_url: String,
    /// Defaults to "<store> Product" when blank.
    pub product_title: Option<String>,
    pub discord_webhook_url: Option<String>,
    pub sms_enabled: bool,
}

impl AddProductCommand {
    /// URL and optional title only; no alert channels.
    pub fn basic(user_id: UserId, product_url: impl Into<String>, product_title: Option<String>) -> Self {
        Self {
            user_id,
            product_url: product_url.into(),
            product_title,
            discord_webhook_url: None,
            sms_enabled: false,
        }
    }
}

pub type AddProductResult = TrackedProduct;

pub struct AddProductHandler {
    products: Arc<dyn ProductRepository>,
    activity: Arc<dyn ActivityLog>,
    quota: Arc<QuotaResolver>,
}

impl AddProductHandler {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        activity: Arc<dyn ActivityLog>,
        quota: Arc<QuotaResolver>,
    ) -> Self {
        Self {
            products,
            activity,
            quota,
        }
    }

    pub async fn handle(&self, cmd: AddProductCommand) -> Result<AddProductResult, DomainError> {
        // 1. Validate URL, title and webhook
        let new = NewProduct::new(
            &cmd.product_url,
            cmd.product_title.as_deref(),
            cmd.discord_webhook_url.as_deref(),
            cmd.sms_enabled,
        )?;

        // 2. Check the quota
        let quota = self.quota.resolve(&cmd.user_id).await?;
        if !quota.allowed {
            return Err(DomainError::new(
                ErrorCode::ProductLimitReached,
                format!(
                    "Product limit reached ({} of {}). Please upgrade your plan.",
                    quota.current_count,
                    quota.max_products()
                ),
            ));
        }

        // 3. Refuse a URL that is already tracked
        if self
            .products
            .find_active_by_url(&cmd.user_id, &new.product_url)
            .await?
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateProduct,
                "You are already tracking this product",
            ));
        }

        // 4. Insert, re-checking the limit under the user lock
        let product = TrackedProduct::create(cmd.user_id, new, Timestamp::now());
        self.products.insert_within_limit(&product, quota.limit).await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::ProductAdded)
                .with_description(format!("Tracking {}", product.product_title)),
        )
        .await;
        tracing::debug!(user_id = %cmd.user_id, store = %product.store_name, "Product added");

        Ok(product)
    }
}
