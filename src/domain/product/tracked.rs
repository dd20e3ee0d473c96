//! Tracked product entity and its create/update inputs.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{default_title, extract_store_name, ProductStatus};
use crate::domain::foundation::{
    DomainError, FieldUpdate, ProductId, Timestamp, UserId, ValidationError,
};
use crate::domain::settings::validate_discord_webhook;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_TITLE_LENGTH: usize = 500;

/// A product a user is watching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedProduct {
    pub id: ProductId,
    pub user_id: UserId,
    pub product_url: String,
    pub store_name: String,
    pub product_title: String,
    pub current_price: Option<Decimal>,
    pub min_price_alert: Option<Decimal>,
    pub max_price_alert: Option<Decimal>,
    pub discord_webhook_url: Option<String>,
    pub sms_enabled: bool,
    pub status: ProductStatus,
    pub alerts_sent: i32,
    pub last_checked_at: Option<Timestamp>,
    pub last_price_change: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TrackedProduct {
    /// Builds the row for a freshly added product.
    pub fn create(user_id: UserId, new: NewProduct, now: Timestamp) -> Self {
        Self {
            id: ProductId::new(),
            user_id,
            product_url: new.product_url,
            store_name: new.store_name,
            product_title: new.product_title,
            current_price: None,
            min_price_alert: None,
            max_price_alert: None,
            discord_webhook_url: new.discord_webhook_url,
            sms_enabled: new.sms_enabled,
            status: ProductStatus::Checking,
            alerts_sent: 0,
            last_checked_at: None,
            last_price_change: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a validated alert update.
    pub fn apply(&mut self, patch: ProductPatch, now: Timestamp) {
        if let Some(min) = patch.min_price_alert {
            self.min_price_alert = Some(min);
        }
        if let Some(max) = patch.max_price_alert {
            self.max_price_alert = Some(max);
        }
        self.discord_webhook_url = patch.discord_webhook_url.apply(self.discord_webhook_url.take());
        if let Some(sms) = patch.sms_enabled {
            self.sms_enabled = sms;
        }
        self.updated_at = now;
    }

    /// Soft delete.
    pub fn deactivate(&mut self, now: Timestamp) {
        self.is_active = false;
        self.updated_at = now;
    }
}

/// Validated input for adding a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub product_url: String,
    pub store_name: String,
    pub product_title: String,
    pub discord_webhook_url: Option<String>,
    pub sms_enabled: bool,
}

impl NewProduct {
    /// Validates the URL and optional webhook; derives store and title.
    pub fn new(
        url: &str,
        title: Option<&str>,
        discord_webhook_url: Option<&str>,
        sms_enabled: bool,
    ) -> Result<Self, ValidationError> {
        let product_url = validate_product_url(url)?;
        let store_name = extract_store_name(&product_url).to_string();

        let product_title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) if t.chars().count() > MAX_TITLE_LENGTH => {
                return Err(ValidationError::out_of_range(
                    "product_title",
                    1,
                    MAX_TITLE_LENGTH as i64,
                    t.chars().count() as i64,
                ));
            }
            Some(t) => t.to_string(),
            None => default_title(&store_name),
        };

        let discord_webhook_url = match discord_webhook_url.map(str::trim) {
            Some(w) if !w.is_empty() => Some(validate_discord_webhook(w)?),
            _ => None,
        };

        Ok(Self {
            product_url,
            store_name,
            product_title,
            discord_webhook_url,
            sms_enabled,
        })
    }
}

/// Checks that a product URL is present and uses http(s).
pub fn validate_product_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::empty_field("product_url"));
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::out_of_range(
            "product_url",
            1,
            MAX_URL_LENGTH as i64,
            url.len() as i64,
        ));
    }
    let lowered = url.to_lowercase();
    let rest = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"));
    match rest {
        Some(r) if !r.is_empty() && !r.starts_with('/') && !r.contains(char::is_whitespace) => {
            Ok(url.to_string())
        }
        _ => Err(ValidationError::invalid_format(
            "product_url",
            "Please enter a valid product URL",
        )),
    }
}

/// Raw alert update as received from a caller.
///
/// `None` leaves a field unchanged; an empty webhook string clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub min_price_alert: Option<Decimal>,
    pub max_price_alert: Option<Decimal>,
    pub discord_webhook_url: Option<String>,
    pub sms_enabled: Option<bool>,
}

/// Validated alert update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub min_price_alert: Option<Decimal>,
    pub max_price_alert: Option<Decimal>,
    pub discord_webhook_url: FieldUpdate<String>,
    pub sms_enabled: Option<bool>,
}

impl ProductChanges {
    pub fn validate(self) -> Result<ProductPatch, DomainError> {
        for (field, value) in [
            ("min_price_alert", self.min_price_alert),
            ("max_price_alert", self.max_price_alert),
        ] {
            if matches!(value, Some(v) if v < Decimal::ZERO) {
                return Err(DomainError::validation(field, "Alert prices cannot be negative"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price_alert, self.max_price_alert) {
            if min >= max {
                return Err(DomainError::validation(
                    "min_price_alert",
                    "Minimum price must be less than maximum price",
                ));
            }
        }

        let discord_webhook_url = FieldUpdate::from_nullable(self.discord_webhook_url.as_deref())
            .try_map(|url| validate_discord_webhook(&url))?;

        Ok(ProductPatch {
            min_price_alert: self.min_price_alert.map(|v| v.round_dp(2)),
            max_price_alert: self.max_price_alert.map(|v| v.round_dp(2)),
            discord_webhook_url,
            sms_enabled: self.sms_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEBHOOK: &str = "https://discord.com/api/webhooks/123/abc";

    fn product() -> TrackedProduct {
        let new = NewProduct::new("https://www.amazon.com/dp/B1", None, Some(WEBHOOK), false).unwrap();
        TrackedProduct::create(UserId::new(), new, Timestamp::now())
    }

    #[test]
    fn new_product_derives_store_and_title() {
        let new = NewProduct::new(" https://www.bestbuy.com/site/1 ", None, None, true).unwrap();
        assert_eq!(new.product_url, "https://www.bestbuy.com/site/1");
        assert_eq!(new.store_name, "Best Buy");
        assert_eq!(new.product_title, "Best Buy Product");
        assert!(new.sms_enabled);
    }

    #[test]
    fn new_product_keeps_supplied_title() {
        let new = NewProduct::new("https://shop.test/x", Some(" GPU "), None, false).unwrap();
        assert_eq!(new.product_title, "GPU");
        assert_eq!(new.store_name, "Other");
    }

    #[test]
    fn new_product_rejects_missing_or_bad_url() {
        assert_eq!(
            NewProduct::new("  ", None, None, false).unwrap_err(),
            ValidationError::empty_field("product_url")
        );
        assert!(NewProduct::new("ftp://x.com/a", None, None, false).is_err());
        assert!(NewProduct::new("https://", None, None, false).is_err());
        assert!(NewProduct::new("not a url", None, None, false).is_err());
    }

    #[test]
    fn new_product_validates_webhook() {
        assert!(NewProduct::new("https://a.com/x", None, Some("https://evil.test/hook"), false).is_err());
        let new = NewProduct::new("https://a.com/x", None, Some("  "), false).unwrap();
        assert_eq!(new.discord_webhook_url, None);
    }

    #[test]
    fn created_product_starts_checking_and_active() {
        let p = product();
        assert_eq!(p.status, ProductStatus::Checking);
        assert!(p.is_active);
        assert_eq!(p.alerts_sent, 0);
    }

    #[test]
    fn inverted_alert_range_is_rejected() {
        let changes = ProductChanges {
            min_price_alert: Some(Decimal::new(10, 0)),
            max_price_alert: Some(Decimal::new(5, 0)),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn equal_alert_bounds_are_rejected() {
        let changes = ProductChanges {
            min_price_alert: Some(Decimal::new(5, 0)),
            max_price_alert: Some(Decimal::new(5, 0)),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn negative_alert_is_rejected() {
        let changes = ProductChanges {
            max_price_alert: Some(Decimal::new(-1, 0)),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn empty_webhook_clears_and_null_preserves() {
        let mut p = product();
        let keep = ProductChanges {
            min_price_alert: Some(Decimal::new(20, 0)),
            ..Default::default()
        }
        .validate()
        .unwrap();
        p.apply(keep, Timestamp::now());
        assert_eq!(p.discord_webhook_url.as_deref(), Some(WEBHOOK));
        assert_eq!(p.min_price_alert, Some(Decimal::new(20, 0)));

        let clear = ProductChanges {
            discord_webhook_url: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        p.apply(clear, Timestamp::now());
        assert_eq!(p.discord_webhook_url, None);
        assert_eq!(p.min_price_alert, Some(Decimal::new(20, 0)));
    }

    #[test]
    fn deactivate_soft_deletes() {
        let mut p = product();
        p.deactivate(Timestamp::now());
        assert!(!p.is_active);
    }
}
