//! Read models built from tracked products and their price history.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{ProductStatus, TrackedProduct};

/// Number of products shown in the dashboard's recent activity list.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// A tracked product joined with price-history statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: TrackedProduct,
    pub price_history_count: i64,
    /// Highest price ever observed, if any observation exists.
    pub highest_price: Option<Decimal>,
}

impl ProductSummary {
    /// Max observed price minus current price, floored at zero.
    pub fn savings_potential(&self) -> Decimal {
        savings_potential(self.highest_price, self.product.current_price)
    }
}

/// Max observed price minus current price, floored at zero.
///
/// Missing either price yields zero.
pub fn savings_potential(max_observed: Option<Decimal>, current: Option<Decimal>) -> Decimal {
    match (max_observed, current) {
        (Some(max), Some(current)) if max > current => max - current,
        _ => Decimal::ZERO,
    }
}

/// Headline numbers for a user's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub alerts_sent: i64,
    pub restocks_found: usize,
    pub total_savings_potential: Decimal,
    pub recent_products: Vec<ProductSummary>,
}

impl DashboardStats {
    /// Aggregates a user's active products.
    ///
    /// `products` may be in any order; the recent list is newest first.
    pub fn from_products(products: &[ProductSummary]) -> Self {
        let mut recent: Vec<ProductSummary> = products.to_vec();
        recent.sort_by(|a, b| b.product.created_at.cmp(&a.product.created_at));
        recent.truncate(RECENT_ACTIVITY_LIMIT);

        Self {
            total_products: products.len(),
            alerts_sent: products.iter().map(|p| i64::from(p.product.alerts_sent)).sum(),
            restocks_found: products
                .iter()
                .filter(|p| p.product.status == ProductStatus::InStock)
                .count(),
            total_savings_potential: products.iter().map(ProductSummary::savings_potential).sum(),
            recent_products: recent,
        }
    }
}
