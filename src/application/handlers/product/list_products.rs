//! ListProductsHandler - Query handler for a user's tracked products.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::product::ProductSummary;
use crate::ports::ProductRepository;

#[derive(Debug, Clone)]
pub struct ListProductsQuery {
    pub user_id: UserId,
}

/// One active product with its price statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductListing {
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub savings_potential: Decimal,
}

impl From<ProductSummary> for ProductListing {
    fn from(summary: ProductSummary) -> Self {
        let savings_potential = summary.savings_potential();
        Self {
            summary,
            savings_potential,
        }
    }
}

/// Newest first.
pub type ListProductsResult = Vec<ProductListing>;

pub struct ListProductsHandler {
    products: Arc<dyn ProductRepository>,
}

impl ListProductsHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn handle(&self, query: ListProductsQuery) -> Result<ListProductsResult, DomainError> {
        let mut summaries = self.products.list_active(&query.user_id).await?;
        summaries.sort_by(|a, b| b.product.created_at.cmp(&a.product.created_at));
        Ok(summaries.into_iter().map(ProductListing::from).collect())
    }
}
