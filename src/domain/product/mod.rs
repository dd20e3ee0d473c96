//! Product domain - tracked products, retailer detection and dashboard read models.

mod status;
mod store;
mod summary;
mod tracked;

pub use status::ProductStatus;
pub use store::{default_title, extract_store_name, OTHER_STORE};
pub use summary::{savings_potential, DashboardStats, ProductSummary, RECENT_ACTIVITY_LIMIT};
pub use tracked::{
    validate_product_url, NewProduct, ProductChanges, ProductPatch, TrackedProduct,
    MAX_TITLE_LENGTH, MAX_URL_LENGTH,
};
