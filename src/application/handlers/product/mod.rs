//! Product tracking handlers.
//!
//! Commands:
//! - `AddProductHandler` - Start tracking a URL within the plan quota
//! - `UpdateProductHandler` - Change alert thresholds and channels
//! - `DeleteProductHandler` - Soft-delete a tracked product
//!
//! Queries:
//! - `ListProductsHandler` - Active products with price statistics

mod add_product;
mod delete_product;
mod list_products;
mod update_product;

// Commands
pub use add_product::{AddProductCommand, AddProductHandler, AddProductResult};
pub use delete_product::{DeleteProductCommand, DeleteProductHandler, DeleteProductResult};
pub use update_product::{UpdateProductCommand, UpdateProductHandler, UpdateProductResult};

// Queries
pub use list_products::{ListProductsHandler, ListProductsQuery, ListProductsResult, ProductListing};
