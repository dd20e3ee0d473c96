//! Payment history port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::Payment;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn record(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Newest first.
    async fn list_for_user(&self, user_id: &UserId, limit: usize)
        -> Result<Vec<Payment>, DomainError>;
}
