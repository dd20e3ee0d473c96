//! ListPaymentsHandler - Query handler for a user's payment history.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::Payment;
use crate::ports::PaymentRepository;

/// Rows returned when the caller gives no limit.
pub const DEFAULT_PAYMENT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct ListPaymentsQuery {
    pub user_id: UserId,
    pub limit: Option<usize>,
}

/// Newest first.
pub type ListPaymentsResult = Vec<Payment>;

pub struct ListPaymentsHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ListPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<ListPaymentsResult, DomainError> {
        let limit = query.limit.unwrap_or(DEFAULT_PAYMENT_HISTORY_LIMIT).max(1);
        self.payments.list_for_user(&query.user_id, limit).await
    }
}
