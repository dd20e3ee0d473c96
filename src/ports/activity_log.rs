//! Activity log port (append-only audit trail).

use async_trait::async_trait;

use crate::domain::account::ActivityEntry;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Appends one entry.
    async fn record(&self, entry: &ActivityEntry) -> Result<(), DomainError>;

    /// Most recent entries for a user, newest first.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, DomainError>;
}
