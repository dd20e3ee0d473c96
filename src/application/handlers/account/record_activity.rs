//! RecordActivityHandler - Command handler for caller-supplied audit entries
//! such as logout.

use std::sync::Arc;

use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{AccountRepository, ActivityLog};

#[derive(Debug, Clone)]
pub struct RecordActivityCommand {
    pub user_id: UserId,
    pub activity_type: String,
    pub description: Option<String>,
}

pub type RecordActivityResult = ActivityEntry;

pub struct RecordActivityHandler {
    accounts: Arc<dyn AccountRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl RecordActivityHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { accounts, activity }
    }

    pub async fn handle(&self, cmd: RecordActivityCommand) -> Result<RecordActivityResult, DomainError> {
        let activity_type: ActivityType = cmd.activity_type.trim().parse()?;

        if self.accounts.find_by_id(&cmd.user_id).await?.is_none() {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }

        let mut entry = ActivityEntry::for_user(cmd.user_id, activity_type);
        if let Some(description) = cmd.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            entry = entry.with_description(description);
        }

        self.activity.record(&entry).await?;
        Ok(entry)
    }
}
