//! Best-effort activity logging shared by the handlers.

use crate::domain::account::ActivityEntry;
use crate::ports::ActivityLog;

/// Appends an audit entry.
///
/// The audited write has already committed when this runs, so a logging
/// failure is reported through tracing and otherwise ignored.
pub(crate) async fn audit(log: &dyn ActivityLog, entry: ActivityEntry) {
    if let Err(e) = log.record(&entry).await {
        tracing::warn!(
            activity_type = entry.activity_type.as_str(),
            error = %e,
            "Failed to write activity log entry"
        );
    }
}
