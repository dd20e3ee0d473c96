//! Pure presentation helpers shared by the web tier.
//!
//! Store extraction, savings, email and password checks live with their
//! domains and are re-exported here so callers have one import path.

use chrono::NaiveDate;

pub use crate::domain::account::{is_valid_email, password_strength};
pub use crate::domain::product::{extract_store_name, savings_potential};
pub use crate::domain::settings::format_currency;

use crate::domain::foundation::Timestamp;

/// Name to greet a user by.
///
/// Falls back to the email's local part when the full name is blank.
pub fn display_name(full_name: Option<&str>, email: &str) -> String {
    match full_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or("").trim().to_string(),
    }
}

/// Up to two uppercase initials, e.g. "Ada Lovelace" -> "AL".
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let picked: Vec<&str> = match words.as_slice() {
        [] => vec![],
        [only] => vec![*only],
        [first, .., last] => vec![*first, *last],
    };
    picked
        .iter()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Whole days elapsed between two instants, never negative.
pub fn days_since(then: Timestamp, now: Timestamp) -> i64 {
    now.duration_since(&then).num_days().max(0)
}

/// Consecutive days with activity, ending today or yesterday.
///
/// Duplicate and unordered dates are tolerated.
pub fn login_streak(activity_days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = activity_days.iter().copied().filter(|d| *d <= today).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let Some(&latest) = days.first() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
