//! Account domain - users, credentials, activity log and password resets.

mod activity;
mod email;
mod password;
mod reset_token;
mod user;

pub use activity::{ActivityEntry, ActivityType};
pub use email::{is_valid_email, Email};
pub use password::{password_strength, MAX_STRENGTH};
pub use reset_token::{hash_reset_token, IssuedResetToken, ResetTokenRecord};
pub use user::{Credentials, NewAccount, PasswordHash, User};
