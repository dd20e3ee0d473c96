//! Account handlers.
//!
//! Commands:
//! - `CreateAccountHandler` - Register a user with default settings and free plan
//! - `RecordLoginHandler` - Stamp a successful login
//! - `RecordActivityHandler` - Append a caller-supplied audit entry
//! - `RequestPasswordResetHandler` - Issue a reset token
//! - `ResetPasswordHandler` - Consume a token and store a new hash
//!
//! Queries:
//! - `VerifyLoginHandler` - Stored hash and flags for an email
//! - `GetUserHandler` - Public user record by id or email
//! - `VerifyResetTokenHandler` - Check a reset token without consuming it

mod create_account;
mod get_user;
mod record_activity;
mod record_login;
mod request_password_reset;
mod reset_password;
mod verify_login;
mod verify_reset_token;

// Commands
pub use create_account::{CreateAccountCommand, CreateAccountHandler, CreateAccountResult};
pub use record_activity::{RecordActivityCommand, RecordActivityHandler, RecordActivityResult};
pub use record_login::{RecordLoginCommand, RecordLoginHandler, RecordLoginResult};
pub use request_password_reset::{
    IssuedToken, RequestPasswordResetCommand, RequestPasswordResetHandler,
    RequestPasswordResetResult,
};
pub use reset_password::{ResetPasswordCommand, ResetPasswordHandler, ResetPasswordResult};

// Queries
pub use get_user::{GetUserHandler, GetUserQuery, GetUserResult};
pub use verify_login::{VerifyLoginHandler, VerifyLoginQuery, VerifyLoginResult};
pub use verify_reset_token::{VerifyResetTokenHandler, VerifyResetTokenQuery, VerifyResetTokenResult};
