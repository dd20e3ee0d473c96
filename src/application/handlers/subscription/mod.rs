//! Subscription handlers.
//!
//! Commands:
//! - `CreateSubscriptionHandler` - Replace the active plan after checkout
//! - `AddAddonHandler` - Attach a catalogue add-on
//! - `CancelSubscriptionHandler` - Cancel now or at period end
//! - `RecordPaymentHandler` - Append to payment history
//!
//! Queries:
//! - `GetSubscriptionInfoHandler` - Active plan, usage and add-ons
//! - `CheckProductLimitHandler` - Whether another product fits the quota
//! - `ListPlansHandler` - Plan and add-on catalogue
//! - `ListPaymentsHandler` - Payment history

mod add_addon;
mod cancel_subscription;
mod check_product_limit;
mod create_subscription;
mod get_subscription_info;
mod list_payments;
mod list_plans;
mod record_payment;

// Commands
pub use add_addon::{AddAddonCommand, AddAddonHandler, AddAddonResult};
pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use record_payment::{RecordPaymentCommand, RecordPaymentHandler, RecordPaymentResult};

// Queries
pub use check_product_limit::{
    CheckProductLimitHandler, CheckProductLimitQuery, CheckProductLimitResult,
};
pub use get_subscription_info::{
    GetSubscriptionInfoHandler, GetSubscriptionInfoQuery, SubscriptionInfo,
};
pub use list_payments::{
    ListPaymentsHandler, ListPaymentsQuery, ListPaymentsResult, DEFAULT_PAYMENT_HISTORY_LIMIT,
};
pub use list_plans::{ListPlansHandler, ListPlansResult};
