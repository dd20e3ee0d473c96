//! RecordPaymentHandler - Command handler appending to payment history.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::audit::audit;
use crate::domain::account::{ActivityEntry, ActivityType};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::Payment;
use crate::ports::{AccountRepository, ActivityLog, PaymentRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct RecordPaymentCommand {
    pub user_id: UserId,
    pub subscription_id: Option<SubscriptionId>,
    pub stripe_payment_intent_id: Option<String>,
    pub amount: Decimal,
    /// ISO code, e.g. "USD".
    pub currency: String,
    /// One of succeeded, pending, failed, refunded.
    pub status: String,
    pub description: Option<String>,
}

pub type RecordPaymentResult = Payment;

pub struct RecordPaymentHandler {
    accounts: Arc<dyn AccountRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl RecordPaymentHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            accounts,
            subscriptions,
            payments,
            activity,
        }
    }

    pub async fn handle(&self, cmd: RecordPaymentCommand) -> Result<RecordPaymentResult, DomainError> {
        let payment = Payment::record(
            cmd.user_id,
            cmd.subscription_id,
            cmd.stripe_payment_intent_id.as_deref(),
            cmd.amount,
            &cmd.currency,
            &cmd.status,
            cmd.description.as_deref(),
            Timestamp::now(),
        )?;

        if self.accounts.find_by_id(&cmd.user_id).await?.is_none() {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        if let Some(subscription_id) = &cmd.subscription_id {
            let owned = self
                .subscriptions
                .find_by_id(subscription_id)
                .await?
                .is_some_and(|s| s.user_id == cmd.user_id);
            if !owned {
                return Err(DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    "Subscription not found for this user",
                ));
            }
        }

        self.payments.record(&payment).await?;

        audit(
            self.activity.as_ref(),
            ActivityEntry::for_user(cmd.user_id, ActivityType::PaymentRecorded).with_description(
                format!("{} payment {}", payment.status.as_str(), payment.currency.format(payment.amount)),
            ),
        )
        .await;

        Ok(payment)
    }
}
