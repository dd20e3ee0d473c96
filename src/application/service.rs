//! `StockWatch` facade.
//!
//! Wires every handler to one set of ports and wraps each result in an
//! [`OperationResponse`]. This is the surface the web tier calls.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::handlers::account::{
    CreateAccountCommand, CreateAccountHandler, CreateAccountResult, GetUserHandler, GetUserQuery,
    RecordActivityCommand, RecordActivityHandler, RecordActivityResult, RecordLoginCommand,
    RecordLoginHandler, RecordLoginResult, RequestPasswordResetCommand,
    RequestPasswordResetHandler, RequestPasswordResetResult, ResetPasswordCommand,
    ResetPasswordHandler, ResetPasswordResult, VerifyLoginHandler, VerifyLoginQuery,
    VerifyLoginResult, VerifyResetTokenHandler, VerifyResetTokenQuery, VerifyResetTokenResult,
};
use super::handlers::dashboard::{
    DashboardOverview, GetDashboardOverviewHandler, GetDashboardOverviewQuery,
};
use super::handlers::product::{
    AddProductCommand, AddProductHandler, DeleteProductCommand, DeleteProductHandler,
    DeleteProductResult, ListProductsHandler, ListProductsQuery, ListProductsResult,
    UpdateProductCommand, UpdateProductHandler,
};
use super::handlers::settings::{
    GetSettingsHandler, GetSettingsQuery, UpdateSettingsCommand, UpdateSettingsHandler,
};
use super::handlers::subscription::{
    AddAddonCommand, AddAddonHandler, CancelSubscriptionCommand, CancelSubscriptionHandler,
    CancelSubscriptionResult, CheckProductLimitHandler, CheckProductLimitQuery,
    CheckProductLimitResult, CreateSubscriptionCommand, CreateSubscriptionHandler,
    GetSubscriptionInfoHandler, GetSubscriptionInfoQuery, ListPaymentsHandler, ListPaymentsQuery,
    ListPlansHandler, RecordPaymentCommand, RecordPaymentHandler, SubscriptionInfo,
};
use super::quota::QuotaResolver;
use super::response::OperationResponse;
use crate::adapters::memory::InMemoryStore;
use crate::adapters::postgres::{
    PostgresAccountRepository, PostgresActivityLog, PostgresPasswordResetRepository,
    PostgresPaymentRepository, PostgresProductRepository, PostgresSettingsRepository,
    PostgresSubscriptionRepository,
};
use crate::config::AppConfig;
use crate::domain::account::User;
use crate::domain::foundation::{ProductId, SubscriptionId, UserId};
use crate::domain::product::{ProductChanges, TrackedProduct};
use crate::domain::settings::{SettingsChanges, UserSettings};
use crate::domain::subscription::{
    AttachedAddon, Payment, PlanCatalogue, Subscription, DEFAULT_FREE_TIER_LIMIT,
};
use crate::ports::{
    AccountRepository, ActivityLog, PasswordResetRepository, PaymentRepository, ProductRepository,
    SettingsRepository, SubscriptionRepository,
};

/// One implementation of every port.
#[derive(Clone)]
pub struct Ports {
    pub accounts: Arc<dyn AccountRepository>,
    pub activity: Arc<dyn ActivityLog>,
    pub password_resets: Arc<dyn PasswordResetRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Ports {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
            activity: Arc::new(PostgresActivityLog::new(pool.clone())),
            password_resets: Arc::new(PostgresPasswordResetRepository::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
            products: Arc::new(PostgresProductRepository::new(pool.clone())),
            settings: Arc::new(PostgresSettingsRepository::new(pool)),
        }
    }

    /// Every port backed by the same shared store.
    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            accounts: Arc::new(store.clone()),
            activity: Arc::new(store.clone()),
            password_resets: Arc::new(store.clone()),
            subscriptions: Arc::new(store.clone()),
            payments: Arc::new(store.clone()),
            products: Arc::new(store.clone()),
            settings: Arc::new(store.clone()),
        }
    }
}

/// Tunables the handlers need from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Product cap used only when the catalogue has no free plan.
    pub free_tier_fallback_limit: u32,
    pub reset_token_ttl_hours: i64,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            free_tier_fallback_limit: DEFAULT_FREE_TIER_LIMIT,
            reset_token_ttl_hours: 24,
        }
    }
}

impl From<&AppConfig> for ServiceOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            free_tier_fallback_limit: config.quota.free_tier_fallback_limit,
            reset_token_ttl_hours: config.password_reset.token_ttl_hours,
        }
    }
}

/// Every account, subscription, product and settings operation.
pub struct StockWatch {
    create_account: CreateAccountHandler,
    verify_login: VerifyLoginHandler,
    record_login: RecordLoginHandler,
    get_user: GetUserHandler,
    record_activity: RecordActivityHandler,
    request_password_reset: RequestPasswordResetHandler,
    verify_reset_token: VerifyResetTokenHandler,
    reset_password: ResetPasswordHandler,
    subscription_info: GetSubscriptionInfoHandler,
    check_product_limit: CheckProductLimitHandler,
    create_subscription: CreateSubscriptionHandler,
    add_addon: AddAddonHandler,
    cancel_subscription: CancelSubscriptionHandler,
    list_plans: ListPlansHandler,
    record_payment: RecordPaymentHandler,
    list_payments: ListPaymentsHandler,
    list_products: ListProductsHandler,
    add_product: AddProductHandler,
    update_product: UpdateProductHandler,
    delete_product: DeleteProductHandler,
    get_settings: GetSettingsHandler,
    update_settings: UpdateSettingsHandler,
    dashboard: GetDashboardOverviewHandler,
}

impl StockWatch {
    pub fn new(ports: Ports, options: ServiceOptions) -> Self {
        let quota = Arc::new(QuotaResolver::new(
            ports.products.clone(),
            ports.subscriptions.clone(),
            options.free_tier_fallback_limit,
        ));

        Self {
            create_account: CreateAccountHandler::new(ports.accounts.clone(), ports.activity.clone()),
            verify_login: VerifyLoginHandler::new(ports.accounts.clone()),
            record_login: RecordLoginHandler::new(ports.accounts.clone(), ports.activity.clone()),
            get_user: GetUserHandler::new(ports.accounts.clone()),
            record_activity: RecordActivityHandler::new(
                ports.accounts.clone(),
                ports.activity.clone(),
            ),
            request_password_reset: RequestPasswordResetHandler::new(
                ports.accounts.clone(),
                ports.password_resets.clone(),
                ports.activity.clone(),
                options.reset_token_ttl_hours,
            ),
            verify_reset_token: VerifyResetTokenHandler::new(
                ports.accounts.clone(),
                ports.password_resets.clone(),
            ),
            reset_password: ResetPasswordHandler::new(
                ports.password_resets.clone(),
                ports.activity.clone(),
            ),
            subscription_info: GetSubscriptionInfoHandler::new(
                ports.subscriptions.clone(),
                quota.clone(),
            ),
            check_product_limit: CheckProductLimitHandler::new(quota.clone()),
            create_subscription: CreateSubscriptionHandler::new(
                ports.subscriptions.clone(),
                ports.activity.clone(),
            ),
            add_addon: AddAddonHandler::new(ports.subscriptions.clone(), ports.activity.clone()),
            cancel_subscription: CancelSubscriptionHandler::new(
                ports.subscriptions.clone(),
                ports.activity.clone(),
            ),
            list_plans: ListPlansHandler::new(ports.subscriptions.clone()),
            record_payment: RecordPaymentHandler::new(
                ports.accounts.clone(),
                ports.subscriptions.clone(),
                ports.payments.clone(),
                ports.activity.clone(),
            ),
            list_payments: ListPaymentsHandler::new(ports.payments.clone()),
            list_products: ListProductsHandler::new(ports.products.clone()),
            add_product: AddProductHandler::new(
                ports.products.clone(),
                ports.activity.clone(),
                quota,
            ),
            update_product: UpdateProductHandler::new(
                ports.products.clone(),
                ports.activity.clone(),
            ),
            delete_product: DeleteProductHandler::new(
                ports.products.clone(),
                ports.activity.clone(),
            ),
            get_settings: GetSettingsHandler::new(ports.settings.clone()),
            update_settings: UpdateSettingsHandler::new(ports.settings, ports.activity.clone()),
            dashboard: GetDashboardOverviewHandler::new(
                ports.accounts,
                ports.products,
                ports.activity,
            ),
        }
    }

    /// Facade over a shared in-memory store with default options.
    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self::new(Ports::in_memory(store), ServiceOptions::default())
    }

    // ── Accounts ──────────────────────────────────────────────────────────

    pub async fn create_account(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
        newsletter_opt_in: bool,
    ) -> OperationResponse<CreateAccountResult> {
        let cmd = CreateAccountCommand {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            newsletter_opt_in,
        };
        OperationResponse::from_result(
            self.create_account.handle(cmd).await,
            "Account created successfully",
        )
    }

    pub async fn verify_login(&self, email: &str) -> OperationResponse<VerifyLoginResult> {
        let query = VerifyLoginQuery {
            email: email.to_string(),
        };
        OperationResponse::from_result(self.verify_login.handle(query).await, "Account found")
    }

    pub async fn record_login(&self, user_id: UserId) -> OperationResponse<RecordLoginResult> {
        OperationResponse::from_result(
            self.record_login.handle(RecordLoginCommand { user_id }).await,
            "Login recorded",
        )
    }

    pub async fn get_user_by_id(&self, user_id: UserId) -> OperationResponse<User> {
        OperationResponse::from_result(
            self.get_user.handle(GetUserQuery::ById(user_id)).await,
            "User found",
        )
    }

    pub async fn get_user_by_email(&self, email: &str) -> OperationResponse<User> {
        OperationResponse::from_result(
            self.get_user.handle(GetUserQuery::ByEmail(email.to_string())).await,
            "User found",
        )
    }

    pub async fn record_activity(
        &self,
        user_id: UserId,
        activity_type: &str,
        description: Option<&str>,
    ) -> OperationResponse<RecordActivityResult> {
        let cmd = RecordActivityCommand {
            user_id,
            activity_type: activity_type.to_string(),
            description: description.map(str::to_string),
        };
        OperationResponse::from_result(self.record_activity.handle(cmd).await, "Activity recorded")
    }

    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> OperationResponse<RequestPasswordResetResult> {
        let cmd = RequestPasswordResetCommand {
            email: email.to_string(),
        };
        OperationResponse::from_result(
            self.request_password_reset.handle(cmd).await,
            "If an account exists for this email, a reset link has been sent",
        )
    }

    pub async fn verify_reset_token(&self, token: &str) -> OperationResponse<VerifyResetTokenResult> {
        let query = VerifyResetTokenQuery {
            token: token.to_string(),
        };
        OperationResponse::from_result(self.verify_reset_token.handle(query).await, "Token is valid")
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password_hash: &str,
    ) -> OperationResponse<ResetPasswordResult> {
        let cmd = ResetPasswordCommand {
            token: token.to_string(),
            new_password_hash: new_password_hash.to_string(),
        };
        OperationResponse::from_result(
            self.reset_password.handle(cmd).await,
            "Password updated successfully",
        )
    }

    // ── Subscriptions ─────────────────────────────────────────────────────

    pub async fn get_subscription_info(&self, user_id: UserId) -> OperationResponse<SubscriptionInfo> {
        OperationResponse::from_result(
            self.subscription_info
                .handle(GetSubscriptionInfoQuery { user_id })
                .await,
            "Subscription info retrieved",
        )
    }

    pub async fn check_product_limit(
        &self,
        user_id: UserId,
    ) -> OperationResponse<CheckProductLimitResult> {
        let result = self
            .check_product_limit
            .handle(CheckProductLimitQuery { user_id })
            .await;
        let message = match &result {
            Ok(r) if r.can_add => "Product can be added",
            _ => "Product limit reached",
        };
        OperationResponse::from_result(result, message)
    }

    pub async fn create_subscription(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> OperationResponse<Subscription> {
        OperationResponse::from_result(
            self.create_subscription.handle(cmd).await,
            "Subscription created successfully",
        )
    }

    pub async fn add_addon(
        &self,
        subscription_id: SubscriptionId,
        addon_name: &str,
        stripe_subscription_item_id: Option<&str>,
    ) -> OperationResponse<AttachedAddon> {
        let cmd = AddAddonCommand {
            subscription_id,
            addon_name: addon_name.to_string(),
            stripe_subscription_item_id: stripe_subscription_item_id.map(str::to_string),
        };
        OperationResponse::from_result(self.add_addon.handle(cmd).await, "Add-on added successfully")
    }

    pub async fn cancel_subscription(
        &self,
        user_id: UserId,
        immediate: bool,
    ) -> OperationResponse<CancelSubscriptionResult> {
        let message = if immediate {
            "Subscription cancelled"
        } else {
            "Subscription will be cancelled at the end of the billing period"
        };
        OperationResponse::from_result(
            self.cancel_subscription
                .handle(CancelSubscriptionCommand { user_id, immediate })
                .await,
            message,
        )
    }

    pub async fn list_plans(&self) -> OperationResponse<PlanCatalogue> {
        OperationResponse::from_result(self.list_plans.handle().await, "Plans retrieved")
    }

    pub async fn record_payment(&self, cmd: RecordPaymentCommand) -> OperationResponse<Payment> {
        OperationResponse::from_result(self.record_payment.handle(cmd).await, "Payment recorded")
    }

    pub async fn list_payments(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> OperationResponse<Vec<Payment>> {
        OperationResponse::from_result(
            self.list_payments
                .handle(ListPaymentsQuery { user_id, limit })
                .await,
            "Payments retrieved",
        )
    }

    // ── Products ──────────────────────────────────────────────────────────

    pub async fn list_products(&self, user_id: UserId) -> OperationResponse<ListProductsResult> {
        OperationResponse::from_result(
            self.list_products.handle(ListProductsQuery { user_id }).await,
            "Products retrieved",
        )
    }

    pub async fn add_product(&self, cmd: AddProductCommand) -> OperationResponse<TrackedProduct> {
        OperationResponse::from_result(
            self.add_product.handle(cmd).await,
            "Product added successfully",
        )
    }

    /// URL and optional title only.
    pub async fn add_product_basic(
        &self,
        user_id: UserId,
        product_url: &str,
        product_title: Option<&str>,
    ) -> OperationResponse<TrackedProduct> {
        self.add_product(AddProductCommand::basic(
            user_id,
            product_url,
            product_title.map(str::to_string),
        ))
        .await
    }

    pub async fn update_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
        changes: ProductChanges,
    ) -> OperationResponse<TrackedProduct> {
        let cmd = UpdateProductCommand {
            user_id,
            product_id,
            changes,
        };
        OperationResponse::from_result(
            self.update_product.handle(cmd).await,
            "Product updated successfully",
        )
    }

    /// Price thresholds only; webhook and SMS flags are left as they are.
    pub async fn update_product_alerts(
        &self,
        user_id: UserId,
        product_id: ProductId,
        min_price_alert: Option<Decimal>,
        max_price_alert: Option<Decimal>,
    ) -> OperationResponse<TrackedProduct> {
        let changes = ProductChanges {
            min_price_alert,
            max_price_alert,
            ..Default::default()
        };
        self.update_product(user_id, product_id, changes).await
    }

    pub async fn delete_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> OperationResponse<DeleteProductResult> {
        OperationResponse::from_result(
            self.delete_product
                .handle(DeleteProductCommand { user_id, product_id })
                .await,
            "Product deleted successfully",
        )
    }

    // ── Settings & dashboard ──────────────────────────────────────────────

    pub async fn get_settings(&self, user_id: UserId) -> OperationResponse<UserSettings> {
        OperationResponse::from_result(
            self.get_settings.handle(GetSettingsQuery { user_id }).await,
            "Settings retrieved",
        )
    }

    pub async fn update_settings(
        &self,
        user_id: UserId,
        changes: SettingsChanges,
    ) -> OperationResponse<UserSettings> {
        OperationResponse::from_result(
            self.update_settings
                .handle(UpdateSettingsCommand { user_id, changes })
                .await,
            "Settings updated successfully",
        )
    }

    pub async fn get_dashboard_overview(&self, user_id: UserId) -> OperationResponse<DashboardOverview> {
        OperationResponse::from_result(
            self.dashboard
                .handle(GetDashboardOverviewQuery { user_id })
                .await,
            "Dashboard retrieved",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::response::ResponseStatus;
    use crate::domain::foundation::ErrorKind;

    #[tokio::test]
    async fn wrappers_share_one_store() {
        let store = InMemoryStore::with_default_catalogue();
        let service = StockWatch::in_memory(&store);

        let user = service
            .create_account("Jane Doe", "jane@example.com", "$2b$12$hash", false)
            .await
            .into_data()
            .unwrap()
            .user;
        let product = service
            .add_product_basic(user.id, "https://www.amazon.com/dp/B0", Some("Headphones"))
            .await
            .into_data()
            .unwrap();
        assert_eq!(product.product_title, "Headphones");

        let updated = service
            .update_product_alerts(user.id, product.id, Some(Decimal::new(50, 0)), None)
            .await;
        assert!(updated.is_success());
        assert_eq!(store.products_for(&user.id).await[0].min_price_alert, Some(Decimal::new(50, 0)));
    }

    #[tokio::test]
    async fn failures_carry_kind_and_no_data() {
        let service = StockWatch::in_memory(&InMemoryStore::with_default_catalogue());
        let response = service.get_user_by_id(UserId::new()).await;

        assert_eq!(response.status, ResponseStatus::Error);
        assert_eq!(response.error_kind, Some(ErrorKind::NotFound));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn limit_check_message_follows_outcome() {
        let store = InMemoryStore::with_default_catalogue();
        let service = StockWatch::in_memory(&store);
        let user_id = service
            .create_account("Jane Doe", "jane@example.com", "$2b$12$hash", false)
            .await
            .into_data()
            .unwrap()
            .user
            .id;

        assert_eq!(service.check_product_limit(user_id).await.message, "Product can be added");
        for n in 0..2 {
            service
                .add_product_basic(user_id, &format!("https://www.ebay.com/itm/{}", n), None)
                .await;
        }
        let response = service.check_product_limit(user_id).await;
        assert!(response.is_success());
        assert_eq!(response.message, "Product limit reached");
    }

    #[test]
    fn options_follow_config() {
        let mut config = AppConfig::default();
        config.quota.free_tier_fallback_limit = 5;
        config.password_reset.token_ttl_hours = 2;

        let options = ServiceOptions::from(&config);
        assert_eq!(options.free_tier_fallback_limit, 5);
        assert_eq!(options.reset_token_ttl_hours, 2);
    }
}
