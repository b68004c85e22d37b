use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the payment sheet shows the payer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Merchant line on the sheet, e.g. the hotel name.
    pub label: String,
    pub amount: f64,
    pub currency_code: String,
    pub country_code: String,
}

/// Internal translation of the wallet SDK's callbacks. Each callback maps to
/// exactly one event; the checkout orchestrator owns every decision, the
/// provider only reports what happened.
#[derive(Debug, Clone)]
pub enum WalletEvent {
    /// The SDK asks the merchant to prove itself against `validation_url`.
    MerchantValidationRequested { validation_url: String },
    /// The payer approved the charge; `token` is the opaque authorization.
    Authorized { token: String },
    /// The payer dismissed the sheet.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet SDK failed to load: {0}")]
    LoadFailed(String),
    #[error("Merchant validation failed: {0}")]
    MerchantValidation(String),
    #[error("Wallet session error: {0}")]
    Session(String),
}

/// Host-side bridge to the device wallet SDK (Apple Pay in production).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Bring the vendor SDK up. Must be idempotent: once loaded, further
    /// calls return immediately. Callers bound this with a deadline since a
    /// wedged script load would otherwise hang forever.
    async fn ensure_loaded(&self) -> Result<(), WalletError>;

    /// Whether this device and browser can present the payment sheet.
    async fn can_make_payments(&self) -> Result<bool, WalletError>;

    /// Vendor-side merchant validation. The returned blob is opaque to us
    /// and is handed straight back to the session.
    async fn validate_merchant(&self, validation_url: &str) -> Result<Value, WalletError>;

    /// Bind the payer's authorization token to a backend payment order.
    async fn bind_authorization(&self, order_id: &str, token: &str) -> Result<(), WalletError>;

    /// Present the payment sheet for `request` and hand back the session
    /// through which its events arrive.
    async fn begin_session(
        &self,
        request: &PaymentRequest,
    ) -> Result<Box<dyn WalletSession>, WalletError>;
}

/// One presented payment sheet. Events arrive in the order the SDK raised
/// them; the report methods deliver our verdict back to the sheet.
#[async_trait]
pub trait WalletSession: Send {
    /// Next SDK event, or `None` once the sheet is gone.
    async fn next_event(&mut self) -> Option<WalletEvent>;

    /// Hand the opaque merchant session blob back to the sheet so it can
    /// proceed to authorization.
    async fn complete_merchant_validation(
        &mut self,
        merchant_session: Value,
    ) -> Result<(), WalletError>;

    /// Tell the sheet the capture succeeded.
    async fn report_success(&mut self) -> Result<(), WalletError>;

    /// Tell the sheet the capture failed.
    async fn report_failure(&mut self) -> Result<(), WalletError>;

    /// Dismiss the sheet without a verdict (merchant-side abort).
    async fn abort(&mut self) -> Result<(), WalletError>;
}
