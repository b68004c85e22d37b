use async_trait::async_trait;
use chrono::NaiveDate;
use nuzul_shared::pii::Redacted;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderIntent {
    Capture,
    Authorize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderAmount {
    pub currency_code: String,
    /// Two-decimal string, e.g. "266.60". Payment-order APIs reject floats.
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseUnit {
    pub amount: OrderAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reconciliation details attached to a payment order so finance can match
/// the charge to a reservation without a database lookup on our side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetadata {
    pub confirmation_number: String,
    pub hotel_name: String,
    pub guest_name: String,
    pub guest_phone: Redacted<String>,
    pub guest_email: Redacted<String>,
    pub guest_nationality: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub intent: OrderIntent,
    pub purchase_units: Vec<PurchaseUnit>,
    pub metadata: OrderMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    /// Provider-side order id, echoed back on capture confirmation.
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    /// Backend spelling of the chosen option: "full" or "deposit".
    pub payment_option: String,
    /// Amount charged, in the reservation currency (SAR).
    pub amount: f64,
    pub currency: String,
    /// Same charge converted to USD for the payment-order provider.
    pub amount_usd: f64,
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub confirmation_number: String,
    pub status: String,
    pub paid_amount: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Reservation-backend operations the checkout flow depends on. The HTTP
/// client implements this; tests substitute a recording double.
#[async_trait]
pub trait ReservationGateway: Send + Sync {
    /// Create a payment order for the charge. Returns the provider order id
    /// that the wallet authorization gets bound to.
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, GatewayError>;

    /// Confirm that the order for this reservation was captured, recording
    /// the paid amount against the booking.
    async fn confirm_payment(
        &self,
        confirmation_number: &str,
        request: &ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, GatewayError>;
}
