//! Analytics event payloads. Emitted fire-and-forget; a lost event must
//! never affect the flow that produced it.

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct CartRestoredEvent {
    pub item_count: usize,
    pub room_count: u32,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PurchaseCompletedEvent {
    pub confirmation_number: String,
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_option: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct CheckoutFailedEvent {
    pub confirmation_number: String,
    /// Where in the flow the attempt died ("merchant_validation", "capture").
    pub stage: String,
    pub timestamp: i64,
}
