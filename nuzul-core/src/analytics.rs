use async_trait::async_trait;
use nuzul_shared::models::events::{CartRestoredEvent, CheckoutFailedEvent, PurchaseCompletedEvent};

/// Outbound analytics seam. Real transports (tag manager, pixel) live in the
/// host; every call site fires and forgets, so a failing sink can never
/// affect the flow that emitted the event.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn cart_restored(&self, event: CartRestoredEvent) -> Result<(), String>;
    async fn purchase_completed(&self, event: PurchaseCompletedEvent) -> Result<(), String>;
    async fn checkout_failed(&self, event: CheckoutFailedEvent) -> Result<(), String>;
}

/// Log-only sink for headless runs and tests.
pub struct TracingAnalytics;

#[async_trait]
impl AnalyticsSink for TracingAnalytics {
    async fn cart_restored(&self, event: CartRestoredEvent) -> Result<(), String> {
        tracing::info!(items = event.item_count, rooms = event.room_count, "cart restored");
        Ok(())
    }

    async fn purchase_completed(&self, event: PurchaseCompletedEvent) -> Result<(), String> {
        tracing::info!(
            confirmation = %event.confirmation_number,
            order = %event.order_id,
            amount = event.amount,
            "purchase completed"
        );
        Ok(())
    }

    async fn checkout_failed(&self, event: CheckoutFailedEvent) -> Result<(), String> {
        tracing::info!(
            confirmation = %event.confirmation_number,
            stage = %event.stage,
            "checkout failed"
        );
        Ok(())
    }
}
