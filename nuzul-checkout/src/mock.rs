//! Doubles for the checkout seams: a scripted wallet, a recording gateway
//! and recording notice/analytics sinks. Shared by the test suite and the
//! headless smoke harness.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nuzul_core::analytics::AnalyticsSink;
use nuzul_core::gateway::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreateOrderRequest, CreateOrderResponse,
    GatewayError, ReservationGateway,
};
use nuzul_core::notify::{Notice, Notifier};
use nuzul_core::wallet::{PaymentRequest, WalletError, WalletEvent, WalletProvider, WalletSession};
use nuzul_shared::models::events::{CartRestoredEvent, CheckoutFailedEvent, PurchaseCompletedEvent};
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

/// What a scripted session was told by the flow under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionReport {
    MerchantCompleted,
    Success,
    Failure,
    Aborted,
}

/// Wallet double driven by a pre-scripted event sequence. Each presented
/// session drains the remaining script; the verdicts the flow reports back
/// are recorded for assertions.
pub struct ScriptedWallet {
    script: Mutex<VecDeque<WalletEvent>>,
    eligible: bool,
    fail_validation: bool,
    fail_bind: bool,
    load_delay: Option<Duration>,
    loaded: AtomicBool,
    load_count: AtomicUsize,
    sessions: AtomicUsize,
    reports: Arc<Mutex<Vec<SessionReport>>>,
    bound: Mutex<Vec<(String, String)>>,
}

impl ScriptedWallet {
    pub fn new(script: Vec<WalletEvent>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            eligible: true,
            fail_validation: false,
            fail_bind: false,
            load_delay: None,
            loaded: AtomicBool::new(false),
            load_count: AtomicUsize::new(0),
            sessions: AtomicUsize::new(0),
            reports: Arc::new(Mutex::new(Vec::new())),
            bound: Mutex::new(Vec::new()),
        }
    }

    /// A wallet whose device cannot present the payment sheet.
    pub fn ineligible() -> Self {
        Self {
            eligible: false,
            ..Self::new(vec![])
        }
    }

    /// Make merchant validation fail.
    pub fn failing_validation(mut self) -> Self {
        self.fail_validation = true;
        self
    }

    /// Make authorization binding fail.
    pub fn failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    /// Delay `ensure_loaded`, for exercising the bootstrap deadline.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn sessions_started(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    pub fn session_reports(&self) -> Vec<SessionReport> {
        self.reports.lock().clone()
    }

    /// `(order_id, token)` pairs bound so far.
    pub fn bound(&self) -> Vec<(String, String)> {
        self.bound.lock().clone()
    }
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    async fn ensure_loaded(&self) -> Result<(), WalletError> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn can_make_payments(&self) -> Result<bool, WalletError> {
        Ok(self.eligible)
    }

    async fn validate_merchant(&self, validation_url: &str) -> Result<Value, WalletError> {
        if self.fail_validation {
            return Err(WalletError::MerchantValidation(format!(
                "scripted failure for {validation_url}"
            )));
        }
        Ok(json!({ "merchantSessionIdentifier": "scripted-session" }))
    }

    async fn bind_authorization(&self, order_id: &str, token: &str) -> Result<(), WalletError> {
        if self.fail_bind {
            return Err(WalletError::Session("scripted bind failure".to_string()));
        }
        self.bound
            .lock()
            .push((order_id.to_string(), token.to_string()));
        Ok(())
    }

    async fn begin_session(
        &self,
        _request: &PaymentRequest,
    ) -> Result<Box<dyn WalletSession>, WalletError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        let events: VecDeque<WalletEvent> = self.script.lock().drain(..).collect();
        Ok(Box::new(ScriptedSession {
            events,
            reports: self.reports.clone(),
        }))
    }
}

struct ScriptedSession {
    events: VecDeque<WalletEvent>,
    reports: Arc<Mutex<Vec<SessionReport>>>,
}

#[async_trait]
impl WalletSession for ScriptedSession {
    async fn next_event(&mut self) -> Option<WalletEvent> {
        self.events.pop_front()
    }

    async fn complete_merchant_validation(
        &mut self,
        _merchant_session: Value,
    ) -> Result<(), WalletError> {
        self.reports.lock().push(SessionReport::MerchantCompleted);
        Ok(())
    }

    async fn report_success(&mut self) -> Result<(), WalletError> {
        self.reports.lock().push(SessionReport::Success);
        Ok(())
    }

    async fn report_failure(&mut self) -> Result<(), WalletError> {
        self.reports.lock().push(SessionReport::Failure);
        Ok(())
    }

    async fn abort(&mut self) -> Result<(), WalletError> {
        self.reports.lock().push(SessionReport::Aborted);
        Ok(())
    }
}

/// Gateway double that approves everything by default and records every
/// request for assertions.
#[derive(Default)]
pub struct RecordingGateway {
    reject_create: bool,
    reject_confirm: bool,
    create_count: AtomicUsize,
    confirm_count: AtomicUsize,
    orders: Mutex<Vec<CreateOrderRequest>>,
    confirmations: Mutex<Vec<(String, ConfirmPaymentRequest)>>,
}

impl RecordingGateway {
    pub fn rejecting_create() -> Self {
        Self {
            reject_create: true,
            ..Self::default()
        }
    }

    pub fn rejecting_confirm() -> Self {
        Self {
            reject_confirm: true,
            ..Self::default()
        }
    }

    pub fn create_calls(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirm_count.load(Ordering::SeqCst)
    }

    pub fn last_order(&self) -> Option<CreateOrderRequest> {
        self.orders.lock().last().cloned()
    }

    pub fn last_confirmation(&self) -> Option<(String, ConfirmPaymentRequest)> {
        self.confirmations.lock().last().cloned()
    }
}

#[async_trait]
impl ReservationGateway for RecordingGateway {
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, GatewayError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        if self.reject_create {
            return Err(GatewayError::Rejected {
                status: 422,
                message: "scripted order rejection".to_string(),
            });
        }
        self.orders.lock().push(request.clone());
        Ok(CreateOrderResponse {
            id: format!("order-{}", Uuid::new_v4().simple()),
            status: "CREATED".to_string(),
        })
    }

    async fn confirm_payment(
        &self,
        confirmation_number: &str,
        request: &ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, GatewayError> {
        self.confirm_count.fetch_add(1, Ordering::SeqCst);
        if self.reject_confirm {
            return Err(GatewayError::Rejected {
                status: 409,
                message: "scripted confirmation rejection".to_string(),
            });
        }
        self.confirmations
            .lock()
            .push((confirmation_number.to_string(), request.clone()));
        Ok(ConfirmPaymentResponse {
            confirmation_number: confirmation_number.to_string(),
            status: "CONFIRMED".to_string(),
            paid_amount: request.amount,
        })
    }
}

/// Notifier double that captures notices instead of rendering them.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Analytics double that captures emitted events.
#[derive(Default)]
pub struct RecordingAnalytics {
    restores: Mutex<Vec<CartRestoredEvent>>,
    purchases: Mutex<Vec<PurchaseCompletedEvent>>,
    failures: Mutex<Vec<CheckoutFailedEvent>>,
}

impl RecordingAnalytics {
    pub fn restores(&self) -> Vec<CartRestoredEvent> {
        self.restores.lock().clone()
    }

    pub fn purchases(&self) -> Vec<PurchaseCompletedEvent> {
        self.purchases.lock().clone()
    }

    pub fn failures(&self) -> Vec<CheckoutFailedEvent> {
        self.failures.lock().clone()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingAnalytics {
    async fn cart_restored(&self, event: CartRestoredEvent) -> Result<(), String> {
        self.restores.lock().push(event);
        Ok(())
    }

    async fn purchase_completed(&self, event: PurchaseCompletedEvent) -> Result<(), String> {
        self.purchases.lock().push(event);
        Ok(())
    }

    async fn checkout_failed(&self, event: CheckoutFailedEvent) -> Result<(), String> {
        self.failures.lock().push(event);
        Ok(())
    }
}
