use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use nuzul_core::analytics::AnalyticsSink;
use nuzul_core::gateway::{
    ConfirmPaymentRequest, CreateOrderRequest, GatewayError, OrderAmount, OrderIntent,
    OrderMetadata, PurchaseUnit, ReservationGateway,
};
use nuzul_core::notify::{Notice, Notifier};
use nuzul_core::wallet::{PaymentRequest, WalletError, WalletEvent, WalletProvider, WalletSession};
use nuzul_shared::locale::Msg;
use nuzul_shared::models::events::{CheckoutFailedEvent, PurchaseCompletedEvent};
use nuzul_shared::money::{format_amount, Currency, ExchangeRates};
use nuzul_shared::pii::Redacted;
use parking_lot::Mutex;
use tokio::time::timeout;

use crate::amount::{compute_charge, ChargeAmount, PaymentOption, ReservationBalance};

/// Where the checkout currently stands. Mirrors the lifecycle of the
/// external payment sheet plus our capture handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Wallet missing, not loaded yet, or device cannot pay.
    NotEligible,
    /// Wallet up and eligible; the pay button may be shown.
    Ready,
    /// Payment sheet presented, no events yet.
    SessionStarted,
    /// Proving the merchant to the wallet vendor.
    MerchantValidating,
    /// Sheet is waiting for the payer's approval.
    AwaitingAuthorization,
    /// Authorization received, backend capture in flight.
    Capturing,
    /// Captured and confirmed; terminal for this orchestrator.
    Settled,
    /// Payer dismissed the sheet; a fresh attempt may start.
    Cancelled,
}

/// Guest input gathered by the checkout form.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutForm {
    pub option: Option<PaymentOption>,
    pub terms_accepted: bool,
}

/// The reservation under payment plus the guest details the backend wants
/// echoed back on the payment order.
#[derive(Debug, Clone)]
pub struct ReservationContext {
    pub confirmation_number: String,
    pub hotel_name: String,
    pub guest_name: String,
    pub guest_phone: Redacted<String>,
    pub guest_email: Redacted<String>,
    pub guest_nationality: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Reservation total in SAR.
    pub total: f64,
    /// Already paid, in SAR.
    pub paid: f64,
}

impl ReservationContext {
    fn balance(&self) -> ReservationBalance {
        ReservationBalance {
            total: self.total,
            paid: self.paid,
        }
    }
}

/// Orchestrator tuning, sourced from the application config.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Currency the payment-order provider settles in.
    pub order_currency: String,
    pub deposit_fraction: f64,
    /// Deadline for the wallet SDK to come up during bootstrap.
    pub wallet_load_timeout: Duration,
    /// How long the host should keep the success notice up before
    /// refreshing the reservation view.
    pub refresh_delay: Duration,
    pub merchant_country: String,
}

/// Terminal result of one `pay` invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// A local precondition failed; nothing external was touched.
    Rejected(Msg),
    /// Captured and confirmed. The host should refresh the reservation
    /// after `refresh_after`.
    Settled {
        order_id: String,
        refresh_after: Duration,
    },
    /// The vendor or backend refused mid-flow; the attempt is over.
    Declined,
    /// The payer dismissed the sheet.
    Cancelled,
    /// The orchestrator was closed, or the sheet vanished without a verdict.
    Abandoned,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Payment method is not ready")]
    NotReady,
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl CheckoutError {
    /// Notice key for the guest-facing toast.
    pub fn message(&self) -> Msg {
        match self {
            CheckoutError::NotReady => Msg::WalletUnavailable,
            CheckoutError::Wallet(_) => Msg::PaymentFailed,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CaptureError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Drives one reservation's payment from wallet bootstrap to a confirmed
/// capture.
///
/// Wallet SDK callbacks arrive as [`WalletEvent`]s through the session; this
/// type owns every decision, so the provider bridge stays a dumb translator.
/// Capture runs at most once per attempt even if the SDK fires duplicate
/// authorization events, and `close` makes late events harmless once the
/// hosting view is gone.
pub struct CheckoutOrchestrator {
    wallet: Arc<dyn WalletProvider>,
    gateway: Arc<dyn ReservationGateway>,
    notifier: Arc<dyn Notifier>,
    analytics: Arc<dyn AnalyticsSink>,
    rates: ExchangeRates,
    settings: CheckoutSettings,
    phase: Mutex<CheckoutPhase>,
    capturing: AtomicBool,
    closed: AtomicBool,
}

impl CheckoutOrchestrator {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        gateway: Arc<dyn ReservationGateway>,
        notifier: Arc<dyn Notifier>,
        analytics: Arc<dyn AnalyticsSink>,
        rates: ExchangeRates,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            wallet,
            gateway,
            notifier,
            analytics,
            rates,
            settings,
            phase: Mutex::new(CheckoutPhase::NotEligible),
            capturing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.lock()
    }

    fn set_phase(&self, next: CheckoutPhase) {
        *self.phase.lock() = next;
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tear the orchestrator down. Any in-flight or later attempt resolves
    /// to [`CheckoutOutcome::Abandoned`]; late SDK events are ignored. This
    /// is the page-unmounted-mid-payment path.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Bring the wallet SDK up and decide eligibility. Bounded by the
    /// configured deadline so a wedged script load cannot hang the page.
    /// Once `Ready`, repeat calls return immediately; a failed bootstrap
    /// may be retried.
    pub async fn bootstrap(&self) -> CheckoutPhase {
        if self.is_closed() {
            return CheckoutPhase::NotEligible;
        }
        {
            let phase = self.phase.lock();
            if *phase != CheckoutPhase::NotEligible {
                return *phase;
            }
        }

        let loaded = timeout(self.settings.wallet_load_timeout, self.wallet.ensure_loaded()).await;
        let next = match loaded {
            Err(_) => {
                tracing::warn!(
                    deadline = ?self.settings.wallet_load_timeout,
                    "wallet SDK load timed out"
                );
                CheckoutPhase::NotEligible
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "wallet SDK failed to load");
                CheckoutPhase::NotEligible
            }
            Ok(Ok(())) => match self.wallet.can_make_payments().await {
                Ok(true) => CheckoutPhase::Ready,
                Ok(false) => {
                    tracing::info!("device cannot present the payment sheet");
                    CheckoutPhase::NotEligible
                }
                Err(e) => {
                    tracing::warn!(error = %e, "wallet eligibility check failed");
                    CheckoutPhase::NotEligible
                }
            },
        };
        self.set_phase(next);
        next
    }

    /// Run one payment attempt end to end.
    ///
    /// Preconditions are checked synchronously before any SDK or network
    /// work; a failed precondition raises a notice and returns `Rejected`
    /// without side effects. From there the wallet session's events drive
    /// the flow until a terminal outcome.
    pub async fn pay(
        &self,
        reservation: &ReservationContext,
        form: &CheckoutForm,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self.is_closed() {
            return Ok(CheckoutOutcome::Abandoned);
        }
        {
            let phase = self.phase.lock();
            if !matches!(*phase, CheckoutPhase::Ready | CheckoutPhase::Cancelled) {
                return Err(CheckoutError::NotReady);
            }
        }

        let option = match form.option {
            Some(option) => option,
            None => return Ok(self.reject(Msg::PaymentOptionRequired)),
        };
        if !form.terms_accepted {
            return Ok(self.reject(Msg::TermsNotAccepted));
        }
        let charge = compute_charge(
            option,
            &reservation.balance(),
            self.settings.deposit_fraction,
            &self.rates,
        );
        if !charge.is_chargeable() {
            return Ok(self.reject(Msg::InvalidChargeAmount));
        }

        let request = PaymentRequest {
            label: reservation.hotel_name.clone(),
            amount: charge.sar,
            currency_code: Currency::Sar.code().to_string(),
            country_code: self.settings.merchant_country.clone(),
        };
        let mut session = self.wallet.begin_session(&request).await?;
        self.set_phase(CheckoutPhase::SessionStarted);
        tracing::info!(
            confirmation = %reservation.confirmation_number,
            amount = charge.sar,
            option = option.backend_code(),
            "payment sheet opened"
        );

        loop {
            if self.is_closed() {
                let _ = session.abort().await;
                self.set_phase(CheckoutPhase::Ready);
                return Ok(CheckoutOutcome::Abandoned);
            }
            let event = match session.next_event().await {
                Some(event) => event,
                None => {
                    tracing::debug!("payment sheet closed without a verdict");
                    self.set_phase(CheckoutPhase::Ready);
                    return Ok(CheckoutOutcome::Abandoned);
                }
            };

            match event {
                WalletEvent::MerchantValidationRequested { validation_url } => {
                    self.set_phase(CheckoutPhase::MerchantValidating);
                    match self.wallet.validate_merchant(&validation_url).await {
                        Ok(merchant_session) => {
                            if let Err(e) =
                                session.complete_merchant_validation(merchant_session).await
                            {
                                tracing::warn!(error = %e, "sheet refused the merchant session");
                                return Ok(self
                                    .decline(session.as_mut(), reservation, "merchant_validation")
                                    .await);
                            }
                            self.set_phase(CheckoutPhase::AwaitingAuthorization);
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "merchant validation failed");
                            return Ok(self
                                .decline(session.as_mut(), reservation, "merchant_validation")
                                .await);
                        }
                    }
                }
                WalletEvent::Authorized { token } => {
                    // Duplicate authorizations while capture is in flight are dropped.
                    if self.capturing.swap(true, Ordering::SeqCst) {
                        tracing::debug!("duplicate authorization event ignored");
                        continue;
                    }
                    self.set_phase(CheckoutPhase::Capturing);
                    let captured = self.capture(reservation, option, &charge, &token).await;
                    self.capturing.store(false, Ordering::SeqCst);

                    match captured {
                        Ok(order_id) => {
                            if let Err(e) = session.report_success().await {
                                // Backend already confirmed; the sheet just missed the news.
                                tracing::warn!(error = %e, "sheet rejected the success report");
                            }
                            self.notifier.notify(Notice::success(Msg::ReservationPaid));
                            let _ = self
                                .analytics
                                .purchase_completed(PurchaseCompletedEvent {
                                    confirmation_number: reservation.confirmation_number.clone(),
                                    order_id: order_id.clone(),
                                    amount: charge.sar,
                                    currency: Currency::Sar.code().to_string(),
                                    payment_option: option.backend_code().to_string(),
                                    timestamp: chrono::Utc::now().timestamp(),
                                })
                                .await;
                            self.set_phase(CheckoutPhase::Settled);
                            tracing::info!(
                                confirmation = %reservation.confirmation_number,
                                order = %order_id,
                                "checkout settled"
                            );
                            return Ok(CheckoutOutcome::Settled {
                                order_id,
                                refresh_after: self.settings.refresh_delay,
                            });
                        }
                        Err(e) => {
                            // Full detail goes to the log; the guest sees only
                            // the generic notice.
                            tracing::error!(
                                confirmation = %reservation.confirmation_number,
                                error = %e,
                                "capture failed"
                            );
                            if let Err(report_err) = session.report_failure().await {
                                tracing::warn!(error = %report_err, "sheet rejected the failure report");
                            }
                            self.notifier.notify(Notice::error(Msg::PaymentFailed));
                            let _ = self
                                .analytics
                                .checkout_failed(CheckoutFailedEvent {
                                    confirmation_number: reservation
                                        .confirmation_number
                                        .clone(),
                                    stage: "capture".to_string(),
                                    timestamp: chrono::Utc::now().timestamp(),
                                })
                                .await;
                            self.set_phase(CheckoutPhase::Ready);
                            return Ok(CheckoutOutcome::Declined);
                        }
                    }
                }
                WalletEvent::Cancelled => {
                    self.notifier.notify(Notice::info(Msg::PaymentCancelled));
                    self.set_phase(CheckoutPhase::Cancelled);
                    return Ok(CheckoutOutcome::Cancelled);
                }
            }
        }
    }

    fn reject(&self, message: Msg) -> CheckoutOutcome {
        self.notifier.notify(Notice::error(message));
        CheckoutOutcome::Rejected(message)
    }

    async fn decline(
        &self,
        session: &mut dyn WalletSession,
        reservation: &ReservationContext,
        stage: &str,
    ) -> CheckoutOutcome {
        if let Err(e) = session.abort().await {
            tracing::debug!(error = %e, "sheet abort failed");
        }
        self.notifier.notify(Notice::error(Msg::PaymentFailed));
        let _ = self
            .analytics
            .checkout_failed(CheckoutFailedEvent {
                confirmation_number: reservation.confirmation_number.clone(),
                stage: stage.to_string(),
                timestamp: chrono::Utc::now().timestamp(),
            })
            .await;
        self.set_phase(CheckoutPhase::Ready);
        CheckoutOutcome::Declined
    }

    /// Backend handshake after the payer authorizes. Returns the provider
    /// order id once the reservation is confirmed paid.
    async fn capture(
        &self,
        reservation: &ReservationContext,
        option: PaymentOption,
        charge: &ChargeAmount,
        token: &str,
    ) -> Result<String, CaptureError> {
        // 1. Create the payment order in the provider's settlement currency.
        let order_request = CreateOrderRequest {
            intent: OrderIntent::Capture,
            purchase_units: vec![PurchaseUnit {
                amount: OrderAmount {
                    currency_code: self.settings.order_currency.clone(),
                    value: format_amount(charge.usd),
                },
                description: Some(format!(
                    "Reservation {}",
                    reservation.confirmation_number
                )),
            }],
            metadata: OrderMetadata {
                confirmation_number: reservation.confirmation_number.clone(),
                hotel_name: reservation.hotel_name.clone(),
                guest_name: reservation.guest_name.clone(),
                guest_phone: reservation.guest_phone.clone(),
                guest_email: reservation.guest_email.clone(),
                guest_nationality: reservation.guest_nationality.clone(),
                check_in: reservation.check_in,
                check_out: reservation.check_out,
            },
        };
        let order = self.gateway.create_order(&order_request).await?;
        tracing::debug!(order = %order.id, "payment order created");

        // 2. Bind the payer's authorization to the order.
        self.wallet.bind_authorization(&order.id, token).await?;

        // 3. Confirm the reservation payment with both amounts.
        let confirm_request = ConfirmPaymentRequest {
            payment_option: option.backend_code().to_string(),
            amount: charge.sar,
            currency: Currency::Sar.code().to_string(),
            amount_usd: charge.usd,
            order_id: order.id.clone(),
        };
        self.gateway
            .confirm_payment(&reservation.confirmation_number, &confirm_request)
            .await?;

        Ok(order.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        RecordingAnalytics, RecordingGateway, RecordingNotifier, ScriptedWallet, SessionReport,
    };
    use nuzul_core::notify::NoticeLevel;

    fn create_test_reservation() -> ReservationContext {
        ReservationContext {
            confirmation_number: "HJ-1001".to_string(),
            hotel_name: "Dar Al Tawhid".to_string(),
            guest_name: "Ahmed Khan".to_string(),
            guest_phone: Redacted::new("+966500000000".to_string()),
            guest_email: Redacted::new("ahmed@example.com".to_string()),
            guest_nationality: "PK".to_string(),
            check_in: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            total: 1000.0,
            paid: 0.0,
        }
    }

    fn create_test_settings() -> CheckoutSettings {
        CheckoutSettings {
            order_currency: "USD".to_string(),
            deposit_fraction: 0.3,
            wallet_load_timeout: Duration::from_secs(5),
            refresh_delay: Duration::from_secs(3),
            merchant_country: "SA".to_string(),
        }
    }

    fn test_rates() -> ExchangeRates {
        ExchangeRates {
            sar_usd: 0.25,
            sar_eur: 0.2,
        }
    }

    fn build(
        wallet: Arc<ScriptedWallet>,
        gateway: Arc<RecordingGateway>,
    ) -> (
        CheckoutOrchestrator,
        Arc<RecordingNotifier>,
        Arc<RecordingAnalytics>,
    ) {
        let notifier = Arc::new(RecordingNotifier::default());
        let analytics = Arc::new(RecordingAnalytics::default());
        let orchestrator = CheckoutOrchestrator::new(
            wallet,
            gateway,
            notifier.clone(),
            analytics.clone(),
            test_rates(),
            create_test_settings(),
        );
        (orchestrator, notifier, analytics)
    }

    fn form(option: PaymentOption) -> CheckoutForm {
        CheckoutForm {
            option: Some(option),
            terms_accepted: true,
        }
    }

    fn happy_script() -> Vec<WalletEvent> {
        vec![
            WalletEvent::MerchantValidationRequested {
                validation_url: "https://wallet.example/validate".to_string(),
            },
            WalletEvent::Authorized {
                token: "tok-1".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_bootstrap_reaches_ready_once() {
        let wallet = Arc::new(ScriptedWallet::new(vec![]));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, _) = build(wallet.clone(), gateway);

        assert_eq!(orchestrator.bootstrap().await, CheckoutPhase::Ready);
        assert_eq!(orchestrator.bootstrap().await, CheckoutPhase::Ready);
        // The second bootstrap must not reload the SDK.
        assert_eq!(wallet.load_count(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_ineligible_device() {
        let wallet = Arc::new(ScriptedWallet::ineligible());
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, _) = build(wallet, gateway);

        assert_eq!(orchestrator.bootstrap().await, CheckoutPhase::NotEligible);

        let result = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await;
        assert!(matches!(result, Err(CheckoutError::NotReady)));
        assert_eq!(
            result.unwrap_err().message(),
            Msg::WalletUnavailable
        );
    }

    #[tokio::test]
    async fn test_bootstrap_gives_up_on_wedged_sdk_load() {
        let wallet =
            Arc::new(ScriptedWallet::new(vec![]).with_load_delay(Duration::from_secs(60)));
        let gateway = Arc::new(RecordingGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let analytics = Arc::new(RecordingAnalytics::default());
        let mut settings = create_test_settings();
        settings.wallet_load_timeout = Duration::from_millis(20);
        let orchestrator = CheckoutOrchestrator::new(
            wallet,
            gateway,
            notifier,
            analytics,
            test_rates(),
            settings,
        );

        assert_eq!(orchestrator.bootstrap().await, CheckoutPhase::NotEligible);
    }

    #[tokio::test]
    async fn test_pay_rejects_missing_payment_option() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, notifier, _) = build(wallet.clone(), gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(
                &create_test_reservation(),
                &CheckoutForm {
                    option: None,
                    terms_accepted: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Rejected(Msg::PaymentOptionRequired));
        assert_eq!(wallet.sessions_started(), 0);
        assert_eq!(gateway.create_calls(), 0);
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, Msg::PaymentOptionRequired);
    }

    #[tokio::test]
    async fn test_pay_rejects_unaccepted_terms() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, _) = build(wallet.clone(), gateway);
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(
                &create_test_reservation(),
                &CheckoutForm {
                    option: Some(PaymentOption::Full),
                    terms_accepted: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Rejected(Msg::TermsNotAccepted));
        assert_eq!(wallet.sessions_started(), 0);
    }

    #[tokio::test]
    async fn test_pay_rejects_non_positive_charge() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, _) = build(wallet.clone(), gateway);
        orchestrator.bootstrap().await;

        let mut reservation = create_test_reservation();
        reservation.paid = reservation.total;

        let outcome = orchestrator
            .pay(&reservation, &form(PaymentOption::RemainingBalance))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Rejected(Msg::InvalidChargeAmount));
        assert_eq!(wallet.sessions_started(), 0);
    }

    #[tokio::test]
    async fn test_full_payment_settles() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, notifier, analytics) = build(wallet.clone(), gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        let order_id = match outcome {
            CheckoutOutcome::Settled {
                order_id,
                refresh_after,
            } => {
                assert_eq!(refresh_after, Duration::from_secs(3));
                order_id
            }
            other => panic!("expected settled outcome, got {:?}", other),
        };

        // Order created in USD with the converted amount.
        let order = gateway.last_order().unwrap();
        assert_eq!(order.purchase_units[0].amount.currency_code, "USD");
        assert_eq!(order.purchase_units[0].amount.value, "250.00");
        assert_eq!(order.metadata.confirmation_number, "HJ-1001");

        // Confirmation carries both amounts and the created order id.
        let (confirmation, confirm) = gateway.last_confirmation().unwrap();
        assert_eq!(confirmation, "HJ-1001");
        assert_eq!(confirm.payment_option, "full");
        assert_eq!(confirm.amount, 1000.0);
        assert_eq!(confirm.currency, "SAR");
        assert_eq!(confirm.amount_usd, 250.0);
        assert_eq!(confirm.order_id, order_id);

        // The wallet authorization was bound to the same order.
        assert_eq!(wallet.bound(), vec![(order_id, "tok-1".to_string())]);

        // Sheet got the merchant session, then the success verdict.
        assert_eq!(
            wallet.session_reports(),
            vec![SessionReport::MerchantCompleted, SessionReport::Success]
        );

        let notices = notifier.notices();
        assert_eq!(notices.last().unwrap().message, Msg::ReservationPaid);
        assert_eq!(notices.last().unwrap().level, NoticeLevel::Success);

        let purchases = analytics.purchases();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].payment_option, "full");
        assert_eq!(purchases[0].amount, 1000.0);

        assert_eq!(orchestrator.phase(), CheckoutPhase::Settled);
    }

    #[tokio::test]
    async fn test_deposit_uses_fraction_and_backend_code() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, _) = build(wallet, gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Deposit))
            .await
            .unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Settled { .. }));

        let (_, confirm) = gateway.last_confirmation().unwrap();
        assert_eq!(confirm.payment_option, "deposit");
        assert_eq!(confirm.amount, 300.0);
        assert_eq!(confirm.amount_usd, 75.0);

        let order = gateway.last_order().unwrap();
        assert_eq!(order.purchase_units[0].amount.value, "75.00");
    }

    #[tokio::test]
    async fn test_cancelled_sheet_is_a_neutral_outcome() {
        let wallet = Arc::new(ScriptedWallet::new(vec![WalletEvent::Cancelled]));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, notifier, analytics) = build(wallet, gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Cancelled);
        assert_eq!(gateway.create_calls(), 0);
        assert_eq!(orchestrator.phase(), CheckoutPhase::Cancelled);

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert_eq!(notices[0].message, Msg::PaymentCancelled);
        assert!(analytics.failures().is_empty());

        // A fresh attempt may start after a cancel.
        let retry = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();
        assert_eq!(retry, CheckoutOutcome::Abandoned);
    }

    #[tokio::test]
    async fn test_merchant_validation_failure_declines() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()).failing_validation());
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, notifier, analytics) = build(wallet.clone(), gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Declined);
        assert_eq!(gateway.create_calls(), 0);
        assert_eq!(wallet.session_reports(), vec![SessionReport::Aborted]);
        assert_eq!(notifier.notices()[0].message, Msg::PaymentFailed);
        assert_eq!(analytics.failures()[0].stage, "merchant_validation");
        assert_eq!(orchestrator.phase(), CheckoutPhase::Ready);
    }

    #[tokio::test]
    async fn test_order_rejection_reports_failure_to_sheet() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::rejecting_create());
        let (orchestrator, notifier, analytics) = build(wallet.clone(), gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Declined);
        assert_eq!(gateway.create_calls(), 1);
        assert_eq!(gateway.confirm_calls(), 0);
        assert_eq!(
            wallet.session_reports(),
            vec![SessionReport::MerchantCompleted, SessionReport::Failure]
        );
        assert_eq!(notifier.notices().last().unwrap().message, Msg::PaymentFailed);
        assert_eq!(analytics.failures()[0].stage, "capture");
        // The flow is ready for a manual retry.
        assert_eq!(orchestrator.phase(), CheckoutPhase::Ready);
    }

    #[tokio::test]
    async fn test_confirm_rejection_after_order_created() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::rejecting_confirm());
        let (orchestrator, _, analytics) = build(wallet.clone(), gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Declined);
        assert_eq!(gateway.create_calls(), 1);
        assert_eq!(gateway.confirm_calls(), 1);
        assert_eq!(wallet.bound().len(), 1);
        assert_eq!(analytics.failures()[0].stage, "capture");
    }

    #[tokio::test]
    async fn test_bind_failure_declines_before_confirmation() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()).failing_bind());
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, analytics) = build(wallet, gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Declined);
        assert_eq!(gateway.create_calls(), 1);
        assert_eq!(gateway.confirm_calls(), 0);
        assert_eq!(analytics.failures()[0].stage, "capture");
    }

    #[tokio::test]
    async fn test_duplicate_authorization_creates_one_order() {
        let mut script = happy_script();
        script.push(WalletEvent::Authorized {
            token: "tok-2".to_string(),
        });
        let wallet = Arc::new(ScriptedWallet::new(script));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, _) = build(wallet, gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert!(matches!(outcome, CheckoutOutcome::Settled { .. }));
        assert_eq!(gateway.create_calls(), 1);
        assert_eq!(gateway.confirm_calls(), 1);
    }

    #[tokio::test]
    async fn test_settled_orchestrator_refuses_another_attempt() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, _, _) = build(wallet, gateway);
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Settled { .. }));

        let again = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await;
        assert!(matches!(again, Err(CheckoutError::NotReady)));
    }

    #[tokio::test]
    async fn test_sheet_vanishing_without_verdict_is_abandoned() {
        let wallet = Arc::new(ScriptedWallet::new(vec![]));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, notifier, _) = build(wallet, gateway.clone());
        orchestrator.bootstrap().await;

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Abandoned);
        assert_eq!(gateway.create_calls(), 0);
        assert!(notifier.notices().is_empty());
        assert_eq!(orchestrator.phase(), CheckoutPhase::Ready);
    }

    #[tokio::test]
    async fn test_closed_orchestrator_abandons_without_side_effects() {
        let wallet = Arc::new(ScriptedWallet::new(happy_script()));
        let gateway = Arc::new(RecordingGateway::default());
        let (orchestrator, notifier, _) = build(wallet.clone(), gateway.clone());
        orchestrator.bootstrap().await;
        orchestrator.close();

        let outcome = orchestrator
            .pay(&create_test_reservation(), &form(PaymentOption::Full))
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Abandoned);
        assert_eq!(wallet.sessions_started(), 0);
        assert_eq!(gateway.create_calls(), 0);
        assert!(notifier.notices().is_empty());
    }
}
