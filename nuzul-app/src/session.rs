use std::sync::Arc;
use std::time::Duration;

use nuzul_cart::store::CartStore;
use nuzul_checkout::orchestrator::{CheckoutOrchestrator, CheckoutSettings, ReservationContext};
use nuzul_client::types::{Reservation, SiteConfig};
use nuzul_client::BackendClient;
use nuzul_core::analytics::AnalyticsSink;
use nuzul_core::gateway::GatewayError;
use nuzul_core::notify::Notifier;
use nuzul_core::storage::LocalStore;
use nuzul_core::wallet::WalletProvider;
use nuzul_shared::models::events::CartRestoredEvent;
use nuzul_shared::money::{Currency, ExchangeRates};
use nuzul_store::app_config::{Config, PaymentsConfig};
use nuzul_store::local::{JsonFileStore, StoreError};
use nuzul_store::preferences::Preferences;
use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// One guest session: the restored cart, persisted preferences and the
/// backend client, assembled from the application config.
pub struct Session {
    config: Config,
    cart: CartStore,
    backend: Arc<BackendClient>,
    prefs: Preferences,
    /// Deposit fraction the backend's site config carried, when it did.
    site_deposit_fraction: Mutex<Option<f64>>,
}

impl Session {
    /// Open the on-disk store under `config.storage.dir` and restore the
    /// previous visit's cart and preferences from it.
    pub fn bootstrap(config: Config) -> Result<Self, SessionError> {
        let storage = Arc::new(JsonFileStore::open(&config.storage.dir)?);
        Self::with_storage(config, storage)
    }

    /// Same as [`Session::bootstrap`] over a caller-provided store.
    pub fn with_storage(
        config: Config,
        storage: Arc<dyn LocalStore>,
    ) -> Result<Self, SessionError> {
        let backend = Arc::new(BackendClient::new(
            config.api.base_url.as_str(),
            Duration::from_secs(config.api.timeout_seconds),
        )?);
        let cart = CartStore::restore(storage.clone());
        let prefs = Preferences::new(storage);
        Ok(Self {
            config,
            cart,
            backend,
            prefs,
            site_deposit_fraction: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn client(&self) -> Arc<BackendClient> {
        self.backend.clone()
    }

    /// Selected display currency; SAR when none was ever picked.
    pub fn currency(&self) -> Currency {
        self.prefs.currency()
    }

    pub fn set_currency(&self, currency: Currency) {
        self.prefs.set_currency(currency);
    }

    /// Conversion rates: the last ones the backend served, or the
    /// configured fallback until then.
    pub fn rates(&self) -> ExchangeRates {
        self.prefs.rates_or(self.config.rates.as_rates())
    }

    /// Share of the reservation total charged when paying a deposit: the
    /// backend's value once seen, the configured one until then.
    pub fn deposit_fraction(&self) -> f64 {
        self.site_deposit_fraction
            .lock()
            .unwrap_or(self.config.payments.deposit_fraction)
    }

    /// Fold the parts of the site config the engine owns into the session:
    /// backend rates are persisted, the deposit fraction overrides config.
    pub fn apply_site_config(&self, site: &SiteConfig) {
        if let Some(rates) = &site.rates {
            self.prefs.set_rates(rates);
        }
        if let Some(fraction) = site.deposit_fraction {
            *self.site_deposit_fraction.lock() = Some(fraction);
        }
    }

    /// Fetch the admin-managed site content and apply it, so later
    /// [`Session::rates`] and [`Session::deposit_fraction`] reads serve
    /// fresh values.
    pub async fn refresh_site_config(&self) -> Result<SiteConfig, SessionError> {
        let site = self.backend.site_config().await?;
        self.apply_site_config(&site);
        Ok(site)
    }

    /// Report the restored cart to analytics. Fire-and-forget; a failing
    /// sink only logs.
    pub async fn report_restore(&self, analytics: &dyn AnalyticsSink) {
        let snapshot = self.cart.snapshot();
        let event = CartRestoredEvent {
            item_count: snapshot.items.len(),
            room_count: snapshot.room_count,
            timestamp: chrono::Utc::now().timestamp(),
        };
        if let Err(e) = analytics.cart_restored(event).await {
            tracing::warn!(error = %e, "cart restore event dropped");
        }
    }

    /// Build a checkout orchestrator against the session's backend, using
    /// the freshest rates and deposit fraction available.
    pub fn checkout(
        &self,
        wallet: Arc<dyn WalletProvider>,
        notifier: Arc<dyn Notifier>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> CheckoutOrchestrator {
        let mut settings = settings_from(&self.config.payments);
        settings.deposit_fraction = self.deposit_fraction();
        CheckoutOrchestrator::new(
            wallet,
            self.backend.clone(),
            notifier,
            analytics,
            self.rates(),
            settings,
        )
    }
}

/// Map the payments config onto orchestrator settings.
pub fn settings_from(payments: &PaymentsConfig) -> CheckoutSettings {
    CheckoutSettings {
        order_currency: payments.order_currency.clone(),
        deposit_fraction: payments.deposit_fraction,
        wallet_load_timeout: Duration::from_secs(payments.wallet_load_timeout_seconds),
        refresh_delay: Duration::from_secs(payments.refresh_delay_seconds),
        merchant_country: payments.merchant_country.clone(),
    }
}

/// Project a backend reservation onto the checkout's view of it.
pub fn payment_context(reservation: &Reservation) -> ReservationContext {
    ReservationContext {
        confirmation_number: reservation.confirmation_number.clone(),
        hotel_name: reservation.hotel_name.clone(),
        guest_name: reservation.guest.name.clone(),
        guest_phone: reservation.guest.phone.clone(),
        guest_email: reservation.guest.email.clone(),
        guest_nationality: reservation.guest.nationality.clone(),
        check_in: reservation.check_in,
        check_out: reservation.check_out,
        total: reservation.total,
        paid: reservation.paid,
    }
}
