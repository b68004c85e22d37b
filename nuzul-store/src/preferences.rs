use std::sync::Arc;

use nuzul_core::storage::{keys, LocalStore};
use nuzul_shared::money::{Currency, ExchangeRates};

/// Typed view over the persisted display preferences.
///
/// Reading never fails: absent or unreadable entries degrade to defaults so
/// a guest with a corrupted store still gets a working page. The currency
/// key is historically a plain (non-JSON) string in whatever casing the UI
/// wrote, and must stay that way for carts persisted by older versions.
pub struct Preferences {
    storage: Arc<dyn LocalStore>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn LocalStore>) -> Self {
        Self { storage }
    }

    /// Selected display currency; SAR when absent or unrecognized.
    pub fn currency(&self) -> Currency {
        match self.storage.get(keys::SELECTED_CURRENCY) {
            Some(raw) => Currency::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unrecognized stored currency, falling back to SAR");
                Currency::default()
            }),
            None => Currency::default(),
        }
    }

    pub fn set_currency(&self, currency: Currency) {
        self.storage.set(keys::SELECTED_CURRENCY, currency.code());
    }

    /// Cached conversion rates; built-in fallback when absent or corrupt.
    pub fn rates(&self) -> ExchangeRates {
        self.rates_or(ExchangeRates::default())
    }

    /// Cached conversion rates with a caller-supplied fallback, for hosts
    /// that configure their own defaults.
    pub fn rates_or(&self, fallback: ExchangeRates) -> ExchangeRates {
        match self.storage.get(keys::EXCHANGE_RATES) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored rates unreadable, using fallback");
                fallback
            }),
            None => fallback,
        }
    }

    pub fn set_rates(&self, rates: &ExchangeRates) {
        match serde_json::to_string(rates) {
            Ok(json) => self.storage.set(keys::EXCHANGE_RATES, &json),
            Err(e) => tracing::error!(error = %e, "rates serialization failed, skipping persist"),
        }
    }
}
