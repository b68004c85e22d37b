use std::env;
use std::path::PathBuf;

use nuzul_shared::money::ExchangeRates;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub rates: RatesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the per-key storage files.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    /// Currency the payment-order provider settles in.
    #[serde(default = "default_order_currency")]
    pub order_currency: String,
    /// Share of the reservation total charged when paying a deposit.
    #[serde(default = "default_deposit_fraction")]
    pub deposit_fraction: f64,
    /// Deadline for the wallet SDK to come up before the flow gives up.
    #[serde(default = "default_wallet_load_timeout")]
    pub wallet_load_timeout_seconds: u64,
    /// How long a settled checkout keeps the success notice on screen
    /// before the host refreshes the reservation view.
    #[serde(default = "default_refresh_delay")]
    pub refresh_delay_seconds: u64,
    /// Merchant country code shown on the payment sheet.
    #[serde(default = "default_merchant_country")]
    pub merchant_country: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RatesConfig {
    #[serde(default = "default_sar_usd")]
    pub sar_usd: f64,
    #[serde(default = "default_sar_eur")]
    pub sar_eur: f64,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".nuzul")
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_order_currency() -> String {
    "USD".to_string()
}

fn default_deposit_fraction() -> f64 {
    0.30
}

fn default_wallet_load_timeout() -> u64 {
    10
}

fn default_refresh_delay() -> u64 {
    3
}

fn default_merchant_country() -> String {
    "SA".to_string()
}

fn default_sar_usd() -> f64 {
    ExchangeRates::default().sar_usd
}

fn default_sar_eur() -> f64 {
    ExchangeRates::default().sar_eur
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            order_currency: default_order_currency(),
            deposit_fraction: default_deposit_fraction(),
            wallet_load_timeout_seconds: default_wallet_load_timeout(),
            refresh_delay_seconds: default_refresh_delay(),
            merchant_country: default_merchant_country(),
        }
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            sar_usd: default_sar_usd(),
            sar_eur: default_sar_eur(),
        }
    }
}

impl RatesConfig {
    /// Configured fallback rates, used until the backend serves fresh ones.
    pub fn as_rates(&self) -> ExchangeRates {
        ExchangeRates {
            sar_usd: self.sar_usd,
            sar_eur: self.sar_eur,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file.
            // Every key has a serde default, so a missing file still works.
            .add_source(config::File::with_name("config/default").required(false))
            // Add in the current environment file (optional).
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file that is not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment,
            // e.g. NUZUL__API__BASE_URL overrides api.base_url.
            .add_source(config::Environment::with_prefix("NUZUL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
