use std::fmt;

use serde::{Deserialize, Serialize};

/// Currencies the storefront can display. SAR is the site currency; all
/// catalog prices are quoted in it and converted for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Sar,
    Usd,
    Eur,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Sar => "SAR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Parse a stored currency code. Earlier storefront versions wrote the
    /// code as a plain (non-JSON) string, in whatever casing the UI used.
    pub fn parse(raw: &str) -> Option<Currency> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SAR" => Some(Currency::Sar),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Sar
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Conversion factors out of SAR. Fetched from the backend at bootstrap and
/// cached locally; the defaults keep price display working offline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    #[serde(rename = "SAR_USD")]
    pub sar_usd: f64,
    #[serde(rename = "SAR_EUR")]
    pub sar_eur: f64,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            sar_usd: 0.2666,
            sar_eur: 0.245,
        }
    }
}

impl ExchangeRates {
    /// Convert an SAR amount into the target currency, rounded to cents.
    pub fn from_sar(&self, amount_sar: f64, to: Currency) -> f64 {
        let converted = match to {
            Currency::Sar => amount_sar,
            Currency::Usd => amount_sar * self.sar_usd,
            Currency::Eur => amount_sar * self.sar_eur,
        };
        round_cents(converted)
    }
}

/// Round a monetary amount to two decimal places. Applied at every boundary
/// where an amount is displayed, persisted or sent over the wire.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format an amount the way payment-order APIs expect it: two decimals,
/// no grouping.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", round_cents(amount))
}
