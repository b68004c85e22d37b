use nuzul_shared::money::{round_cents, Currency, ExchangeRates};
use serde::{Deserialize, Serialize};

/// How much of the reservation the guest chose to pay now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentOption {
    /// The whole reservation total.
    Full,
    /// A configured fraction of the total, paid up front.
    Deposit,
    /// What is still owed after earlier payments.
    RemainingBalance,
}

impl PaymentOption {
    /// Backend spelling of the option. The backend only distinguishes
    /// deposit from anything that completes the balance.
    pub fn backend_code(&self) -> &'static str {
        match self {
            PaymentOption::Deposit => "deposit",
            PaymentOption::Full | PaymentOption::RemainingBalance => "full",
        }
    }
}

/// Amounts already recorded on the reservation, in SAR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReservationBalance {
    pub total: f64,
    pub paid: f64,
}

/// The charge for one payment attempt, carried in the site currency (SAR)
/// and in USD for the payment-order provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeAmount {
    pub sar: f64,
    pub usd: f64,
}

impl ChargeAmount {
    /// A charge must be a positive finite amount before any SDK or network
    /// work starts.
    pub fn is_chargeable(&self) -> bool {
        self.sar.is_finite() && self.sar > 0.0
    }
}

/// Compute the charge for the chosen option from the reservation balance.
pub fn compute_charge(
    option: PaymentOption,
    balance: &ReservationBalance,
    deposit_fraction: f64,
    rates: &ExchangeRates,
) -> ChargeAmount {
    let sar = match option {
        PaymentOption::Full => round_cents(balance.total),
        PaymentOption::Deposit => round_cents(balance.total * deposit_fraction),
        PaymentOption::RemainingBalance => round_cents(balance.total - balance.paid),
    };
    ChargeAmount {
        sar,
        usd: rates.from_sar(sar, Currency::Usd),
    }
}
