use chrono::{DateTime, NaiveDate, Utc};
use nuzul_shared::money::ExchangeRates;
use nuzul_shared::pii::Redacted;
use serde::{Deserialize, Serialize};

/// Site-wide content managed in the admin panel: branding, banners, terms
/// and the payment tuning the storefront should honor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub banners: Vec<Banner>,
    #[serde(default)]
    pub terms_html: Option<String>,
    /// Overrides the configured deposit fraction when present.
    #[serde(default)]
    pub deposit_fraction: Option<f64>,
    /// Current conversion rates out of SAR, when the backend publishes them.
    #[serde(default)]
    pub rates: Option<ExchangeRates>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub image_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// A bookable property as the listing endpoints return it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub stars: Option<u8>,
    #[serde(default)]
    pub distance_to_haram_meters: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Whatever else the backend sent; carried for the rendering layer.
    #[serde(default)]
    pub extra: serde_json::Value,
}

fn default_active() -> bool {
    true
}

/// Hotel-owner onboarding request from the property-signup page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySignupRequest {
    pub hotel_name: String,
    pub owner_name: String,
    pub email: Redacted<String>,
    pub phone: Redacted<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySignupResponse {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInfo {
    pub name: String,
    pub phone: Redacted<String>,
    pub email: Redacted<String>,
    pub nationality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedRoom {
    pub room_type: String,
    pub quantity: u32,
    /// Guest price for this line over the whole stay, in SAR.
    pub amount: f64,
}

/// A reservation as the status endpoint returns it, including the running
/// payment balance the checkout flow charges against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub confirmation_number: String,
    pub hotel_name: String,
    pub guest: GuestInfo,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms: Vec<ReservedRoom>,
    /// Reservation total in SAR.
    pub total: f64,
    /// Already paid, in SAR.
    pub paid: f64,
    pub status: ReservationStatus,
}

impl Reservation {
    /// What is still owed, floored at zero.
    pub fn outstanding(&self) -> f64 {
        (self.total - self.paid).max(0.0)
    }
}
