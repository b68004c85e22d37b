use chrono::NaiveDate;
use nuzul_catalog::pricing::{nightly_breakdown, NightlyRate, PriceRating};
use nuzul_catalog::room::RoomDetails;
use nuzul_shared::locale::Language;
use nuzul_shared::money::round_cents;
use serde::{Deserialize, Serialize};

/// One room configuration held in the cart.
///
/// Serialized as-is (camelCase) under the legacy "roomCart" storage key;
/// field names cannot change without migrating persisted carts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: String,
    pub room: RoomDetails,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hotel_id: String,
    pub listing_id: String,
    /// Pricing rules captured at add time, so a catalog change can never
    /// silently reprice an existing cart.
    pub price_rating: PriceRating,
    /// UI accent colour assigned when the item was added.
    pub color_tag: String,
    pub adults: u32,
    pub children: u32,
    /// How many identical rooms of this configuration.
    pub quantity: u32,
    /// Per-night breakdown for the current stay dates.
    pub nightly: Vec<NightlyRate>,
    /// Commission applied on top of supplier rates for this listing.
    pub commission_rate: f64,
}

impl CartLineItem {
    pub fn nights(&self) -> usize {
        self.nightly.len()
    }

    /// Guest price for one room over the whole stay.
    pub fn stay_price(&self) -> f64 {
        round_cents(self.nightly.iter().map(|night| night.selling).sum())
    }

    /// Guest price for this line: stay price times quantity.
    pub fn line_total(&self) -> f64 {
        round_cents(self.stay_price() * self.quantity as f64)
    }

    /// Move the stay to new dates and rebuild the nightly breakdown from the
    /// captured pricing rules.
    pub(crate) fn reprice(&mut self, start_date: NaiveDate, end_date: NaiveDate) {
        self.start_date = start_date;
        self.end_date = end_date;
        self.nightly = nightly_breakdown(
            &self.price_rating,
            self.commission_rate,
            start_date,
            end_date,
        );
    }
}

/// Payload for adding a room to the cart. Carries everything the line item
/// needs so the cart never calls back into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoom {
    pub id: String,
    pub room: RoomDetails,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hotel_id: String,
    pub listing_id: String,
    pub price_rating: PriceRating,
    pub color_tag: String,
    pub adults: u32,
    pub children: u32,
    pub commission_rate: f64,
}

impl AddRoom {
    pub(crate) fn into_line_item(self) -> CartLineItem {
        let nightly = nightly_breakdown(
            &self.price_rating,
            self.commission_rate,
            self.start_date,
            self.end_date,
        );
        CartLineItem {
            id: self.id,
            room: self.room,
            start_date: self.start_date,
            end_date: self.end_date,
            hotel_id: self.hotel_id,
            listing_id: self.listing_id,
            price_rating: self.price_rating,
            color_tag: self.color_tag,
            adults: self.adults,
            children: self.children,
            quantity: 1,
            nightly,
            commission_rate: self.commission_rate,
        }
    }
}

/// The whole cart session: guest locale, held rooms, derived totals.
///
/// Only `items` and `language` are ever persisted. The derived fields are
/// recomputed from the items on every change and on restore, so a stale or
/// hand-edited persisted total can never survive a reload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub language: Language,
    pub items: Vec<CartLineItem>,
    /// Total rooms across all line items (sum of quantities).
    pub room_count: u32,
    /// Guest total for everything in the cart, in SAR.
    pub total_price: f64,
    pub sidebar_open: bool,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            language: Language::default(),
            items: Vec::new(),
            room_count: 0,
            total_price: 0.0,
            sidebar_open: false,
        }
    }
}

impl CartState {
    /// Rebuild a state from restored parts, deriving the totals.
    pub fn restored(language: Language, items: Vec<CartLineItem>) -> Self {
        let mut state = Self {
            language,
            items,
            ..Default::default()
        };
        state.recompute_totals();
        state
    }

    /// Derive `room_count` and `total_price` from the line items.
    pub fn recompute_totals(&mut self) {
        self.room_count = self.items.iter().map(|item| item.quantity).sum();
        self.total_price = round_cents(
            self.items
                .iter()
                .map(|item| item.stay_price() * item.quantity as f64)
                .sum(),
        );
    }
}
