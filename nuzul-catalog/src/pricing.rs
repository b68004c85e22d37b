use chrono::{Days, NaiveDate};
use nuzul_shared::money::round_cents;
use serde::{Deserialize, Serialize};

/// A dated band of nights with its own supplier rate. Bounds are inclusive;
/// when bands overlap, the first matching band wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonBand {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub nightly: f64,
}

impl SeasonBand {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Nightly price authority for a listing, captured into the cart at
/// add-to-room time so a later catalog change cannot silently reprice an
/// existing cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PriceRating {
    /// One nightly rate year-round.
    #[serde(rename_all = "camelCase")]
    Flat { nightly: f64 },
    /// Season bands override the default nightly rate.
    #[serde(rename_all = "camelCase")]
    Seasonal {
        default_nightly: f64,
        seasons: Vec<SeasonBand>,
    },
}

impl PriceRating {
    /// Supplier rate for one night.
    pub fn nightly_rate(&self, date: NaiveDate) -> f64 {
        match self {
            PriceRating::Flat { nightly } => *nightly,
            PriceRating::Seasonal {
                default_nightly,
                seasons,
            } => seasons
                .iter()
                .find(|band| band.covers(date))
                .map(|band| band.nightly)
                .unwrap_or(*default_nightly),
        }
    }
}

/// One night of a stay: the supplier base rate and the guest-facing selling
/// price with the line item's commission applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NightlyRate {
    pub date: NaiveDate,
    pub base: f64,
    pub selling: f64,
}

/// The nights covered by a stay of [`start`, `end`): a guest checking out on
/// the morning of `end` does not pay for that date. Degenerate ranges
/// (end on or before start) produce no nights.
pub fn stay_nights(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut nights = Vec::new();
    let mut date = start;
    while date < end {
        nights.push(date);
        date = date + Days::new(1);
    }
    nights
}

/// Build the per-night breakdown for a stay, marking each night up by
/// `commission_rate` and rounding the selling price to cents.
pub fn nightly_breakdown(
    rating: &PriceRating,
    commission_rate: f64,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NightlyRate> {
    stay_nights(start, end)
        .into_iter()
        .map(|date| {
            let base = rating.nightly_rate(date);
            NightlyRate {
                date,
                base,
                selling: round_cents(base * (1.0 + commission_rate)),
            }
        })
        .collect()
}
