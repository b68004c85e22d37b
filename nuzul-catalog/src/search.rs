use chrono::NaiveDate;
use nuzul_shared::locale::Msg;
use serde::{Deserialize, Serialize};

/// Guest-entered hotel search form, validated before any navigation or
/// backend call happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchQuery {
    pub city: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub rooms: u32,
    pub guests: u32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchQueryError {
    #[error("Destination and stay dates are required")]
    MissingFields,
    #[error("Check-out must fall after check-in")]
    InvalidDateOrder,
}

impl SearchQueryError {
    /// Notice key for the guest-facing toast.
    pub fn message(&self) -> Msg {
        match self {
            SearchQueryError::MissingFields => Msg::SearchFieldsMissing,
            SearchQueryError::InvalidDateOrder => Msg::SearchDatesInvalid,
        }
    }
}

impl HotelSearchQuery {
    pub fn validate(&self) -> Result<(), SearchQueryError> {
        if self.city.trim().is_empty() {
            return Err(SearchQueryError::MissingFields);
        }
        let (check_in, check_out) = match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => (check_in, check_out),
            _ => return Err(SearchQueryError::MissingFields),
        };
        if check_out <= check_in {
            return Err(SearchQueryError::InvalidDateOrder);
        }
        Ok(())
    }

    /// Nights the guest asked for; zero until the form validates.
    pub fn nights(&self) -> i64 {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                (check_out - check_in).num_days()
            }
            _ => 0,
        }
    }
}
