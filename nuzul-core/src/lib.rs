//! Seams between the booking engine and the outside world: local storage,
//! the reservation backend, the device wallet, notifications and analytics.
//! Concrete implementations live in the infrastructure crates; the flow
//! crates depend only on these traits.

pub mod analytics;
pub mod gateway;
pub mod notify;
pub mod storage;
pub mod wallet;
