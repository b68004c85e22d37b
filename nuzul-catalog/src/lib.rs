//! Hotel catalog domain: room display data, the nightly pricing rules a
//! listing carries, and search-form validation.

pub mod pricing;
pub mod room;
pub mod search;
