//! Persistence for the booking engine: layered application configuration,
//! the local key-value stores behind [`nuzul_core::storage::LocalStore`],
//! and the typed view over persisted guest preferences.

pub mod app_config;
pub mod local;
pub mod preferences;
