//! HTTP client for the reservation backend. Thin and typed: every endpoint
//! gets a method returning a deserialized response or a
//! [`nuzul_core::gateway::GatewayError`].

pub mod client;
pub mod types;

pub use client::BackendClient;
