//! Composition root for the storefront. Wires local storage, the cart,
//! guest preferences and the backend client into one [`Session`] the
//! rendering layer drives, and hands out checkout orchestrators bound to
//! the session's configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod session;

pub use session::{Session, SessionError};

/// Install the global tracing subscriber. `RUST_LOG` wins when set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nuzul_app=debug,nuzul_cart=debug,nuzul_checkout=debug,nuzul_client=debug,nuzul_store=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
