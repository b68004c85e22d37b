//! Checkout: turning a reservation balance and a wallet authorization into a
//! captured, confirmed payment. The orchestrator owns the whole lifecycle;
//! wallet and backend stay behind the seams in `nuzul-core`.

pub mod amount;
pub mod mock;
pub mod orchestrator;
