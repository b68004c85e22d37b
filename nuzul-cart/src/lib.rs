//! The shopping cart: a pure reducer over a closed action set, the line-item
//! model it operates on, and the store that owns the state, persists it and
//! broadcasts snapshots to the rendering layer.

pub mod models;
pub mod reducer;
pub mod store;
