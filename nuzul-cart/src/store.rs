use std::sync::Arc;

use chrono::NaiveDate;
use nuzul_core::storage::{keys, LocalStore};
use nuzul_shared::locale::Language;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::models::{AddRoom, CartLineItem, CartState};
use crate::reducer::{reduce, CartAction, QuantityStep};

/// Application-wide cart provider. Owns the state, runs every action through
/// the reducer, persists the line-item list and language, and pushes a state
/// snapshot to subscribers after each dispatch.
///
/// Dispatch is synchronous: when it returns, the in-memory state and the
/// persisted copy are both current. Storage failures are absorbed by the
/// backend and degrade persistence only.
pub struct CartStore {
    state: Mutex<CartState>,
    storage: Arc<dyn LocalStore>,
    updates: broadcast::Sender<CartState>,
}

impl CartStore {
    /// Restore a cart session from storage. Absent or corrupt entries fall
    /// back to an empty cart and the default language; restore never fails.
    pub fn restore(storage: Arc<dyn LocalStore>) -> Self {
        let language = match storage.get(keys::LANGUAGE) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored language unreadable, using default");
                Language::default()
            }),
            None => Language::default(),
        };
        let items: Vec<CartLineItem> = match storage.get(keys::ROOM_CART) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored cart unreadable, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let state = CartState::restored(language, items);
        tracing::info!(
            items = state.items.len(),
            rooms = state.room_count,
            "cart session restored"
        );

        let (updates, _) = broadcast::channel(100);
        Self {
            state: Mutex::new(state),
            storage,
            updates,
        }
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> CartState {
        self.state.lock().clone()
    }

    /// Subscribe to post-dispatch state snapshots. A lagging subscriber only
    /// loses intermediate snapshots, never the ability to catch up.
    pub fn subscribe(&self) -> broadcast::Receiver<CartState> {
        self.updates.subscribe()
    }

    /// Apply one action: reduce, persist what changed, notify subscribers.
    pub fn dispatch(&self, action: CartAction) {
        let persist_items = action.touches_items();
        let persist_language = matches!(action, CartAction::SetLanguage(_));

        let next = {
            let mut state = self.state.lock();
            let next = reduce(&state, action);
            *state = next.clone();
            next
        };

        if persist_items {
            match serde_json::to_string(&next.items) {
                Ok(json) => self.storage.set(keys::ROOM_CART, &json),
                Err(e) => tracing::error!(error = %e, "cart serialization failed, skipping persist"),
            }
        }
        if persist_language {
            match serde_json::to_string(&next.language) {
                Ok(json) => self.storage.set(keys::LANGUAGE, &json),
                Err(e) => tracing::error!(error = %e, "language serialization failed, skipping persist"),
            }
        }

        // Nobody subscribed is fine; the snapshot is simply dropped.
        let _ = self.updates.send(next);
    }

    // ==== Imperative wrappers, one per action ====

    pub fn set_language(&self, language: Language) {
        self.dispatch(CartAction::SetLanguage(language));
    }

    pub fn add_room(&self, payload: AddRoom) {
        self.dispatch(CartAction::AddLineItem(Box::new(payload)));
    }

    pub fn update_dates(&self, id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) {
        self.dispatch(CartAction::UpdateLineItemDates {
            id: id.into(),
            start_date,
            end_date,
        });
    }

    /// Apply a stay-date change to every item in the cart, one dispatch per
    /// item so each step persists and notifies like any other action.
    pub fn update_all_dates(&self, start_date: NaiveDate, end_date: NaiveDate) {
        let ids: Vec<String> = self
            .snapshot()
            .items
            .iter()
            .map(|item| item.id.clone())
            .collect();
        for id in ids {
            self.dispatch(CartAction::UpdateLineItemDates {
                id,
                start_date,
                end_date,
            });
        }
    }

    pub fn remove_room(&self, id: impl Into<String>) {
        self.dispatch(CartAction::RemoveLineItem { id: id.into() });
    }

    pub fn increment_quantity(&self, id: impl Into<String>) {
        self.dispatch(CartAction::SetQuantity {
            id: id.into(),
            step: QuantityStep::Increment,
        });
    }

    pub fn decrement_quantity(&self, id: impl Into<String>) {
        self.dispatch(CartAction::SetQuantity {
            id: id.into(),
            step: QuantityStep::Decrement,
        });
    }

    pub fn recompute_totals(&self) {
        self.dispatch(CartAction::RecomputeTotals);
    }

    pub fn clear(&self) {
        self.dispatch(CartAction::ClearCart);
    }

    pub fn open_sidebar(&self) {
        self.dispatch(CartAction::OpenCartSidebar);
    }

    pub fn close_sidebar(&self) {
        self.dispatch(CartAction::CloseCartSidebar);
    }
}
