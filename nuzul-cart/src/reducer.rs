use chrono::NaiveDate;
use nuzul_shared::locale::Language;

use crate::models::{AddRoom, CartState};

/// Direction of a quantity change. A closed pair instead of a free-form
/// string, so a misspelled operation cannot exist at any call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityStep {
    Increment,
    Decrement,
}

/// Every operation the cart supports. The set is closed; there is no
/// unknown-action case to fail on at runtime.
#[derive(Debug, Clone)]
pub enum CartAction {
    SetLanguage(Language),
    /// Add a room configuration. Re-adding an existing id bumps its quantity
    /// and keeps the stored configuration untouched.
    AddLineItem(Box<AddRoom>),
    /// Move one item to new stay dates and rebuild its nightly breakdown.
    UpdateLineItemDates {
        id: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    RemoveLineItem {
        id: String,
    },
    SetQuantity {
        id: String,
        step: QuantityStep,
    },
    /// Explicit re-derivation of the totals. Item-changing actions already
    /// recompute on their own; this is an idempotent consistency nudge.
    RecomputeTotals,
    ClearCart,
    OpenCartSidebar,
    CloseCartSidebar,
}

impl CartAction {
    /// Whether this action can change the persisted line-item list.
    pub(crate) fn touches_items(&self) -> bool {
        matches!(
            self,
            CartAction::AddLineItem(_)
                | CartAction::UpdateLineItemDates { .. }
                | CartAction::RemoveLineItem { .. }
                | CartAction::SetQuantity { .. }
                | CartAction::ClearCart
        )
    }
}

/// Pure transition function: current state plus one action yields the next
/// state. Touches no storage and never panics, so any action sequence can be
/// replayed to reconstruct a cart.
pub fn reduce(state: &CartState, action: CartAction) -> CartState {
    let mut next = state.clone();
    match action {
        CartAction::SetLanguage(language) => {
            next.language = language;
        }
        CartAction::AddLineItem(payload) => {
            match next.items.iter_mut().find(|item| item.id == payload.id) {
                Some(existing) => existing.quantity += 1,
                None => next.items.push(payload.into_line_item()),
            }
            next.recompute_totals();
        }
        CartAction::UpdateLineItemDates {
            id,
            start_date,
            end_date,
        } => {
            if end_date <= start_date {
                tracing::warn!(%id, %start_date, %end_date, "ignoring degenerate stay date update");
                return next;
            }
            if let Some(item) = next.items.iter_mut().find(|item| item.id == id) {
                item.reprice(start_date, end_date);
                next.recompute_totals();
            }
        }
        CartAction::RemoveLineItem { id } => {
            next.items.retain(|item| item.id != id);
            next.recompute_totals();
        }
        CartAction::SetQuantity { id, step } => {
            if let Some(item) = next.items.iter_mut().find(|item| item.id == id) {
                item.quantity = match step {
                    QuantityStep::Increment => item.quantity + 1,
                    // Quantity floors at one; removing a line is its own action.
                    QuantityStep::Decrement => item.quantity.saturating_sub(1).max(1),
                };
                next.recompute_totals();
            }
        }
        CartAction::RecomputeTotals => {
            next.recompute_totals();
        }
        CartAction::ClearCart => {
            next.items.clear();
            next.recompute_totals();
        }
        CartAction::OpenCartSidebar => {
            next.sidebar_open = true;
        }
        CartAction::CloseCartSidebar => {
            next.sidebar_open = false;
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuzul_catalog::pricing::PriceRating;
    use nuzul_catalog::room::RoomDetails;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_payload(id: &str, nightly: f64) -> AddRoom {
        AddRoom {
            id: id.to_string(),
            room: RoomDetails::new("QUAD", "Quad Room"),
            start_date: date(2025, 3, 10),
            end_date: date(2025, 3, 13),
            hotel_id: "hotel-1".to_string(),
            listing_id: "listing-1".to_string(),
            price_rating: PriceRating::Flat { nightly },
            color_tag: "#1d4ed8".to_string(),
            adults: 2,
            children: 0,
            commission_rate: 0.0,
        }
    }

    fn add(state: &CartState, payload: AddRoom) -> CartState {
        reduce(state, CartAction::AddLineItem(Box::new(payload)))
    }

    #[test]
    fn test_add_new_item_appends_with_quantity_one() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].quantity, 1);
        assert_eq!(state.room_count, 1);
        // Three nights at 100.
        assert_eq!(state.total_price, 300.0);
    }

    #[test]
    fn test_readding_same_id_increments_and_keeps_original_config() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));

        // Second add for the same id with different details must not
        // overwrite the stored configuration.
        let mut conflicting = create_test_payload("a", 999.0);
        conflicting.color_tag = "#dc2626".to_string();
        let state = add(&state, conflicting);

        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].quantity, 2);
        assert_eq!(state.items[0].color_tag, "#1d4ed8");
        assert_eq!(state.items[0].price_rating, PriceRating::Flat { nightly: 100.0 });
        assert_eq!(state.total_price, 600.0);
    }

    #[test]
    fn test_totals_scale_with_nights_quantity_and_items() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        let state = add(&state, create_test_payload("b", 50.0));
        let state = reduce(
            &state,
            CartAction::SetQuantity {
                id: "a".to_string(),
                step: QuantityStep::Increment,
            },
        );

        // a: 2 rooms x 3 nights x 100 = 600; b: 1 room x 3 nights x 50 = 150.
        assert_eq!(state.room_count, 3);
        assert_eq!(state.total_price, 750.0);
    }

    #[test]
    fn test_commission_reaches_the_totals() {
        let mut payload = create_test_payload("a", 100.0);
        payload.commission_rate = 0.1;
        let state = add(&CartState::default(), payload);
        assert_eq!(state.items[0].nightly[0].selling, 110.0);
        assert_eq!(state.total_price, 330.0);
    }

    #[test]
    fn test_update_dates_rebuilds_breakdown_and_totals() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        let state = reduce(
            &state,
            CartAction::UpdateLineItemDates {
                id: "a".to_string(),
                start_date: date(2025, 3, 20),
                end_date: date(2025, 3, 25),
            },
        );

        assert_eq!(state.items[0].start_date, date(2025, 3, 20));
        assert_eq!(state.items[0].nights(), 5);
        assert_eq!(state.total_price, 500.0);
    }

    #[test]
    fn test_update_dates_refuses_degenerate_range() {
        let before = add(&CartState::default(), create_test_payload("a", 100.0));
        let after = reduce(
            &before,
            CartAction::UpdateLineItemDates {
                id: "a".to_string(),
                start_date: date(2025, 3, 13),
                end_date: date(2025, 3, 13),
            },
        );
        assert_eq!(after, before);
    }

    #[test]
    fn test_update_dates_unknown_id_is_a_noop() {
        let before = add(&CartState::default(), create_test_payload("a", 100.0));
        let after = reduce(
            &before,
            CartAction::UpdateLineItemDates {
                id: "missing".to_string(),
                start_date: date(2025, 4, 1),
                end_date: date(2025, 4, 3),
            },
        );
        assert_eq!(after, before);
    }

    #[test]
    fn test_remove_line_item() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        let state = add(&state, create_test_payload("b", 50.0));

        let state = reduce(&state, CartAction::RemoveLineItem { id: "a".to_string() });
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].id, "b");
        assert_eq!(state.total_price, 150.0);

        // Removing an id that is not there changes nothing.
        let again = reduce(&state, CartAction::RemoveLineItem { id: "a".to_string() });
        assert_eq!(again, state);
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        let mut state = add(&state, create_test_payload("a", 100.0));
        assert_eq!(state.items[0].quantity, 2);

        for _ in 0..4 {
            state = reduce(
                &state,
                CartAction::SetQuantity {
                    id: "a".to_string(),
                    step: QuantityStep::Decrement,
                },
            );
        }
        assert_eq!(state.items[0].quantity, 1);
        assert_eq!(state.room_count, 1);
        assert_eq!(state.total_price, 300.0);
    }

    #[test]
    fn test_clear_cart_keeps_language_and_sidebar() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        let state = reduce(&state, CartAction::SetLanguage(Language::Arabic));
        let state = reduce(&state, CartAction::OpenCartSidebar);

        let state = reduce(&state, CartAction::ClearCart);
        assert!(state.items.is_empty());
        assert_eq!(state.room_count, 0);
        assert_eq!(state.total_price, 0.0);
        assert_eq!(state.language, Language::Arabic);
        assert!(state.sidebar_open);
    }

    #[test]
    fn test_recompute_totals_is_idempotent() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        let once = reduce(&state, CartAction::RecomputeTotals);
        let twice = reduce(&once, CartAction::RecomputeTotals);
        assert_eq!(once, state);
        assert_eq!(twice, state);
    }

    #[test]
    fn test_sidebar_actions_only_touch_the_flag() {
        let base = add(&CartState::default(), create_test_payload("a", 100.0));

        let open = reduce(&base, CartAction::OpenCartSidebar);
        assert!(open.sidebar_open);
        assert_eq!(open.items, base.items);

        let closed = reduce(&open, CartAction::CloseCartSidebar);
        assert!(!closed.sidebar_open);
    }

    #[test]
    fn test_set_language_preserves_items() {
        let state = add(&CartState::default(), create_test_payload("a", 100.0));
        let state = reduce(&state, CartAction::SetLanguage(Language::Arabic));
        assert_eq!(state.language, Language::Arabic);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.total_price, 300.0);
    }
}
