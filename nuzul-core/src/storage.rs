/// Storage keys, kept byte-identical to what earlier storefront versions
/// wrote so a returning guest's persisted cart and preferences survive.
pub mod keys {
    /// JSON array of cart line items.
    pub const ROOM_CART: &str = "roomCart";
    /// JSON-encoded language name ("English" / "Arabic").
    pub const LANGUAGE: &str = "lang";
    /// Plain (non-JSON) currency code, historically in mixed casing.
    pub const SELECTED_CURRENCY: &str = "selectedCurrency";
    /// JSON object of SAR conversion factors.
    pub const EXCHANGE_RATES: &str = "rates";
}

/// Small synchronous key-value store scoped to this engine, the analog of a
/// browser's per-origin local storage.
///
/// Writes are best-effort: implementations log failures and return normally,
/// so a full disk or read-only mount degrades persistence without breaking
/// the session.
pub trait LocalStore: Send + Sync {
    /// Raw value for `key`, or `None` if the key was never written.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Drop `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str);
}
