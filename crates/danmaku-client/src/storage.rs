//! LocalStorage utilities for per-browser state.

use danmaku_core::LikeLedger;

/// Anonymous user identifier, generated once per browser.
pub const USER_ID_KEY: &str = "$danmaku-live$/user-id";

/// Comment ids this browser has liked.
const LIKED_COMMENTS_KEY: &str = "$danmaku-live$/liked-comments";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Load the like ledger from LocalStorage. Missing or corrupt data yields
/// an empty ledger.
pub fn load_like_ledger() -> LikeLedger {
    let Some(storage) = local_storage() else {
        return LikeLedger::default();
    };
    let Ok(Some(json)) = storage.get_item(LIKED_COMMENTS_KEY) else {
        return LikeLedger::default();
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Discarding unreadable like ledger");
        LikeLedger::default()
    })
}

/// Save the like ledger to LocalStorage.
pub fn save_like_ledger(ledger: &LikeLedger) -> bool {
    let Some(storage) = local_storage() else {
        return false;
    };
    let Ok(json) = serde_json::to_string(ledger) else {
        return false;
    };
    storage.set_item(LIKED_COMMENTS_KEY, &json).is_ok()
}
