//! Hook for the anonymous per-browser user identifier.

use yew::prelude::*;

use crate::hooks::use_localstorage;
use crate::storage::USER_ID_KEY;

/// Returns a stable anonymous user id, generating one on first visit.
#[hook]
pub fn use_user_id() -> UseStateHandle<String> {
    use_localstorage(USER_ID_KEY, || format!("anon-{}", uuid::Uuid::new_v4()))
}
