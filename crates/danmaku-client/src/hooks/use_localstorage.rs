use std::ops::Deref;

use yew::prelude::*;

/// State persisted as JSON under `key`.
///
/// Falls back to `init_fn` when the key is absent or unreadable; the
/// fallback is written back on the first effect run, so generated values
/// stay stable across sessions.
#[hook]
pub fn use_localstorage<T, F>(key: &'static str, init_fn: F) -> UseStateHandle<T>
where
    T: 'static + Clone + serde::Serialize + serde::de::DeserializeOwned + PartialEq,
    F: Fn() -> T + 'static,
{
    let state = use_state(|| {
        let storage = web_sys::window().and_then(|win| win.local_storage().ok().flatten());

        if let Some(storage) = storage {
            if let Ok(Some(value)) = storage.get_item(key) {
                match serde_json::from_str::<T>(&value) {
                    Ok(deserialized) => return deserialized,
                    Err(e) => tracing::warn!(key, error = %e, "Unreadable localStorage value"),
                }
            }
        }
        init_fn()
    });
    {
        use_effect_with(state.clone(), move |state| {
            let storage = web_sys::window().and_then(|win| win.local_storage().ok().flatten());
            if let Some(storage) = storage {
                if let Ok(serialized) = serde_json::to_string(state.deref()) {
                    if storage.set_item(key, &serialized).is_err() {
                        tracing::warn!(key, "Failed to write localStorage");
                    }
                }
            }
            || ()
        });
    }
    state
}
