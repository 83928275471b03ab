//! Panic page displayed when a WASM panic occurs.
//!
//! The visitor only gets a reload prompt; details stay in the console and in
//! localStorage for whoever debugs it.

use crate::routes::Route;
use yew::prelude::*;
use yew_router::prelude::*;

const PANIC_INFO_KEY: &str = "$danmaku-live$/panic-info";

/// Retrieves panic info from localStorage.
fn get_panic_info() -> Option<String> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    storage.get_item(PANIC_INFO_KEY).ok()?
}

/// Clears panic info from localStorage.
fn clear_panic_info() {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.remove_item(PANIC_INFO_KEY);
        }
    }
}

/// Sets up a panic hook that logs the panic, saves it to localStorage and
/// redirects to the panic page.
pub fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        // Console output with JS stack trace
        console_error_panic_hook::hook(info);

        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());
        let panic_info = format!("{info}\n\nLocation: {location}");

        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                let _ = storage.set_item(PANIC_INFO_KEY, &panic_info);
            }

            // Avoid a redirect loop if the panic page itself panics
            let on_panic_page = window
                .location()
                .pathname()
                .is_ok_and(|path| path == "/panic");
            if !on_panic_page {
                let _ = window.location().set_pathname("/panic");
            }
        }
    }));
}

/// Panic page component.
#[function_component(PanicPage)]
pub fn panic_page() -> Html {
    let panic_info = use_state(get_panic_info);

    let on_reload = Callback::from(move |_: MouseEvent| {
        clear_panic_info();
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href("/");
        }
    });

    html! {
        <main class="page panic-page">
            <div class="panic-container">
                <h1>{ "Something went wrong" }</h1>
                <p class="panic-description">
                    { "The page hit an unexpected error. Reloading usually fixes it." }
                </p>

                <button onclick={on_reload} class="btn-primary">
                    { "Reload" }
                </button>

                if let Some(info) = &*panic_info {
                    <details class="panic-info-box">
                        <summary>{ "Error details" }</summary>
                        <pre class="panic-details">{ info }</pre>
                    </details>
                }

                <div class="panic-navigation">
                    <Link<Route> to={Route::Home}>{ "Back to the countdown" }</Link<Route>>
                </div>
            </div>
        </main>
    }
}
