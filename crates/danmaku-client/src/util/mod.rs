mod callback;

pub use callback::async_callback;

/// Milliseconds on the page's monotonic clock.
///
/// Same time base as `requestAnimationFrame` timestamps.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}
