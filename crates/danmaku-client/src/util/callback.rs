use yew::Callback;

/// Callback that runs an async task per event on the local executor.
///
/// `deps` is cloned into every task together with the event payload.
pub fn async_callback<Deps, F, Fut, E>(deps: Deps, f: F) -> Callback<E>
where
    Deps: Clone + 'static,
    E: 'static,
    F: Fn(Deps, E) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    Callback::from(move |event: E| {
        let deps = deps.clone();
        wasm_bindgen_futures::spawn_local(f(deps, event));
    })
}
