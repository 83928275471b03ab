//! Danmaku-Live Client
//!
//! Yew WASM frontend: countdown banner, fluid background and the floating
//! comment overlay.
//!
//! This crate is WASM-only. Use `trunk build` or `cargo check --target wasm32-unknown-unknown`.

#[cfg(not(target_arch = "wasm32"))]
compile_error!(
    "danmaku-client only supports wasm32 target. Use: cargo check -p danmaku-client --target wasm32-unknown-unknown"
);

mod app;
mod components;
mod config;
mod hooks;
mod network;
mod pages;
mod routes;
mod storage;
mod util;

use app::App;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_web::MakeWebConsoleWriter;

fn main() {
    // Initialize custom panic hook that redirects to panic page
    pages::set_panic_hook();

    let filter = EnvFilter::new("info,danmaku_core=info,danmaku_client=debug");

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new())
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();

    yew::Renderer::<App>::new().render();
}
