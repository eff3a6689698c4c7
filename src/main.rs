//! Fiscal Desk Frontend Entry Point

mod app;
mod commands;
mod components;
mod context;
mod storage;

use app::App;
use leptos::prelude::*;
use log::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = rolling_logger::init_logger("FiscalDesk", LevelFilter::Info) {
        web_sys::console::warn_1(&format!("Logger not installed: {}", e).into());
    }
    let _ = rolling_logger::info("Fiscal Desk starting");
    mount_to_body(App);
}
