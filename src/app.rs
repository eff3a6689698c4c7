//! Fiscal Desk App
//!
//! Opens the store, seeds the lookup tables on first run and hosts the tabs.

use std::collections::HashSet;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::components::{
    Admin, Assistant, Calculator, Dashboard, Manuals, Providers, RejectedNotes, Tab, TabBar, TaxRates, Tickets,
    ToastHost, XmlValidator,
};
use crate::context::AppContext;
use crate::storage::{bridge_storage_events, open_data_context};

const REMINDER_CHECK_MS: u32 = 60_000;

/// Toast each invoice reminder once when it comes due
fn watch_reminders(ctx: AppContext) {
    spawn_local(async move {
        let mut announced = HashSet::new();
        loop {
            for nota in commands::due_notas(&ctx.data()) {
                if announced.insert(nota.id.clone()) {
                    ctx.success(format!("Lembrete: NF {} {}", nota.number, nota.notes));
                }
            }
            TimeoutFuture::new(REMINDER_CHECK_MS).await;
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let data = open_data_context();
    rolling_logger::set_level(data.config().log_level());
    if let Err(e) = data.seed_defaults() {
        let _ = rolling_logger::error(&format!("Seeding default tables failed: {}", e));
    }
    bridge_storage_events(data.bus.clone());

    let ctx = AppContext::new(data);
    provide_context(ctx);
    ctx.listen();
    watch_reminders(ctx);

    let current = RwSignal::new(Tab::Dashboard);

    view! {
        <div class="app-layout">
            <header class="app-header">
                <h1>"Fiscal Desk"</h1>
                <TabBar current=current />
            </header>
            <main class="main-content">
                {move || match current.get() {
                    Tab::Dashboard => view! { <Dashboard /> }.into_any(),
                    Tab::Tickets => view! { <Tickets /> }.into_any(),
                    Tab::TaxRates => view! { <TaxRates /> }.into_any(),
                    Tab::Providers => view! { <Providers /> }.into_any(),
                    Tab::XmlValidator => view! { <XmlValidator /> }.into_any(),
                    Tab::Manuals => view! { <Manuals /> }.into_any(),
                    Tab::RejectedNotes => view! { <RejectedNotes /> }.into_any(),
                    Tab::Admin => view! { <Admin /> }.into_any(),
                    Tab::Calculator => view! { <Calculator /> }.into_any(),
                    Tab::Assistant => view! { <Assistant /> }.into_any(),
                }}
            </main>
            <ToastHost />
        </div>
    }
}
