//! Tab Bar Component
//!
//! Top-level navigation between the desk screens.

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Tickets,
    TaxRates,
    Providers,
    XmlValidator,
    Manuals,
    RejectedNotes,
    Admin,
    Calculator,
    Assistant,
}

impl Tab {
    pub const ALL: [Tab; 10] = [
        Tab::Dashboard,
        Tab::Tickets,
        Tab::TaxRates,
        Tab::Providers,
        Tab::XmlValidator,
        Tab::Manuals,
        Tab::RejectedNotes,
        Tab::Admin,
        Tab::Calculator,
        Tab::Assistant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Tickets => "Chamados",
            Tab::TaxRates => "Alíquotas",
            Tab::Providers => "Prestadores",
            Tab::XmlValidator => "Validador XML",
            Tab::Manuals => "Manuais",
            Tab::RejectedNotes => "Notas Recusadas",
            Tab::Admin => "Admin",
            Tab::Calculator => "Calculadora",
            Tab::Assistant => "Assistente",
        }
    }
}

#[component]
pub fn TabBar(current: RwSignal<Tab>) -> impl IntoView {
    view! {
        <nav class="tab-bar">
            {Tab::ALL
                .into_iter()
                .map(|tab| {
                    let tab_class = move || if current.get() == tab { "tab active" } else { "tab" };
                    view! {
                        <button class=tab_class on:click=move |_| current.set(tab)>
                            {tab.label()}
                        </button>
                    }
                })
                .collect_view()}
        </nav>
    }
}
