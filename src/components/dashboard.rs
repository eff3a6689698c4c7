//! Dashboard
//!
//! Ticket numbers by status and topic, the admin board progress, rejected
//! invoices still owed and reminders that came due.

use fiscal_core::domain::{CollectionKey, Topic};
use fiscal_core::views::{rejected_summary, task_stats, DashboardStats};
use fiscal_core::Clock;
use leptos::prelude::*;

use crate::commands;
use crate::context::use_app;

fn money(value: f64) -> String {
    format!("R$ {:.2}", value).replace('.', ",")
}

#[component]
pub fn Dashboard() -> impl IntoView {
    let ctx = use_app();

    let stats = Memo::new(move |_| {
        ctx.track(CollectionKey::Tickets);
        DashboardStats::from_tickets(&commands::list_tickets(&ctx.data()))
    });
    let tasks = Memo::new(move |_| {
        ctx.track(CollectionKey::Tasks);
        task_stats(&commands::list_tasks(&ctx.data()))
    });
    let rejected = Memo::new(move |_| {
        ctx.track(CollectionKey::RejectedNotes);
        let data = ctx.data();
        let today = data.clock.now().date_naive();
        rejected_summary(&commands::list_rejected_notes(&data), today)
    });
    let due = Memo::new(move |_| {
        ctx.track(CollectionKey::NotasFiscais);
        commands::due_notas(&ctx.data())
    });

    view! {
        <section class="dashboard">
            <div class="stat-cards">
                <div class="stat-card">
                    <span class="stat-value">{move || stats.get().total}</span>
                    <span class="stat-label">"Chamados"</span>
                </div>
                <div class="stat-card open">
                    <span class="stat-value">{move || stats.get().open_count}</span>
                    <span class="stat-label">"Abertos"</span>
                </div>
                <div class="stat-card progress">
                    <span class="stat-value">{move || stats.get().in_progress_count}</span>
                    <span class="stat-label">"Em andamento"</span>
                </div>
                <div class="stat-card resolved">
                    <span class="stat-value">{move || format!("{}%", stats.get().resolved_rate)}</span>
                    <span class="stat-label">
                        {move || format!("Resolvidos ({})", stats.get().resolved_count)}
                    </span>
                </div>
            </div>

            <div class="dashboard-row">
                <div class="panel">
                    <h3>"Chamados por assunto"</h3>
                    <ul class="topic-bars">
                        {move || {
                            let stats = stats.get();
                            let max = stats.by_topic.values().copied().max().unwrap_or(0).max(1);
                            Topic::ALL
                                .into_iter()
                                .map(|topic| {
                                    let count = stats.by_topic.get(&topic).copied().unwrap_or(0);
                                    let width = format!("width: {}%", count * 100 / max);
                                    view! {
                                        <li>
                                            <span class="topic-label">{topic.label()}</span>
                                            <span class="topic-bar" style=width></span>
                                            <span class="topic-count">{count}</span>
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                </div>

                <div class="panel">
                    <h3>"Tarefas administrativas"</h3>
                    <p>
                        {move || {
                            let t = tasks.get();
                            format!("{} de {} concluídas ({}%)", t.done, t.total, t.completion_rate)
                        }}
                    </p>
                    <progress max="100" value=move || tasks.get().completion_rate.to_string()></progress>
                </div>

                <div class="panel">
                    <h3>"Notas recusadas"</h3>
                    <p>{move || format!("{} nota(s), {}", rejected.get().count, money(rejected.get().total_value))}</p>
                    <p class="muted">
                        {move || match rejected.get().next_due_date {
                            Some(date) => format!("Próximo vencimento: {}", date.format("%d/%m/%Y")),
                            None => "Nenhum vencimento futuro".to_string(),
                        }}
                    </p>
                </div>
            </div>

            <Show when=move || !due.get().is_empty()>
                <div class="panel reminders">
                    <h3>"Lembretes vencidos"</h3>
                    <ul>
                        {move || {
                            due.get()
                                .into_iter()
                                .map(|nota| {
                                    view! {
                                        <li>
                                            <strong>{format!("NF {}", nota.number)}</strong>
                                            " "
                                            <span>{nota.notes.clone()}</span>
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                </div>
            </Show>
        </section>
    }
}
