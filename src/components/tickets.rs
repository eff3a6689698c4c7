//! Tickets Screen
//!
//! Open a ticket and work the queue column by column.

use fiscal_core::domain::{CollectionKey, Ticket, TicketStatus, Topic};
use fiscal_core::validation::{FieldErrors, TicketForm};
use leptos::prelude::*;

use crate::commands;
use crate::components::{DeleteConfirmButton, FieldError};
use crate::context::use_app;

#[component]
fn NewTicketForm() -> impl IntoView {
    let ctx = use_app();
    let name = RwSignal::new(String::new());
    let topic = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let file_name = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = TicketForm {
            name: name.get_untracked(),
            topic: topic.get_untracked(),
            description: description.get_untracked(),
            file_name: Some(file_name.get_untracked()),
        };
        match commands::create_ticket(&ctx.data(), &form) {
            Ok(ticket) => {
                errors.set(FieldErrors::new());
                name.set(String::new());
                topic.set(String::new());
                description.set(String::new());
                file_name.set(String::new());
                ctx.success(format!("Chamado #{} aberto", ticket.id));
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <form class="ticket-form" on:submit=on_submit>
            <h3>"Novo chamado"</h3>
            <label>
                "Nome"
                <input
                    type="text"
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                />
                <FieldError errors=errors field="name" />
            </label>
            <label>
                "Assunto"
                <select on:change=move |ev| topic.set(event_target_value(&ev)) prop:value=move || topic.get()>
                    <option value="">"Selecione..."</option>
                    {Topic::ALL
                        .into_iter()
                        .map(|t| view! { <option value=t.label()>{t.label()}</option> })
                        .collect_view()}
                </select>
                <FieldError errors=errors field="topic" />
            </label>
            <label>
                "Descrição"
                <textarea
                    prop:value=move || description.get()
                    on:input=move |ev| description.set(event_target_value(&ev))
                ></textarea>
                <FieldError errors=errors field="description" />
            </label>
            <label>
                "Anexo"
                <input
                    type="file"
                    on:change=move |ev| {
                        let picked = commands::files_from_event(&ev);
                        file_name.set(picked.first().map(|f| f.name()).unwrap_or_default());
                    }
                />
            </label>
            <button type="submit">"Abrir chamado"</button>
        </form>
    }
}

#[component]
fn TicketCard(ticket: Ticket) -> impl IntoView {
    let ctx = use_app();
    let id = ticket.id.clone();
    let id_for_delete = ticket.id.clone();

    let move_to = move |status: TicketStatus| {
        if let Err(e) = commands::set_ticket_status(&ctx.data(), &id, status) {
            ctx.error(e.to_string());
        }
    };
    let on_delete = Callback::new(move |_| {
        if let Err(e) = commands::delete_ticket(&ctx.data(), &id_for_delete) {
            ctx.error(e.to_string());
        }
    });
    let current = ticket.status;

    view! {
        <div class="ticket-card">
            <div class="ticket-header">
                <span class="ticket-topic">{ticket.topic.label()}</span>
                <span class="ticket-date">{ticket.created_at.format("%d/%m/%Y %H:%M").to_string()}</span>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
            </div>
            <strong>{ticket.name.clone()}</strong>
            <p>{ticket.description.clone()}</p>
            {ticket.file_name.clone().map(|f| view! { <span class="ticket-attachment">{f}</span> })}
            <div class="ticket-actions">
                {TicketStatus::ALL
                    .into_iter()
                    .filter(move |s| *s != current)
                    .map(|status| {
                        let move_to = move_to.clone();
                        view! {
                            <button class="status-btn" on:click=move |_| move_to(status)>
                                {format!("→ {}", status.label())}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

#[component]
pub fn Tickets() -> impl IntoView {
    let ctx = use_app();

    view! {
        <section class="tickets">
            <NewTicketForm />
            <div class="ticket-board">
                {TicketStatus::ALL
                    .into_iter()
                    .map(|status| {
                        let column = Memo::new(move |_| {
                            ctx.track(CollectionKey::Tickets);
                            commands::tickets_by_status(&ctx.data(), status)
                        });
                        view! {
                            <div class="ticket-column">
                                <h3>{move || format!("{} ({})", status.label(), column.get().len())}</h3>
                                <For
                                    each=move || column.get()
                                    key=|t| (t.id.clone(), t.status)
                                    children=|ticket| view! { <TicketCard ticket=ticket /> }
                                />
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}
