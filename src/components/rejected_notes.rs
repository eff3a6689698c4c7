//! Rejected Notes Screen
//!
//! Invoices refused on receipt, with their installment due dates.

use fiscal_core::domain::{CollectionKey, RejectedNote};
use fiscal_core::validation::{DueDateInput, FieldErrors, RejectedNoteForm};
use fiscal_core::Clock;
use leptos::prelude::*;

use crate::commands;
use crate::components::{input_class, DeleteConfirmButton, FieldError};
use crate::context::use_app;

fn money(value: f64) -> String {
    format!("R$ {:.2}", value).replace('.', ",")
}

fn text_input(
    form: RwSignal<RejectedNoteForm>,
    errors: RwSignal<FieldErrors>,
    label: &'static str,
    key: &'static str,
    kind: &'static str,
    get: fn(&RejectedNoteForm) -> &String,
    set: fn(&mut RejectedNoteForm, String),
) -> impl IntoView {
    view! {
        <label class="form-field">
            {label}
            <input
                type=kind
                class=input_class(errors, key)
                prop:value=move || form.with(|f| get(f).clone())
                on:input=move |ev| form.update(|f| set(f, event_target_value(&ev)))
            />
            <FieldError errors=errors field=key />
        </label>
    }
}

#[component]
fn DueDateList(form: RwSignal<RejectedNoteForm>, errors: RwSignal<FieldErrors>) -> impl IntoView {
    // Rows are rebuilt only when one is added or removed
    let count = Memo::new(move |_| form.with(|f| f.due_dates.len()));

    view! {
        <fieldset class="due-dates">
            <legend>"Vencimentos"</legend>
            {move || {
                (0..count.get())
                    .map(|i| {
                        let date_key = format!("dueDates[{}].date", i);
                        let value_key = format!("dueDates[{}].value", i);
                        view! {
                            <div class="due-date-row">
                                <input
                                    type="date"
                                    prop:value=move || form.with(|f| f.due_dates.get(i).map(|d| d.date.clone()).unwrap_or_default())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        form.update(|f| {
                                            if let Some(d) = f.due_dates.get_mut(i) {
                                                d.date = value;
                                            }
                                        })
                                    }
                                />
                                <FieldError errors=errors field=date_key />
                                <input
                                    type="text"
                                    placeholder="Valor"
                                    prop:value=move || form.with(|f| f.due_dates.get(i).map(|d| d.value.clone()).unwrap_or_default())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        form.update(|f| {
                                            if let Some(d) = f.due_dates.get_mut(i) {
                                                d.value = value;
                                            }
                                        })
                                    }
                                />
                                <FieldError errors=errors field=value_key />
                                <button
                                    type="button"
                                    class="remove-btn"
                                    on:click=move |_| form.update(|f| {
                                        if i < f.due_dates.len() {
                                            f.due_dates.remove(i);
                                        }
                                    })
                                >
                                    "−"
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
            }}
            <FieldError errors=errors field="dueDates" />
            <button
                type="button"
                class="add-btn"
                on:click=move |_| form.update(|f| f.due_dates.push(DueDateInput::default()))
            >
                "Adicionar vencimento"
            </button>
        </fieldset>
    }
}

#[component]
fn RejectedNoteEditor(
    /// `None` creates a new note
    editing: Option<String>,
    initial: RejectedNoteForm,
    on_done: Callback<()>,
) -> impl IntoView {
    let ctx = use_app();
    let form = RwSignal::new(initial);
    let errors = RwSignal::new(FieldErrors::new());
    let is_new = editing.is_none();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let data = ctx.data();
        let current = form.get_untracked();
        let result = match &editing {
            None => commands::create_rejected_note(&data, &current),
            Some(id) => commands::update_rejected_note(&data, id, &current),
        };
        match result {
            Ok(note) => {
                ctx.success(format!("Nota {} salva", note.nfe_number));
                on_done.run(());
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <form class="rejected-editor" on:submit=on_submit>
            <h3>{if is_new { "Nova nota recusada" } else { "Editar nota recusada" }}</h3>
            <div class="form-grid">
                {text_input(form, errors, "Número NF-e", "nfeNumber", "text", |f| &f.nfe_number, |f, v| f.nfe_number = v)}
                {text_input(form, errors, "Fornecedor", "supplierName", "text", |f| &f.supplier_name, |f, v| f.supplier_name = v)}
                {text_input(form, errors, "Emissão", "issueDate", "date", |f| &f.issue_date, |f, v| f.issue_date = v)}
                {text_input(form, errors, "Recusa", "rejectionDate", "date", |f| &f.rejection_date, |f, v| f.rejection_date = v)}
                {text_input(form, errors, "Valor total", "totalValue", "text", |f| &f.total_value, |f, v| f.total_value = v)}
            </div>
            <label class="form-field">
                "Motivo da recusa"
                <textarea
                    prop:value=move || form.with(|f| f.rejection_reason.clone())
                    on:input=move |ev| form.update(|f| f.rejection_reason = event_target_value(&ev))
                ></textarea>
                <FieldError errors=errors field="rejectionReason" />
            </label>
            <DueDateList form=form errors=errors />
            <div class="form-actions">
                <button type="submit">"Salvar"</button>
                <button type="button" on:click=move |_| on_done.run(())>"Cancelar"</button>
            </div>
        </form>
    }
}

#[component]
fn RejectedNoteRow(note: RejectedNote, on_edit: Callback<RejectedNote>) -> impl IntoView {
    let ctx = use_app();
    let id = note.id.clone();
    let on_delete = Callback::new(move |_| match commands::delete_rejected_note(&ctx.data(), &id) {
        Ok(_) => ctx.success("Nota excluída"),
        Err(e) => ctx.error(e.to_string()),
    });
    let today = ctx.data().clock.now().date_naive();
    let next_due = note
        .next_due_date(today)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".into());
    let edit_target = note.clone();

    view! {
        <tr>
            <td>{note.nfe_number.clone()}</td>
            <td>{note.supplier_name.clone()}</td>
            <td>{note.issue_date.format("%d/%m/%Y").to_string()}</td>
            <td>{note.rejection_date.format("%d/%m/%Y").to_string()}</td>
            <td>{money(note.total_value)}</td>
            <td>{note.rejection_reason.clone()}</td>
            <td>{next_due}</td>
            <td>
                <button class="edit-btn" on:click=move |_| on_edit.run(edit_target.clone())>"Editar"</button>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
            </td>
        </tr>
    }
}

#[derive(Debug, Clone)]
enum Editing {
    New,
    Existing(String, RejectedNoteForm),
}

#[component]
pub fn RejectedNotes() -> impl IntoView {
    let ctx = use_app();
    let notes = Memo::new(move |_| {
        ctx.track(CollectionKey::RejectedNotes);
        commands::list_rejected_notes(&ctx.data())
    });
    let editing = RwSignal::new(None::<Editing>);
    let stop_editing = Callback::new(move |_| editing.set(None));
    let on_edit = Callback::new(move |note: RejectedNote| {
        editing.set(Some(Editing::Existing(note.id.clone(), commands::rejected_note_form(&note))));
    });

    view! {
        <section class="rejected-notes">
            <div class="panel-header">
                <h3>"Notas recusadas"</h3>
                <button class="new-btn" on:click=move |_| editing.set(Some(Editing::New))>"Nova nota"</button>
            </div>
            {move || match editing.get() {
                None => ().into_any(),
                Some(Editing::New) => {
                    let initial = RejectedNoteForm {
                        due_dates: vec![DueDateInput::default()],
                        ..Default::default()
                    };
                    view! { <RejectedNoteEditor editing=None initial=initial on_done=stop_editing /> }.into_any()
                }
                Some(Editing::Existing(id, form)) => {
                    view! { <RejectedNoteEditor editing=Some(id) initial=form on_done=stop_editing /> }.into_any()
                }
            }}
            <table class="rejected-table">
                <thead>
                    <tr>
                        <th>"NF-e"</th>
                        <th>"Fornecedor"</th>
                        <th>"Emissão"</th>
                        <th>"Recusa"</th>
                        <th>"Valor"</th>
                        <th>"Motivo"</th>
                        <th>"Próx. vencimento"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || notes.get()
                        key=|note| format!("{:?}", note)
                        children=move |note| view! { <RejectedNoteRow note=note on_edit=on_edit /> }
                    />
                </tbody>
            </table>
        </section>
    }
}
