//! Admin Screen
//!
//! Password-gated area: the team task board, invoice reminders and the
//! password change form. Unlocking also enables tax table edits.

use fiscal_core::domain::{AdminTask, CollectionKey, NotaFiscal, NotaStatus, TaskStatus};
use fiscal_core::validation::{FieldErrors, LoginForm, NotaFiscalForm, PasswordChangeForm, TaskForm};
use fiscal_core::Clock;
use leptos::prelude::*;

use crate::commands;
use crate::components::{DeleteConfirmButton, FieldError};
use crate::context::use_app;

#[component]
fn LoginGate() -> impl IntoView {
    let ctx = use_app();
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = LoginForm {
            password: password.get_untracked(),
        };
        match commands::login(&ctx.data(), &form) {
            Ok(()) => {
                password.set(String::new());
                errors.set(FieldErrors::new());
                ctx.admin_unlocked.set(true);
                log::info!("Admin area unlocked");
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <form class="login-gate" on:submit=on_submit>
            <h3>"Área administrativa"</h3>
            <input
                type="password"
                placeholder="Senha"
                prop:value=move || password.get()
                on:input=move |ev| password.set(event_target_value(&ev))
            />
            <FieldError errors=errors field="password" />
            <button type="submit">"Entrar"</button>
        </form>
    }
}

#[component]
fn TaskRow(task: AdminTask) -> impl IntoView {
    let ctx = use_app();
    let id = task.id.clone();
    let delete_id = task.id.clone();
    let on_delete = Callback::new(move |_| {
        if let Err(e) = commands::delete_task(&ctx.data(), &delete_id) {
            ctx.error(e.to_string());
        }
    });
    let done = task.status == TaskStatus::Done;

    view! {
        <li class=if done { "task done" } else { "task" }>
            <input
                type="checkbox"
                prop:checked=done
                on:change=move |_| {
                    if let Err(e) = commands::toggle_task(&ctx.data(), &id) {
                        ctx.error(e.to_string());
                    }
                }
            />
            <span>{task.title.clone()}</span>
            <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
        </li>
    }
}

#[component]
fn TaskBoard() -> impl IntoView {
    let ctx = use_app();
    let tasks = Memo::new(move |_| {
        ctx.track(CollectionKey::Tasks);
        commands::list_tasks(&ctx.data())
    });
    let title = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = TaskForm {
            title: title.get_untracked(),
        };
        match commands::create_task(&ctx.data(), &form) {
            Ok(_) => {
                title.set(String::new());
                errors.set(FieldErrors::new());
            }
            Err(e) => errors.set(e.fields()),
        }
    };

    view! {
        <div class="panel tasks">
            <h3>"Tarefas"</h3>
            <form on:submit=on_submit>
                <input
                    type="text"
                    placeholder="Nova tarefa"
                    prop:value=move || title.get()
                    on:input=move |ev| title.set(event_target_value(&ev))
                />
                <button type="submit">"Adicionar"</button>
                <FieldError errors=errors field="title" />
            </form>
            <ul>
                <For
                    each=move || tasks.get()
                    key=|t| (t.id.clone(), t.status)
                    children=|task| view! { <TaskRow task=task /> }
                />
            </ul>
        </div>
    }
}

#[component]
fn NotaRow(nota: NotaFiscal) -> impl IntoView {
    let ctx = use_app();
    let id = nota.id.clone();
    let delete_id = nota.id.clone();
    let on_delete = Callback::new(move |_| {
        if let Err(e) = commands::delete_nota(&ctx.data(), &delete_id) {
            ctx.error(e.to_string());
        }
    });
    let now = ctx.data().clock.now();
    let due = nota.is_due(now);
    let next = match nota.status {
        NotaStatus::Pending => NotaStatus::Done,
        NotaStatus::Done => NotaStatus::Pending,
    };
    let reminder = nota
        .reminder_date
        .map(|at| {
            let local = at - chrono::Duration::minutes(commands::timezone_offset_minutes() as i64);
            local.format("%d/%m/%Y %H:%M").to_string()
        })
        .unwrap_or_else(|| "-".into());

    view! {
        <tr class=if due { "nota due" } else { "nota" }>
            <td>{nota.number.clone()}</td>
            <td>{nota.issue_date.format("%d/%m/%Y").to_string()}</td>
            <td>{nota.notes.clone()}</td>
            <td>{reminder}</td>
            <td>
                <button
                    class="status-btn"
                    on:click=move |_| {
                        if let Err(e) = commands::set_nota_status(&ctx.data(), &id, next) {
                            ctx.error(e.to_string());
                        }
                    }
                >
                    {match nota.status {
                        NotaStatus::Pending => "Pendente",
                        NotaStatus::Done => "Concluída",
                    }}
                </button>
            </td>
            <td>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
            </td>
        </tr>
    }
}

#[component]
fn NotaBoard() -> impl IntoView {
    let ctx = use_app();
    let notas = Memo::new(move |_| {
        ctx.track(CollectionKey::NotasFiscais);
        commands::list_notas(&ctx.data())
    });
    let form = RwSignal::new(NotaFiscalForm::default());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut current = form.get_untracked();
        current.tz_offset_minutes = commands::timezone_offset_minutes();
        match commands::create_nota(&ctx.data(), &current) {
            Ok(nota) => {
                form.set(NotaFiscalForm::default());
                errors.set(FieldErrors::new());
                ctx.success(format!("NF {} cadastrada", nota.number));
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <div class="panel notas">
            <h3>"Notas fiscais"</h3>
            <form class="nota-form" on:submit=on_submit>
                <label>
                    "Número"
                    <input
                        type="text"
                        prop:value=move || form.with(|f| f.number.clone())
                        on:input=move |ev| form.update(|f| f.number = event_target_value(&ev))
                    />
                    <FieldError errors=errors field="number" />
                </label>
                <label>
                    "Emissão"
                    <input
                        type="date"
                        prop:value=move || form.with(|f| f.issue_date.clone())
                        on:input=move |ev| form.update(|f| f.issue_date = event_target_value(&ev))
                    />
                    <FieldError errors=errors field="issueDate" />
                </label>
                <label>
                    "Observações"
                    <input
                        type="text"
                        prop:value=move || form.with(|f| f.notes.clone())
                        on:input=move |ev| form.update(|f| f.notes = event_target_value(&ev))
                    />
                </label>
                <label>
                    "Lembrete"
                    <input
                        type="datetime-local"
                        prop:value=move || form.with(|f| f.reminder.clone())
                        on:input=move |ev| form.update(|f| f.reminder = event_target_value(&ev))
                    />
                    <FieldError errors=errors field="reminderDate" />
                </label>
                <button type="submit">"Cadastrar"</button>
            </form>
            <table>
                <thead>
                    <tr>
                        <th>"Número"</th>
                        <th>"Emissão"</th>
                        <th>"Observações"</th>
                        <th>"Lembrete"</th>
                        <th>"Status"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || notas.get()
                        key=|n| (n.id.clone(), n.status)
                        children=|nota| view! { <NotaRow nota=nota /> }
                    />
                </tbody>
            </table>
        </div>
    }
}

#[component]
fn PasswordChange() -> impl IntoView {
    let ctx = use_app();
    let form = RwSignal::new(PasswordChangeForm::default());
    let errors = RwSignal::new(FieldErrors::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match commands::change_password(&ctx.data(), &form.get_untracked()) {
            Ok(()) => {
                form.set(PasswordChangeForm::default());
                errors.set(FieldErrors::new());
                ctx.success("Senha alterada");
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <form class="panel password-change" on:submit=on_submit>
            <h3>"Alterar senha"</h3>
            <input
                type="password"
                placeholder="Senha atual"
                prop:value=move || form.with(|f| f.current.clone())
                on:input=move |ev| form.update(|f| f.current = event_target_value(&ev))
            />
            <FieldError errors=errors field="currentPassword" />
            <input
                type="password"
                placeholder="Nova senha"
                prop:value=move || form.with(|f| f.new_password.clone())
                on:input=move |ev| form.update(|f| f.new_password = event_target_value(&ev))
            />
            <FieldError errors=errors field="newPassword" />
            <input
                type="password"
                placeholder="Confirmar nova senha"
                prop:value=move || form.with(|f| f.confirm.clone())
                on:input=move |ev| form.update(|f| f.confirm = event_target_value(&ev))
            />
            <FieldError errors=errors field="confirmPassword" />
            <button type="submit">"Salvar"</button>
        </form>
    }
}

#[component]
fn RecentLog() -> impl IntoView {
    let lines = RwSignal::new(rolling_logger::recent_lines());

    view! {
        <div class="panel recent-log">
            <div class="panel-header">
                <h3>"Registro de eventos"</h3>
                <button on:click=move |_| lines.set(rolling_logger::recent_lines())>"Atualizar"</button>
            </div>
            <pre class="log-lines">{move || lines.get().join("\n")}</pre>
        </div>
    }
}

#[component]
pub fn Admin() -> impl IntoView {
    let ctx = use_app();

    view! {
        <section class="admin">
            <Show when=move || ctx.admin_unlocked.get() fallback=|| view! { <LoginGate /> }>
                <div class="panel-header">
                    <h2>"Administração"</h2>
                    <button class="logout-btn" on:click=move |_| ctx.admin_unlocked.set(false)>"Sair"</button>
                </div>
                <div class="admin-grid">
                    <TaskBoard />
                    <NotaBoard />
                    <PasswordChange />
                </div>
                <RecentLog />
            </Show>
        </section>
    }
}
