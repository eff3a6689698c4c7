//! XML Validator Screen
//!
//! Drop NF-e files, check each one, export the session's results as CSV and
//! browse the recent validation history.

use fiscal_core::domain::{CollectionKey, ValidationStatus};
use fiscal_core::export::EXPORT_FILE_NAME;
use fiscal_core::xml::{accepts_file, NfeValidation};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::components::{DeleteConfirmButton, DropZone};
use crate::context::use_app;

fn status_label(status: ValidationStatus) -> &'static str {
    match status {
        ValidationStatus::Valid => "Válido",
        ValidationStatus::Invalid => "Inválido",
    }
}

fn field(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

#[component]
fn ResultRow(result: NfeValidation) -> impl IntoView {
    let class = if result.is_valid() { "result valid" } else { "result invalid" };
    let data = result.data.clone().unwrap_or_default();
    let entry_type = data.entry_type().unwrap_or("-");

    view! {
        <tr class=class>
            <td>{result.file_name.clone()}</td>
            <td>{status_label(result.status)}</td>
            <td>{field(&data.version)}</td>
            <td>{field(&data.issuer_cnpj)}</td>
            <td>{field(&data.recipient_doc)}</td>
            <td>{field(&data.number)}</td>
            <td>{field(&data.total_value)}</td>
            <td>{field(&data.emission_date)}</td>
            <td>{field(&data.cfop)}</td>
            <td>{entry_type}</td>
            <td>
                <ul class="issues">
                    {result.errors.iter().map(|e| view! { <li>{e.to_string()}</li> }).collect_view()}
                </ul>
            </td>
        </tr>
    }
}

#[component]
fn HistoryPanel() -> impl IntoView {
    let ctx = use_app();
    let history = Memo::new(move |_| {
        ctx.track(CollectionKey::ValidationHistory);
        commands::validation_history(&ctx.data())
    });
    let on_clear = Callback::new(move |_| match commands::clear_validation_history(&ctx.data()) {
        Ok(()) => ctx.success("Histórico limpo"),
        Err(e) => ctx.error(e.to_string()),
    });

    view! {
        <div class="panel history">
            <div class="panel-header">
                <h3>"Histórico"</h3>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_clear prompt="Limpar histórico?" />
            </div>
            <Show
                when=move || !history.get().is_empty()
                fallback=|| view! { <p class="muted">"Nenhuma validação registrada"</p> }
            >
                <ul>
                    <For
                        each=move || history.get()
                        key=|item| item.id.clone()
                        children=|item| {
                            view! {
                                <li class=if item.status == ValidationStatus::Valid { "valid" } else { "invalid" }>
                                    <span>{item.file_name.clone()}</span>
                                    " "
                                    <span class="muted">{item.date.format("%d/%m/%Y %H:%M").to_string()}</span>
                                    " "
                                    <strong>{status_label(item.status)}</strong>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </div>
    }
}

#[component]
pub fn XmlValidator() -> impl IntoView {
    let ctx = use_app();
    let results = RwSignal::new(Vec::<NfeValidation>::new());
    let pending = RwSignal::new(0usize);

    let on_files = Callback::new(move |files: Vec<web_sys::File>| {
        let (accepted, skipped): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| accepts_file(&f.name()));
        for file in &skipped {
            ctx.error(format!("'{}' não é um arquivo XML", file.name()));
        }
        if accepted.is_empty() {
            return;
        }
        pending.update(|n| *n += accepted.len());
        spawn_local(async move {
            let mut batch = Vec::with_capacity(accepted.len());
            for file in &accepted {
                match commands::read_file_text(file).await {
                    Ok(text) => batch.push((file.name(), text)),
                    Err(e) => {
                        log::warn!("Could not read {}: {}", file.name(), e);
                        ctx.error(format!("Falha ao ler '{}'", file.name()));
                    }
                }
            }
            let count = accepted.len();
            // Screen may have been left while the files were read
            if pending.try_update(|n| *n = n.saturating_sub(count)).is_none() {
                return;
            }
            match commands::validate_files(&ctx.data(), &batch) {
                Ok(checked) => {
                    let valid = checked.iter().filter(|r| r.is_valid()).count();
                    ctx.success(format!("{} arquivo(s) validado(s), {} válido(s)", checked.len(), valid));
                    results.update(|r| r.extend(checked));
                }
                Err(e) => ctx.error(e.to_string()),
            }
        });
    });

    let on_export = move |_| {
        let csv = match commands::export_results_csv(&results.get_untracked()) {
            Ok(csv) => csv,
            Err(e) => return ctx.error(e.to_string()),
        };
        if let Err(e) = commands::download_text(EXPORT_FILE_NAME, "text/csv", &csv) {
            ctx.error(e);
        }
    };

    view! {
        <section class="xml-validator">
            <DropZone
                label="Arraste arquivos XML de NF-e aqui ou selecione"
                accept=".xml"
                on_files=on_files
            />
            <Show when=move || { pending.get() > 0 }>
                <p class="muted">{move || format!("Lendo {} arquivo(s)...", pending.get())}</p>
            </Show>
            <div class="panel-header">
                <h3>{move || format!("Resultados ({})", results.with(|r| r.len()))}</h3>
                <button disabled=move || results.with(|r| r.is_empty()) on:click=on_export>
                    "Exportar CSV"
                </button>
                <button disabled=move || results.with(|r| r.is_empty()) on:click=move |_| results.set(Vec::new())>
                    "Limpar resultados"
                </button>
            </div>
            <table class="results-table">
                <thead>
                    <tr>
                        <th>"Arquivo"</th>
                        <th>"Status"</th>
                        <th>"Versão"</th>
                        <th>"CNPJ Emitente"</th>
                        <th>"Destinatário"</th>
                        <th>"Número"</th>
                        <th>"Valor"</th>
                        <th>"Emissão"</th>
                        <th>"CFOP"</th>
                        <th>"Tipo"</th>
                        <th>"Erros"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        results.get().into_iter().map(|result| view! { <ResultRow result=result /> }).collect_view()
                    }}
                </tbody>
            </table>
            <HistoryPanel />
        </section>
    }
}
