//! Providers Screen
//!
//! Search the service provider registry, read a provider's withholdings and
//! maintain the records.

use fiscal_core::domain::{CollectionKey, Provider};
use fiscal_core::validation::{FieldErrors, ProviderForm};
use leptos::prelude::*;

use crate::commands;
use crate::components::{DeleteConfirmButton, FieldError};
use crate::context::use_app;

#[derive(Debug, Clone, PartialEq)]
enum Editing {
    New,
    Existing(String),
}

fn text_field(
    form: RwSignal<ProviderForm>,
    errors: RwSignal<FieldErrors>,
    label: &'static str,
    key: &'static str,
    get: fn(&ProviderForm) -> &String,
    set: fn(&mut ProviderForm, String),
) -> impl IntoView {
    view! {
        <label class="form-field">
            {label}
            <input
                type="text"
                prop:value=move || form.with(|f| get(f).clone())
                on:input=move |ev| form.update(|f| set(f, event_target_value(&ev)))
            />
            <FieldError errors=errors field=key />
        </label>
    }
}

fn check_field(
    form: RwSignal<ProviderForm>,
    label: &'static str,
    get: fn(&ProviderForm) -> bool,
    set: fn(&mut ProviderForm, bool),
) -> impl IntoView {
    view! {
        <label class="form-check">
            <input
                type="checkbox"
                prop:checked=move || form.with(get)
                on:change=move |ev| form.update(|f| set(f, event_target_checked(&ev)))
            />
            {label}
        </label>
    }
}

#[component]
fn ProviderEditor(editing: Editing, initial: ProviderForm, on_done: Callback<()>) -> impl IntoView {
    let ctx = use_app();
    let form = RwSignal::new(initial);
    let errors = RwSignal::new(FieldErrors::new());
    let title = match &editing {
        Editing::New => "Novo prestador",
        Editing::Existing(_) => "Editar prestador",
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let data = ctx.data();
        let current = form.get_untracked();
        let result = match &editing {
            Editing::New => commands::create_provider(&data, &current),
            Editing::Existing(id) => commands::update_provider(&data, id, &current),
        };
        match result {
            Ok(provider) => {
                ctx.success(format!("Prestador {} salvo", provider.nome));
                on_done.run(());
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <form class="provider-editor" on:submit=on_submit>
            <h3>{title}</h3>
            <div class="form-grid">
                {text_field(form, errors, "Empresa", "empresa", |f| &f.empresa, |f, v| f.empresa = v)}
                {text_field(form, errors, "Nome", "nome", |f| &f.nome, |f, v| f.nome = v)}
                {text_field(form, errors, "Código fornecedor", "fornecedor", |f| &f.fornecedor, |f, v| f.fornecedor = v)}
                {text_field(form, errors, "Descrição", "descricao", |f| &f.descricao, |f, v| f.descricao = v)}
                {text_field(form, errors, "Serviço", "servico", |f| &f.servico, |f, v| f.servico = v)}
                {text_field(form, errors, "TES", "tes", |f| &f.tes, |f, v| f.tes = v)}
                {text_field(form, errors, "Conta", "conta", |f| &f.conta, |f, v| f.conta = v)}
                {text_field(form, errors, "Vencimento", "vencimento", |f| &f.vencimento, |f, v| f.vencimento = v)}
                {text_field(form, errors, "Município", "municipio", |f| &f.municipio, |f, v| f.municipio = v)}
                {text_field(form, errors, "E-mail", "email", |f| &f.email, |f, v| f.email = v)}
                {text_field(
                    form,
                    errors,
                    "Link de autenticidade",
                    "autenticidadeUrl",
                    |f| &f.autenticidade_url,
                    |f, v| f.autenticidade_url = v,
                )}
            </div>
            <div class="form-checks">
                {check_field(form, "NFTS", |f| f.nfts, |f, v| f.nfts = v)}
                {check_field(form, "Simples Nacional", |f| f.simples_nacional, |f, v| f.simples_nacional = v)}
            </div>
            <div class="form-grid withholdings">
                {check_field(form, "Retém ISS", |f| f.iss, |f, v| f.iss = v)}
                {text_field(form, errors, "Código ISS", "codigoIss", |f| &f.codigo_iss, |f, v| f.codigo_iss = v)}
                {check_field(form, "Retém IR", |f| f.ir, |f, v| f.ir = v)}
                {text_field(form, errors, "Código IR", "codigoIr", |f| &f.codigo_ir, |f, v| f.codigo_ir = v)}
                {check_field(form, "Retém PCC", |f| f.pcc, |f, v| f.pcc = v)}
                {text_field(form, errors, "Código PCC", "codigoPcc", |f| &f.codigo_pcc, |f, v| f.codigo_pcc = v)}
                {check_field(form, "Retém INSS", |f| f.inss, |f, v| f.inss = v)}
                {text_field(form, errors, "Código INSS", "codigoInss", |f| &f.codigo_inss, |f, v| f.codigo_inss = v)}
            </div>
            {text_field(form, errors, "Editado por", "editor", |f| &f.editor, |f, v| f.editor = v)}
            <div class="form-actions">
                <button type="submit">"Salvar"</button>
                <button type="button" on:click=move |_| on_done.run(())>"Cancelar"</button>
            </div>
        </form>
    }
}

#[component]
fn ProviderDetails(provider: Provider, on_edit: Callback<()>) -> impl IntoView {
    let ctx = use_app();
    let id = provider.id.clone();
    let on_delete = Callback::new(move |_| match commands::delete_provider(&ctx.data(), &id) {
        Ok(_) => ctx.success("Prestador excluído"),
        Err(e) => ctx.error(e.to_string()),
    });
    let withholdings = provider
        .withholdings()
        .into_iter()
        .map(|(kind, code)| format!("{} ({})", kind.label(), code.unwrap_or("sem código")))
        .collect::<Vec<_>>();

    view! {
        <div class="provider-details">
            <div class="panel-header">
                <h3>{provider.nome.clone()}</h3>
                <button class="edit-btn" on:click=move |_| on_edit.run(())>"Editar"</button>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
            </div>
            <dl>
                <dt>"Empresa"</dt>
                <dd>{provider.empresa.clone()}</dd>
                <dt>"Fornecedor"</dt>
                <dd>{provider.fornecedor.clone()}</dd>
                <dt>"Serviço"</dt>
                <dd>{provider.servico.clone()}</dd>
                <dt>"TES / Conta"</dt>
                <dd>{format!("{} / {}", provider.tes, provider.conta)}</dd>
                <dt>"Vencimento"</dt>
                <dd>{provider.vencimento.clone()}</dd>
                <dt>"Município"</dt>
                <dd>{provider.municipio.clone()}</dd>
            </dl>
            {provider.is_exempt_from_federal().then(|| view! { <span class="badge">"Simples Nacional"</span> })}
            {provider.nfts.then(|| view! { <span class="badge">"NFTS"</span> })}
            <h4>"Retenções"</h4>
            {if withholdings.is_empty() {
                view! { <p class="muted">"Sem retenções"</p> }.into_any()
            } else {
                view! { <ul>{withholdings.into_iter().map(|w| view! { <li>{w}</li> }).collect_view()}</ul> }.into_any()
            }}
            {provider.email.clone().map(|email| view! { <p>{format!("E-mail: {}", email)}</p> })}
            {provider
                .autenticidade_url
                .clone()
                .map(|url| view! { <a href=url.clone() target="_blank" rel="noopener">"Verificar autenticidade"</a> })}
            {provider.last_modified_at.map(|at| {
                let by = provider.last_modified_by.clone().unwrap_or_else(|| "-".into());
                view! { <p class="muted">{format!("Alterado por {} em {}", by, at.format("%d/%m/%Y %H:%M"))}</p> }
            })}
        </div>
    }
}

#[component]
pub fn Providers() -> impl IntoView {
    let ctx = use_app();
    let query = RwSignal::new(String::new());
    let selected = RwSignal::new(None::<String>);
    let editing = RwSignal::new(None::<Editing>);

    let results = Memo::new(move |_| {
        ctx.track(CollectionKey::Providers);
        commands::search_providers(&ctx.data(), &query.get())
    });
    let current = Memo::new(move |_| {
        let id = selected.get()?;
        results.with(|list| list.iter().find(|p| p.id == id).cloned())
    });
    let stop_editing = Callback::new(move |_| editing.set(None));

    view! {
        <section class="providers">
            <div class="provider-sidebar">
                <input
                    type="search"
                    placeholder="Buscar por nome, código ou serviço"
                    prop:value=move || query.get()
                    on:input=move |ev| query.set(event_target_value(&ev))
                />
                <button class="new-btn" on:click=move |_| editing.set(Some(Editing::New))>"Novo prestador"</button>
                <Show
                    when=move || !results.get().is_empty()
                    fallback=|| view! { <p class="muted">"Nenhum prestador encontrado"</p> }
                >
                    <ul class="provider-list">
                        <For
                            each=move || results.get()
                            key=|p| (p.id.clone(), p.nome.clone())
                            children=move |p| {
                                let id = p.id.clone();
                                let active_id = p.id.clone();
                                view! {
                                    <li
                                        class=move || {
                                            if selected.get().as_deref() == Some(active_id.as_str()) { "active" } else { "" }
                                        }
                                        on:click=move |_| {
                                            editing.set(None);
                                            selected.set(Some(id.clone()));
                                        }
                                    >
                                        <strong>{p.nome.clone()}</strong>
                                        <span class="muted">{format!(" {}", p.servico)}</span>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>
            </div>
            <div class="provider-main">
                {move || match (editing.get(), current.get()) {
                    (Some(Editing::New), _) => {
                        view! { <ProviderEditor editing=Editing::New initial=ProviderForm::default() on_done=stop_editing /> }
                            .into_any()
                    }
                    (Some(Editing::Existing(id)), Some(provider)) if provider.id == id => {
                        let initial = commands::provider_form(&provider, "");
                        view! { <ProviderEditor editing=Editing::Existing(id) initial=initial on_done=stop_editing /> }
                            .into_any()
                    }
                    (_, Some(provider)) => {
                        let id = provider.id.clone();
                        let on_edit = Callback::new(move |_| editing.set(Some(Editing::Existing(id.clone()))));
                        view! { <ProviderDetails provider=provider on_edit=on_edit /> }.into_any()
                    }
                    (_, None) => view! { <p class="muted">"Selecione um prestador"</p> }.into_any(),
                }}
            </div>
        </section>
    }
}
