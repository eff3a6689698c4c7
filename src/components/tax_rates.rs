//! Tax Rates Screen
//!
//! ICMS lookup by origin and destination, the TES code finder and, when the
//! admin area is unlocked, inline edits of the rate table.

use fiscal_core::domain::{CollectionKey, Origin, TaxRateRow};
use fiscal_core::validation::FieldErrors;
use fiscal_core::views::{lookup_tes, tes_companies, Operation, Purpose, SaleType, TaxQuote, TesQuery};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::components::{DeleteConfirmButton, FieldError};
use crate::context::use_app;

fn percent(rate: f64) -> String {
    format!("{}%", rate).replace('.', ",")
}

#[derive(Debug, Clone, PartialEq)]
enum LookupState {
    Idle,
    Loading,
    Found(TaxQuote),
    NotFound(String),
}

#[component]
fn RateLookup() -> impl IntoView {
    let ctx = use_app();
    let origin = RwSignal::new(Origin::Es);
    let destination = RwSignal::new(String::new());
    let state = RwSignal::new(LookupState::Idle);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let code = destination.get_untracked();
        if code.trim().is_empty() {
            return;
        }
        let data = ctx.data();
        let delay = data.config().lookup_delay_ms;
        let origin = origin.get_untracked();
        state.set(LookupState::Loading);
        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            let next = match commands::lookup_rate(&data, origin, &code) {
                Some(quote) => LookupState::Found(quote),
                None => LookupState::NotFound(code.trim().to_ascii_uppercase()),
            };
            // Screen may be gone by now
            let _ = state.try_set(next);
        });
    };

    view! {
        <form class="rate-lookup" on:submit=on_submit>
            <h3>"Consultar alíquota"</h3>
            <label>
                "Origem"
                <select on:change=move |ev| {
                    if let Some(o) = Origin::from_code(&event_target_value(&ev)) {
                        origin.set(o);
                    }
                }>
                    {Origin::ALL
                        .into_iter()
                        .map(|o| view! { <option value=o.code()>{o.code()}</option> })
                        .collect_view()}
                </select>
            </label>
            <label>
                "Destino (UF)"
                <input
                    type="text"
                    maxlength="2"
                    prop:value=move || destination.get()
                    on:input=move |ev| destination.set(event_target_value(&ev))
                />
            </label>
            <button type="submit" disabled=move || state.get() == LookupState::Loading>
                "Consultar"
            </button>
            {move || match state.get() {
                LookupState::Idle => ().into_any(),
                LookupState::Loading => view! { <p class="muted">"Consultando..."</p> }.into_any(),
                LookupState::NotFound(code) => {
                    view! { <p class="not-found">{format!("Nenhuma alíquota cadastrada para {}", code)}</p> }
                        .into_any()
                }
                LookupState::Found(quote) => {
                    view! {
                        <div class="quote">
                            <h4>{format!("{} ({})", quote.state_name, quote.state_code)}</h4>
                            <dl>
                                <dt>"Interestadual"</dt>
                                <dd>{percent(quote.interstate_rate)}</dd>
                                <dt>"Interna destino"</dt>
                                <dd>{percent(quote.internal_rate)}</dd>
                                <dt>"Importados"</dt>
                                <dd>{percent(quote.imported_rate)}</dd>
                                <dt>"DIFAL"</dt>
                                <dd>{percent(quote.difal)}</dd>
                            </dl>
                            {quote.protocol.then(|| view! { <span class="badge">"Protocolo ICMS"</span> })}
                            {quote.suframa.then(|| view! { <span class="badge">"SUFRAMA"</span> })}
                        </div>
                    }
                        .into_any()
                }
            }}
        </form>
    }
}

#[component]
fn TesLookup() -> impl IntoView {
    let companies = tes_companies();
    let company = RwSignal::new(companies.first().map(|(code, _)| code.to_string()).unwrap_or_default());
    let operation = RwSignal::new(Operation::Compra);
    let purpose = RwSignal::new(None::<Purpose>);
    let sale_type = RwSignal::new(None::<SaleType>);
    let suframa = RwSignal::new(None::<bool>);

    let codes = Memo::new(move |_| {
        lookup_tes(&TesQuery {
            company: company.get(),
            operation: operation.get(),
            purpose: purpose.get(),
            sale_type: sale_type.get(),
            suframa: suframa.get(),
        })
        .to_vec()
    });

    view! {
        <div class="tes-lookup">
            <h3>"Consultar TES"</h3>
            <label>
                "Empresa"
                <select on:change=move |ev| company.set(event_target_value(&ev))>
                    {companies
                        .into_iter()
                        .map(|(code, name)| view! { <option value=code>{format!("{} - {}", code, name)}</option> })
                        .collect_view()}
                </select>
            </label>
            <label>
                "Operação"
                <select on:change=move |ev| {
                    let op = if event_target_value(&ev) == "venda" { Operation::Venda } else { Operation::Compra };
                    operation.set(op);
                    purpose.set(None);
                    sale_type.set(None);
                    suframa.set(None);
                }>
                    <option value="compra">"Compra"</option>
                    <option value="venda">"Venda"</option>
                </select>
            </label>
            <Show when=move || operation.get() == Operation::Venda>
                <label>
                    "Finalidade"
                    <select on:change=move |ev| {
                        purpose.set(match event_target_value(&ev).as_str() {
                            "revenda" => Some(Purpose::Revenda),
                            "consumo" => Some(Purpose::Consumo),
                            _ => None,
                        })
                    }>
                        <option value="">"Selecione..."</option>
                        <option value="revenda">"Revenda"</option>
                        <option value="consumo">"Consumo"</option>
                    </select>
                </label>
                <label>
                    "Tipo de venda"
                    <select on:change=move |ev| {
                        sale_type.set(match event_target_value(&ev).as_str() {
                            "normal" => Some(SaleType::Normal),
                            "zfm" => Some(SaleType::Zfm),
                            _ => None,
                        });
                        suframa.set(None);
                    }>
                        <option value="">"Selecione..."</option>
                        <option value="normal">"Normal"</option>
                        <option value="zfm">"Zona Franca de Manaus"</option>
                    </select>
                </label>
                <Show when=move || sale_type.get() == Some(SaleType::Zfm)>
                    <label>
                        "Cliente com SUFRAMA?"
                        <select on:change=move |ev| {
                            suframa.set(match event_target_value(&ev).as_str() {
                                "sim" => Some(true),
                                "nao" => Some(false),
                                _ => None,
                            })
                        }>
                            <option value="">"Selecione..."</option>
                            <option value="sim">"Sim"</option>
                            <option value="nao">"Não"</option>
                        </select>
                    </label>
                </Show>
            </Show>
            <Show
                when=move || !codes.get().is_empty()
                fallback=|| view! { <p class="muted">"Nenhum TES encontrado"</p> }
            >
                <table class="tes-table">
                    <thead>
                        <tr>
                            <th>"TES"</th>
                            <th>"CFOP"</th>
                            <th>"Descrição"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            codes
                                .get()
                                .into_iter()
                                .map(|c| {
                                    view! {
                                        <tr>
                                            <td>{c.code}</td>
                                            <td>{c.cfop}</td>
                                            <td>{c.description}</td>
                                        </tr>
                                    }
                                })
                                .collect_view()
                        }}
                    </tbody>
                </table>
            </Show>
        </div>
    }
}

#[component]
fn TaxRateEditor(row: TaxRateRow, on_done: Callback<()>) -> impl IntoView {
    let ctx = use_app();
    let code = row.destination_state_code.clone();
    let form = RwSignal::new(commands::tax_rate_form(&row));
    let errors = RwSignal::new(FieldErrors::new());

    let save = move |_| {
        match commands::update_tax_rate(&ctx.data(), &code, &form.get_untracked()) {
            Ok(updated) => {
                ctx.success(format!("Alíquotas de {} atualizadas", updated.destination_state_code));
                on_done.run(());
            }
            Err(e) => {
                errors.set(e.fields());
                ctx.error(e.to_string());
            }
        }
    };

    view! {
        <tr class="tax-editor">
            <td>{row.destination_state_name.clone()}</td>
            {Origin::ALL
                .into_iter()
                .enumerate()
                .map(|(i, origin)| {
                    let field = format!("interstateRate.{}", origin.code());
                    view! {
                        <td>
                            <input
                                type="text"
                                class="rate-input"
                                prop:value=move || form.with(|f| f.interstate.get(i).map(|(_, v)| v.clone()).unwrap_or_default())
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    form.update(|f| {
                                        if let Some(slot) = f.interstate.get_mut(i) {
                                            slot.1 = value;
                                        }
                                    });
                                }
                            />
                            <FieldError errors=errors field=field />
                        </td>
                    }
                })
                .collect_view()}
            <td>
                <input
                    type="text"
                    class="rate-input"
                    prop:value=move || form.with(|f| f.imported_rate.clone())
                    on:input=move |ev| form.update(|f| f.imported_rate = event_target_value(&ev))
                />
                <FieldError errors=errors field="importedRate" />
            </td>
            <td>
                <input
                    type="text"
                    class="rate-input"
                    prop:value=move || form.with(|f| f.internal_rate.clone())
                    on:input=move |ev| form.update(|f| f.internal_rate = event_target_value(&ev))
                />
                <FieldError errors=errors field="internalDestinationRate" />
            </td>
            <td>
                <input
                    type="checkbox"
                    prop:checked=move || form.with(|f| f.suframa)
                    on:change=move |ev| form.update(|f| f.suframa = event_target_checked(&ev))
                />
            </td>
            <td>
                <input
                    type="checkbox"
                    prop:checked=move || form.with(|f| f.protocol)
                    on:change=move |ev| form.update(|f| f.protocol = event_target_checked(&ev))
                />
            </td>
            <td>
                <button class="save-btn" on:click=save>"Salvar"</button>
                <button class="cancel-btn" on:click=move |_| on_done.run(())>"Cancelar"</button>
            </td>
        </tr>
    }
}

#[component]
fn TaxRateTable() -> impl IntoView {
    let ctx = use_app();
    let rows = Memo::new(move |_| {
        ctx.track(CollectionKey::TaxRates);
        commands::list_tax_rates(&ctx.data())
    });
    let editing = RwSignal::new(None::<String>);

    let on_restore = Callback::new(move |_| match commands::restore_default_tax_rates(&ctx.data()) {
        Ok(()) => {
            editing.set(None);
            ctx.success("Tabela de alíquotas restaurada");
        }
        Err(e) => ctx.error(e.to_string()),
    });
    let stop_editing = Callback::new(move |_| editing.set(None));

    view! {
        <div class="tax-table-panel">
            <div class="panel-header">
                <h3>"Tabela de alíquotas"</h3>
                <Show when=move || ctx.admin_unlocked.get()>
                    <DeleteConfirmButton
                        button_class="restore-btn"
                        on_confirm=on_restore
                        label="Restaurar padrão"
                        prompt="Restaurar valores padrão?"
                    />
                </Show>
            </div>
            <table class="tax-table">
                <thead>
                    <tr>
                        <th>"Destino"</th>
                        {Origin::ALL.into_iter().map(|o| view! { <th>{o.code()}</th> }).collect_view()}
                        <th>"Importados"</th>
                        <th>"Interna"</th>
                        <th>"SUFRAMA"</th>
                        <th>"Protocolo"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || rows.get()
                        key=|row| format!("{:?}", row)
                        children=move |row| {
                            let code = row.destination_state_code.clone();
                            let is_editing = {
                                let code = code.clone();
                                move || editing.get().as_deref() == Some(code.as_str())
                            };
                            let display = row.clone();
                            view! {
                                <Show
                                    when=is_editing
                                    fallback=move || {
                                        let row = display.clone();
                                        let code = code.clone();
                                        view! {
                                            <tr>
                                                <td>{format!("{} ({})", row.destination_state_name, row.destination_state_code)}</td>
                                                {Origin::ALL
                                                    .into_iter()
                                                    .map(|o| {
                                                        let rate = row.interstate_rate.get(&o).map(|r| percent(*r)).unwrap_or_else(|| "-".into());
                                                        view! { <td>{rate}</td> }
                                                    })
                                                    .collect_view()}
                                                <td>{percent(row.imported_rate)}</td>
                                                <td>{percent(row.internal_destination_rate)}</td>
                                                <td>{if row.suframa { "Sim" } else { "Não" }}</td>
                                                <td>{if row.protocol { "Sim" } else { "Não" }}</td>
                                                <td>
                                                    <Show when=move || ctx.admin_unlocked.get()>
                                                        {
                                                            let code = code.clone();
                                                            view! {
                                                                <button class="edit-btn" on:click=move |_| editing.set(Some(code.clone()))>
                                                                    "Editar"
                                                                </button>
                                                            }
                                                        }
                                                    </Show>
                                                </td>
                                            </tr>
                                        }
                                    }
                                >
                                    <TaxRateEditor row=row.clone() on_done=stop_editing />
                                </Show>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}

#[component]
pub fn TaxRates() -> impl IntoView {
    view! {
        <section class="tax-rates">
            <div class="lookup-row">
                <RateLookup />
                <TesLookup />
            </div>
            <TaxRateTable />
        </section>
    }
}
