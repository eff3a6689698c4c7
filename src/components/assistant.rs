//! Assistant Screen
//!
//! Ask a tax question; the answer comes from the configured chat service.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::context::use_app;

#[derive(Debug, Clone, PartialEq)]
struct Exchange {
    question: String,
    answer: String,
}

#[component]
pub fn Assistant() -> impl IntoView {
    let ctx = use_app();
    let question = RwSignal::new(String::new());
    let asking = RwSignal::new(false);
    let exchanges = RwSignal::new(Vec::<Exchange>::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let asked = question.get_untracked();
        if asked.trim().is_empty() || asking.get_untracked() {
            return;
        }
        asking.set(true);
        let data = ctx.data();
        spawn_local(async move {
            let result = commands::ask_assistant(&data, &asked).await;
            // Screen may have been left while waiting
            if asking.try_set(false).is_some() {
                return;
            }
            match result {
                Ok(answer) => {
                    question.set(String::new());
                    exchanges.update(|list| {
                        list.insert(0, Exchange { question: asked, answer });
                    });
                }
                Err(e) => ctx.error(e.to_string()),
            }
        });
    };

    view! {
        <section class="assistant">
            <form on:submit=on_submit>
                <textarea
                    placeholder="Digite sua dúvida fiscal"
                    prop:value=move || question.get()
                    on:input=move |ev| question.set(event_target_value(&ev))
                ></textarea>
                <button type="submit" disabled=move || asking.get()>
                    {move || if asking.get() { "Consultando..." } else { "Perguntar" }}
                </button>
            </form>
            <ul class="exchanges">
                {move || {
                    exchanges
                        .get()
                        .into_iter()
                        .map(|ex| {
                            view! {
                                <li>
                                    <p class="question">{ex.question}</p>
                                    <p class="answer">{ex.answer}</p>
                                </li>
                            }
                        })
                        .collect_view()
                }}
            </ul>
        </section>
    }
}
