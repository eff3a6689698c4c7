//! Calculator Screen
//!
//! Keypad plus free typing; accepts `,` as the decimal separator.

use fiscal_core::calculator::{evaluate, format_result};
use leptos::prelude::*;

const KEYS: [&str; 20] = [
    "7", "8", "9", "÷", "4", "5", "6", "×", "1", "2", "3", "-", "0", ",", "%", "+", "(", ")", "C", "=",
];

#[component]
pub fn Calculator() -> impl IntoView {
    let expression = RwSignal::new(String::new());
    let display = RwSignal::new(String::from("0"));
    let error = RwSignal::new(None::<String>);

    let run = move || match evaluate(&expression.get_untracked()) {
        Ok(value) => {
            let shown = format_result(value);
            error.set(None);
            expression.set(shown.clone());
            display.set(shown);
        }
        Err(e) => error.set(Some(e.to_string())),
    };

    let press = move |key: &'static str| match key {
        "C" => {
            expression.set(String::new());
            display.set("0".into());
            error.set(None);
        }
        "=" => run(),
        // Percent of the whole expression
        "%" => expression.update(|e| *e = format!("({})/100", e)),
        _ => expression.update(|e| e.push_str(key)),
    };

    view! {
        <section class="calculator">
            <form on:submit=move |ev: web_sys::SubmitEvent| {
                ev.prevent_default();
                run();
            }>
                <input
                    type="text"
                    class="calc-input"
                    prop:value=move || expression.get()
                    on:input=move |ev| expression.set(event_target_value(&ev))
                />
            </form>
            <div class="calc-display">{move || display.get()}</div>
            {move || error.get().map(|e| view! { <p class="field-error">{e}</p> })}
            <div class="calc-keys">
                {KEYS
                    .into_iter()
                    .map(|key| view! { <button class="calc-key" on:click=move |_| press(key)>{key}</button> })
                    .collect_view()}
            </div>
        </section>
    }
}
