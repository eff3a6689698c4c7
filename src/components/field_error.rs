//! Field Error
//!
//! Message under a form input when validation rejected that field.

use fiscal_core::validation::FieldErrors;
use leptos::prelude::*;

#[component]
pub fn FieldError(errors: RwSignal<FieldErrors>, #[prop(into)] field: String) -> impl IntoView {
    move || {
        errors.with(|e| {
            e.get(&field)
                .map(|message| view! { <span class="field-error">{message.to_string()}</span> })
        })
    }
}

/// `input` class with the error state applied
pub fn input_class(errors: RwSignal<FieldErrors>, field: &'static str) -> impl Fn() -> &'static str {
    move || {
        if errors.with(|e| e.get(field).is_some()) {
            "input has-error"
        } else {
            "input"
        }
    }
}
