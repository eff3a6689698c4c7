//! Delete Confirm Button Component
//!
//! Destructive actions (deletes, clearing history, restoring the tax table)
//! ask once inline before running.

use leptos::prelude::*;

/// A button that turns into "prompt ✓ ✗" when clicked.
///
/// # Arguments
/// * `button_class` - CSS class for the idle button
/// * `on_confirm` - Runs when the user clicks ✓
/// * `prompt` - Question shown while armed (default "Excluir?")
/// * `label` - Idle button text (default "×")
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into)] on_confirm: Callback<()>,
    #[prop(optional, into)] prompt: Option<String>,
    #[prop(optional, into)] label: Option<String>,
) -> impl IntoView {
    let armed = RwSignal::new(false);
    let prompt = StoredValue::new(prompt.unwrap_or_else(|| "Excluir?".to_string()));
    let label = StoredValue::new(label.unwrap_or_else(|| "×".to_string()));
    let button_class = StoredValue::new(button_class);

    let idle = move || {
        view! {
            <button
                class=button_class.get_value()
                title=prompt.get_value()
                on:click=move |ev| {
                    ev.stop_propagation();
                    armed.set(true);
                }
            >
                {label.get_value()}
            </button>
        }
    };

    view! {
        <Show when=move || armed.get() fallback=idle>
            <span class="delete-confirm">
                <span class="delete-confirm-text">{prompt.get_value()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        armed.set(false);
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        armed.set(false);
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
