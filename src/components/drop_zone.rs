//! Drop Zone Component
//!
//! File drop target with a picker fallback.

use leptos::prelude::*;
use web_sys::DragEvent;

use crate::commands;

/// Drop area that also opens a file picker
#[component]
pub fn DropZone(
    /// Text shown inside the zone
    #[prop(into)]
    label: String,
    /// `accept` attribute of the picker
    #[prop(into)]
    accept: String,
    /// Receives the dropped or picked files
    on_files: Callback<Vec<web_sys::File>>,
) -> impl IntoView {
    let (is_over, set_is_over) = signal(false);

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_over.set(true);
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_over.set(false);
    };

    let on_drop_handler = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_over.set(false);
        let files = commands::files_from_drop(&ev);
        if !files.is_empty() {
            on_files.run(files);
        }
    };

    view! {
        <div
            class=move || if is_over.get() { "drop-zone active" } else { "drop-zone" }
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:drop=on_drop_handler
        >
            <p>{label}</p>
            <input
                type="file"
                multiple=true
                accept=accept
                on:change=move |ev| {
                    let files = commands::files_from_event(&ev);
                    if !files.is_empty() {
                        on_files.run(files);
                    }
                }
            />
        </div>
    }
}
