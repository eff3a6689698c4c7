//! Toasts
//!
//! Short-lived messages stacked in a corner; click to dismiss early.

use leptos::prelude::*;

use crate::context::{use_app, ToastKind};

#[component]
pub fn ToastHost() -> impl IntoView {
    let ctx = use_app();

    view! {
        <div class="toast-host">
            <For
                each=move || ctx.toasts().get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    let class = match toast.kind {
                        ToastKind::Success => "toast success",
                        ToastKind::Error => "toast error",
                    };
                    view! {
                        <div class=class on:click=move |_| ctx.dismiss(id)>
                            {toast.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
