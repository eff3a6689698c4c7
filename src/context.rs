//! Application Context
//!
//! Shared state provided via Leptos Context API.

use fiscal_core::domain::CollectionKey;
use fiscal_core::repository::{DataContext, Subscription};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

const TOAST_MS: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub message: String,
}

/// One version counter per collection; screens track the ones they read
#[derive(Clone, Copy)]
struct Versions([RwSignal<u32>; CollectionKey::ALL.len()]);

impl Versions {
    fn new() -> Self {
        Self(std::array::from_fn(|_| RwSignal::new(0)))
    }

    fn slot(&self, key: CollectionKey) -> Option<RwSignal<u32>> {
        CollectionKey::ALL.iter().position(|k| *k == key).map(|i| self.0[i])
    }
}

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    data: StoredValue<DataContext>,
    versions: Versions,
    toasts: RwSignal<Vec<Toast>>,
    next_toast: StoredValue<u32>,
    /// Admin screen unlocked for this session
    pub admin_unlocked: RwSignal<bool>,
}

impl AppContext {
    pub fn new(data: DataContext) -> Self {
        Self {
            data: StoredValue::new(data),
            versions: Versions::new(),
            toasts: RwSignal::new(Vec::new()),
            next_toast: StoredValue::new(0),
            admin_unlocked: RwSignal::new(false),
        }
    }

    pub fn data(&self) -> DataContext {
        self.data.get_value()
    }

    /// Re-run the calling effect/view when `key` changes
    pub fn track(&self, key: CollectionKey) {
        if let Some(version) = self.versions.slot(key) {
            version.track();
        }
    }

    fn bump(&self, key: CollectionKey) {
        if let Some(version) = self.versions.slot(key) {
            version.update(|v| *v = v.wrapping_add(1));
        }
    }

    /// Route every bus notification to the matching version counter.
    /// Unsubscribes when the owning component is cleaned up.
    pub fn listen(&self) {
        let ctx = *self;
        let subscription: Subscription = self.data.with_value(|data| {
            data.bus.subscribe_all(move |event| ctx.bump(event.key))
        });
        on_cleanup(move || drop(subscription));
    }

    pub fn toasts(&self) -> Signal<Vec<Toast>> {
        self.toasts.into()
    }

    fn push_toast(&self, kind: ToastKind, message: String) {
        let id = self.next_toast.get_value();
        self.next_toast.set_value(id.wrapping_add(1));
        self.toasts.update(|t| t.push(Toast { id, kind, message }));
        let ctx = *self;
        spawn_local(async move {
            TimeoutFuture::new(TOAST_MS).await;
            ctx.dismiss(id);
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push_toast(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.push_toast(ToastKind::Error, message);
    }

    pub fn dismiss(&self, id: u32) {
        self.toasts.update(|t| t.retain(|toast| toast.id != id));
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}
