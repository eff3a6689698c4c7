//! Domain Layer
//!
//! Contains all domain entities, their patches and seed tables.
//! This layer depends only on serde and chrono.

mod entity;
mod ticket;
mod tax_rate;
mod provider;
mod manual;
mod rejected_note;
mod task;
mod nota_fiscal;
mod history;

pub use entity::{ApplyPatch, CollectionKey, Entity};
pub use ticket::{Ticket, TicketPatch, TicketStatus, Topic};
pub use tax_rate::{default_tax_rates, Origin, TaxRatePatch, TaxRateRow};
pub use provider::{default_providers, Provider, ProviderPatch, Withholding};
pub use manual::{ManualPage, Notebook, NotebookPatch};
pub use rejected_note::{DueDate, RejectedNote, RejectedNotePatch};
pub use task::{AdminTask, TaskPatch, TaskStatus};
pub use nota_fiscal::{NotaFiscal, NotaFiscalPatch, NotaStatus};
pub use history::{ValidationHistoryItem, ValidationStatus};
