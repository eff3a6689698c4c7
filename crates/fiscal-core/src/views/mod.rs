//! Derived Views
//!
//! Pure projections computed on every read: dashboard numbers, lookups
//! against the stored tables and the ordering each screen uses.

mod dashboard;
mod lookup;
mod ordering;
mod tes;

pub use dashboard::{due_reminders, rejected_summary, task_stats, DashboardStats, RejectedNoteSummary, TaskStats};
pub use lookup::{find_provider, lookup_tax_rate, provider_matches, TaxQuote};
pub use ordering::{fold_accents, sort_tasks, sort_tax_rows, tickets_in_status};
pub use tes::{lookup_tes, tes_companies, Operation, Purpose, SaleType, TesCode, TesQuery};
