//! UI Components
//!
//! One module per screen plus the small shared pieces they reuse.

mod admin;
mod assistant;
mod calculator;
mod dashboard;
mod delete_confirm_button;
mod drop_zone;
mod field_error;
mod manuals;
mod providers;
mod rejected_notes;
mod tab_bar;
mod tax_rates;
mod tickets;
mod toast;
mod xml_validator;

pub use admin::Admin;
pub use assistant::Assistant;
pub use calculator::Calculator;
pub use dashboard::Dashboard;
pub use delete_confirm_button::DeleteConfirmButton;
pub use drop_zone::DropZone;
pub use field_error::{input_class, FieldError};
pub use manuals::Manuals;
pub use providers::Providers;
pub use rejected_notes::RejectedNotes;
pub use tab_bar::{Tab, TabBar};
pub use tax_rates::TaxRates;
pub use tickets::Tickets;
pub use toast::ToastHost;
pub use xml_validator::XmlValidator;
