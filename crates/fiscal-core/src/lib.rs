//! Fiscal Desk Core
//!
//! Layered architecture:
//! - domain: Entities, patches and seed tables
//! - repository: Store adapter, change bus and collection repositories
//! - validation: Form schemas checked before any repository write
//! - views: Pure projections (dashboards, lookups, sorting)
//!
//! Plus the standalone services the screens use: NF-e XML validation,
//! CSV export, the manual page document model, the calculator and the
//! tax assistant client.

pub mod assistant;
pub mod calculator;
pub mod clock;
pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod export;
pub mod repository;
pub mod validation;
pub mod views;
pub mod xml;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::DeskConfig;
pub use error::{DomainError, DomainResult};
