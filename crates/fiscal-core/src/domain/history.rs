//! Validation History Entry
//!
//! One line per XML file checked; the collection is capped (see
//! `repository::ValidationHistory`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationHistoryItem {
    pub id: String,
    pub file_name: String,
    pub date: DateTime<Utc>,
    pub status: ValidationStatus,
}
