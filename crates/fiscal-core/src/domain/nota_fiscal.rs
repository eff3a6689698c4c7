//! Invoice Reminder Entity
//!
//! Invoices the admin wants to be reminded about.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{ApplyPatch, CollectionKey, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotaStatus {
    #[default]
    Pending,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotaFiscal {
    pub id: String,
    pub number: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub reminder_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: NotaStatus,
}

impl NotaFiscal {
    /// Pending with a reminder at or before `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == NotaStatus::Pending && self.reminder_date.is_some_and(|at| at <= now)
    }
}

impl Entity for NotaFiscal {
    const COLLECTION: CollectionKey = CollectionKey::NotasFiscais;
    type Patch = NotaFiscalPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotaFiscalPatch {
    Status(NotaStatus),
    Notes(String),
    Reminder(Option<DateTime<Utc>>),
}

impl ApplyPatch<NotaFiscal> for NotaFiscalPatch {
    fn apply(self, target: &mut NotaFiscal) {
        match self {
            NotaFiscalPatch::Status(status) => target.status = status,
            NotaFiscalPatch::Notes(notes) => target.notes = notes,
            NotaFiscalPatch::Reminder(at) => target.reminder_date = at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_due() {
        let now = DateTime::from_timestamp_millis(10_000).unwrap();
        let mut nota = NotaFiscal {
            id: "1".into(),
            number: "123".into(),
            issue_date: "2024-01-10".parse().unwrap(),
            notes: String::new(),
            reminder_date: None,
            status: NotaStatus::Pending,
        };
        assert!(!nota.is_due(now));
        nota.reminder_date = Some(now);
        assert!(nota.is_due(now));
        nota.status = NotaStatus::Done;
        assert!(!nota.is_due(now));
    }
}
