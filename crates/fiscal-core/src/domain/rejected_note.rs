//! Rejected Note Entity
//!
//! Supplier invoices the company refused, with the installments that
//! would have been due.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{ApplyPatch, CollectionKey, Entity};

/// One installment of a rejected invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueDate {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedNote {
    pub id: String,
    pub nfe_number: String,
    pub supplier_name: String,
    pub issue_date: NaiveDate,
    pub rejection_date: NaiveDate,
    pub total_value: f64,
    pub rejection_reason: String,
    #[serde(default)]
    pub due_dates: Vec<DueDate>,
}

impl RejectedNote {
    pub fn next_due_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.due_dates.iter().map(|d| d.date).filter(|d| *d >= today).min()
    }
}

impl Entity for RejectedNote {
    const COLLECTION: CollectionKey = CollectionKey::RejectedNotes;
    type Patch = RejectedNotePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectedNotePatch {
    /// Full edit from the form; keeps the id
    Replace(Box<RejectedNote>),
    Reason(String),
    DueDates(Vec<DueDate>),
}

impl ApplyPatch<RejectedNote> for RejectedNotePatch {
    fn apply(self, target: &mut RejectedNote) {
        match self {
            RejectedNotePatch::Replace(note) => {
                let id = std::mem::take(&mut target.id);
                *target = *note;
                target.id = id;
            }
            RejectedNotePatch::Reason(reason) => target.rejection_reason = reason,
            RejectedNotePatch::DueDates(dates) => target.due_dates = dates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_due_dates_json_shape() {
        let json = r#"{"id":"1","nfeNumber":"4512","supplierName":"ACME","issueDate":"2024-03-01",
            "rejectionDate":"2024-03-05","totalValue":1500.5,"rejectionReason":"Valor divergente",
            "dueDates":[{"date":"2024-04-01","value":750.25},{"date":"2024-05-01","value":750.25}]}"#;
        let note: RejectedNote = serde_json::from_str(json).unwrap();
        assert_eq!(note.due_dates.len(), 2);
        assert_eq!(note.next_due_date(date("2024-04-15")), Some(date("2024-05-01")));
        assert_eq!(note.next_due_date(date("2024-06-01")), None);
    }
}
