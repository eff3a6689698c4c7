//! Ticket (Chamado) Entity
//!
//! Support tickets opened by the fiscal team. Status drives the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{ApplyPatch, CollectionKey, Entity};

/// Ticket workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    #[default]
    #[serde(rename = "Aberto")]
    Open,
    #[serde(rename = "Em Andamento")]
    InProgress,
    #[serde(rename = "Resolvido")]
    Resolved,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [TicketStatus::Open, TicketStatus::InProgress, TicketStatus::Resolved];

    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Aberto",
            TicketStatus::InProgress => "Em Andamento",
            TicketStatus::Resolved => "Resolvido",
        }
    }
}

/// Fixed set of ticket topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "NF-e")]
    Nfe,
    #[serde(rename = "ICMS")]
    Icms,
    #[serde(rename = "ISS")]
    Iss,
    #[serde(rename = "Retenções")]
    Withholding,
    #[serde(rename = "Cadastro")]
    Registration,
    #[serde(rename = "Outros")]
    Other,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Nfe,
        Topic::Icms,
        Topic::Iss,
        Topic::Withholding,
        Topic::Registration,
        Topic::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Nfe => "NF-e",
            Topic::Icms => "ICMS",
            Topic::Iss => "ISS",
            Topic::Withholding => "Retenções",
            Topic::Registration => "Cadastro",
            Topic::Other => "Outros",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// A support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Creation timestamp in milliseconds, as a string
    pub id: String,
    /// Requester name
    pub name: String,
    pub topic: Topic,
    pub description: String,
    /// Name of the file attached when the ticket was opened
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(name: String, topic: Topic, description: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            name,
            topic,
            description,
            file_name: None,
            status: TicketStatus::Open,
            created_at,
        }
    }
}

impl Entity for Ticket {
    const COLLECTION: CollectionKey = CollectionKey::Tickets;
    type Patch = TicketPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Changes a ticket accepts after creation
#[derive(Debug, Clone, PartialEq)]
pub enum TicketPatch {
    Status(TicketStatus),
    Description(String),
    Topic(Topic),
}

impl ApplyPatch<Ticket> for TicketPatch {
    fn apply(self, target: &mut Ticket) {
        match self {
            TicketPatch::Status(status) => target.status = status,
            TicketPatch::Description(text) => target.description = text,
            TicketPatch::Topic(topic) => target.topic = topic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_json_shape() {
        let created = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let mut ticket = Ticket::new("Ana".into(), Topic::Icms, "Dúvida sobre DIFAL".into(), created);
        ticket.id = "1700000000000".into();
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["topic"], "ICMS");
        assert_eq!(json["status"], "Aberto");
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20Z");
        assert!(json.get("fileName").is_some());
    }

    #[test]
    fn test_status_patch() {
        let mut ticket = Ticket::new("Ana".into(), Topic::Nfe, "Nota rejeitada".into(), Utc::now());
        TicketPatch::Status(TicketStatus::Resolved).apply(&mut ticket);
        assert_eq!(ticket.status, TicketStatus::Resolved);
    }

    #[test]
    fn test_topic_labels() {
        assert_eq!(Topic::from_label("Retenções"), Some(Topic::Withholding));
        assert_eq!(Topic::from_label("Imposto de Renda"), None);
    }
}
