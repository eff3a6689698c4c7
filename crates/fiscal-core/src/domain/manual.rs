//! Notebook and Manual Page Entities
//!
//! The help wiki: notebooks hold an ordered list of pages. A notebook
//! never exists without pages once its last page is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{ApplyPatch, CollectionKey, Entity};
use crate::document::Document;

/// One wiki page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualPage {
    pub id: String,
    pub title: String,
    /// Structured content; legacy HTML strings are converted on read
    #[serde(default)]
    pub content: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ManualPage {
    pub fn new(id: String, title: String, content: Document, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A container of pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub pages: Vec<ManualPage>,
}

impl Notebook {
    pub fn new(title: String, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            title,
            created_at: now,
            pages: Vec::new(),
        }
    }

    pub fn page(&self, page_id: &str) -> Option<&ManualPage> {
        self.pages.iter().find(|p| p.id == page_id)
    }
}

impl Entity for Notebook {
    const COLLECTION: CollectionKey = CollectionKey::Notebooks;
    type Patch = NotebookPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Changes to a notebook and its pages
#[derive(Debug, Clone, PartialEq)]
pub enum NotebookPatch {
    Title(String),
    AddPage(ManualPage),
    UpdatePage {
        page_id: String,
        title: Option<String>,
        content: Option<Document>,
        at: DateTime<Utc>,
    },
    RemovePage(String),
}

impl ApplyPatch<Notebook> for NotebookPatch {
    fn apply(self, target: &mut Notebook) {
        match self {
            NotebookPatch::Title(title) => target.title = title,
            NotebookPatch::AddPage(page) => target.pages.push(page),
            NotebookPatch::UpdatePage { page_id, title, content, at } => {
                if let Some(page) = target.pages.iter_mut().find(|p| p.id == page_id) {
                    if let Some(title) = title {
                        page.title = title;
                    }
                    if let Some(content) = content {
                        page.content = content;
                    }
                    page.updated_at = at;
                }
            }
            NotebookPatch::RemovePage(page_id) => target.pages.retain(|p| p.id != page_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_page_touches_only_that_page() {
        let t0 = DateTime::from_timestamp_millis(0).unwrap();
        let t1 = DateTime::from_timestamp_millis(1_000).unwrap();
        let mut nb = Notebook::new("Rotinas".into(), t0);
        nb.pages.push(ManualPage::new("a".into(), "Fechamento".into(), Document::default(), t0));
        nb.pages.push(ManualPage::new("b".into(), "SPED".into(), Document::default(), t0));

        NotebookPatch::UpdatePage {
            page_id: "b".into(),
            title: Some("SPED Fiscal".into()),
            content: None,
            at: t1,
        }
        .apply(&mut nb);

        assert_eq!(nb.page("a").unwrap().updated_at, t0);
        assert_eq!(nb.page("b").unwrap().title, "SPED Fiscal");
        assert_eq!(nb.page("b").unwrap().updated_at, t1);
    }

    #[test]
    fn test_legacy_html_content_is_accepted() {
        let json = r#"{
            "id": "1", "title": "Manual", "createdAt": "2024-01-01T00:00:00Z",
            "pages": [{"id": "p1", "title": "Início", "content": "<p>Olá <b>mundo</b></p>",
                       "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}]
        }"#;
        let nb: Notebook = serde_json::from_str(json).unwrap();
        assert_eq!(nb.pages[0].content.plain_text(), "Olá mundo");
    }
}
