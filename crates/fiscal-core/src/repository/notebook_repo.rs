//! Notebook Repository
//!
//! Page-level operations on top of the notebook collection. A notebook
//! whose last page is deleted is removed with it.

use super::collection::{fresh_id, CollectionRepository};
use super::traits::Repository;
use crate::document::Document;
use crate::domain::{ManualPage, Notebook, NotebookPatch};
use crate::error::{DomainError, DomainResult};

/// What a page deletion removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRemoval {
    Page,
    /// The page was the notebook's last one
    Notebook,
}

#[derive(Clone)]
pub struct NotebookRepository {
    inner: CollectionRepository<Notebook>,
}

impl NotebookRepository {
    pub fn new(inner: CollectionRepository<Notebook>) -> Self {
        Self { inner }
    }

    pub fn list(&self) -> Vec<Notebook> {
        self.inner.list()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Notebook> {
        self.inner.find_by_id(id)
    }

    /// New notebook with its first (empty) page
    pub fn create_notebook(&self, title: String, first_page_title: String) -> DomainResult<Notebook> {
        let now = self.inner.clock().now();
        let mut notebook = Notebook::new(title, now);
        let page_id = fresh_id(now.timestamp_millis(), std::iter::empty());
        notebook.pages.push(ManualPage::new(page_id, first_page_title, Document::default(), now));
        self.inner.create(notebook)
    }

    pub fn rename_notebook(&self, id: &str, title: String) -> DomainResult<Notebook> {
        self.inner.update_by_id(id, NotebookPatch::Title(title))
    }

    pub fn add_page(&self, notebook_id: &str, title: String, content: Document) -> DomainResult<ManualPage> {
        let notebook = self
            .find_by_id(notebook_id)
            .ok_or_else(|| DomainError::NotFound(format!("notebook '{}'", notebook_id)))?;
        let now = self.inner.clock().now();
        let page_id = fresh_id(now.timestamp_millis(), notebook.pages.iter().map(|p| p.id.as_str()));
        let page = ManualPage::new(page_id, title, content, now);
        self.inner.update_by_id(notebook_id, NotebookPatch::AddPage(page.clone()))?;
        Ok(page)
    }

    pub fn update_page(
        &self,
        notebook_id: &str,
        page_id: &str,
        title: Option<String>,
        content: Option<Document>,
    ) -> DomainResult<ManualPage> {
        let notebook = self
            .find_by_id(notebook_id)
            .ok_or_else(|| DomainError::NotFound(format!("notebook '{}'", notebook_id)))?;
        if notebook.page(page_id).is_none() {
            return Err(DomainError::NotFound(format!("page '{}'", page_id)));
        }
        let patch = NotebookPatch::UpdatePage {
            page_id: page_id.to_string(),
            title,
            content,
            at: self.inner.clock().now(),
        };
        let updated = self.inner.update_by_id(notebook_id, patch)?;
        updated
            .page(page_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("page '{}'", page_id)))
    }

    pub fn delete_page(&self, notebook_id: &str, page_id: &str) -> DomainResult<PageRemoval> {
        let notebook = self
            .find_by_id(notebook_id)
            .ok_or_else(|| DomainError::NotFound(format!("notebook '{}'", notebook_id)))?;
        if notebook.page(page_id).is_none() {
            return Err(DomainError::NotFound(format!("page '{}'", page_id)));
        }
        if notebook.pages.len() == 1 {
            self.inner.delete_by_id(notebook_id)?;
            log::info!("Removed notebook '{}' with its last page", notebook_id);
            return Ok(PageRemoval::Notebook);
        }
        self.inner.update_by_id(notebook_id, NotebookPatch::RemovePage(page_id.to_string()))?;
        Ok(PageRemoval::Page)
    }

    pub fn delete_notebook(&self, id: &str) -> DomainResult<bool> {
        self.inner.delete_by_id(id)
    }
}
