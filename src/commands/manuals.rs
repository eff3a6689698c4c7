//! Manual Commands

use fiscal_core::domain::{ManualPage, Notebook};
use fiscal_core::Clock;
use fiscal_core::repository::{DataContext, PageRemoval};
use fiscal_core::validation::{NotebookForm, PageForm, Validate};

use super::CommandResult;

pub fn list_notebooks(data: &DataContext) -> Vec<Notebook> {
    data.notebooks().list()
}

pub fn create_notebook(data: &DataContext, form: &NotebookForm) -> CommandResult<Notebook> {
    let (title, first_page) = form.validate(data.clock.now())?;
    Ok(data.notebooks().create_notebook(title, first_page)?)
}

pub fn rename_notebook(data: &DataContext, id: &str, form: &NotebookForm) -> CommandResult<Notebook> {
    let (title, _) = form.validate(data.clock.now())?;
    Ok(data.notebooks().rename_notebook(id, title)?)
}

pub fn delete_notebook(data: &DataContext, id: &str) -> CommandResult<bool> {
    Ok(data.notebooks().delete_notebook(id)?)
}

pub fn add_page(data: &DataContext, notebook_id: &str, form: &PageForm) -> CommandResult<ManualPage> {
    let (title, content) = form.validate(data.clock.now())?;
    Ok(data.notebooks().add_page(notebook_id, title, content)?)
}

pub fn save_page(data: &DataContext, notebook_id: &str, page_id: &str, form: &PageForm) -> CommandResult<ManualPage> {
    let (title, content) = form.validate(data.clock.now())?;
    Ok(data.notebooks().update_page(notebook_id, page_id, Some(title), Some(content))?)
}

pub fn delete_page(data: &DataContext, notebook_id: &str, page_id: &str) -> CommandResult<PageRemoval> {
    Ok(data.notebooks().delete_page(notebook_id, page_id)?)
}

/// Notebook title and page for the editor
pub fn find_page(data: &DataContext, notebook_id: &str, page_id: &str) -> Option<(String, ManualPage)> {
    let notebook = data.notebooks().find_by_id(notebook_id)?;
    let page = notebook.page(page_id)?.clone();
    Some((notebook.title, page))
}
