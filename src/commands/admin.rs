//! Admin Commands
//!
//! Login, password, tasks and invoice reminders.

use fiscal_core::domain::{AdminTask, NotaFiscal, NotaFiscalPatch, NotaStatus, TaskPatch};
use fiscal_core::Clock;
use fiscal_core::repository::{DataContext, Repository};
use fiscal_core::validation::{LoginForm, NotaFiscalForm, PasswordChangeForm, TaskForm, Validate};
use fiscal_core::views::{due_reminders, sort_tasks};

use super::CommandResult;

pub fn login(data: &DataContext, form: &LoginForm) -> CommandResult<()> {
    Ok(data.admin_password().login(form)?)
}

pub fn change_password(data: &DataContext, form: &PasswordChangeForm) -> CommandResult<()> {
    Ok(data.admin_password().change(form)?)
}

pub fn list_tasks(data: &DataContext) -> Vec<AdminTask> {
    let mut tasks = data.tasks().list();
    sort_tasks(&mut tasks);
    tasks
}

pub fn create_task(data: &DataContext, form: &TaskForm) -> CommandResult<AdminTask> {
    let task = form.validate(data.clock.now())?;
    Ok(data.tasks().create(task)?)
}

pub fn toggle_task(data: &DataContext, id: &str) -> CommandResult<AdminTask> {
    Ok(data.tasks().update_by_id(id, TaskPatch::Toggle)?)
}

pub fn delete_task(data: &DataContext, id: &str) -> CommandResult<bool> {
    Ok(data.tasks().delete_by_id(id)?)
}

/// Pending first, then by issue date
pub fn list_notas(data: &DataContext) -> Vec<NotaFiscal> {
    let mut notas = data.notas_fiscais().list();
    notas.sort_by(|a, b| {
        let pending = |n: &NotaFiscal| n.status != NotaStatus::Pending;
        pending(a).cmp(&pending(b)).then(a.issue_date.cmp(&b.issue_date))
    });
    notas
}

pub fn create_nota(data: &DataContext, form: &NotaFiscalForm) -> CommandResult<NotaFiscal> {
    let nota = form.validate(data.clock.now())?;
    Ok(data.notas_fiscais().create(nota)?)
}

pub fn set_nota_status(data: &DataContext, id: &str, status: NotaStatus) -> CommandResult<NotaFiscal> {
    Ok(data.notas_fiscais().update_by_id(id, NotaFiscalPatch::Status(status))?)
}

pub fn delete_nota(data: &DataContext, id: &str) -> CommandResult<bool> {
    Ok(data.notas_fiscais().delete_by_id(id)?)
}

/// Pending invoices whose reminder time has passed
pub fn due_notas(data: &DataContext) -> Vec<NotaFiscal> {
    let notas = data.notas_fiscais().list();
    due_reminders(&notas, data.clock.now()).into_iter().cloned().collect()
}
