//! Rejected Note Commands

use fiscal_core::domain::{RejectedNote, RejectedNotePatch};
use fiscal_core::Clock;
use fiscal_core::repository::{DataContext, Repository};
use fiscal_core::validation::{DueDateInput, RejectedNoteForm, Validate};

use super::CommandResult;

/// Most recent rejection first
pub fn list_rejected_notes(data: &DataContext) -> Vec<RejectedNote> {
    let mut notes = data.rejected_notes().list();
    notes.sort_by(|a, b| b.rejection_date.cmp(&a.rejection_date));
    notes
}

pub fn create_rejected_note(data: &DataContext, form: &RejectedNoteForm) -> CommandResult<RejectedNote> {
    let note = form.validate(data.clock.now())?;
    Ok(data.rejected_notes().create(note)?)
}

pub fn update_rejected_note(data: &DataContext, id: &str, form: &RejectedNoteForm) -> CommandResult<RejectedNote> {
    let note = form.validate(data.clock.now())?;
    Ok(data
        .rejected_notes()
        .update_by_id(id, RejectedNotePatch::Replace(Box::new(note)))?)
}

pub fn delete_rejected_note(data: &DataContext, id: &str) -> CommandResult<bool> {
    Ok(data.rejected_notes().delete_by_id(id)?)
}

pub fn rejected_note_form(note: &RejectedNote) -> RejectedNoteForm {
    RejectedNoteForm {
        nfe_number: note.nfe_number.clone(),
        supplier_name: note.supplier_name.clone(),
        issue_date: note.issue_date.to_string(),
        rejection_date: note.rejection_date.to_string(),
        total_value: note.total_value.to_string(),
        rejection_reason: note.rejection_reason.clone(),
        due_dates: note
            .due_dates
            .iter()
            .map(|d| DueDateInput {
                date: d.date.to_string(),
                value: d.value.to_string(),
            })
            .collect(),
    }
}
