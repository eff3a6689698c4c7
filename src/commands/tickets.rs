//! Ticket Commands

use fiscal_core::domain::{Ticket, TicketPatch, TicketStatus};
use fiscal_core::Clock;
use fiscal_core::repository::{DataContext, Repository};
use fiscal_core::validation::{TicketForm, Validate};
use fiscal_core::views::tickets_in_status;

use super::CommandResult;

pub fn list_tickets(data: &DataContext) -> Vec<Ticket> {
    data.tickets().list()
}

/// Oldest first, so the queue is worked in arrival order
pub fn tickets_by_status(data: &DataContext, status: TicketStatus) -> Vec<Ticket> {
    tickets_in_status(&list_tickets(data), status)
}

pub fn create_ticket(data: &DataContext, form: &TicketForm) -> CommandResult<Ticket> {
    let ticket = form.validate(data.clock.now())?;
    Ok(data.tickets().create(ticket)?)
}

pub fn set_ticket_status(data: &DataContext, id: &str, status: TicketStatus) -> CommandResult<Ticket> {
    Ok(data.tickets().update_by_id(id, TicketPatch::Status(status))?)
}

pub fn delete_ticket(data: &DataContext, id: &str) -> CommandResult<bool> {
    Ok(data.tickets().delete_by_id(id)?)
}
