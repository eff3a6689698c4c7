//! Dashboard statistics

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{AdminTask, NotaFiscal, RejectedNote, TaskStatus, Ticket, TicketStatus, Topic};

/// Percentage rounded to the nearest integer; 0 for an empty total
fn rate(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub resolved_count: usize,
    pub in_progress_count: usize,
    pub open_count: usize,
    pub resolved_rate: u32,
    pub by_topic: BTreeMap<Topic, usize>,
}

impl DashboardStats {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let count = |status: TicketStatus| tickets.iter().filter(|t| t.status == status).count();
        let resolved_count = count(TicketStatus::Resolved);
        let mut by_topic = BTreeMap::new();
        for ticket in tickets {
            *by_topic.entry(ticket.topic).or_insert(0) += 1;
        }
        Self {
            total: tickets.len(),
            resolved_count,
            in_progress_count: count(TicketStatus::InProgress),
            open_count: count(TicketStatus::Open),
            resolved_rate: rate(resolved_count, tickets.len()),
            by_topic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub done: usize,
    pub pending: usize,
    pub completion_rate: u32,
}

pub fn task_stats(tasks: &[AdminTask]) -> TaskStats {
    let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    TaskStats {
        total: tasks.len(),
        done,
        pending: tasks.len() - done,
        completion_rate: rate(done, tasks.len()),
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RejectedNoteSummary {
    pub count: usize,
    pub total_value: f64,
    /// Earliest installment on or after today across all notes
    pub next_due_date: Option<NaiveDate>,
}

pub fn rejected_summary(notes: &[RejectedNote], today: NaiveDate) -> RejectedNoteSummary {
    RejectedNoteSummary {
        count: notes.len(),
        total_value: notes.iter().map(|n| n.total_value).sum(),
        next_due_date: notes.iter().filter_map(|n| n.next_due_date(today)).min(),
    }
}

/// Pending invoice reminders whose time has come
pub fn due_reminders(notas: &[NotaFiscal], now: DateTime<Utc>) -> Vec<&NotaFiscal> {
    notas.iter().filter(|n| n.is_due(now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(status: TicketStatus, topic: Topic) -> Ticket {
        let mut t = Ticket::new("Ana".into(), topic, "descrição longa".into(), Utc::now());
        t.status = status;
        t
    }

    #[test]
    fn test_empty_dashboard_has_zero_rate() {
        let stats = DashboardStats::from_tickets(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.resolved_rate, 0);
        assert!(stats.by_topic.is_empty());
    }

    #[test]
    fn test_rate_rounds_for_all_combinations() {
        for total in 1..=12usize {
            for resolved in 0..=total {
                let tickets: Vec<_> = (0..total)
                    .map(|i| ticket(if i < resolved { TicketStatus::Resolved } else { TicketStatus::Open }, Topic::Nfe))
                    .collect();
                let stats = DashboardStats::from_tickets(&tickets);
                let expected = (resolved as f64 / total as f64 * 100.0).round() as u32;
                assert_eq!(stats.resolved_rate, expected, "{}/{}", resolved, total);
            }
        }
    }

    #[test]
    fn test_counts_by_status_and_topic() {
        let tickets = vec![
            ticket(TicketStatus::Open, Topic::Icms),
            ticket(TicketStatus::InProgress, Topic::Icms),
            ticket(TicketStatus::Resolved, Topic::Iss),
        ];
        let stats = DashboardStats::from_tickets(&tickets);
        assert_eq!((stats.open_count, stats.in_progress_count, stats.resolved_count), (1, 1, 1));
        assert_eq!(stats.resolved_rate, 33);
        assert_eq!(stats.by_topic[&Topic::Icms], 2);
        assert_eq!(stats.by_topic[&Topic::Iss], 1);
    }

    #[test]
    fn test_task_completion_rate() {
        let mut tasks: Vec<_> = (0..4).map(|i| AdminTask::new(format!("t{}", i), Utc::now())).collect();
        tasks[0].status = TaskStatus::Done;
        let stats = task_stats(&tasks);
        assert_eq!((stats.done, stats.pending, stats.completion_rate), (1, 3, 25));
        assert_eq!(task_stats(&[]).completion_rate, 0);
    }
}
