//! Display ordering

use crate::domain::{AdminTask, TaskStatus, TaxRateRow, Ticket, TicketStatus};

/// Tickets of one status, oldest first (work the queue in FIFO order)
pub fn tickets_in_status(tickets: &[Ticket], status: TicketStatus) -> Vec<Ticket> {
    let mut selected: Vec<Ticket> = tickets.iter().filter(|t| t.status == status).cloned().collect();
    selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    selected
}

/// Pending before done, newest first within each group
pub fn sort_tasks(tasks: &mut [AdminTask]) {
    tasks.sort_by(|a, b| {
        let rank = |t: &AdminTask| if t.status == TaskStatus::Pending { 0 } else { 1 };
        rank(a).cmp(&rank(b)).then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Lowercase and strip Portuguese diacritics for collation
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Alphabetical by destination state name, ignoring accents
pub fn sort_tax_rows(rows: &mut [TaxRateRow]) {
    rows.sort_by_cached_key(|r| fold_accents(&r.destination_state_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{default_tax_rates, Topic};
    use chrono::DateTime;

    #[test]
    fn test_tickets_fifo_within_status() {
        let at = |ms| DateTime::from_timestamp_millis(ms).unwrap();
        let mut newer = Ticket::new("B".into(), Topic::Nfe, "descrição".into(), at(2_000));
        newer.id = "2000".into();
        let mut older = Ticket::new("A".into(), Topic::Nfe, "descrição".into(), at(1_000));
        older.id = "1000".into();
        let mut done = Ticket::new("C".into(), Topic::Nfe, "descrição".into(), at(500));
        done.status = TicketStatus::Resolved;

        let open = tickets_in_status(&[newer, done, older], TicketStatus::Open);
        let names: Vec<_> = open.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_tasks_pending_first_then_newest() {
        let at = |ms| DateTime::from_timestamp_millis(ms).unwrap();
        let mut tasks = vec![
            AdminTask::new("old pending".into(), at(1)),
            AdminTask::new("new done".into(), at(3)),
            AdminTask::new("new pending".into(), at(2)),
        ];
        tasks[1].status = TaskStatus::Done;
        sort_tasks(&mut tasks);
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["new pending", "old pending", "new done"]);
    }

    #[test]
    fn test_tax_rows_sorted_ignoring_accents() {
        let mut rows = default_tax_rates();
        sort_tax_rows(&mut rows);
        let names: Vec<_> = rows.iter().map(|r| r.destination_state_name.as_str()).collect();
        let para = names.iter().position(|n| *n == "Paraíba").unwrap();
        let parana = names.iter().position(|n| *n == "Paraná").unwrap();
        assert!(para < parana);
        assert_eq!(names.first(), Some(&"Acre"));
        assert_eq!(names.last(), Some(&"Tocantins"));
    }
}
