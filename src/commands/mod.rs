//! Screen Commands
//!
//! What the screens call to read and change data, organized by domain.
//! Forms are validated here, stamped with the context clock, and written
//! through the repositories; every write reaches the change bus.

mod admin;
mod assistant;
mod files;
mod manuals;
mod providers;
mod rejected;
mod tax;
mod tickets;
mod xml;

pub use admin::*;
pub use assistant::*;
pub use files::*;
pub use manuals::*;
pub use providers::*;
pub use rejected::*;
pub use tax::*;
pub use tickets::*;
pub use xml::*;

use fiscal_core::validation::FieldErrors;
use fiscal_core::DomainError;

/// Why a command did not go through
#[derive(Debug, Clone)]
pub enum CommandError {
    /// Form rejected; one message per field
    Fields(FieldErrors),
    /// Anything else, shown as a toast
    Message(String),
}

impl CommandError {
    pub fn fields(&self) -> FieldErrors {
        match self {
            CommandError::Fields(errors) => errors.clone(),
            CommandError::Message(_) => FieldErrors::new(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Fields(_) => f.write_str("Verifique os campos destacados"),
            CommandError::Message(message) => f.write_str(message),
        }
    }
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidInput(errors) => CommandError::Fields(errors),
            DomainError::Conflict(detail) => CommandError::Message(format!("Registro já existe: {}", detail)),
            DomainError::NotFound(detail) => CommandError::Message(format!("Não encontrado: {}", detail)),
            DomainError::FileFormat(detail) => CommandError::Message(format!("Arquivo inválido: {}", detail)),
            DomainError::ExternalService(detail) => {
                log::warn!("External service failed: {}", detail);
                CommandError::Message(format!("Serviço indisponível: {}", detail))
            }
            other => {
                log::error!("Command failed: {}", other);
                CommandError::Message(format!("Falha ao salvar: {}", other))
            }
        }
    }
}

impl From<FieldErrors> for CommandError {
    fn from(errors: FieldErrors) -> Self {
        CommandError::Fields(errors)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fiscal_core::domain::{default_tax_rates, TicketStatus, Topic, ValidationStatus};
    use fiscal_core::repository::{ChangeBus, DataContext, MemoryStore};
    use fiscal_core::validation::{
        DueDateInput, NotebookForm, PageForm, ProviderForm, RejectedNoteForm, TicketForm,
    };
    use fiscal_core::FixedClock;
    use std::sync::Arc;

    fn setup() -> DataContext {
        DataContext::new(
            Arc::new(MemoryStore::new()),
            ChangeBus::new(),
            Arc::new(FixedClock::at_millis(1_700_000_000_000)),
        )
    }

    fn ticket_form(name: &str) -> TicketForm {
        TicketForm {
            name: name.to_string(),
            topic: Topic::Icms.label().to_string(),
            description: "Dúvida sobre ICMS-ST na entrada".to_string(),
            file_name: None,
        }
    }

    fn nfe_xml() -> String {
        r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe1" versao="4.00">
      <ide><nNF>77</nNF><dhEmi>2024-01-15T10:30:00-03:00</dhEmi></ide>
      <emit><CNPJ>12345678000190</CNPJ></emit>
      <dest><CNPJ>98765432000110</CNPJ></dest>
      <det nItem="1"><prod><CFOP>5102</CFOP></prod></det>
      <total><ICMSTot><vNF>99.90</vNF></ICMSTot></total>
    </infNFe>
  </NFe>
</nfeProc>"#
            .to_string()
    }

    #[test]
    fn test_invalid_form_surfaces_field_errors() {
        let data = setup();
        let err = create_ticket(&data, &ticket_form("A")).unwrap_err();
        match err {
            CommandError::Fields(errors) => assert!(errors.get("name").is_some()),
            other => panic!("Expected field errors, got {:?}", other),
        }
        assert!(list_tickets(&data).is_empty());
    }

    #[test]
    fn test_unknown_id_becomes_message() {
        let data = setup();
        let err = set_ticket_status(&data, "missing", TicketStatus::Resolved).unwrap_err();
        assert!(err.fields().is_empty());
        assert!(err.to_string().starts_with("Não encontrado"));
    }

    #[test]
    fn test_tickets_by_status_follows_updates() {
        let data = setup();
        let ana = create_ticket(&data, &ticket_form("Ana")).unwrap();
        create_ticket(&data, &ticket_form("Bruno")).unwrap();

        set_ticket_status(&data, &ana.id, TicketStatus::Resolved).unwrap();

        let open = tickets_by_status(&data, TicketStatus::Open);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].name, "Bruno");
        assert_eq!(tickets_by_status(&data, TicketStatus::Resolved)[0].id, ana.id);
    }

    #[test]
    fn test_non_xml_upload_is_rejected_before_history() {
        let data = setup();
        let files = vec![
            ("a.xml".to_string(), nfe_xml()),
            ("nota.pdf".to_string(), "%PDF".to_string()),
        ];
        let err = validate_files(&data, &files).unwrap_err();
        assert!(err.to_string().starts_with("Arquivo inválido"));
        assert!(validation_history(&data).is_empty());
    }

    #[test]
    fn test_validate_files_records_each_result() {
        let data = setup();
        let files = vec![
            ("boa.xml".to_string(), nfe_xml()),
            ("ruim.xml".to_string(), "<outro/>".to_string()),
        ];
        let results = validate_files(&data, &files).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_valid());
        assert!(!results[1].is_valid());

        let history = validation_history(&data);
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().filter(|h| h.status == ValidationStatus::Valid).count(), 1);

        clear_validation_history(&data).unwrap();
        assert!(validation_history(&data).is_empty());
    }

    #[test]
    fn test_tax_rate_edit_and_restore() {
        let data = setup();
        data.seed_defaults().unwrap();
        let rows = list_tax_rates(&data);
        assert_eq!(rows.len(), default_tax_rates().len());

        let row = rows.iter().find(|r| r.destination_state_code == "BA").unwrap();
        let mut form = tax_rate_form(row);
        form.imported_rate = "5".to_string();
        let updated = update_tax_rate(&data, "BA", &form).unwrap();
        assert_eq!(updated.imported_rate, 5.0);
        assert_eq!(updated.internal_destination_rate, row.internal_destination_rate);

        form.internal_rate = "150".to_string();
        let err = update_tax_rate(&data, "BA", &form).unwrap_err();
        assert!(err.fields().get("internalDestinationRate").is_some());

        restore_default_tax_rates(&data).unwrap();
        let restored = list_tax_rates(&data);
        let ba = restored.iter().find(|r| r.destination_state_code == "BA").unwrap();
        assert_eq!(ba.imported_rate, 4.0);
    }

    #[test]
    fn test_rejected_note_form_prefills_an_edit() {
        let data = setup();
        let form = RejectedNoteForm {
            nfe_number: "1234".into(),
            supplier_name: "Metalúrgica Sul".into(),
            issue_date: "2024-03-01".into(),
            rejection_date: "2024-03-05".into(),
            total_value: "1500.5".into(),
            rejection_reason: "Produto divergente".into(),
            due_dates: vec![DueDateInput {
                date: "2024-04-01".into(),
                value: "1500.5".into(),
            }],
        };
        let note = create_rejected_note(&data, &form).unwrap();

        let mut edit = rejected_note_form(&note);
        assert_eq!(edit.issue_date, "2024-03-01");
        edit.rejection_reason = "Quantidade divergente".into();
        let updated = update_rejected_note(&data, &note.id, &edit).unwrap();

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.rejection_reason, "Quantidade divergente");
        assert_eq!(updated.total_value, 1500.5);
        assert_eq!(list_rejected_notes(&data).len(), 1);
    }

    #[test]
    fn test_blank_provider_search_lists_everything() {
        let data = setup();
        data.seed_defaults().unwrap();
        let all = list_providers(&data);
        assert!(!all.is_empty());
        assert_eq!(search_providers(&data, "   ").len(), all.len());
    }

    #[test]
    fn test_editing_supplier_code_is_a_field_error() {
        let data = setup();
        let form = ProviderForm {
            empresa: "01".into(),
            nome: "Limpeza Sul".into(),
            fornecedor: "000321".into(),
            editor: "ana".into(),
            ..ProviderForm::default()
        };
        let created = create_provider(&data, &form).unwrap();

        let mut edit = provider_form(&created, "bia");
        edit.fornecedor = "000322".into();
        match update_provider(&data, &created.id, &edit).unwrap_err() {
            CommandError::Fields(errors) => assert!(errors.get("fornecedor").is_some()),
            other => panic!("unexpected: {}", other),
        }
        assert_eq!(list_providers(&data)[0].fornecedor, "000321");
    }

    #[test]
    fn test_find_page_returns_notebook_title() {
        let data = setup();
        let notebook = create_notebook(
            &data,
            &NotebookForm {
                title: "Fechamento".into(),
                first_page_title: String::new(),
            },
        )
        .unwrap();
        let page = add_page(
            &data,
            &notebook.id,
            &PageForm {
                title: "Checklist".into(),
                content: "- conciliar".into(),
            },
        )
        .unwrap();

        let (title, found) = find_page(&data, &notebook.id, &page.id).unwrap();
        assert_eq!(title, "Fechamento");
        assert_eq!(found.title, "Checklist");
        assert!(find_page(&data, &notebook.id, "missing").is_none());
    }
}
