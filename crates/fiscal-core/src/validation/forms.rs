//! Form schemas
//!
//! Raw input as typed by the user (strings from inputs) and the rules
//! that turn it into entities. Field names match the stored JSON fields.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use super::{Checker, FieldErrors, Validate};
use crate::document::Document;
use crate::domain::{
    AdminTask, DueDate, NotaFiscal, NotaStatus, Origin, Provider, RejectedNote, TaxRatePatch, Ticket, Topic,
};

#[derive(Debug, Clone, Default)]
pub struct TicketForm {
    pub name: String,
    /// Topic label as shown in the select
    pub topic: String,
    pub description: String,
    pub file_name: Option<String>,
}

impl Validate for TicketForm {
    type Output = Ticket;

    fn validate(&self, now: DateTime<Utc>) -> Result<Ticket, FieldErrors> {
        let mut checker = Checker::new();
        checker.min_len("name", &self.name, 3);
        let topic = Topic::from_label(self.topic.trim());
        if checker.required("topic", &self.topic) {
            checker.check("topic", topic.is_some(), "Assunto inválido");
        }
        checker.min_len("description", &self.description, 10);

        checker.finish(|| {
            let mut ticket = Ticket::new(
                self.name.trim().to_string(),
                topic.unwrap_or(Topic::Other),
                self.description.trim().to_string(),
                now,
            );
            ticket.file_name = self.file_name.clone().filter(|f| !f.trim().is_empty());
            ticket
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
}

impl Validate for TaskForm {
    type Output = AdminTask;

    fn validate(&self, now: DateTime<Utc>) -> Result<AdminTask, FieldErrors> {
        let mut checker = Checker::new();
        checker.min_len("title", &self.title, 3);
        checker.finish(|| AdminTask::new(self.title.trim().to_string(), now))
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotaFiscalForm {
    pub number: String,
    pub issue_date: String,
    pub notes: String,
    /// `datetime-local` value (`YYYY-MM-DDTHH:MM`), empty for none
    pub reminder: String,
    /// Browser `getTimezoneOffset()`: minutes to add to local time to get UTC
    pub tz_offset_minutes: i32,
}

impl Validate for NotaFiscalForm {
    type Output = NotaFiscal;

    fn validate(&self, _now: DateTime<Utc>) -> Result<NotaFiscal, FieldErrors> {
        let mut checker = Checker::new();
        checker.required("number", &self.number);
        let issue_date = checker.date("issueDate", &self.issue_date);

        let reminder = self.reminder.trim();
        let reminder_date = if reminder.is_empty() {
            None
        } else {
            match NaiveDateTime::parse_from_str(reminder, "%Y-%m-%dT%H:%M") {
                Ok(local) => Some((local + Duration::minutes(self.tz_offset_minutes as i64)).and_utc()),
                Err(_) => {
                    checker.fail("reminderDate", "Data inválida");
                    None
                }
            }
        };

        checker.finish(|| NotaFiscal {
            id: String::new(),
            number: self.number.trim().to_string(),
            issue_date: issue_date.unwrap_or_default(),
            notes: self.notes.trim().to_string(),
            reminder_date,
            status: NotaStatus::Pending,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotebookForm {
    pub title: String,
    pub first_page_title: String,
}

impl Validate for NotebookForm {
    /// (notebook title, first page title)
    type Output = (String, String);

    fn validate(&self, _now: DateTime<Utc>) -> Result<(String, String), FieldErrors> {
        let mut checker = Checker::new();
        checker.required("title", &self.title);
        checker.finish(|| {
            let page_title = self.first_page_title.trim();
            let page_title = if page_title.is_empty() { "Introdução" } else { page_title };
            (self.title.trim().to_string(), page_title.to_string())
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageForm {
    pub title: String,
    /// Editor text (Markdown)
    pub content: String,
}

impl Validate for PageForm {
    type Output = (String, Document);

    fn validate(&self, _now: DateTime<Utc>) -> Result<(String, Document), FieldErrors> {
        let mut checker = Checker::new();
        checker.required("title", &self.title);
        checker.finish(|| (self.title.trim().to_string(), Document::from_markdown(&self.content)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DueDateInput {
    pub date: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct RejectedNoteForm {
    pub nfe_number: String,
    pub supplier_name: String,
    pub issue_date: String,
    pub rejection_date: String,
    pub total_value: String,
    pub rejection_reason: String,
    pub due_dates: Vec<DueDateInput>,
}

impl Validate for RejectedNoteForm {
    type Output = RejectedNote;

    fn validate(&self, _now: DateTime<Utc>) -> Result<RejectedNote, FieldErrors> {
        let mut checker = Checker::new();
        checker.required("nfeNumber", &self.nfe_number);
        checker.required("supplierName", &self.supplier_name);
        let issue_date = checker.date("issueDate", &self.issue_date);
        let rejection_date = checker.date("rejectionDate", &self.rejection_date);
        if let (Some(issued), Some(rejected)) = (issue_date, rejection_date) {
            checker.check("rejectionDate", rejected >= issued, "Recusa anterior à emissão");
        }
        let total_value = checker.positive("totalValue", &self.total_value);
        checker.min_len("rejectionReason", &self.rejection_reason, 5);

        checker.check("dueDates", !self.due_dates.is_empty(), "Informe ao menos um vencimento");
        let due_dates: Vec<DueDate> = self
            .due_dates
            .iter()
            .enumerate()
            .filter_map(|(i, due)| {
                let date = checker.date(&format!("dueDates[{}].date", i), &due.date);
                let value = checker.positive(&format!("dueDates[{}].value", i), &due.value);
                Some(DueDate { date: date?, value: value? })
            })
            .collect();

        checker.finish(|| RejectedNote {
            id: String::new(),
            nfe_number: self.nfe_number.trim().to_string(),
            supplier_name: self.supplier_name.trim().to_string(),
            issue_date: issue_date.unwrap_or_default(),
            rejection_date: rejection_date.unwrap_or_default(),
            total_value: total_value.unwrap_or_default(),
            rejection_reason: self.rejection_reason.trim().to_string(),
            due_dates,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderForm {
    pub empresa: String,
    pub nome: String,
    pub fornecedor: String,
    pub descricao: String,
    pub servico: String,
    pub tes: String,
    pub conta: String,
    pub vencimento: String,
    pub municipio: String,
    pub nfts: bool,
    pub simples_nacional: bool,
    pub iss: bool,
    pub codigo_iss: String,
    pub ir: bool,
    pub codigo_ir: String,
    pub pcc: bool,
    pub codigo_pcc: String,
    pub inss: bool,
    pub codigo_inss: String,
    pub email: String,
    pub autenticidade_url: String,
    /// Who is saving the record
    pub editor: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && !value.contains(' ')
        }
        None => false,
    }
}

impl Validate for ProviderForm {
    type Output = Provider;

    fn validate(&self, now: DateTime<Utc>) -> Result<Provider, FieldErrors> {
        let mut checker = Checker::new();
        checker.required("empresa", &self.empresa);
        checker.min_len("nome", &self.nome, 3);
        checker.required("fornecedor", &self.fornecedor);

        if let Some(email) = optional(&self.email) {
            checker.check("email", looks_like_email(&email), "E-mail inválido");
        }
        if let Some(url) = optional(&self.autenticidade_url) {
            let lower = url.to_ascii_lowercase();
            checker.check(
                "autenticidadeUrl",
                lower.starts_with("http://") || lower.starts_with("https://"),
                "URL deve começar com http:// ou https://",
            );
        }
        for (flag, field, code) in [
            (self.iss, "codigoIss", &self.codigo_iss),
            (self.ir, "codigoIr", &self.codigo_ir),
            (self.pcc, "codigoPcc", &self.codigo_pcc),
            (self.inss, "codigoInss", &self.codigo_inss),
        ] {
            if flag {
                checker.required(field, code);
            }
        }

        checker.finish(|| {
            let nome = self.nome.trim().to_string();
            let code_if = |flag: bool, code: &str| if flag { optional(code) } else { None };
            Provider {
                id: String::new(),
                empresa: self.empresa.trim().to_string(),
                nome_busca: nome.to_lowercase(),
                nome,
                fornecedor: self.fornecedor.trim().to_string(),
                descricao: self.descricao.trim().to_string(),
                servico: self.servico.trim().to_string(),
                tes: self.tes.trim().to_string(),
                conta: self.conta.trim().to_string(),
                vencimento: self.vencimento.trim().to_string(),
                municipio: self.municipio.trim().to_string(),
                nfts: self.nfts,
                simples_nacional: self.simples_nacional,
                iss: self.iss,
                codigo_iss: code_if(self.iss, &self.codigo_iss),
                ir: self.ir,
                codigo_ir: code_if(self.ir, &self.codigo_ir),
                pcc: self.pcc,
                codigo_pcc: code_if(self.pcc, &self.codigo_pcc),
                inss: self.inss,
                codigo_inss: code_if(self.inss, &self.codigo_inss),
                email: optional(&self.email),
                autenticidade_url: optional(&self.autenticidade_url),
                last_modified_by: optional(&self.editor),
                last_modified_at: Some(now),
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaxRateForm {
    pub interstate: Vec<(Origin, String)>,
    pub imported_rate: String,
    pub internal_rate: String,
    pub suframa: bool,
    pub protocol: bool,
}

impl Validate for TaxRateForm {
    type Output = Vec<TaxRatePatch>;

    fn validate(&self, _now: DateTime<Utc>) -> Result<Vec<TaxRatePatch>, FieldErrors> {
        let mut checker = Checker::new();
        let mut patches: Vec<TaxRatePatch> = self
            .interstate
            .iter()
            .filter_map(|(origin, value)| {
                let field = format!("interstateRate.{}", origin.code());
                checker.percentage(&field, value).map(|rate| TaxRatePatch::InterstateRate(*origin, rate))
            })
            .collect();
        if let Some(rate) = checker.percentage("importedRate", &self.imported_rate) {
            patches.push(TaxRatePatch::ImportedRate(rate));
        }
        if let Some(rate) = checker.percentage("internalDestinationRate", &self.internal_rate) {
            patches.push(TaxRatePatch::InternalRate(rate));
        }
        patches.push(TaxRatePatch::Suframa(self.suframa));
        patches.push(TaxRatePatch::Protocol(self.protocol));
        checker.finish(|| patches)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PasswordChangeForm {
    pub current: String,
    pub new_password: String,
    pub confirm: String,
}

impl Validate for PasswordChangeForm {
    /// The new password
    type Output = String;

    fn validate(&self, _now: DateTime<Utc>) -> Result<String, FieldErrors> {
        let mut checker = Checker::new();
        checker.required("currentPassword", &self.current);
        if checker.min_len("newPassword", &self.new_password, 4) {
            checker.check("confirmPassword", self.confirm == self.new_password, "As senhas não conferem");
        }
        checker.finish(|| self.new_password.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub password: String,
}

impl Validate for LoginForm {
    type Output = String;

    fn validate(&self, _now: DateTime<Utc>) -> Result<String, FieldErrors> {
        let mut checker = Checker::new();
        checker.required("password", &self.password);
        checker.finish(|| self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TicketStatus;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_ticket_form_valid() {
        let form = TicketForm {
            name: "  Maria ".into(),
            topic: "ICMS".into(),
            description: "Dúvida sobre substituição tributária".into(),
            file_name: Some(String::new()),
        };
        let ticket = form.validate(now()).unwrap();
        assert_eq!(ticket.name, "Maria");
        assert_eq!(ticket.topic, Topic::Icms);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.file_name, None);
        assert_eq!(ticket.created_at, now());
    }

    #[test]
    fn test_ticket_form_field_errors() {
        let form = TicketForm {
            name: "Jo".into(),
            topic: "Folha".into(),
            description: "curta".into(),
            file_name: None,
        };
        let errors = form.validate(now()).unwrap_err();
        assert_eq!(errors.get("name"), Some("Mínimo de 3 caracteres"));
        assert_eq!(errors.get("topic"), Some("Assunto inválido"));
        assert!(errors.get("description").is_some());
    }

    #[test]
    fn test_rejected_note_requires_due_date() {
        let form = RejectedNoteForm {
            nfe_number: "4512".into(),
            supplier_name: "ACME".into(),
            issue_date: "2024-03-01".into(),
            rejection_date: "2024-03-05".into(),
            total_value: "1.500,00".into(),
            rejection_reason: "Valor divergente do pedido".into(),
            due_dates: vec![],
        };
        let errors = form.clone().validate(now()).unwrap_err();
        assert_eq!(errors.get("dueDates"), Some("Informe ao menos um vencimento"));
        assert_eq!(errors.len(), 1);

        let form = RejectedNoteForm {
            due_dates: vec![DueDateInput { date: "2024-04-01".into(), value: "1500".into() }],
            ..form
        };
        let note = form.validate(now()).unwrap();
        assert_eq!(note.total_value, 1500.0);
        assert_eq!(note.due_dates.len(), 1);
    }

    #[test]
    fn test_rejected_note_nested_errors() {
        let form = RejectedNoteForm {
            nfe_number: "1".into(),
            supplier_name: "ACME".into(),
            issue_date: "2024-03-10".into(),
            rejection_date: "2024-03-01".into(),
            total_value: "10".into(),
            rejection_reason: "Duplicada".into(),
            due_dates: vec![DueDateInput { date: "amanhã".into(), value: "0".into() }],
        };
        let errors = form.validate(now()).unwrap_err();
        assert_eq!(errors.get("rejectionDate"), Some("Recusa anterior à emissão"));
        assert_eq!(errors.get("dueDates[0].date"), Some("Data inválida"));
        assert_eq!(errors.get("dueDates[0].value"), Some("Valor deve ser maior que zero"));
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let form = PasswordChangeForm {
            current: "admin".into(),
            new_password: "s3nha".into(),
            confirm: "s3nhA".into(),
        };
        let errors = form.validate(now()).unwrap_err();
        assert_eq!(errors.get("confirmPassword"), Some("As senhas não conferem"));
    }

    #[test]
    fn test_provider_form_derives_search_key() {
        let form = ProviderForm {
            empresa: "01".into(),
            nome: "Boa Vista S.A.".into(),
            fornecedor: "000123".into(),
            ir: true,
            codigo_ir: "1708".into(),
            codigo_pcc: "ignored".into(),
            email: "fiscal@boavista.com.br".into(),
            editor: "ana".into(),
            ..Default::default()
        };
        let provider = form.validate(now()).unwrap();
        assert_eq!(provider.nome_busca, "boa vista s.a.");
        assert_eq!(provider.codigo_ir.as_deref(), Some("1708"));
        assert_eq!(provider.codigo_pcc, None);
        assert_eq!(provider.last_modified_by.as_deref(), Some("ana"));
    }

    #[test]
    fn test_provider_form_rejects_bad_email_and_url() {
        let form = ProviderForm {
            empresa: "01".into(),
            nome: "ACME".into(),
            fornecedor: "1".into(),
            email: "fiscal@".into(),
            autenticidade_url: "javascript:alert(1)".into(),
            iss: true,
            ..Default::default()
        };
        let errors = form.validate(now()).unwrap_err();
        assert_eq!(errors.get("email"), Some("E-mail inválido"));
        assert!(errors.get("autenticidadeUrl").is_some());
        assert_eq!(errors.get("codigoIss"), Some(super::super::REQUIRED));
    }

    #[test]
    fn test_tax_rate_form_bounds() {
        let form = TaxRateForm {
            interstate: vec![(Origin::Es, "12".into()), (Origin::Sp, "107".into())],
            imported_rate: "4".into(),
            internal_rate: "18,5".into(),
            suframa: false,
            protocol: true,
        };
        let errors = form.validate(now()).unwrap_err();
        assert_eq!(errors.get("interstateRate.SP"), Some("Alíquota deve estar entre 0 e 100"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_nota_reminder_converted_to_utc() {
        let form = NotaFiscalForm {
            number: "991".into(),
            issue_date: "2024-05-01".into(),
            notes: String::new(),
            reminder: "2024-05-10T09:00".into(),
            tz_offset_minutes: 180,
        };
        let nota = form.validate(now()).unwrap();
        assert_eq!(nota.reminder_date.unwrap().to_rfc3339(), "2024-05-10T12:00:00+00:00");
    }
}
