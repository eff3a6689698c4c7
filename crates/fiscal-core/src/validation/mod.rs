//! Form Validation Layer
//!
//! Every form is checked before a repository is touched. A failed check
//! yields one message per offending field and nothing is written.

mod forms;

pub use forms::{
    DueDateInput, LoginForm, NotaFiscalForm, NotebookForm, PageForm, PasswordChangeForm, ProviderForm,
    RejectedNoteForm, TaskForm, TaxRateForm, TicketForm,
};

use chrono::{DateTime, NaiveDate, Utc};

pub const REQUIRED: &str = "Campo obrigatório";

/// Ordered field → message list; the first message per field wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.0.push((field.to_string(), message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
        f.write_str(&parts.join("; "))
    }
}

/// A form that turns raw input into a typed value
pub trait Validate {
    type Output;

    fn validate(&self, now: DateTime<Utc>) -> Result<Self::Output, FieldErrors>;
}

/// Collects rule failures for one form
#[derive(Debug, Default)]
pub struct Checker {
    errors: FieldErrors,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> bool {
        if !ok {
            self.fail(field, message);
        }
        ok
    }

    pub fn required(&mut self, field: &str, value: &str) -> bool {
        self.check(field, !value.trim().is_empty(), REQUIRED)
    }

    /// Required and at least `min` characters after trimming
    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> bool {
        if !self.required(field, value) {
            return false;
        }
        self.check(
            field,
            value.trim().chars().count() >= min,
            &format!("Mínimo de {} caracteres", min),
        )
    }

    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        if !self.required(field, value) {
            return None;
        }
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.fail(field, "Data inválida");
        }
        parsed
    }

    pub fn decimal(&mut self, field: &str, value: &str) -> Option<f64> {
        if !self.required(field, value) {
            return None;
        }
        let parsed = parse_decimal(value);
        if parsed.is_none() {
            self.fail(field, "Valor inválido");
        }
        parsed
    }

    pub fn positive(&mut self, field: &str, value: &str) -> Option<f64> {
        let parsed = self.decimal(field, value)?;
        self.check(field, parsed > 0.0, "Valor deve ser maior que zero").then_some(parsed)
    }

    pub fn percentage(&mut self, field: &str, value: &str) -> Option<f64> {
        let parsed = self.decimal(field, value)?;
        self.check(field, (0.0..=100.0).contains(&parsed), "Alíquota deve estar entre 0 e 100")
            .then_some(parsed)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// `Ok(build())` when no rule failed
    pub fn finish<T>(self, build: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(build())
        } else {
            Err(self.errors)
        }
    }
}

/// Parse `YYYY-MM-DD` (date inputs) or `DD/MM/YYYY` (typed by hand)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

/// Parse a decimal typed with either `,` or `.` as separator.
/// With both present, `.` groups thousands and `,` is the decimal mark.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let value = value.trim().trim_start_matches("R$").trim();
    if value.is_empty() {
        return None;
    }
    let normalized = if value.contains(',') {
        value.replace('.', "").replace(',', ".")
    } else {
        value.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Campo obrigatório");
        errors.add("name", "Mínimo de 3 caracteres");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some("Campo obrigatório"));
    }

    #[test]
    fn test_parse_decimal_separators() {
        assert_eq!(parse_decimal("1500,50"), Some(1500.5));
        assert_eq!(parse_decimal("1.500,50"), Some(1500.5));
        assert_eq!(parse_decimal("1500.50"), Some(1500.5));
        assert_eq!(parse_decimal("R$ 12"), Some(12.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("2024-03-05"), expected);
        assert_eq!(parse_date("05/03/2024"), expected);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_checker_min_len() {
        let mut checker = Checker::new();
        checker.min_len("name", "Jo", 3);
        checker.min_len("title", "   ", 3);
        let errors = checker.finish(|| ()).unwrap_err();
        assert_eq!(errors.get("name"), Some("Mínimo de 3 caracteres"));
        assert_eq!(errors.get("title"), Some(REQUIRED));
    }
}
