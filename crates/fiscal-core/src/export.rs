//! CSV export of XML validation results

use crate::domain::ValidationStatus;
use crate::error::{DomainError, DomainResult};
use crate::xml::NfeValidation;

pub const CSV_HEADERS: [&str; 11] = [
    "Arquivo",
    "Status",
    "Versão NFe",
    "CNPJ Emitente",
    "CNPJ Destinatário",
    "Número Nota",
    "Valor Total",
    "Data Emissão",
    "CFOP",
    "Tipo de Entrada",
    "Erros",
];

pub const EXPORT_FILE_NAME: &str = "validacao_nfe.csv";

fn status_label(status: ValidationStatus) -> &'static str {
    match status {
        ValidationStatus::Valid => "Válido",
        ValidationStatus::Invalid => "Inválido",
    }
}

fn row(result: &NfeValidation) -> Vec<String> {
    let data = result.data.clone().unwrap_or_default();
    let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
    vec![
        result.file_name.clone(),
        status_label(result.status).to_string(),
        data.version.clone().unwrap_or_default(),
        data.issuer_cnpj.clone().unwrap_or_default(),
        data.recipient_doc.clone().unwrap_or_default(),
        data.number.clone().unwrap_or_default(),
        data.total_value.clone().unwrap_or_default(),
        data.emission_date.clone().unwrap_or_default(),
        data.cfop.clone().unwrap_or_default(),
        data.entry_type().unwrap_or_default().to_string(),
        errors.join("; "),
    ]
}

/// One header line plus one row per result, quoted where needed
pub fn results_to_csv(results: &[NfeValidation]) -> DomainResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let to_err = |e: csv::Error| DomainError::Serialization(e.to_string());

    writer.write_record(CSV_HEADERS).map_err(to_err)?;
    for result in results {
        writer.write_record(row(result)).map_err(to_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::validate_nfe;

    #[test]
    fn test_header_and_rows() {
        let results = vec![
            validate_nfe("a.xml", "<nfeProc/>"),
            validate_nfe("b.xml", "not xml"),
        ];
        let csv = results_to_csv(&results).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Arquivo,Status,Versão NFe"));
        assert!(lines[1].starts_with("a.xml,Inválido"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let results = vec![validate_nfe("nota, cópia.xml", "<nfeProc/>")];
        let csv = results_to_csv(&results).unwrap();
        assert!(csv.contains("\"nota, cópia.xml\""));
    }

    #[test]
    fn test_empty_results_only_header() {
        let csv = results_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
