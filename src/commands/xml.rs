//! XML Validation Commands

use fiscal_core::domain::{ValidationHistoryItem, ValidationStatus};
use fiscal_core::export::results_to_csv;
use fiscal_core::repository::DataContext;
use fiscal_core::xml::{accepts_file, validate_batch, NfeValidation};
use fiscal_core::DomainError;

use super::CommandResult;

/// Validate an upload batch and record it in the history with one write
pub fn validate_files(data: &DataContext, files: &[(String, String)]) -> CommandResult<Vec<NfeValidation>> {
    if let Some((name, _)) = files.iter().find(|(name, _)| !accepts_file(name)) {
        return Err(DomainError::FileFormat(format!("'{}' is not an .xml file", name)).into());
    }
    let results = validate_batch(files);
    let entries: Vec<(String, ValidationStatus)> =
        results.iter().map(|r| (r.file_name.clone(), r.status)).collect();
    if !entries.is_empty() {
        data.validation_history().record_many(&entries)?;
    }
    log::info!(
        "Validated {} file(s), {} valid",
        results.len(),
        results.iter().filter(|r| r.is_valid()).count()
    );
    Ok(results)
}

pub fn validation_history(data: &DataContext) -> Vec<ValidationHistoryItem> {
    data.validation_history().list()
}

pub fn clear_validation_history(data: &DataContext) -> CommandResult<()> {
    Ok(data.validation_history().clear()?)
}

pub fn export_results_csv(results: &[NfeValidation]) -> CommandResult<String> {
    Ok(results_to_csv(results)?)
}
