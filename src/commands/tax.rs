//! Tax Rate Commands

use fiscal_core::domain::{Origin, TaxRateRow};
use fiscal_core::Clock;
use fiscal_core::repository::{DataContext, Repository};
use fiscal_core::validation::{TaxRateForm, Validate};
use fiscal_core::views::{lookup_tax_rate, sort_tax_rows, TaxQuote};

use super::CommandResult;

/// Rows sorted by state name
pub fn list_tax_rates(data: &DataContext) -> Vec<TaxRateRow> {
    let mut rows = data.tax_rates().list();
    sort_tax_rows(&mut rows);
    rows
}

/// `None` renders the "not found" state
pub fn lookup_rate(data: &DataContext, origin: Origin, destination: &str) -> Option<TaxQuote> {
    lookup_tax_rate(&data.tax_rates().list(), origin, destination)
}

pub fn update_tax_rate(data: &DataContext, state_code: &str, form: &TaxRateForm) -> CommandResult<TaxRateRow> {
    let patches = form.validate(data.clock.now())?;
    Ok(data.tax_rates().update_many(state_code, patches)?)
}

pub fn restore_default_tax_rates(data: &DataContext) -> CommandResult<()> {
    Ok(data.tax_rates().restore_defaults()?)
}

/// Edit form prefilled from a stored row
pub fn tax_rate_form(row: &TaxRateRow) -> TaxRateForm {
    TaxRateForm {
        interstate: Origin::ALL
            .into_iter()
            .map(|origin| {
                let value = row.interstate_rate.get(&origin).map(|r| r.to_string()).unwrap_or_default();
                (origin, value)
            })
            .collect(),
        imported_rate: row.imported_rate.to_string(),
        internal_rate: row.internal_destination_rate.to_string(),
        suframa: row.suframa,
        protocol: row.protocol,
    }
}
