//! Table lookups
//!
//! "Not found" is `None`, never an error.

use crate::domain::{Origin, Provider, TaxRateRow};

/// Rates that apply to a shipment from `origin` into one state
#[derive(Debug, Clone, PartialEq)]
pub struct TaxQuote {
    pub state_name: String,
    pub state_code: String,
    pub interstate_rate: f64,
    pub internal_rate: f64,
    pub imported_rate: f64,
    /// Rate differential owed to the destination (never negative)
    pub difal: f64,
    pub protocol: bool,
    pub suframa: bool,
}

/// Exact (case-insensitive) match on the destination state code
pub fn lookup_tax_rate(rows: &[TaxRateRow], origin: Origin, destination_code: &str) -> Option<TaxQuote> {
    let code = destination_code.trim().to_ascii_uppercase();
    let row = rows.iter().find(|r| r.destination_state_code.eq_ignore_ascii_case(&code))?;
    let interstate_rate = match row.interstate_rate.get(&origin) {
        Some(rate) => *rate,
        None => {
            log::warn!("No interstate rate from {} into {}", origin.code(), code);
            return None;
        }
    };
    Some(TaxQuote {
        state_name: row.destination_state_name.clone(),
        state_code: row.destination_state_code.clone(),
        interstate_rate,
        internal_rate: row.internal_destination_rate,
        imported_rate: row.imported_rate,
        difal: (row.internal_destination_rate - interstate_rate).max(0.0),
        protocol: row.protocol,
        suframa: row.suframa,
    })
}

/// Case-insensitive substring match on `nome` or `nomeBusca`
pub fn provider_matches(provider: &Provider, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }
    provider.nome.to_lowercase().contains(&query) || provider.nome_busca.to_lowercase().contains(&query)
}

/// First provider matching the query
pub fn find_provider<'a>(providers: &'a [Provider], query: &str) -> Option<&'a Provider> {
    providers.iter().find(|p| provider_matches(p, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{default_providers, default_tax_rates};

    #[test]
    fn test_sp_from_es() {
        let quote = lookup_tax_rate(&default_tax_rates(), Origin::Es, "SP").unwrap();
        assert_eq!(quote.interstate_rate, 12.0);
        assert_eq!(quote.internal_rate, 18.0);
        assert_eq!(quote.imported_rate, 4.0);
        assert!(quote.protocol);
        assert_eq!(quote.difal, 6.0);
    }

    #[test]
    fn test_unknown_state_is_not_found() {
        assert!(lookup_tax_rate(&default_tax_rates(), Origin::Es, "ZZ").is_none());
        assert!(lookup_tax_rate(&[], Origin::Sp, "SP").is_none());
    }

    #[test]
    fn test_code_is_case_insensitive() {
        assert!(lookup_tax_rate(&default_tax_rates(), Origin::Sp, " ba ").is_some());
    }

    #[test]
    fn test_provider_search() {
        let providers = default_providers();
        assert_eq!(find_provider(&providers, "vista").unwrap().nome, "BOA VISTA S.A.");
        assert_eq!(find_provider(&providers, "VISTA").unwrap().nome, "BOA VISTA S.A.");
        assert!(find_provider(&providers, "nonexistent-co").is_none());
        assert!(find_provider(&providers, "   ").is_none());
    }
}
