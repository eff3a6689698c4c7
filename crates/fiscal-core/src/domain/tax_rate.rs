//! Tax Rate Entity
//!
//! ICMS rates per destination state, keyed by the state code. The table is
//! seeded from `default_tax_rates` on first load and edited by admins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{ApplyPatch, CollectionKey, Entity};

/// States the company ships from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Origin {
    Es,
    Sp,
    Mg,
    Rj,
    Pr,
    Sc,
    Rs,
}

impl Origin {
    pub const ALL: [Origin; 7] = [Origin::Es, Origin::Sp, Origin::Mg, Origin::Rj, Origin::Pr, Origin::Sc, Origin::Rs];

    pub fn code(&self) -> &'static str {
        match self {
            Origin::Es => "ES",
            Origin::Sp => "SP",
            Origin::Mg => "MG",
            Origin::Rj => "RJ",
            Origin::Pr => "PR",
            Origin::Sc => "SC",
            Origin::Rs => "RS",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|o| o.code() == code)
    }

    /// South/Southeast origins (except ES) pay 7% into N/NE/CO and ES
    fn is_developed_region(&self) -> bool {
        !matches!(self, Origin::Es)
    }
}

/// One row of the ICMS table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRateRow {
    pub destination_state_name: String,
    pub destination_state_code: String,
    /// Interstate rate by origin state
    pub interstate_rate: BTreeMap<Origin, f64>,
    pub imported_rate: f64,
    pub internal_destination_rate: f64,
    #[serde(default)]
    pub suframa: bool,
    #[serde(default)]
    pub protocol: bool,
}

impl Entity for TaxRateRow {
    const COLLECTION: CollectionKey = CollectionKey::TaxRates;
    type Patch = TaxRatePatch;

    fn id(&self) -> &str {
        &self.destination_state_code
    }

    fn set_id(&mut self, id: String) {
        self.destination_state_code = id;
    }

    fn natural_id(&self) -> Option<String> {
        Some(self.destination_state_code.clone())
    }
}

/// Admin edits to a tax row
#[derive(Debug, Clone, PartialEq)]
pub enum TaxRatePatch {
    InterstateRate(Origin, f64),
    ImportedRate(f64),
    InternalRate(f64),
    Suframa(bool),
    Protocol(bool),
}

impl ApplyPatch<TaxRateRow> for TaxRatePatch {
    fn apply(self, target: &mut TaxRateRow) {
        match self {
            TaxRatePatch::InterstateRate(origin, rate) => {
                target.interstate_rate.insert(origin, rate);
            }
            TaxRatePatch::ImportedRate(rate) => target.imported_rate = rate,
            TaxRatePatch::InternalRate(rate) => target.internal_destination_rate = rate,
            TaxRatePatch::Suframa(flag) => target.suframa = flag,
            TaxRatePatch::Protocol(flag) => target.protocol = flag,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Region {
    North,
    Northeast,
    CenterWest,
    Southeast,
    South,
}

// (code, name, internal rate, region, suframa, protocol)
const STATES: &[(&str, &str, f64, Region, bool, bool)] = &[
    ("AC", "Acre", 19.0, Region::North, true, false),
    ("AL", "Alagoas", 19.0, Region::Northeast, false, false),
    ("AP", "Amapá", 18.0, Region::North, true, false),
    ("AM", "Amazonas", 20.0, Region::North, true, false),
    ("BA", "Bahia", 20.5, Region::Northeast, false, true),
    ("CE", "Ceará", 20.0, Region::Northeast, false, false),
    ("DF", "Distrito Federal", 20.0, Region::CenterWest, false, false),
    ("ES", "Espírito Santo", 17.0, Region::Southeast, false, true),
    ("GO", "Goiás", 19.0, Region::CenterWest, false, false),
    ("MA", "Maranhão", 23.0, Region::Northeast, false, false),
    ("MT", "Mato Grosso", 17.0, Region::CenterWest, false, false),
    ("MS", "Mato Grosso do Sul", 17.0, Region::CenterWest, false, false),
    ("MG", "Minas Gerais", 18.0, Region::Southeast, false, true),
    ("PA", "Pará", 19.0, Region::North, false, false),
    ("PB", "Paraíba", 20.0, Region::Northeast, false, false),
    ("PR", "Paraná", 19.5, Region::South, false, true),
    ("PE", "Pernambuco", 20.5, Region::Northeast, false, true),
    ("PI", "Piauí", 22.5, Region::Northeast, false, false),
    ("RJ", "Rio de Janeiro", 22.0, Region::Southeast, false, true),
    ("RN", "Rio Grande do Norte", 20.0, Region::Northeast, false, false),
    ("RS", "Rio Grande do Sul", 17.0, Region::South, false, true),
    ("RO", "Rondônia", 19.5, Region::North, true, false),
    ("RR", "Roraima", 20.0, Region::North, true, false),
    ("SC", "Santa Catarina", 17.0, Region::South, false, true),
    ("SP", "São Paulo", 18.0, Region::Southeast, false, true),
    ("SE", "Sergipe", 19.0, Region::Northeast, false, false),
    ("TO", "Tocantins", 20.0, Region::North, false, false),
];

const IMPORTED_RATE: f64 = 4.0;

fn interstate_rate(origin: Origin, code: &str, region: Region, internal: f64) -> f64 {
    if origin.code() == code {
        return internal;
    }
    let reduced_destination = matches!(region, Region::North | Region::Northeast | Region::CenterWest) || code == "ES";
    if origin.is_developed_region() && reduced_destination {
        7.0
    } else {
        12.0
    }
}

/// The built-in ICMS table used for first load and "restore defaults"
pub fn default_tax_rates() -> Vec<TaxRateRow> {
    STATES
        .iter()
        .map(|&(code, name, internal, region, suframa, protocol)| TaxRateRow {
            destination_state_name: name.to_string(),
            destination_state_code: code.to_string(),
            interstate_rate: Origin::ALL
                .into_iter()
                .map(|origin| (origin, interstate_rate(origin, code, region, internal)))
                .collect(),
            imported_rate: IMPORTED_RATE,
            internal_destination_rate: internal,
            suframa,
            protocol,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str) -> TaxRateRow {
        default_tax_rates().into_iter().find(|r| r.destination_state_code == code).unwrap()
    }

    #[test]
    fn test_defaults_cover_all_states() {
        let rows = default_tax_rates();
        assert_eq!(rows.len(), 27);
        let mut codes: Vec<_> = rows.iter().map(|r| r.id().to_string()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 27);
    }

    #[test]
    fn test_sao_paulo_from_espirito_santo() {
        let sp = row("SP");
        assert_eq!(sp.interstate_rate[&Origin::Es], 12.0);
        assert_eq!(sp.internal_destination_rate, 18.0);
        assert_eq!(sp.imported_rate, 4.0);
        assert!(sp.protocol);
    }

    #[test]
    fn test_reduced_rate_into_north() {
        let am = row("AM");
        assert_eq!(am.interstate_rate[&Origin::Sp], 7.0);
        assert_eq!(am.interstate_rate[&Origin::Es], 12.0);
        assert!(am.suframa);
    }

    #[test]
    fn test_origin_keys_serialize_uppercase() {
        let json = serde_json::to_value(row("BA")).unwrap();
        assert_eq!(json["interstateRate"]["ES"], 12.0);
        assert_eq!(json["destinationStateCode"], "BA");
    }
}
