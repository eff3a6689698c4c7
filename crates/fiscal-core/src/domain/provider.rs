//! Provider (Prestador) Entity
//!
//! Service providers with their accounting setup: TES, ledger account,
//! due day and which taxes are withheld at payment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{ApplyPatch, CollectionKey, Entity};

/// A service provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub empresa: String,
    pub nome: String,
    /// Lowercased search key derived from `nome`
    #[serde(default)]
    pub nome_busca: String,
    /// Supplier code in the ERP
    pub fornecedor: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(default)]
    pub servico: String,
    #[serde(default)]
    pub tes: String,
    #[serde(default)]
    pub conta: String,
    /// Payment due rule, e.g. "Dia 10"
    #[serde(default)]
    pub vencimento: String,
    #[serde(default)]
    pub municipio: String,

    // Withholding flags and their revenue codes
    #[serde(default)]
    pub nfts: bool,
    #[serde(default)]
    pub simples_nacional: bool,
    #[serde(default)]
    pub iss: bool,
    #[serde(default)]
    pub codigo_iss: Option<String>,
    #[serde(default)]
    pub ir: bool,
    #[serde(default)]
    pub codigo_ir: Option<String>,
    #[serde(default)]
    pub pcc: bool,
    #[serde(default)]
    pub codigo_pcc: Option<String>,
    #[serde(default)]
    pub inss: bool,
    #[serde(default)]
    pub codigo_inss: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
    /// Where the invoice authenticity can be checked
    #[serde(default)]
    pub autenticidade_url: Option<String>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default)]
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// Taxes that can be withheld when paying a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Withholding {
    Iss,
    Ir,
    Pcc,
    Inss,
}

impl Withholding {
    pub fn label(&self) -> &'static str {
        match self {
            Withholding::Iss => "ISS",
            Withholding::Ir => "IR",
            Withholding::Pcc => "PCC",
            Withholding::Inss => "INSS",
        }
    }
}

impl Provider {
    /// Withheld taxes with their revenue codes
    pub fn withholdings(&self) -> Vec<(Withholding, Option<&str>)> {
        [
            (self.iss, Withholding::Iss, self.codigo_iss.as_deref()),
            (self.ir, Withholding::Ir, self.codigo_ir.as_deref()),
            (self.pcc, Withholding::Pcc, self.codigo_pcc.as_deref()),
            (self.inss, Withholding::Inss, self.codigo_inss.as_deref()),
        ]
        .into_iter()
        .filter(|(on, _, _)| *on)
        .map(|(_, kind, code)| (kind, code))
        .collect()
    }

    /// Providers under Simples Nacional have no federal withholding
    pub fn is_exempt_from_federal(&self) -> bool {
        self.simples_nacional
    }
}

impl Entity for Provider {
    const COLLECTION: CollectionKey = CollectionKey::Providers;
    type Patch = ProviderPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn natural_id(&self) -> Option<String> {
        let code = self.fornecedor.trim();
        (!code.is_empty()).then(|| code.to_string())
    }
}

/// Changes to a provider record
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPatch {
    /// Full edit from the provider form; keeps the id
    Replace(Box<Provider>),
    Email(Option<String>),
    Tes(String),
    /// Who touched the record and when
    Touched { by: String, at: DateTime<Utc> },
}

impl ApplyPatch<Provider> for ProviderPatch {
    fn apply(self, target: &mut Provider) {
        match self {
            ProviderPatch::Replace(provider) => {
                let id = std::mem::take(&mut target.id);
                *target = *provider;
                target.id = id;
            }
            ProviderPatch::Email(email) => target.email = email,
            ProviderPatch::Tes(tes) => target.tes = tes,
            ProviderPatch::Touched { by, at } => {
                target.last_modified_by = Some(by);
                target.last_modified_at = Some(at);
            }
        }
    }
}

fn seed(empresa: &str, nome: &str, fornecedor: &str, servico: &str, tes: &str, conta: &str, municipio: &str) -> Provider {
    Provider {
        id: fornecedor.to_string(),
        empresa: empresa.to_string(),
        nome: nome.to_string(),
        nome_busca: nome.to_lowercase(),
        fornecedor: fornecedor.to_string(),
        servico: servico.to_string(),
        tes: tes.to_string(),
        conta: conta.to_string(),
        vencimento: "Dia 10".to_string(),
        municipio: municipio.to_string(),
        ..Default::default()
    }
}

/// Providers loaded on first run
pub fn default_providers() -> Vec<Provider> {
    let mut boa_vista = seed("01", "BOA VISTA S.A.", "000123", "Consulta de crédito", "101", "3.1.02.005", "São Paulo");
    boa_vista.descricao = "Serviço de análise cadastral".to_string();
    boa_vista.ir = true;
    boa_vista.codigo_ir = Some("1708".to_string());
    boa_vista.pcc = true;
    boa_vista.codigo_pcc = Some("5952".to_string());
    boa_vista.autenticidade_url = Some("https://nfe.prefeitura.sp.gov.br".to_string());

    let mut limpeza = seed("01", "LIMPA TUDO SERVIÇOS LTDA", "000456", "Limpeza e conservação", "102", "3.1.03.010", "Vitória");
    limpeza.iss = true;
    limpeza.codigo_iss = Some("7.10".to_string());
    limpeza.inss = true;
    limpeza.codigo_inss = Some("1162".to_string());

    let mut contabil = seed("02", "ESCRITÓRIO CONTÁBIL ALFA", "000789", "Assessoria contábil", "103", "3.1.02.001", "Serra");
    contabil.simples_nacional = true;
    contabil.nfts = true;

    vec![boa_vista, limpeza, contabil]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_id_from_supplier_code() {
        let mut p = Provider::default();
        assert_eq!(p.natural_id(), None);
        p.fornecedor = " 000999 ".into();
        assert_eq!(p.natural_id().as_deref(), Some("000999"));
    }

    #[test]
    fn test_withholdings_listed_in_order() {
        let boa_vista = &default_providers()[0];
        let kinds: Vec<_> = boa_vista.withholdings().into_iter().map(|(k, _)| k.label()).collect();
        assert_eq!(kinds, vec!["IR", "PCC"]);
    }

    #[test]
    fn test_replace_keeps_id() {
        let mut p = default_providers().remove(0);
        let mut edited = p.clone();
        edited.id = "other".into();
        edited.nome = "BOA VISTA SERVIÇOS".into();
        ProviderPatch::Replace(Box::new(edited)).apply(&mut p);
        assert_eq!(p.id, "000123");
        assert_eq!(p.nome, "BOA VISTA SERVIÇOS");
    }
}
