//! NF-e XML validation
//!
//! Checks an uploaded authorized NF-e (`nfeProc` envelope) and pulls out the
//! fields the fiscal team reconciles. Structural problems (not XML, wrong
//! root) stop extraction; missing fields are reported one by one next to
//! whatever could be read.

use roxmltree::Node;

use crate::domain::ValidationStatus;

pub const EXPECTED_ROOT: &str = "nfeProc";

/// Fields every valid NF-e must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfeField {
    IssuerTaxId,
    RecipientTaxId,
    Number,
    TotalValue,
}

impl NfeField {
    pub fn label(&self) -> &'static str {
        match self {
            NfeField::IssuerTaxId => "issuer tax id",
            NfeField::RecipientTaxId => "recipient tax id",
            NfeField::Number => "invoice number",
            NfeField::TotalValue => "total value",
        }
    }
}

/// One problem found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlIssue {
    Malformed(String),
    UnexpectedRoot(String),
    MissingField(NfeField),
}

impl XmlIssue {
    pub fn is_structural(&self) -> bool {
        !matches!(self, XmlIssue::MissingField(_))
    }
}

impl std::fmt::Display for XmlIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XmlIssue::Malformed(reason) => write!(f, "malformed XML: {}", reason),
            XmlIssue::UnexpectedRoot(found) => {
                write!(f, "expected root element '{}', found '{}'", EXPECTED_ROOT, found)
            }
            XmlIssue::MissingField(field) => write!(f, "{} not found", field.label()),
        }
    }
}

/// Values read from the document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NfeData {
    pub version: Option<String>,
    pub issuer_cnpj: Option<String>,
    /// CNPJ, or CPF for individuals
    pub recipient_doc: Option<String>,
    pub number: Option<String>,
    pub total_value: Option<String>,
    pub emission_date: Option<String>,
    /// CFOP of the first item
    pub cfop: Option<String>,
}

impl NfeData {
    /// Operation scope from the CFOP's first digit
    pub fn entry_type(&self) -> Option<&'static str> {
        match self.cfop.as_deref()?.chars().next()? {
            '1' | '5' => Some("Interna"),
            '2' | '6' => Some("Interestadual"),
            '3' | '7' => Some("Exterior"),
            _ => None,
        }
    }

    pub fn total_value_number(&self) -> Option<f64> {
        self.total_value.as_deref()?.trim().parse().ok()
    }
}

/// Outcome for one file
#[derive(Debug, Clone, PartialEq)]
pub struct NfeValidation {
    pub file_name: String,
    pub status: ValidationStatus,
    /// `None` when the document could not be read at all
    pub data: Option<NfeData>,
    pub errors: Vec<XmlIssue>,
}

impl NfeValidation {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }

    fn finish(file_name: &str, data: Option<NfeData>, errors: Vec<XmlIssue>) -> Self {
        let status = if errors.is_empty() { ValidationStatus::Valid } else { ValidationStatus::Invalid };
        Self {
            file_name: file_name.to_string(),
            status,
            data,
            errors,
        }
    }
}

/// Only `.xml` files are offered for validation
pub fn accepts_file(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".xml")
}

fn is_named(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| is_named(n, name))
}

/// Trimmed, non-empty text at the end of a child path
fn text_at(node: Node<'_, '_>, path: &[&str]) -> Option<String> {
    let mut current = node;
    for name in path {
        current = child(current, name)?;
    }
    current.text().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

fn extract(root: Node<'_, '_>) -> NfeData {
    let inf = root.descendants().find(|n| is_named(n, "infNFe"));
    let Some(inf) = inf else {
        return NfeData {
            version: root.attribute("versao").map(str::to_string),
            ..Default::default()
        };
    };
    NfeData {
        version: inf
            .attribute("versao")
            .or_else(|| root.attribute("versao"))
            .map(str::to_string),
        issuer_cnpj: text_at(inf, &["emit", "CNPJ"]).or_else(|| text_at(inf, &["emit", "CPF"])),
        recipient_doc: text_at(inf, &["dest", "CNPJ"]).or_else(|| text_at(inf, &["dest", "CPF"])),
        number: text_at(inf, &["ide", "nNF"]),
        total_value: text_at(inf, &["total", "ICMSTot", "vNF"]),
        emission_date: text_at(inf, &["ide", "dhEmi"]).or_else(|| text_at(inf, &["ide", "dEmi"])),
        cfop: inf
            .children()
            .filter(|n| is_named(n, "det"))
            .find_map(|det| text_at(det, &["prod", "CFOP"])),
    }
}

/// Validate one NF-e document
pub fn validate_nfe(file_name: &str, xml: &str) -> NfeValidation {
    let doc = match roxmltree::Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            log::info!("'{}' is not well-formed XML: {}", file_name, e);
            return NfeValidation::finish(file_name, None, vec![XmlIssue::Malformed(e.to_string())]);
        }
    };

    let root = doc.root_element();
    if !is_named(&root, EXPECTED_ROOT) {
        let found = root.tag_name().name().to_string();
        return NfeValidation::finish(file_name, None, vec![XmlIssue::UnexpectedRoot(found)]);
    }

    let data = extract(root);
    let errors: Vec<XmlIssue> = [
        (NfeField::IssuerTaxId, data.issuer_cnpj.is_some()),
        (NfeField::RecipientTaxId, data.recipient_doc.is_some()),
        (NfeField::Number, data.number.is_some()),
        (NfeField::TotalValue, data.total_value.is_some()),
    ]
    .into_iter()
    .filter(|(_, present)| !present)
    .map(|(field, _)| XmlIssue::MissingField(field))
    .collect();

    NfeValidation::finish(file_name, Some(data), errors)
}

/// Validate every (file name, content) pair of an upload batch
pub fn validate_batch(files: &[(String, String)]) -> Vec<NfeValidation> {
    files.iter().map(|(name, xml)| validate_nfe(name, xml)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfe(total: Option<&str>) -> String {
        let total = total
            .map(|v| format!("<total><ICMSTot><vNF>{}</vNF></ICMSTot></total>", v))
            .unwrap_or_default();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe32240112345678000190550010000012341000012345" versao="4.00">
      <ide><nNF>1234</nNF><dhEmi>2024-01-15T10:30:00-03:00</dhEmi></ide>
      <emit><CNPJ>12345678000190</CNPJ></emit>
      <dest><CNPJ>98765432000110</CNPJ></dest>
      <det nItem="1"><prod><CFOP>6102</CFOP></prod></det>
      {}
    </infNFe>
  </NFe>
</nfeProc>"#,
            total
        )
    }

    #[test]
    fn test_complete_document_is_valid() {
        let result = validate_nfe("nota.xml", &nfe(Some("1500.00")));
        assert!(result.is_valid());
        let data = result.data.unwrap();
        assert_eq!(data.number.as_deref(), Some("1234"));
        assert_eq!(data.version.as_deref(), Some("4.00"));
        assert_eq!(data.cfop.as_deref(), Some("6102"));
        assert_eq!(data.entry_type(), Some("Interestadual"));
        assert_eq!(data.total_value_number(), Some(1500.0));
    }

    #[test]
    fn test_missing_total_is_single_error() {
        let result = validate_nfe("nota.xml", &nfe(None));
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert_eq!(result.errors, vec![XmlIssue::MissingField(NfeField::TotalValue)]);
        assert_eq!(result.errors[0].to_string(), "total value not found");
        let data = result.data.unwrap();
        assert_eq!(data.issuer_cnpj.as_deref(), Some("12345678000190"));
        assert_eq!(data.recipient_doc.as_deref(), Some("98765432000110"));
        assert_eq!(data.number.as_deref(), Some("1234"));
        assert_eq!(data.emission_date.as_deref(), Some("2024-01-15T10:30:00-03:00"));
    }

    #[test]
    fn test_wrong_root_is_structural() {
        let result = validate_nfe("evento.xml", "<procEventoNFe><evento/></procEventoNFe>");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].is_structural());
        assert!(result.data.is_none());
    }

    #[test]
    fn test_malformed_xml() {
        let result = validate_nfe("quebrado.xml", "<nfeProc><NFe></nfeProc>");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], XmlIssue::Malformed(_)));
        assert!(result.data.is_none());
    }

    #[test]
    fn test_empty_envelope_reports_every_field() {
        let result = validate_nfe("vazio.xml", "<nfeProc versao=\"4.00\"/>");
        assert_eq!(result.errors.len(), 4);
        assert_eq!(result.data.unwrap().version.as_deref(), Some("4.00"));
    }

    #[test]
    fn test_accepts_only_xml() {
        assert!(accepts_file("NOTA.XML"));
        assert!(!accepts_file("nota.pdf"));
    }
}
