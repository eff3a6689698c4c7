//! TES lookup
//!
//! Static table of TES (entry/exit type) codes per company. Purchases are
//! keyed by company only; sales by purpose, sale type and, for Zona Franca
//! de Manaus sales, whether the customer has a SUFRAMA registration.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compra,
    Venda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Revenda,
    Consumo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleType {
    Normal,
    Zfm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesQuery {
    pub company: String,
    pub operation: Operation,
    /// Sales only
    pub purpose: Option<Purpose>,
    /// Sales only
    pub sale_type: Option<SaleType>,
    /// ZFM sales only
    pub suframa: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TesCode {
    pub code: &'static str,
    /// Intrastate / interstate CFOP
    pub cfop: &'static str,
    pub description: &'static str,
}

struct ZfmCodes {
    with_suframa: &'static [TesCode],
    without_suframa: &'static [TesCode],
}

struct SaleTypeCodes {
    normal: &'static [TesCode],
    zfm: ZfmCodes,
}

struct CompanyTes {
    company: &'static str,
    name: &'static str,
    purchases: &'static [TesCode],
    revenda: SaleTypeCodes,
    consumo: SaleTypeCodes,
}

const fn tes(code: &'static str, cfop: &'static str, description: &'static str) -> TesCode {
    TesCode { code, cfop, description }
}

static TABLE: &[CompanyTes] = &[
    CompanyTes {
        company: "01",
        name: "Matriz - Serra/ES",
        purchases: &[
            tes("001", "1102/2102", "Compra para comercialização"),
            tes("002", "1556/2556", "Compra de material de uso e consumo"),
            tes("003", "1551/2551", "Compra de ativo imobilizado"),
        ],
        revenda: SaleTypeCodes {
            normal: &[
                tes("501", "5102/6102", "Venda de mercadoria adquirida de terceiros"),
                tes("502", "5403/6403", "Venda com substituição tributária"),
            ],
            zfm: ZfmCodes {
                with_suframa: &[tes("510", "6110", "Venda à ZFM com benefício SUFRAMA")],
                without_suframa: &[tes("511", "6102", "Venda à ZFM sem inscrição SUFRAMA")],
            },
        },
        consumo: SaleTypeCodes {
            normal: &[tes("520", "5102/6108", "Venda a consumidor final não contribuinte")],
            zfm: ZfmCodes {
                with_suframa: &[tes("521", "6109", "Venda à ZFM para consumo com SUFRAMA")],
                without_suframa: &[tes("522", "6108", "Venda à ZFM para consumo sem SUFRAMA")],
            },
        },
    },
    CompanyTes {
        company: "02",
        name: "Filial - São Paulo/SP",
        purchases: &[
            tes("101", "1102/2102", "Compra para comercialização"),
            tes("102", "1407/2407", "Compra para uso e consumo com ST"),
        ],
        revenda: SaleTypeCodes {
            normal: &[tes("601", "5102/6102", "Venda de mercadoria adquirida de terceiros")],
            zfm: ZfmCodes {
                with_suframa: &[tes("610", "6110", "Venda à ZFM com benefício SUFRAMA")],
                without_suframa: &[],
            },
        },
        consumo: SaleTypeCodes {
            normal: &[tes("620", "5102/6108", "Venda a consumidor final")],
            zfm: ZfmCodes {
                with_suframa: &[],
                without_suframa: &[tes("622", "6108", "Venda à ZFM para consumo sem SUFRAMA")],
            },
        },
    },
];

/// (code, name) of every company in the table
pub fn tes_companies() -> Vec<(&'static str, &'static str)> {
    TABLE.iter().map(|c| (c.company, c.name)).collect()
}

/// Codes for the query's path; an empty slice means "no results"
pub fn lookup_tes(query: &TesQuery) -> &'static [TesCode] {
    let Some(company) = TABLE.iter().find(|c| c.company == query.company.trim()) else {
        return &[];
    };
    match query.operation {
        Operation::Compra => company.purchases,
        Operation::Venda => {
            let by_purpose = match query.purpose {
                Some(Purpose::Revenda) => &company.revenda,
                Some(Purpose::Consumo) => &company.consumo,
                None => return &[],
            };
            match query.sale_type {
                Some(SaleType::Normal) => by_purpose.normal,
                Some(SaleType::Zfm) => match query.suframa {
                    Some(true) => by_purpose.zfm.with_suframa,
                    Some(false) => by_purpose.zfm.without_suframa,
                    None => &[],
                },
                None => &[],
            }
        }
    }
}
