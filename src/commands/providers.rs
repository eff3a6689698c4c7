//! Provider Commands

use fiscal_core::domain::Provider;
use fiscal_core::Clock;
use fiscal_core::repository::{DataContext, Repository, SearchableRepository};
use fiscal_core::validation::{ProviderForm, Validate};

use super::CommandResult;

pub fn list_providers(data: &DataContext) -> Vec<Provider> {
    let mut providers = data.providers().list();
    providers.sort_by(|a, b| a.nome.cmp(&b.nome));
    providers
}

/// Empty query lists everything
pub fn search_providers(data: &DataContext, query: &str) -> Vec<Provider> {
    if query.trim().is_empty() {
        return list_providers(data);
    }
    data.providers().search(query)
}

pub fn create_provider(data: &DataContext, form: &ProviderForm) -> CommandResult<Provider> {
    let provider = form.validate(data.clock.now())?;
    Ok(data.providers().create(provider)?)
}

pub fn update_provider(data: &DataContext, id: &str, form: &ProviderForm) -> CommandResult<Provider> {
    let provider = form.validate(data.clock.now())?;
    Ok(data.providers().replace_provider(id, provider)?)
}

pub fn delete_provider(data: &DataContext, id: &str) -> CommandResult<bool> {
    Ok(data.providers().delete_by_id(id)?)
}

/// Edit form prefilled from a stored provider
pub fn provider_form(provider: &Provider, editor: &str) -> ProviderForm {
    ProviderForm {
        empresa: provider.empresa.clone(),
        nome: provider.nome.clone(),
        fornecedor: provider.fornecedor.clone(),
        descricao: provider.descricao.clone(),
        servico: provider.servico.clone(),
        tes: provider.tes.clone(),
        conta: provider.conta.clone(),
        vencimento: provider.vencimento.clone(),
        municipio: provider.municipio.clone(),
        nfts: provider.nfts,
        simples_nacional: provider.simples_nacional,
        iss: provider.iss,
        codigo_iss: provider.codigo_iss.clone().unwrap_or_default(),
        ir: provider.ir,
        codigo_ir: provider.codigo_ir.clone().unwrap_or_default(),
        pcc: provider.pcc,
        codigo_pcc: provider.codigo_pcc.clone().unwrap_or_default(),
        inss: provider.inss,
        codigo_inss: provider.codigo_inss.clone().unwrap_or_default(),
        email: provider.email.clone().unwrap_or_default(),
        autenticidade_url: provider.autenticidade_url.clone().unwrap_or_default(),
        editor: editor.to_string(),
    }
}
