//! Provider dispatch.
//!
//! Providers differ only in their name and the model kinds they offer. The
//! beans they emit follow one pattern, built here.

use crate::{AzureOpenAi, ProvidersConfig, SelectedModel, watsonx::Watsonx};
use aicore::{BeanSupplier, ModelKind, Qualifier, Scope, SyntheticBean, is_default_model};

/// Provider names known to selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKind {
    /// Azure OpenAI.
    AzureOpenAi,
    /// IBM watsonx.ai.
    Watsonx,
}

impl ProviderKind {
    /// Name used in configuration and selection.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AzureOpenAi => AzureOpenAi::NAME,
            Self::Watsonx => Watsonx::NAME,
        }
    }

    /// Parse a provider name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            AzureOpenAi::NAME => Some(Self::AzureOpenAi),
            Watsonx::NAME => Some(Self::Watsonx),
            _ => None,
        }
    }
}

/// Unified provider enum.
#[derive(Debug, Clone)]
pub enum Provider {
    AzureOpenAi(AzureOpenAi),
    Watsonx(Watsonx),
}

impl Provider {
    /// Every built-in provider.
    pub fn all() -> Vec<Self> {
        vec![Self::AzureOpenAi(AzureOpenAi), Self::Watsonx(Watsonx)]
    }

    /// The provider of a kind.
    pub fn of(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::AzureOpenAi => Self::AzureOpenAi(AzureOpenAi),
            ProviderKind::Watsonx => Self::Watsonx(Watsonx),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::AzureOpenAi(_) => ProviderKind::AzureOpenAi,
            Self::Watsonx(_) => ProviderKind::Watsonx,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Feature name reported when the provider is linked.
    pub fn feature(&self) -> &'static str {
        match self {
            Self::AzureOpenAi(_) => AzureOpenAi::FEATURE,
            Self::Watsonx(_) => Watsonx::FEATURE,
        }
    }

    /// Model kinds the provider can be selected for.
    pub fn capabilities(&self) -> &'static [ModelKind] {
        match self {
            Self::AzureOpenAi(p) => p.capabilities(),
            Self::Watsonx(p) => p.capabilities(),
        }
    }

    /// Bean kinds emitted when the provider is selected for `kind`.
    pub fn bean_kinds(&self, kind: ModelKind) -> &'static [ModelKind] {
        match self {
            Self::AzureOpenAi(p) => p.bean_kinds(kind),
            Self::Watsonx(p) => p.bean_kinds(kind),
        }
    }

    /// Capabilities not disabled in configuration.
    pub fn candidates(&self, config: &ProvidersConfig) -> Vec<ModelKind> {
        self.capabilities()
            .iter()
            .copied()
            .filter(|kind| config.enabled(self.name(), *kind))
            .collect()
    }

    /// Model beans for the selections naming this provider.
    pub fn beans(&self, selected: &[SelectedModel]) -> Vec<SyntheticBean> {
        selected
            .iter()
            .filter(|s| s.provider == self.name())
            .flat_map(|s| {
                self.bean_kinds(s.kind)
                    .iter()
                    .map(|kind| model_bean(self.name(), *kind, &s.model_name))
            })
            .collect()
    }
}

/// An application scoped default bean of `kind`, created at run-time init,
/// qualified by model name unless the model is the default one.
pub fn model_bean(provider: &str, kind: ModelKind, model_name: &str) -> SyntheticBean {
    let bean = SyntheticBean::configure(
        kind.bean_type(),
        BeanSupplier::Model {
            provider: provider.to_owned(),
            model: kind,
            model_name: model_name.to_owned(),
        },
    )
    .runtime_init()
    .default_bean()
    .scope(Scope::Application);
    if is_default_model(model_name) {
        bean
    } else {
        bean.qualifier(Qualifier::ModelName(model_name.to_owned()))
    }
}
