//! Provider selection.

use crate::{Provider, ProvidersConfig};
use aicore::{DEFAULT_MODEL_NAME, ModelKind, SyntheticBean};
use std::collections::BTreeSet;

/// A provider offering one model kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub provider: String,
    pub kind: ModelKind,
}

/// The provider chosen for one logical model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedModel {
    pub provider: String,
    pub kind: ModelKind,
    pub model_name: String,
}

/// Models the services need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requests {
    /// Logical chat model names.
    pub chat_models: BTreeSet<String>,
    /// Logical embedding model names.
    pub embedding_models: BTreeSet<String>,
    /// Whether the default moderation model is needed.
    pub moderation: bool,
}

/// Selected providers and the beans they emit.
#[derive(Debug, Clone, Default)]
pub struct Wiring {
    pub selected: Vec<SelectedModel>,
    pub beans: Vec<SyntheticBean>,
}

/// Provider selection failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Nothing offers the requested kind.
    #[error("a {bean} bean was requested, but no model providers were configured")]
    NoProvider { bean: &'static str },

    /// The configured provider is not the only one available.
    #[error(
        "a {bean} bean with provider={requested} was requested via configuration, \
         but the only available provider is {available}"
    )]
    Unavailable {
        bean: &'static str,
        requested: String,
        available: String,
    },

    /// Several providers and no configured choice.
    #[error(
        "a {bean} bean was requested, but since there are multiple available providers, \
         '{key}' needs to be set to one of: {available}"
    )]
    Ambiguous {
        bean: &'static str,
        key: String,
        available: String,
    },

    /// The configured provider is not among several available ones.
    #[error(
        "a {bean} bean was requested, but the value of '{key}' ({requested}) does not match \
         any of the available providers: {available}"
    )]
    Unknown {
        bean: &'static str,
        key: String,
        requested: String,
        available: String,
    },
}

/// Candidates of every provider, in provider order.
pub fn candidates(providers: &[Provider], config: &ProvidersConfig) -> Vec<Candidate> {
    let mut found = Vec::new();
    for provider in providers {
        for kind in provider.candidates(config) {
            tracing::debug!("{} offers {}", provider.feature(), kind.bean_type());
            found.push(Candidate {
                provider: provider.name().to_owned(),
                kind,
            });
        }
    }
    found
}

/// Pick the provider of `kind` for `model_name`.
///
/// A single candidate is taken unless configuration names another one. With
/// several candidates the configured one must be among them.
pub fn select(
    candidates: &[Candidate],
    kind: ModelKind,
    model_name: &str,
    config: &ProvidersConfig,
) -> Result<String, SelectionError> {
    let bean = kind.bean_type();
    let available = candidates
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.provider.as_str())
        .collect::<Vec<_>>();
    let (configured, key) = config.selection.configured(kind, model_name);

    match (available.as_slice(), configured) {
        ([], _) => Err(SelectionError::NoProvider { bean }),
        ([only], Some(requested)) if *only != requested => Err(SelectionError::Unavailable {
            bean,
            requested: requested.to_owned(),
            available: (*only).to_owned(),
        }),
        ([only], _) => Ok((*only).to_owned()),
        (_, None) => Err(SelectionError::Ambiguous {
            bean,
            key,
            available: available.join(", "),
        }),
        (_, Some(requested)) if available.contains(&requested) => Ok(requested.to_owned()),
        (_, Some(requested)) => Err(SelectionError::Unknown {
            bean,
            key,
            requested: requested.to_owned(),
            available: available.join(", "),
        }),
    }
}

/// Select a provider for every requested model and collect the model beans.
pub fn wire(
    providers: &[Provider],
    config: &ProvidersConfig,
    requests: &Requests,
) -> Result<Wiring, SelectionError> {
    let candidates = candidates(providers, config);
    let mut wanted = Vec::new();
    wanted.extend(requests.chat_models.iter().map(|m| (ModelKind::Chat, m.as_str())));
    wanted.extend(
        requests
            .embedding_models
            .iter()
            .map(|m| (ModelKind::Embedding, m.as_str())),
    );
    if requests.moderation {
        wanted.push((ModelKind::Moderation, DEFAULT_MODEL_NAME));
    }

    let mut wiring = Wiring::default();
    for (kind, model_name) in wanted {
        let provider = select(&candidates, kind, model_name, config)?;
        tracing::info!(
            "selected {provider} for {} '{model_name}'",
            kind.bean_type()
        );
        wiring.selected.push(SelectedModel {
            provider,
            kind,
            model_name: model_name.to_owned(),
        });
    }
    for provider in providers {
        wiring.beans.extend(provider.beans(&wiring.selected));
    }
    Ok(wiring)
}
