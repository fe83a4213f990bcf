//! Provider configuration, the `[providers]` and `[selection]` tables of
//! `aiservice.toml`.

use aicore::ModelKind;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Failure to load the provider configuration.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid provider configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Provider toggles and selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Toggles by provider name, `azure-openai`.
    pub providers: BTreeMap<String, KindToggles>,
    /// Which provider serves which model.
    pub selection: Selection,
}

impl ProvidersConfig {
    /// Parse the provider tables of a manifest, ignoring the other tables.
    pub fn from_toml(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }

    /// Load the provider tables of a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml(&text)?)
    }

    /// Whether `provider` offers `kind`. Missing entries are enabled.
    pub fn enabled(&self, provider: &str, kind: ModelKind) -> bool {
        let Some(toggles) = self.providers.get(provider) else {
            return true;
        };
        let toggle = match kind {
            ModelKind::Chat | ModelKind::StreamingChat => &toggles.chat_model,
            ModelKind::Embedding => &toggles.embedding_model,
            ModelKind::Moderation => &toggles.moderation_model,
        };
        toggle.enabled.unwrap_or(true)
    }
}

/// Per kind toggles of one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindToggles {
    pub chat_model: Toggle,
    pub embedding_model: Toggle,
    pub moderation_model: Toggle,
}

/// An optional `enabled` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggle {
    pub enabled: Option<bool>,
}

/// Configured provider per model kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Provider of the default chat model.
    pub chat_model: Option<String>,
    /// Provider of the default embedding model.
    pub embedding_model: Option<String>,
    /// Provider of the default moderation model.
    pub moderation_model: Option<String>,
    /// Logical names of the embedding models to wire.
    pub embedding_models: Vec<String>,
    /// Overrides by logical model name.
    pub named: BTreeMap<String, NamedSelection>,
}

/// Provider overrides of one named model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedSelection {
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
    pub moderation_model: Option<String>,
}

impl Selection {
    /// The configured provider of `kind` for `model_name`, with the
    /// configuration key it was read from.
    ///
    /// Named models fall back to the default selection.
    pub fn configured(&self, kind: ModelKind, model_name: &str) -> (Option<&str>, String) {
        let field = field_name(kind);
        let named = (!aicore::is_default_model(model_name))
            .then(|| self.named.get(model_name))
            .flatten()
            .and_then(|named| match kind {
                ModelKind::Chat | ModelKind::StreamingChat => named.chat_model.as_deref(),
                ModelKind::Embedding => named.embedding_model.as_deref(),
                ModelKind::Moderation => named.moderation_model.as_deref(),
            });
        if let Some(provider) = named {
            return (Some(provider), format!("selection.named.{model_name}.{field}"));
        }
        let default = match kind {
            ModelKind::Chat | ModelKind::StreamingChat => self.chat_model.as_deref(),
            ModelKind::Embedding => self.embedding_model.as_deref(),
            ModelKind::Moderation => self.moderation_model.as_deref(),
        };
        (default, format!("selection.{field}"))
    }
}

fn field_name(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Chat | ModelKind::StreamingChat => "chat_model",
        ModelKind::Embedding => "embedding_model",
        ModelKind::Moderation => "moderation_model",
    }
}
