//! The `aiservice.toml` manifest

use anyhow::{Context, Result};
use codegen::CodegenConfig;
use provider::ProvidersConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use codegen::MANIFEST_FILE;

/// Codegen and provider configuration of a crate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Manifest {
    /// The `[codegen]` table
    pub codegen: CodegenConfig,

    /// The `[providers]` and `[selection]` tables
    #[serde(flatten)]
    pub providers: ProvidersConfig,
}

impl Manifest {
    /// Load the manifest, or the defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no manifest at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid manifest {}", path.display()))
    }

    /// Save the manifest to the file
    pub fn save(&self, path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
        std::fs::write(path, toml::to_string(self)?)?;
        tracing::info!("manifest saved to {}", path.display());
        Ok(())
    }
}
