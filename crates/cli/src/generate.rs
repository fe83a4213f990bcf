//! Generate command

use crate::Manifest;
use aicore::{ModelKind, SyntheticBean};
use anyhow::{Context, Result};
use clap::Args;
use codegen::{Processor, TypeIndex};
use provider::{Provider, Requests};
use std::path::{Path, PathBuf};

/// File name of the provider model beans.
pub const MODELS_FILE: &str = "ai_models.json";

/// Generate command arguments
#[derive(Debug, Args)]
pub struct GenerateCmd {
    /// Source root to scan
    #[arg(short, long, default_value = "src")]
    pub src: PathBuf,

    /// Directory receiving the generated files
    #[arg(short, long, default_value = "target/aiservice")]
    pub out: PathBuf,
}

/// Summary of one generation run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub services: usize,
    pub models: Vec<SyntheticBean>,
    pub warnings: Vec<String>,
}

impl GenerateCmd {
    /// Run the generate command
    pub fn run(&self, manifest: &Path) -> Result<Summary> {
        let manifest = Manifest::load_or_default(manifest)?;
        let providers = Provider::all();
        let candidates = provider::candidates(&providers, &manifest.providers);
        let chat_selected = candidates.iter().any(|c| c.kind == ModelKind::Chat);

        let index = TypeIndex::builder().dir(&self.src)?.build();
        let generated = Processor::new(manifest.codegen.clone())
            .chat_model_provider_selected(chat_selected)
            .process(&index)
            .with_context(|| format!("failed to generate services of {}", self.src.display()))?;
        generated.write_to(&self.out)?;

        let requests = Requests {
            chat_models: generated.beans.requested_chat_models.clone(),
            embedding_models: manifest
                .providers
                .selection
                .embedding_models
                .iter()
                .cloned()
                .collect(),
            moderation: generated.beans.needs_moderation_model,
        };
        let wiring = provider::wire(&providers, &manifest.providers, &requests)?;
        let path = self.out.join(MODELS_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(&wiring.beans)?)
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!(
            "generated {} services and {} model beans into {}",
            generated.metadata.len(),
            wiring.beans.len(),
            self.out.display()
        );
        Ok(Summary {
            services: generated.metadata.len(),
            models: wiring.beans,
            warnings: generated.warnings,
        })
    }
}
