//! Entry point for build scripts.

use crate::{CodegenConfig, Generated, Processor, index::TypeIndex};
use anyhow::Context;
use std::{env, path::PathBuf};

/// Name of the optional manifest next to the crate's `Cargo.toml`.
pub const MANIFEST_FILE: &str = "aiservice.toml";

/// Generates the services of the crate being built.
///
/// ```no_run
/// // build.rs
/// fn main() -> anyhow::Result<()> {
///     aiservice_codegen::Build::new().run()?;
///     Ok(())
/// }
/// ```
///
/// The generated source is then included with
/// `include!(concat!(env!("OUT_DIR"), "/ai_services.rs"))`.
#[derive(Debug, Default)]
pub struct Build {
    src: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    config: Option<CodegenConfig>,
    chat_model_provider_selected: Option<bool>,
}

impl Build {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source root to scan. Defaults to `$CARGO_MANIFEST_DIR/src`.
    pub fn src(mut self, src: impl Into<PathBuf>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Output directory. Defaults to `$OUT_DIR`.
    pub fn out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(out_dir.into());
        self
    }

    /// Use this configuration instead of the manifest's `[codegen]` table.
    pub fn config(mut self, config: CodegenConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn chat_model_provider_selected(mut self, selected: bool) -> Self {
        self.chat_model_provider_selected = Some(selected);
        self
    }

    pub fn run(self) -> anyhow::Result<Generated> {
        let manifest_dir = env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from);
        let src = match (self.src, &manifest_dir) {
            (Some(src), _) => src,
            (None, Some(dir)) => dir.join("src"),
            (None, None) => anyhow::bail!("CARGO_MANIFEST_DIR is not set and no source root was given"),
        };
        let out_dir = match self.out_dir {
            Some(dir) => dir,
            None => env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .context("OUT_DIR is not set and no output directory was given")?,
        };

        let config = match self.config {
            Some(config) => config,
            None => {
                let manifest = manifest_dir.map(|dir| dir.join(MANIFEST_FILE));
                match manifest.filter(|path| path.exists()) {
                    Some(path) => {
                        println!("cargo:rerun-if-changed={}", path.display());
                        CodegenConfig::from_manifest(&path)?
                    }
                    None => CodegenConfig::default(),
                }
            }
        };

        println!("cargo:rerun-if-changed={}", src.display());
        let index = TypeIndex::builder().dir(&src)?.build();
        let generated = Processor::new(config)
            .chat_model_provider_selected(self.chat_model_provider_selected.unwrap_or(true))
            .process(&index)
            .with_context(|| format!("failed to generate ai services of {}", src.display()))?;
        for warning in &generated.warnings {
            println!("cargo:warning={warning}");
        }
        generated.write_to(&out_dir)?;
        Ok(generated)
    }
}
