//! Codegen configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of the build pipeline, usually the `[codegen]` table of
/// `aiservice.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Path generated code uses to reach the runtime crate.
    pub runtime_crate: String,

    /// Suffix of generated implementation names.
    pub impl_suffix: String,

    /// Joins the text segments of message templates.
    pub default_delimiter: String,

    /// Modules whose factory calls are never analyzed.
    pub framework_prefixes: Vec<String>,

    /// Parameter annotations ignored when binding template variables.
    pub transparent: TransparentAnnotations,

    /// Method annotations copied verbatim onto generated methods.
    pub passthrough_prefixes: Vec<String>,

    /// Optional observability capabilities.
    pub capabilities: Capabilities,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            runtime_crate: "aiservice_core".into(),
            impl_suffix: "Impl".into(),
            default_delimiter: "\n".into(),
            framework_prefixes: Vec::new(),
            transparent: TransparentAnnotations::default(),
            passthrough_prefixes: [
                "retry",
                "timeout",
                "circuit_breaker",
                "fallback",
                "bulkhead",
                "rate_limit",
                "fault_tolerance",
            ]
            .map(String::from)
            .to_vec(),
            capabilities: Capabilities::default(),
        }
    }
}

impl CodegenConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&toml)
    }

    /// Load the `[codegen]` table of a manifest, ignoring the other tables.
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self> {
        #[derive(Deserialize)]
        struct Manifest {
            #[serde(default)]
            codegen: CodegenConfig,
        }

        let path = path.as_ref();
        let toml = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let manifest: Manifest = toml::from_str(&toml)?;
        Ok(manifest.codegen)
    }

    /// Whether a parameter annotation is ignored for binding.
    pub fn is_transparent(&self, annotation: &str) -> bool {
        self.transparent
            .prefixes
            .iter()
            .any(|p| annotation.starts_with(p.as_str()))
            || self
                .transparent
                .suffixes
                .iter()
                .any(|s| annotation.ends_with(s.as_str()))
    }

    /// Whether a method annotation is copied onto generated methods.
    pub fn is_passthrough(&self, annotation: &str) -> bool {
        self.passthrough_prefixes
            .iter()
            .any(|p| annotation.starts_with(p.as_str()))
    }

    /// Whether a module is part of a framework and never analyzed.
    pub fn is_framework(&self, module: &str) -> bool {
        self.framework_prefixes
            .iter()
            .any(|p| module.starts_with(p.as_str()))
    }
}

/// Parameter annotations that do not take part in template binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransparentAnnotations {
    /// Matched against the start of the annotation path.
    pub prefixes: Vec<String>,
    /// Matched against the end of the annotation path.
    pub suffixes: Vec<String>,
}

impl Default for TransparentAnnotations {
    fn default() -> Self {
        Self {
            prefixes: ["validate", "garde", "cfg", "allow", "doc", "tracing", "otel"]
                .map(String::from)
                .to_vec(),
            suffixes: vec!["not_null".into()],
        }
    }
}

/// Capabilities enabled for the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Compute timer and counter descriptors.
    pub metrics: bool,
    /// Compute span descriptors.
    pub tracing: bool,
}
