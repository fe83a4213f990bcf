//! The processing pipeline: registry, scan, extraction, synthesis.

use crate::{
    CodegenConfig, Error, Result,
    extract::Extractor,
    index::{MethodDecl, TypeDecl, TypeIndex, path_text},
    names,
    registry::{self, BeanPlan},
    scan,
    synth::{ClassSpec, Synthesizer},
};
use aicore::{AiServiceMetadata, ClassCreateInfo};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};
use syn::Type;

/// File name of the generated source.
pub const SOURCE_FILE: &str = "ai_services.rs";
/// File name of the serialized metadata table.
pub const METADATA_FILE: &str = "ai_services.json";
/// File name of the bean manifest.
pub const BEANS_FILE: &str = "ai_beans.json";

/// Types the container must be able to construct or inspect reflectively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflective {
    /// Constructed through their no-args constructor or generated constructor.
    pub constructors: BTreeSet<String>,
    /// Inspected field by field, for structured output.
    pub fields: BTreeSet<String>,
    /// Non-std return types of generated methods.
    pub types: BTreeSet<String>,
}

/// Everything the container needs besides the generated source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanManifest {
    #[serde(flatten)]
    pub plan: BeanPlan,
    pub reflective: Reflective,
    /// Logical names of the chat models declarative services need.
    pub requested_chat_models: BTreeSet<String>,
    pub needs_moderation_model: bool,
    /// Wrapper beans enabled by the build capabilities.
    pub additional_beans: Vec<String>,
}

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Formatted Rust source of the implementations.
    pub source: String,
    pub metadata: AiServiceMetadata,
    pub beans: BeanManifest,
    /// Non-fatal irregularities found while scanning.
    pub warnings: Vec<String>,
}

impl Generated {
    /// Write the source, metadata and bean manifest into `out_dir`.
    pub fn write_to(&self, out_dir: impl AsRef<Path>) -> Result<()> {
        let out_dir = out_dir.as_ref();
        std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
        let files = [
            (SOURCE_FILE, self.source.clone()),
            (METADATA_FILE, self.metadata.to_json()?),
            (BEANS_FILE, serde_json::to_string_pretty(&self.beans)?),
        ];
        for (name, contents) in files {
            let path = out_dir.join(name);
            std::fs::write(&path, contents).map_err(|e| Error::io(path, e))?;
        }
        tracing::info!("generated {} ai services into {}", self.metadata.len(), out_dir.display());
        Ok(())
    }
}

/// Runs the pipeline over an index.
#[derive(Debug, Clone)]
pub struct Processor {
    config: CodegenConfig,
    chat_model_provider_selected: bool,
}

impl Processor {
    pub fn new(config: CodegenConfig) -> Self {
        Self {
            config,
            chat_model_provider_selected: true,
        }
    }

    /// Whether a chat model provider is available for injection.
    pub fn chat_model_provider_selected(mut self, selected: bool) -> Self {
        self.chat_model_provider_selected = selected;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Generate every service of the index.
    ///
    /// Configuration errors abort the run; everything else is logged and
    /// reported in [`Generated::warnings`].
    pub fn process(&self, index: &TypeIndex) -> Result<Generated> {
        let registry = registry::find_declarative_services(index)?;
        let report = scan::scan(index, &self.config, &registry.names());
        let extractor = Extractor::new(&self.config, index);
        let synthesizer = Synthesizer::new(&self.config)?;

        let mut classes = BTreeMap::new();
        let mut tokens = Vec::new();
        let mut constructors = Vec::new();
        let mut reflective = Reflective {
            constructors: registry.reflective_suppliers.clone(),
            ..Reflective::default()
        };

        for candidate in report.candidates.values() {
            let Some(interface) = index.get(&candidate.name) else {
                continue;
            };
            let mut traits = vec![(interface, implementable(interface))];
            for parent in index.all_supertraits(&interface.name) {
                traits.push((parent, implementable(parent)));
            }

            let mut methods = BTreeMap::new();
            for method in traits.iter().flat_map(|(_, methods)| methods) {
                let descriptor = extractor.extract(method)?;
                if let Some(ty) = method.output.as_ref().and_then(registrable_type) {
                    reflective.types.insert(ty);
                }
                methods.insert(method.id(), descriptor);
            }

            let implementation = synthesizer.implementation_name(&interface.name);
            let scope = registry.services.get(&interface.name).map(|s| s.scope);
            tokens.push(synthesizer.class(&ClassSpec {
                interface,
                implementation: implementation.clone(),
                traits,
                scope,
            }));
            tracing::debug!("generated '{implementation}' for '{}'", interface.name);
            reflective.constructors.insert(implementation.clone());
            constructors.push((interface.name.clone(), implementation.clone()));
            classes.insert(
                interface.name.clone(),
                ClassCreateInfo::new(implementation, methods),
            );
        }

        for (decl, _) in index.annotated_fields(names::DESCRIPTION) {
            reflective.fields.insert(decl.name.clone());
        }

        let metadata = AiServiceMetadata::new(classes);
        let source = synthesizer.file(tokens, &metadata.to_json()?, &constructors)?;

        let mut additional_beans = Vec::new();
        if self.config.capabilities.metrics {
            additional_beans.push(names::METRICS_TIMED_WRAPPER.to_owned());
            additional_beans.push(names::METRICS_COUNTED_WRAPPER.to_owned());
        }
        if self.config.capabilities.tracing {
            additional_beans.push(names::SPAN_WRAPPER.to_owned());
        }

        Ok(Generated {
            source,
            metadata,
            beans: BeanManifest {
                plan: registry::plan_beans(&registry, self.chat_model_provider_selected),
                reflective,
                requested_chat_models: registry.requested_chat_models,
                needs_moderation_model: registry.needs_moderation_model,
                additional_beans,
            },
            warnings: report.warnings,
        })
    }
}

/// Methods a generated type must implement: those without a default body.
fn implementable(decl: &TypeDecl) -> Vec<&MethodDecl> {
    decl.methods.iter().filter(|m| !m.has_default).collect()
}

const PRELUDE: &[&str] = &[
    "String", "Vec", "Option", "Result", "Box", "bool", "char", "str", "f32", "f64", "i8", "i16",
    "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];

/// The outermost path of a return type, unless it is std or primitive.
fn registrable_type(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else {
        return None;
    };
    let name = path_text(&path.path);
    let first = name.trim_start_matches("::").split("::").next()?;
    if matches!(first, "std" | "core" | "alloc") || PRELUDE.contains(&name.as_str()) {
        return None;
    }
    Some(name)
}
