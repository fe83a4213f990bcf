//! Candidate discovery.

use crate::{
    CodegenConfig,
    index::{TypeDecl, TypeIndex},
    names, usage,
};
use std::collections::{BTreeMap, BTreeSet};

/// How a candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Discovery {
    /// Created through the service factory.
    Usage,
    /// Marked `#[created_aware]`.
    CreatedAware,
    /// Has message template annotations on its methods.
    MessageAnnotations,
    /// Marked `#[register_ai_service]`.
    Registered,
}

/// A trait that gets a generated implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Qualified trait name.
    pub name: String,
    /// Has a fixed scope and supplier configuration.
    pub registered: bool,
    pub discovered_by: BTreeSet<Discovery>,
}

/// Result of a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Candidates by qualified name.
    pub candidates: BTreeMap<String, Candidate>,
    /// Non-fatal irregularities, also logged.
    pub warnings: Vec<String>,
}

impl ScanReport {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

/// Collect every trait that must get a generated implementation.
///
/// `registered` holds the declarative services found by the registry.
pub fn scan(index: &TypeIndex, config: &CodegenConfig, registered: &BTreeSet<String>) -> ScanReport {
    let mut report = ScanReport::default();
    let mut found: BTreeMap<String, BTreeSet<Discovery>> = BTreeMap::new();

    let usage = usage::analyze(index, config).services();
    for (service, memory_provider_used) in &usage {
        found.entry(service.clone()).or_default().insert(Discovery::Usage);
        let Some(decl) = index.get(service) else {
            continue;
        };
        if !memory_provider_used && decl.has_param_annotation(names::MEMORY_ID) {
            report.warn(format!(
                "'{service}' is used in AiServices and while it leverages #[memory_id], a chat memory \
                 provider has not been configured. This will likely result in an error when the service is used."
            ));
        }
    }

    for decl in index.annotated_types(names::CREATED_AWARE) {
        found.entry(decl.name.clone()).or_default().insert(Discovery::CreatedAware);
    }

    for annotation in [names::SYSTEM_MESSAGE, names::USER_MESSAGE, names::MODERATE] {
        for (decl, _) in index.annotated_methods(annotation) {
            if decl.is_interface() {
                found
                    .entry(decl.name.clone())
                    .or_default()
                    .insert(Discovery::MessageAnnotations);
            }
        }
    }

    for name in registered {
        found.entry(name.clone()).or_default().insert(Discovery::Registered);
    }

    for (name, discovered_by) in found {
        let Some(decl) = index.get(&name) else {
            report.warn(format!(
                "'{name}' used for creating an AiService was not found in the index. \
                 Attempting to create an AiService using this type will fail"
            ));
            continue;
        };
        if let Some(reason) = unsupported(decl) {
            report.warn(format!(
                "'{name}' used for creating an AiService {reason}. \
                 Attempting to create an AiService using this type will fail"
            ));
            continue;
        }
        report.candidates.insert(
            name.clone(),
            Candidate {
                registered: registered.contains(&name),
                name,
                discovered_by,
            },
        );
    }
    tracing::debug!("found {} ai service candidates", report.candidates.len());
    report
}

fn unsupported(decl: &TypeDecl) -> Option<&'static str> {
    if !decl.is_interface() {
        Some("is not a trait")
    } else if decl.generic {
        Some("declares generic parameters")
    } else {
        None
    }
}
