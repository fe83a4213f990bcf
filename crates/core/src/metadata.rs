//! The process-wide metadata table.
//!
//! Written once by the build pipeline, deserialized once at startup and then
//! shared by reference. There is no mutation after construction, so readers
//! need no locking.

use crate::MethodDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Failure decoding a serialized metadata table.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The payload is not a valid table.
    #[error("invalid ai service metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata for one generated implementation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassCreateInfo {
    /// Name of the generated implementation type.
    pub implementation: String,

    /// Descriptors keyed by method id, `name(T1,T2)`.
    pub methods: BTreeMap<String, MethodDescriptor>,
}

impl ClassCreateInfo {
    /// Create the metadata for one implementation.
    pub fn new(
        implementation: impl Into<String>,
        methods: BTreeMap<String, MethodDescriptor>,
    ) -> Self {
        Self {
            implementation: implementation.into(),
            methods,
        }
    }
}

/// Interface name to implementation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AiServiceMetadata {
    classes: BTreeMap<String, ClassCreateInfo>,
}

impl AiServiceMetadata {
    /// Freeze a fully populated table.
    pub fn new(classes: BTreeMap<String, ClassCreateInfo>) -> Self {
        Self { classes }
    }

    /// Decode a table produced by the build pipeline.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the table for embedding into generated sources.
    pub fn to_json(&self) -> Result<String, MetadataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Metadata of one interface.
    pub fn class(&self, interface: &str) -> Option<&ClassCreateInfo> {
        self.classes.get(interface)
    }

    /// Descriptor of one method.
    pub fn method_create_info(&self, interface: &str, method_id: &str) -> Option<&MethodDescriptor> {
        self.classes.get(interface)?.methods.get(method_id)
    }

    /// All interfaces with a generated implementation.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Number of interfaces in the table.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
