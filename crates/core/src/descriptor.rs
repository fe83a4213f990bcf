//! Per-method descriptors computed at build time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the execution engine needs to know about one service method.
///
/// Computed once by the build pipeline, stored in the metadata table and
/// looked up by `(interface, method id)` on every call. Never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Qualified name of the trait declaring the method.
    pub interface: String,

    /// Method name.
    pub method: String,

    /// Number of declared parameters, receiver excluded.
    pub parameter_count: usize,

    /// Template variable name to argument position.
    #[serde(default)]
    pub bindings: BTreeMap<String, usize>,

    /// System message template, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<TemplateInfo>,

    /// How the user message is produced.
    pub user_message: UserMessageInfo,

    /// Position of the parameter carrying the memory id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_id_position: Option<usize>,

    /// Whether the call must go through the moderation model.
    #[serde(default)]
    pub requires_moderation: bool,

    /// Declared return type, as written in the resolved signature.
    pub return_type: String,

    /// Timer configuration, present only when metrics are enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_timed: Option<MetricsTimedInfo>,

    /// Counter configuration, present only when metrics are enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_counted: Option<MetricsCountedInfo>,

    /// Span configuration, present only when tracing is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SpanInfo>,
}

impl MethodDescriptor {
    /// Argument position bound to a template variable.
    pub fn binding(&self, name: &str) -> Option<usize> {
        self.bindings.get(name).copied()
    }
}

/// A prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInfo {
    /// Template text with the text segments already joined.
    pub template: String,
}

/// The user message part of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessageInfo {
    /// Where the message text comes from.
    pub source: UserMessageSource,

    /// Position of the parameter carrying the user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name_position: Option<usize>,

    /// Structured output hint appended to the message.
    #[serde(default)]
    pub output_format_instructions: String,
}

/// Source of the user message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserMessageSource {
    /// Rendered from a template.
    Template(TemplateInfo),
    /// Taken verbatim from the argument at this position.
    Parameter {
        /// Argument position.
        position: usize,
    },
}

impl UserMessageInfo {
    /// User message rendered from a template.
    pub fn from_template(
        template: TemplateInfo,
        user_name_position: Option<usize>,
        output_format_instructions: impl Into<String>,
    ) -> Self {
        Self {
            source: UserMessageSource::Template(template),
            user_name_position,
            output_format_instructions: output_format_instructions.into(),
        }
    }

    /// User message taken from a method argument.
    pub fn from_parameter(
        position: usize,
        user_name_position: Option<usize>,
        output_format_instructions: impl Into<String>,
    ) -> Self {
        Self {
            source: UserMessageSource::Parameter { position },
            user_name_position,
            output_format_instructions: output_format_instructions.into(),
        }
    }

    /// The template, if the message is templated.
    pub fn template(&self) -> Option<&TemplateInfo> {
        match &self.source {
            UserMessageSource::Template(template) => Some(template),
            UserMessageSource::Parameter { .. } => None,
        }
    }

    /// The argument position, if the message comes from a parameter.
    pub fn parameter(&self) -> Option<usize> {
        match self.source {
            UserMessageSource::Parameter { position } => Some(position),
            UserMessageSource::Template(_) => None,
        }
    }
}

/// Timer settings for a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsTimedInfo {
    /// Metric name.
    pub name: String,
    /// Flat key/value tag list.
    pub extra_tags: Vec<String>,
    /// Record as a long task timer.
    #[serde(default)]
    pub long_task: bool,
    /// Percentiles to publish.
    #[serde(default)]
    pub percentiles: Vec<f64>,
    /// Publish a histogram.
    #[serde(default)]
    pub histogram: bool,
    /// Metric description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Counter settings for a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsCountedInfo {
    /// Metric name.
    pub name: String,
    /// Flat key/value tag list.
    pub extra_tags: Vec<String>,
    /// Only count failed invocations.
    #[serde(default)]
    pub record_failures_only: bool,
    /// Metric description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Span settings for a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanInfo {
    /// Span name.
    pub name: String,
}
