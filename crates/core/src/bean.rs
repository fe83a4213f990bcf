//! Bean descriptions handed from the build pipeline to the container.

use serde::{Deserialize, Serialize};

/// Logical model name meaning "the unqualified default model".
pub const DEFAULT_MODEL_NAME: &str = "<default>";

/// Whether a logical model name refers to the default model.
pub fn is_default_model(name: &str) -> bool {
    name.is_empty() || name == DEFAULT_MODEL_NAME
}

/// Component scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// One shared instance, created lazily behind a client proxy.
    Application,
    /// One shared instance, created eagerly.
    Singleton,
    /// One instance per request.
    #[default]
    Request,
    /// One instance per session.
    Session,
    /// A new instance per injection point.
    Dependent,
}

impl Scope {
    /// Parse a scope from its annotation spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "application" | "application_scoped" | "Application" => Some(Self::Application),
            "singleton" | "Singleton" => Some(Self::Singleton),
            "request" | "request_scoped" | "Request" => Some(Self::Request),
            "session" | "session_scoped" | "Session" => Some(Self::Session),
            "dependent" | "Dependent" => Some(Self::Dependent),
            _ => None,
        }
    }

    /// Variant name, as used in generated code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::Singleton => "Singleton",
            Self::Request => "Request",
            Self::Session => "Session",
            Self::Dependent => "Dependent",
        }
    }
}

/// Bean qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Qualifier {
    /// Selects a named model bean.
    ModelName(String),
    /// Selects the service context of one interface.
    AiServiceContext(String),
}

/// A dependency a synthetic bean needs at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPoint {
    /// Required bean type.
    pub bean_type: String,
    /// Optional qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
    /// Resolved lazily; absence is not an error.
    #[serde(default)]
    pub optional: bool,
}

impl InjectionPoint {
    /// A required, unqualified injection point.
    pub fn of(bean_type: impl Into<String>) -> Self {
        Self {
            bean_type: bean_type.into(),
            qualifier: None,
            optional: false,
        }
    }

    /// Attach a qualifier.
    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    /// Mark the injection point as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Model capability a provider bean offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Blocking chat model.
    Chat,
    /// Streaming chat model.
    StreamingChat,
    /// Embedding model.
    Embedding,
    /// Moderation model.
    Moderation,
}

impl ModelKind {
    /// Bean type name of the capability.
    pub fn bean_type(&self) -> &'static str {
        match self {
            Self::Chat => "ChatModel",
            Self::StreamingChat => "StreamingChatModel",
            Self::Embedding => "EmbeddingModel",
            Self::Moderation => "ModerationModel",
        }
    }
}

/// How a component of a declarative service is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum Supplier {
    /// Exactly one bean of the expected capability, via injection.
    Injected,
    /// A bean of the expected capability if one exists.
    InjectedIfPresent,
    /// A custom supplier type, constructed without arguments.
    Custom(String),
    /// The component is not used.
    Disabled,
}

impl Supplier {
    /// The custom supplier type, if any.
    pub fn custom(&self) -> Option<&str> {
        match self {
            Self::Custom(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the component is obtained through injection.
    pub fn is_injected(&self) -> bool {
        matches!(self, Self::Injected | Self::InjectedIfPresent)
    }
}

/// Run-time creation info of a declarative service context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarativeAiServiceCreateInfo {
    /// Qualified interface name.
    pub service: String,
    /// Chat model supplier.
    pub chat_model_supplier: Supplier,
    /// Tool bean types, in declaration order.
    pub tools: Vec<String>,
    /// Chat memory provider supplier.
    pub chat_memory_provider_supplier: Supplier,
    /// Retriever bean type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retriever: Option<String>,
    /// Audit service supplier.
    pub audit_service_supplier: Supplier,
    /// Moderation model supplier.
    pub moderation_model_supplier: Supplier,
    /// Logical chat model name.
    pub model_name: String,
}

/// What the container calls to create a synthetic bean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BeanSupplier {
    /// Build the service context of a declarative service.
    DeclarativeService(DeclarativeAiServiceCreateInfo),
    /// Build a model through a provider.
    Model {
        /// Provider name.
        provider: String,
        /// Model capability.
        model: ModelKind,
        /// Logical model name.
        model_name: String,
    },
}

/// A bean the container must create at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticBean {
    /// Bean type.
    pub bean_type: String,
    /// Qualifiers.
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    /// Scope.
    pub scope: Scope,
    /// Yields to any user-declared bean of the same type.
    #[serde(default)]
    pub default_bean: bool,
    /// Created during run-time init rather than static init.
    #[serde(default)]
    pub runtime_init: bool,
    /// Dependencies resolved before creation.
    #[serde(default)]
    pub injection_points: Vec<InjectionPoint>,
    /// Creation recipe.
    pub supplier: BeanSupplier,
}

impl SyntheticBean {
    /// Start describing a bean of the given type.
    pub fn configure(bean_type: impl Into<String>, supplier: BeanSupplier) -> Self {
        Self {
            bean_type: bean_type.into(),
            qualifiers: Vec::new(),
            scope: Scope::Dependent,
            default_bean: false,
            runtime_init: false,
            injection_points: Vec::new(),
            supplier,
        }
    }

    /// Set the scope.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Add a qualifier.
    pub fn qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Mark as a default bean.
    pub fn default_bean(mut self) -> Self {
        self.default_bean = true;
        self
    }

    /// Create at run-time init.
    pub fn runtime_init(mut self) -> Self {
        self.runtime_init = true;
        self
    }

    /// Add an injection point.
    pub fn injection_point(mut self, point: InjectionPoint) -> Self {
        self.injection_points.push(point);
        self
    }
}
