//! Well-known annotation, sentinel and bean type names.

// method annotations
pub const SYSTEM_MESSAGE: &str = "system_message";
pub const USER_MESSAGE: &str = "user_message";
pub const MODERATE: &str = "moderate";
pub const TIMED: &str = "timed";
pub const COUNTED: &str = "counted";

// parameter annotations
pub const V: &str = "v";
pub const MEMORY_ID: &str = "memory_id";
pub const USER_NAME: &str = "user_name";

// type annotations
pub const REGISTER_AI_SERVICE: &str = "register_ai_service";
pub const SCOPE: &str = "scope";
pub const CREATED_AWARE: &str = "created_aware";

// field annotations
pub const DESCRIPTION: &str = "description";

/// The service factory whose call sites are analyzed.
pub const AI_SERVICES: &str = "AiServices";
/// Factory entry points taking the service type as generic argument.
pub const FACTORY_METHODS: &[&str] = &["builder", "create"];
/// Builder method configuring a chat memory provider.
pub const CHAT_MEMORY_PROVIDER_METHOD: &str = "chat_memory_provider";

// suppliers
pub const BEAN_CHAT_MODEL_SUPPLIER: &str = "BeanChatModelSupplier";
pub const BEAN_CHAT_MEMORY_PROVIDER_SUPPLIER: &str = "BeanChatMemoryProviderSupplier";
pub const NO_CHAT_MEMORY_PROVIDER_SUPPLIER: &str = "NoChatMemoryProviderSupplier";
pub const NO_RETRIEVER: &str = "NoRetriever";
pub const BEAN_IF_EXISTS_AUDIT_SERVICE_SUPPLIER: &str = "BeanIfExistsAuditServiceSupplier";
pub const NO_AUDIT_SERVICE_SUPPLIER: &str = "NoAuditServiceSupplier";
pub const BEAN_MODERATION_MODEL_SUPPLIER: &str = "BeanModerationModelSupplier";
pub const NO_MODERATION_MODEL_SUPPLIER: &str = "NoModerationModelSupplier";

// bean types
pub const CHAT_MEMORY_PROVIDER: &str = "ChatMemoryProvider";
pub const RETRIEVER: &str = "Retriever";
pub const AUDIT_SERVICE: &str = "AuditService";

// additional beans
pub const METRICS_TIMED_WRAPPER: &str = "MetricsTimedWrapper";
pub const METRICS_COUNTED_WRAPPER: &str = "MetricsCountedWrapper";
pub const SPAN_WRAPPER: &str = "SpanWrapper";

/// Implicit template variable of single-argument methods.
pub const IT: &str = "it";
pub const IT_PLACEHOLDER: &str = "{{it}}";

pub const METRICS_DEFAULT_NAME: &str = "aiservices";
pub const SPAN_PREFIX: &str = "aiservices";

/// Last segment of a `::` separated path.
pub fn simple_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

pub const SENTINELS: &[&str] = &[
    BEAN_CHAT_MODEL_SUPPLIER,
    BEAN_CHAT_MEMORY_PROVIDER_SUPPLIER,
    NO_CHAT_MEMORY_PROVIDER_SUPPLIER,
    NO_RETRIEVER,
    BEAN_IF_EXISTS_AUDIT_SERVICE_SUPPLIER,
    NO_AUDIT_SERVICE_SUPPLIER,
    BEAN_MODERATION_MODEL_SUPPLIER,
    NO_MODERATION_MODEL_SUPPLIER,
];

/// Whether `path` names the sentinel `name`.
///
/// Sentinels come from outside the crate being built, unqualified or through
/// an import. A type declared in the crate is never a sentinel, whatever its
/// name.
pub fn is_sentinel(path: &str, name: &str) -> bool {
    simple_name(path) == name && !is_local(path)
}

/// Whether `path` is a crate-local type named like a sentinel.
pub fn shadows_sentinel(path: &str) -> bool {
    is_local(path) && SENTINELS.contains(&simple_name(path))
}

fn is_local(path: &str) -> bool {
    path.starts_with("crate::")
}
