//! Build errors.

use std::path::PathBuf;

/// Result alias for the build pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal build failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An annotated declaration breaks a generation rule.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A source file or output file could not be accessed.
    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The codegen configuration is malformed.
    #[error("invalid codegen configuration: {0}")]
    Settings(#[from] toml::de::Error),

    /// The metadata table could not be encoded.
    #[error(transparent)]
    Metadata(#[from] aicore::MetadataError),

    /// The bean plan could not be encoded.
    #[error("failed to encode bean plan: {0}")]
    Json(#[from] serde_json::Error),

    /// Generated code failed to parse, a bug in the synthesizer.
    #[error("generated code does not parse: {0}")]
    Emit(syn::Error),

    /// The configured runtime crate path is not a valid path.
    #[error("invalid runtime crate path '{path}': {source}")]
    RuntimePath {
        /// The configured path.
        path: String,
        /// The parse failure.
        #[source]
        source: syn::Error,
    },
}

impl Error {
    /// Wrap an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A declaration that cannot be turned into a generated service.
///
/// `method` is the qualified signature `iface::name(T1,T2)`, `class` the
/// qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The method returns nothing.
    #[error("return type of method '{method}' cannot be unit")]
    VoidReturn {
        /// The offending method.
        method: String,
    },

    /// The system message joins to an empty template.
    #[error("illegal method '{method}': #[system_message] template cannot be empty")]
    EmptySystemMessage {
        /// The offending method.
        method: String,
    },

    /// The user message uses `{{it}}` but the method does not take exactly one argument.
    #[error(
        "illegal method '{method}': the {{{{it}}}} placeholder is present but the method has {count} parameters, \
         methods using {{{{it}}}} must have exactly one parameter"
    )]
    ItPlaceholderArity {
        /// The offending method.
        method: String,
        /// Number of declared parameters.
        count: usize,
    },

    /// No user message template and nothing to derive one from.
    #[error("illegal method '{method}': method should have at least one argument")]
    NoParameters {
        /// The offending method.
        method: String,
    },

    /// Several parameters and no way to tell which one is the user message.
    #[error(
        "illegal method '{method}': for methods with multiple parameters, each parameter must be annotated \
         with #[v] (or match a template variable by name), #[user_message], #[user_name] or #[memory_id]"
    )]
    AmbiguousParameters {
        /// The offending method.
        method: String,
    },

    /// Two parameters bind the same template variable.
    #[error("illegal method '{method}': template variable '{name}' is bound to parameters {first} and {second}")]
    DuplicateBinding {
        /// The offending method.
        method: String,
        /// The variable name.
        name: String,
        /// Position of the first binding.
        first: usize,
        /// Position of the conflicting binding.
        second: usize,
    },

    /// Trait methods without `self` cannot be dispatched through an instance.
    #[error("illegal method '{method}': methods of ai services must take a self receiver")]
    MissingReceiver {
        /// The offending method.
        method: String,
    },

    /// A parameter or the result borrows, so it cannot cross the dispatcher.
    #[error(
        "illegal method '{method}': {item} has type '{ty}', parameters and return types of ai service \
         methods must be owned or 'static"
    )]
    BorrowedType {
        /// The offending method.
        method: String,
        /// The offending parameter or `return type`.
        item: String,
        /// The offending type as written.
        ty: String,
    },

    /// Generated methods cannot be generic over types.
    #[error("illegal method '{method}': methods of ai services cannot declare type or const parameters")]
    GenericMethod {
        /// The offending method.
        method: String,
    },

    /// A custom supplier cannot be constructed without arguments.
    #[error("class '{class}' must provide a no-args constructor")]
    MissingNoArgConstructor {
        /// The offending supplier type.
        class: String,
    },
}
