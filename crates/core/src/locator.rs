//! Service locator abstraction over the dependency-injection container.

use crate::MethodImplementationSupport;
use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

/// A type-erased bean instance.
pub type Bean = Arc<dyn Any + Send + Sync>;

/// Bean type plus optional qualifier value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BeanKey {
    /// Bean type name.
    pub bean_type: String,
    /// Qualifier value.
    pub qualifier: Option<String>,
}

impl BeanKey {
    /// Unqualified key.
    pub fn of(bean_type: impl Into<String>) -> Self {
        Self {
            bean_type: bean_type.into(),
            qualifier: None,
        }
    }

    /// Qualified key.
    pub fn qualified(bean_type: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            bean_type: bean_type.into(),
            qualifier: Some(qualifier.into()),
        }
    }
}

impl fmt::Display for BeanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}@{}", self.bean_type, qualifier),
            None => f.write_str(&self.bean_type),
        }
    }
}

/// What generated code needs from the container.
///
/// Handed to generated implementations through [`AiServiceRuntime`] at
/// composition time; there is no global container.
///
/// [`AiServiceRuntime`]: crate::AiServiceRuntime
pub trait ServiceLocator: Send + Sync {
    /// The shared execution dispatcher.
    fn implementation_support(&self) -> Arc<dyn MethodImplementationSupport>;

    /// A bean by key.
    fn instance(&self, key: &BeanKey) -> Option<Bean>;
}

/// A fixed set of beans assembled during startup.
pub struct StaticLocator {
    support: Arc<dyn MethodImplementationSupport>,
    beans: BTreeMap<BeanKey, Bean>,
}

impl StaticLocator {
    /// Create a locator around the dispatcher.
    pub fn new(support: Arc<dyn MethodImplementationSupport>) -> Self {
        Self {
            support,
            beans: BTreeMap::new(),
        }
    }

    /// Register a bean.
    pub fn with_bean(mut self, key: BeanKey, bean: Bean) -> Self {
        self.beans.insert(key, bean);
        self
    }
}

impl ServiceLocator for StaticLocator {
    fn implementation_support(&self) -> Arc<dyn MethodImplementationSupport> {
        Arc::clone(&self.support)
    }

    fn instance(&self, key: &BeanKey) -> Option<Bean> {
        self.beans.get(key).cloned()
    }
}

impl fmt::Debug for StaticLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticLocator")
            .field("beans", &self.beans.keys().collect::<Vec<_>>())
            .finish()
    }
}
