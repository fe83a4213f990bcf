//! Handles shared by every generated implementation.

use crate::{
    AiServiceContext, AiServiceMetadata, Bean, BeanKey, MemoryId, MethodDescriptor,
    MethodImplementationSupport, Scope, ServiceLocator,
};
use std::{fmt, sync::Arc};

/// Bean type under which service contexts are registered.
pub const CONTEXT_BEAN_TYPE: &str = "AiServiceContext";

/// The metadata table plus the container, as seen by generated code.
#[derive(Clone)]
pub struct AiServiceRuntime {
    metadata: Arc<AiServiceMetadata>,
    locator: Arc<dyn ServiceLocator>,
}

impl AiServiceRuntime {
    /// Compose the runtime once during startup.
    pub fn new(metadata: Arc<AiServiceMetadata>, locator: Arc<dyn ServiceLocator>) -> Self {
        Self { metadata, locator }
    }

    /// The metadata table.
    pub fn metadata(&self) -> &AiServiceMetadata {
        &self.metadata
    }

    /// The container.
    pub fn locator(&self) -> &Arc<dyn ServiceLocator> {
        &self.locator
    }

    /// The shared execution dispatcher.
    pub fn implementation_support(&self) -> Arc<dyn MethodImplementationSupport> {
        self.locator.implementation_support()
    }

    /// Descriptor of a generated method.
    ///
    /// # Panics
    ///
    /// Panics when the table has no entry, meaning the generated code and the
    /// table come from different builds.
    pub fn method_create_info(&self, interface: &str, method_id: &str) -> &MethodDescriptor {
        match self.metadata.method_create_info(interface, method_id) {
            Some(info) => info,
            None => panic!("no ai service metadata for {interface}::{method_id}"),
        }
    }

    /// The context bean qualified by interface name.
    pub fn context(&self, interface: &str) -> Option<Arc<AiServiceContext>> {
        let bean = self
            .locator
            .instance(&BeanKey::qualified(CONTEXT_BEAN_TYPE, interface))?;
        bean.downcast::<AiServiceContext>().ok()
    }

    /// Instantiate a generated implementation the way the container does,
    /// injecting the context registered for its interface.
    pub fn construct(
        self: &Arc<Self>,
        constructors: &[ReflectiveConstructor],
        interface: &str,
    ) -> Option<Bean> {
        let constructor = constructors.iter().find(|c| c.interface == interface)?;
        let context = self.context(interface);
        if context.is_none() {
            tracing::debug!("no context bean for '{interface}', constructing unbound instance");
        }
        Some((constructor.construct)(Arc::clone(self), context))
    }
}

impl fmt::Debug for AiServiceRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiServiceRuntime")
            .field("interfaces", &self.metadata.len())
            .finish()
    }
}

/// Implemented by every generated service.
pub trait ChatMemoryRemovable {
    /// Forget the conversation histories of the given ids.
    fn remove(&self, ids: &[MemoryId]);
}

/// Implemented by generated declarative services; called before destruction.
pub trait Closeable {
    /// Release the service context.
    fn close(&self);
}

/// Scope of a generated declarative service.
pub trait ScopedBean {
    /// The resolved scope.
    const SCOPE: Scope;
}

/// Constructor entry for container instantiation of generated types.
#[derive(Clone, Copy)]
pub struct ReflectiveConstructor {
    /// Qualified interface name.
    pub interface: &'static str,
    /// Generated implementation name.
    pub implementation: &'static str,
    /// Builds the implementation, boxed as a bean.
    pub construct: fn(Arc<AiServiceRuntime>, Option<Arc<AiServiceContext>>) -> Bean,
}

impl fmt::Debug for ReflectiveConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectiveConstructor")
            .field("interface", &self.interface)
            .field("implementation", &self.implementation)
            .finish()
    }
}
