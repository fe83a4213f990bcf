//! Run-time contract for generated AI services.
//!
//! Generated implementations hold an [`AiServiceRuntime`] and an optional
//! [`AiServiceContext`]. Each generated method looks up its precomputed
//! [`MethodDescriptor`] in the [`AiServiceMetadata`] table, boxes its
//! arguments and hands everything to the [`MethodImplementationSupport`]
//! obtained from the [`ServiceLocator`].

pub use {
    bean::{
        BeanSupplier, DEFAULT_MODEL_NAME, DeclarativeAiServiceCreateInfo, InjectionPoint,
        ModelKind, Qualifier, Scope, Supplier, SyntheticBean, is_default_model,
    },
    context::{AiServiceContext, ChatMemory, ChatMemoryProvider, MemoryId},
    descriptor::{
        MethodDescriptor, MetricsCountedInfo, MetricsTimedInfo, SpanInfo, TemplateInfo,
        UserMessageInfo, UserMessageSource,
    },
    locator::{Bean, BeanKey, ServiceLocator, StaticLocator},
    metadata::{AiServiceMetadata, ClassCreateInfo, MetadataError},
    runtime::{
        AiServiceRuntime, CONTEXT_BEAN_TYPE, ChatMemoryRemovable, Closeable, ReflectiveConstructor,
        ScopedBean,
    },
    support::{MethodImplementationSupport, MethodInput, into_return},
};

mod bean;
mod context;
mod descriptor;
mod locator;
mod metadata;
mod runtime;
mod support;
