//! Declarative service resolution and the synthetic bean plan.

use crate::{
    ConfigError,
    index::{Annotation, TypeDecl, TypeIndex},
    names::{self, is_sentinel},
};
use aicore::{
    BeanSupplier, CONTEXT_BEAN_TYPE, DEFAULT_MODEL_NAME, DeclarativeAiServiceCreateInfo,
    InjectionPoint, ModelKind, Qualifier, Scope, Supplier, SyntheticBean, is_default_model,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A registered service with its resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarativeService {
    pub create_info: DeclarativeAiServiceCreateInfo,
    pub scope: Scope,
}

/// Result of resolving every registered service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// Services by qualified trait name.
    pub services: BTreeMap<String, DeclarativeService>,
    /// Custom supplier types constructed reflectively.
    pub reflective_suppliers: BTreeSet<String>,
    /// Logical names of the chat models services inject.
    pub requested_chat_models: BTreeSet<String>,
    /// Whether any service injects the moderation model bean.
    pub needs_moderation_model: bool,
}

impl Registry {
    /// Qualified names of all registered services.
    pub fn names(&self) -> BTreeSet<String> {
        self.services.keys().cloned().collect()
    }
}

/// Resolve every trait marked `#[register_ai_service]`.
///
/// Fails before producing anything when a custom supplier cannot be
/// constructed without arguments.
pub fn find_declarative_services(index: &TypeIndex) -> Result<Registry, ConfigError> {
    let mut registry = Registry::default();
    for decl in index.annotated_types(names::REGISTER_AI_SERVICE) {
        let Some(annotation) = decl.annotation(names::REGISTER_AI_SERVICE) else {
            continue;
        };
        let service = resolve(index, decl, annotation, &mut registry)?;
        registry.services.insert(decl.name.clone(), service);
    }
    Ok(registry)
}

fn resolve(
    index: &TypeIndex,
    decl: &TypeDecl,
    annotation: &Annotation,
    registry: &mut Registry,
) -> Result<DeclarativeService, ConfigError> {
    let class = |key: &str| {
        let class = annotation.value(key).and_then(|v| v.as_class())?;
        if names::shadows_sentinel(class) {
            tracing::warn!(
                "'{class}' given as {key} of '{}' is declared in this crate and is used as a \
                 custom type, not as the built-in sentinel",
                decl.name
            );
        }
        Some(class.to_owned())
    };
    let mut custom = |supplier: String| -> Result<Supplier, ConfigError> {
        validate_supplier(index, &supplier, &mut registry.reflective_suppliers)?;
        Ok(Supplier::Custom(supplier))
    };

    let chat_model_supplier = match class("chat_model_supplier") {
        Some(supplier) if !is_sentinel(&supplier, names::BEAN_CHAT_MODEL_SUPPLIER) => {
            custom(supplier)?
        }
        _ => Supplier::Injected,
    };

    let mut model_name = DEFAULT_MODEL_NAME.to_owned();
    if chat_model_supplier.is_injected() {
        if let Some(name) = annotation.string("model_name").filter(|n| !n.is_empty()) {
            model_name = name.to_owned();
        }
    }

    let tools = annotation
        .value("tools")
        .map(|v| v.as_class_array())
        .unwrap_or_default();

    let chat_memory_provider_supplier = match class("chat_memory_provider_supplier") {
        None => Supplier::Injected,
        Some(s) if is_sentinel(&s, names::BEAN_CHAT_MEMORY_PROVIDER_SUPPLIER) => Supplier::Injected,
        Some(s) if is_sentinel(&s, names::NO_CHAT_MEMORY_PROVIDER_SUPPLIER) => Supplier::Disabled,
        Some(s) => custom(s)?,
    };

    let retriever = class("retriever").filter(|r| !is_sentinel(r, names::NO_RETRIEVER));

    let audit_service_supplier = match class("audit_service_supplier") {
        None => Supplier::InjectedIfPresent,
        Some(s) if is_sentinel(&s, names::BEAN_IF_EXISTS_AUDIT_SERVICE_SUPPLIER) => {
            Supplier::InjectedIfPresent
        }
        Some(s) if is_sentinel(&s, names::NO_AUDIT_SERVICE_SUPPLIER) => Supplier::Disabled,
        Some(s) => custom(s)?,
    };

    let moderation_model_supplier = match class("moderation_model_supplier") {
        None => Supplier::Disabled,
        Some(s) if is_sentinel(&s, names::NO_MODERATION_MODEL_SUPPLIER) => Supplier::Disabled,
        Some(s) if is_sentinel(&s, names::BEAN_MODERATION_MODEL_SUPPLIER) => Supplier::Injected,
        Some(s) => custom(s)?,
    };

    if chat_model_supplier.is_injected() {
        registry.requested_chat_models.insert(model_name.clone());
    }
    if moderation_model_supplier == Supplier::Injected {
        registry.needs_moderation_model = true;
    }

    Ok(DeclarativeService {
        create_info: DeclarativeAiServiceCreateInfo {
            service: decl.name.clone(),
            chat_model_supplier,
            tools,
            chat_memory_provider_supplier,
            retriever,
            audit_service_supplier,
            moderation_model_supplier,
            model_name,
        },
        scope: scope_of(decl),
    })
}

/// Check that a custom supplier has a no-args constructor.
///
/// Suppliers missing from the index are only reported.
fn validate_supplier(
    index: &TypeIndex,
    supplier: &str,
    reflective: &mut BTreeSet<String>,
) -> Result<(), ConfigError> {
    let Some(decl) = index.get(supplier) else {
        tracing::warn!("'{supplier}' cannot be indexed");
        return Ok(());
    };
    if !decl.no_arg_constructor {
        return Err(ConfigError::MissingNoArgConstructor {
            class: supplier.to_owned(),
        });
    }
    reflective.insert(supplier.to_owned());
    Ok(())
}

/// The declared scope, request scope when absent.
fn scope_of(decl: &TypeDecl) -> Scope {
    let Some(annotation) = decl.annotation(names::SCOPE) else {
        return Scope::default();
    };
    let declared = annotation.positional().and_then(|v| {
        v.as_class()
            .map(names::simple_name)
            .or_else(|| v.as_str())
            .map(str::to_owned)
    });
    match declared.as_deref().and_then(Scope::from_name) {
        Some(scope) => scope,
        None => {
            tracing::warn!(
                "unknown scope {:?} on '{}', using {}",
                declared,
                decl.name,
                Scope::default().as_str()
            );
            Scope::default()
        }
    }
}

/// Beans the container must create for the declarative services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanPlan {
    /// One service context bean per declarative service.
    pub beans: Vec<SyntheticBean>,
    /// Bean types that must survive dead bean elimination.
    pub unremovable: BTreeSet<String>,
}

/// Plan the context bean of every declarative service.
///
/// The chat model is injected only when a chat model provider has been
/// selected and the service has no custom supplier.
pub fn plan_beans(registry: &Registry, chat_model_provider_selected: bool) -> BeanPlan {
    let mut plan = BeanPlan::default();
    for (name, service) in &registry.services {
        let info = &service.create_info;
        let mut bean = SyntheticBean::configure(
            CONTEXT_BEAN_TYPE,
            BeanSupplier::DeclarativeService(info.clone()),
        )
        .runtime_init()
        .qualifier(Qualifier::AiServiceContext(name.clone()))
        .scope(Scope::Dependent);

        if info.chat_model_supplier.custom().is_none() && chat_model_provider_selected {
            let chat_model = ModelKind::Chat.bean_type();
            let point = if is_default_model(&info.model_name) {
                InjectionPoint::of(chat_model)
            } else {
                InjectionPoint::of(chat_model)
                    .qualified(Qualifier::ModelName(info.model_name.clone()))
            };
            bean = bean.injection_point(point);
            plan.unremovable.insert(chat_model.to_owned());
        }

        for tool in &info.tools {
            bean = bean.injection_point(InjectionPoint::of(tool.as_str()));
            plan.unremovable.insert(tool.clone());
        }

        if info.chat_memory_provider_supplier == Supplier::Injected {
            bean = bean.injection_point(InjectionPoint::of(names::CHAT_MEMORY_PROVIDER));
            plan.unremovable.insert(names::CHAT_MEMORY_PROVIDER.to_owned());
        }

        if let Some(retriever) = &info.retriever {
            bean = bean.injection_point(InjectionPoint::of(retriever.as_str()));
            plan.unremovable.insert(names::RETRIEVER.to_owned());
        }

        if info.audit_service_supplier == Supplier::InjectedIfPresent {
            bean = bean.injection_point(InjectionPoint::of(names::AUDIT_SERVICE).optional());
            plan.unremovable.insert(names::AUDIT_SERVICE.to_owned());
        }

        if info.moderation_model_supplier == Supplier::Injected {
            let moderation = ModelKind::Moderation.bean_type();
            bean = bean.injection_point(InjectionPoint::of(moderation));
            plan.unremovable.insert(moderation.to_owned());
        }

        plan.beans.push(bean);
    }
    plan
}
