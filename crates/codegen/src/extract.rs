//! Method metadata extraction.

use crate::{
    CodegenConfig, ConfigError,
    index::{Annotation, MethodDecl, TypeDecl, TypeIndex, type_text},
    names, output,
};
use aicore::{
    MethodDescriptor, MetricsCountedInfo, MetricsTimedInfo, SpanInfo, TemplateInfo,
    UserMessageInfo,
};
use std::collections::BTreeMap;
use syn::{
    Lifetime, ParenthesizedGenericArguments, Type, TypeBareFn, TypeImplTrait, TypeReference,
    visit::{self, Visit},
};

/// Derives method descriptors from declarations.
///
/// Extraction reads only the method, its declaring trait and the index, so
/// extracting the same method twice yields identical descriptors.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    config: &'a CodegenConfig,
    index: &'a TypeIndex,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a CodegenConfig, index: &'a TypeIndex) -> Self {
        Self { config, index }
    }

    /// Compute the descriptor of `method`.
    pub fn extract(&self, method: &MethodDecl) -> Result<MethodDescriptor, ConfigError> {
        let Some(return_type) = &method.output else {
            return Err(ConfigError::VoidReturn {
                method: method.qualified(),
            });
        };
        if !method.receiver {
            return Err(ConfigError::MissingReceiver {
                method: method.qualified(),
            });
        }
        owned_signature(method, return_type)?;

        let requires_moderation = method.has_annotation(names::MODERATE);
        let bindings = self.bindings(method)?;
        let system_message = self.system_message(method)?;
        let instructions = output::format_instructions(return_type, self.index);
        let user_message = self.user_message(method, instructions)?;
        let memory_id_position = method.param_with(names::MEMORY_ID).map(|p| p.position);

        let declaring = self.index.get(&method.declaring);
        let (metrics_timed, metrics_counted) = if self.config.capabilities.metrics {
            (
                Some(timed_info(method, declaring)),
                Some(counted_info(method, declaring)),
            )
        } else {
            (None, None)
        };
        let span = self.config.capabilities.tracing.then(|| SpanInfo {
            name: format!(
                "{}.{}.{}",
                names::SPAN_PREFIX,
                names::simple_name(&method.declaring),
                method.name
            ),
        });

        Ok(MethodDescriptor {
            interface: method.declaring.clone(),
            method: method.name.clone(),
            parameter_count: method.params.len(),
            bindings,
            system_message,
            user_message,
            memory_id_position,
            requires_moderation,
            return_type: type_text(return_type),
            metrics_timed,
            metrics_counted,
            span,
        })
    }

    /// Template variable bindings.
    ///
    /// A parameter without effective annotations binds by its own name, one
    /// with `#[v("name")]` by the given name. A single binding on a single
    /// parameter also binds `it`.
    fn bindings(&self, method: &MethodDecl) -> Result<BTreeMap<String, usize>, ConfigError> {
        let mut bindings = BTreeMap::new();
        for param in &method.params {
            let effective = param
                .annotations
                .iter()
                .any(|a| !self.config.is_transparent(&a.name));
            let name = if effective {
                param
                    .annotation(names::V)
                    .and_then(|v| first_string(v).or_else(|| v.string("name").map(str::to_owned)))
            } else {
                Some(param.name.clone())
            };
            let Some(name) = name else {
                continue;
            };
            match bindings.get(&name) {
                Some(&first) if first != param.position => {
                    return Err(ConfigError::DuplicateBinding {
                        method: method.qualified(),
                        name,
                        first,
                        second: param.position,
                    });
                }
                _ => {
                    bindings.insert(name, param.position);
                }
            }
        }

        if bindings.len() == 1 && method.params.len() == 1 {
            bindings.entry(names::IT.to_owned()).or_insert(0);
        }
        Ok(bindings)
    }

    fn system_message(&self, method: &MethodDecl) -> Result<Option<TemplateInfo>, ConfigError> {
        let Some(annotation) = method.annotation(names::SYSTEM_MESSAGE) else {
            return Ok(None);
        };
        let template = self.template(annotation);
        if template.is_empty() {
            return Err(ConfigError::EmptySystemMessage {
                method: method.qualified(),
            });
        }
        Ok(Some(TemplateInfo { template }))
    }

    fn user_message(
        &self,
        method: &MethodDecl,
        instructions: String,
    ) -> Result<UserMessageInfo, ConfigError> {
        let user_name = method.param_with(names::USER_NAME).map(|p| p.position);

        if let Some(annotation) = method.annotation(names::USER_MESSAGE) {
            let template = self.template(annotation);
            if template.contains(names::IT_PLACEHOLDER) && method.params.len() != 1 {
                return Err(ConfigError::ItPlaceholderArity {
                    method: method.qualified(),
                    count: method.params.len(),
                });
            }
            return Ok(UserMessageInfo::from_template(
                TemplateInfo { template },
                user_name,
                instructions,
            ));
        }

        if let Some(param) = method.param_with(names::USER_MESSAGE) {
            return Ok(UserMessageInfo::from_parameter(
                param.position,
                user_name,
                instructions,
            ));
        }

        match method.params.len() {
            0 => Err(ConfigError::NoParameters {
                method: method.qualified(),
            }),
            1 => Ok(UserMessageInfo::from_parameter(0, user_name, instructions)),
            // every argument feeds a template or a side channel, the prompt
            // lives in the system message
            _ if method.params.iter().all(|p| {
                [names::V, names::USER_NAME, names::MEMORY_ID]
                    .iter()
                    .any(|a| p.annotation(a).is_some())
            }) =>
            {
                Ok(UserMessageInfo::from_template(
                    TemplateInfo {
                        template: String::new(),
                    },
                    user_name,
                    instructions,
                ))
            }
            _ => Err(ConfigError::AmbiguousParameters {
                method: method.qualified(),
            }),
        }
    }

    /// Text segments of a message annotation, joined with its delimiter.
    fn template(&self, annotation: &Annotation) -> String {
        let delimiter = annotation
            .string("delimiter")
            .unwrap_or(&self.config.default_delimiter);
        annotation
            .positional()
            .map(|v| v.as_string_array().join(delimiter))
            .unwrap_or_default()
    }
}

/// Arguments and results cross the dispatcher as `dyn Any`, which requires
/// `'static`. A shared reference parameter is passed as its owned form.
fn owned_signature(method: &MethodDecl, return_type: &Type) -> Result<(), ConfigError> {
    let generics = &method.sig.generics;
    if generics.type_params().next().is_some() || generics.const_params().next().is_some() {
        return Err(ConfigError::GenericMethod {
            method: method.qualified(),
        });
    }

    for param in &method.params {
        let passed = match &param.ty {
            Type::Reference(reference) if reference.mutability.is_none() => match &*reference.elem {
                Type::TraitObject(_) => &param.ty,
                elem => elem,
            },
            ty => ty,
        };
        if borrows(passed) {
            return Err(ConfigError::BorrowedType {
                method: method.qualified(),
                item: format!("parameter '{}'", param.name),
                ty: type_text(&param.ty),
            });
        }
    }

    if borrows(return_type) {
        return Err(ConfigError::BorrowedType {
            method: method.qualified(),
            item: "return type".to_owned(),
            ty: type_text(return_type),
        });
    }
    Ok(())
}

/// Whether `ty` holds a non-`'static` borrow or an opaque type.
fn borrows(ty: &Type) -> bool {
    let mut finder = BorrowFinder::default();
    finder.visit_type(ty);
    finder.found
}

#[derive(Default)]
struct BorrowFinder {
    found: bool,
}

impl<'ast> Visit<'ast> for BorrowFinder {
    fn visit_type_reference(&mut self, node: &'ast TypeReference) {
        let is_static = node.lifetime.as_ref().is_some_and(|l| l.ident == "static");
        if !is_static || node.mutability.is_some() {
            self.found = true;
            return;
        }
        visit::visit_type_reference(self, node);
    }

    // borrows in `fn(&str)` and `Fn(&str)` are higher-ranked
    fn visit_type_bare_fn(&mut self, _: &'ast TypeBareFn) {}

    fn visit_parenthesized_generic_arguments(&mut self, _: &'ast ParenthesizedGenericArguments) {}

    fn visit_type_impl_trait(&mut self, _: &'ast TypeImplTrait) {
        self.found = true;
    }

    fn visit_lifetime(&mut self, node: &'ast Lifetime) {
        if node.ident != "static" {
            self.found = true;
        }
    }
}

fn first_string(annotation: &Annotation) -> Option<String> {
    annotation
        .positional()?
        .elements()
        .into_iter()
        .find_map(|v| v.as_str().map(str::to_owned))
}

/// `[aiservice, <SimpleName>, method, <method>]`.
fn default_tags(method: &MethodDecl) -> Vec<String> {
    vec![
        "aiservice".to_owned(),
        names::simple_name(&method.declaring).to_owned(),
        "method".to_owned(),
        method.name.clone(),
    ]
}

/// The method annotation, falling back to the declaring trait's.
fn metrics_annotation<'a>(
    method: &'a MethodDecl,
    declaring: Option<&'a TypeDecl>,
    name: &str,
) -> Option<&'a Annotation> {
    method
        .annotation(name)
        .or_else(|| declaring.and_then(|d| d.annotation(name)))
}

fn metric_name(annotation: &Annotation) -> String {
    first_string(annotation)
        .or_else(|| annotation.string("name").map(str::to_owned))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| names::METRICS_DEFAULT_NAME.to_owned())
}

fn extra_tags(annotation: &Annotation, mut tags: Vec<String>) -> Vec<String> {
    if let Some(extra) = annotation.value("extra_tags") {
        tags.extend(extra.as_string_array());
    }
    tags
}

fn timed_info(method: &MethodDecl, declaring: Option<&TypeDecl>) -> MetricsTimedInfo {
    let tags = default_tags(method);
    let Some(annotation) = metrics_annotation(method, declaring, names::TIMED) else {
        return MetricsTimedInfo {
            name: names::METRICS_DEFAULT_NAME.to_owned(),
            extra_tags: tags,
            long_task: false,
            percentiles: Vec::new(),
            histogram: false,
            description: None,
        };
    };
    MetricsTimedInfo {
        name: metric_name(annotation),
        extra_tags: extra_tags(annotation, tags),
        long_task: annotation.flag("long_task"),
        percentiles: annotation
            .value("percentiles")
            .map(|v| v.as_f64_array())
            .unwrap_or_default(),
        histogram: annotation.flag("histogram"),
        description: annotation.string("description").map(str::to_owned),
    }
}

fn counted_info(method: &MethodDecl, declaring: Option<&TypeDecl>) -> MetricsCountedInfo {
    let tags = default_tags(method);
    let Some(annotation) = metrics_annotation(method, declaring, names::COUNTED) else {
        return MetricsCountedInfo {
            name: names::METRICS_DEFAULT_NAME.to_owned(),
            extra_tags: tags,
            record_failures_only: false,
            description: None,
        };
    };
    MetricsCountedInfo {
        name: metric_name(annotation),
        extra_tags: extra_tags(annotation, tags),
        record_failures_only: annotation.flag("record_failures_only"),
        description: annotation.string("description").map(str::to_owned),
    }
}
