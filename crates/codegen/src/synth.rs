//! Emission of the implementation types.
//!
//! Each class is written in a fixed order: scope, fields, constructors, one
//! impl block per implemented trait, lifecycle impls, then the memory removal
//! impl. The whole file is assembled and formatted at the end.

use crate::{
    CodegenConfig, Error, Result,
    index::{MethodDecl, TypeDecl, ident, path_text},
};
use aicore::Scope;
use heck::ToUpperCamelCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, Pat, Type, parse_quote};

/// Header of generated files.
pub const HEADER: &str = "// @generated by aiservice-codegen, do not edit.\n\n";

/// Everything needed to emit one implementation.
#[derive(Debug)]
pub struct ClassSpec<'a> {
    /// The candidate trait.
    pub interface: &'a TypeDecl,
    /// Generated type name.
    pub implementation: String,
    /// Implemented traits, the candidate first, each with its methods.
    pub traits: Vec<(&'a TypeDecl, Vec<&'a MethodDecl>)>,
    /// Resolved scope, present for declarative services.
    pub scope: Option<Scope>,
}

/// Writes implementation types against the runtime crate.
#[derive(Debug)]
pub struct Synthesizer<'a> {
    config: &'a CodegenConfig,
    runtime: syn::Path,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a CodegenConfig) -> Result<Self> {
        let runtime = syn::parse_str::<syn::Path>(&config.runtime_crate).map_err(|source| {
            Error::RuntimePath {
                path: config.runtime_crate.clone(),
                source,
            }
        })?;
        Ok(Self { config, runtime })
    }

    /// Name of the implementation of `interface`: module segments and trait
    /// name in upper camel case, plus the configured suffix.
    pub fn implementation_name(&self, interface: &str) -> String {
        let name = interface
            .split("::")
            .filter(|s| *s != "crate")
            .map(|s| s.trim_start_matches("r#").to_upper_camel_case())
            .collect::<String>();
        format!("{name}{}", self.config.impl_suffix)
    }

    /// Emit one implementation type.
    pub fn class(&self, spec: &ClassSpec<'_>) -> TokenStream {
        let rt = &self.runtime;
        let name = format_ident!("{}", spec.implementation);
        let interface = spec.interface.name.as_str();
        let doc = format!(" Generated implementation of `{interface}`.");

        // scope
        let scope = spec.scope.map(|scope| {
            let variant = format_ident!("{}", scope.as_str());
            quote! {
                impl #rt::ScopedBean for #name {
                    const SCOPE: #rt::Scope = #rt::Scope::#variant;
                }
            }
        });

        // fields and constructors
        let inject_doc = format!(" Injection constructor, takes the context qualified by `{interface}`.");
        let header = quote! {
            #[doc = #doc]
            pub struct #name {
                context: ::std::option::Option<::std::sync::Arc<#rt::AiServiceContext>>,
                runtime: ::std::sync::Arc<#rt::AiServiceRuntime>,
            }

            impl #name {
                /// Qualified name of the implemented service.
                pub const INTERFACE: &'static str = #interface;

                #[doc = #inject_doc]
                pub fn new(
                    runtime: ::std::sync::Arc<#rt::AiServiceRuntime>,
                    context: ::std::sync::Arc<#rt::AiServiceContext>,
                ) -> Self {
                    Self {
                        context: ::std::option::Option::Some(context),
                        runtime,
                    }
                }

                /// Instance without a service context, for ad hoc use.
                pub fn unbound(runtime: ::std::sync::Arc<#rt::AiServiceRuntime>) -> Self {
                    Self {
                        context: ::std::option::Option::None,
                        runtime,
                    }
                }

                fn construct(
                    runtime: ::std::sync::Arc<#rt::AiServiceRuntime>,
                    context: ::std::option::Option<::std::sync::Arc<#rt::AiServiceContext>>,
                ) -> #rt::Bean {
                    ::std::sync::Arc::new(Self { context, runtime })
                }
            }
        };

        // methods
        let impls = spec.traits.iter().map(|(decl, methods)| {
            let path: syn::Path = syn::parse_str(&decl.name).unwrap_or_else(|_| {
                let ident = ident(&decl.ident);
                parse_quote!(#ident)
            });
            let methods = methods.iter().map(|m| self.method(m));
            quote! {
                impl #path for #name {
                    #(#methods)*
                }
            }
        });

        // lifecycle
        let lifecycle = spec.scope.is_some().then(|| {
            quote! {
                impl #rt::Closeable for #name {
                    fn close(&self) {
                        if let ::std::option::Option::Some(context) = &self.context {
                            context.close();
                        }
                    }
                }
            }
        });

        quote! {
            #header
            #scope
            #(#impls)*
            #lifecycle

            impl #rt::ChatMemoryRemovable for #name {
                fn remove(&self, ids: &[#rt::MemoryId]) {
                    if let ::std::option::Option::Some(context) = &self.context {
                        context.remove_chat_memory_ids(ids);
                    }
                }
            }
        }
    }

    /// One forwarding method: read the context, look up the descriptor, box
    /// the arguments and hand everything to the dispatcher.
    fn method(&self, method: &MethodDecl) -> TokenStream {
        let rt = &self.runtime;
        let method_id = method.id();
        let passthrough = method
            .attrs
            .iter()
            .filter(|a| self.config.is_passthrough(&path_text(a.path())));

        let mut sig = method.sig.clone();
        let mut params = Vec::new();
        let typed = sig.inputs.iter_mut().filter_map(|input| match input {
            FnArg::Typed(typed) => Some(typed),
            FnArg::Receiver(_) => None,
        });
        for (position, typed) in typed.enumerate() {
            let name = match &*typed.pat {
                Pat::Ident(pat) if pat.ident != "self" => pat.ident.clone(),
                _ => format_ident!("arg{position}"),
            };
            typed.pat = Box::new(parse_quote!(#name));
            params.push(match &*typed.ty {
                Type::Reference(_) => {
                    quote!(::std::boxed::Box::new(::std::borrow::ToOwned::to_owned(#name)))
                }
                _ => quote!(::std::boxed::Box::new(#name)),
            });
        }

        let output: Type = match &method.output {
            Some(ty) => ty.clone(),
            None => parse_quote!(()),
        };

        quote! {
            #(#passthrough)*
            #sig {
                let context = self.context.as_ref();
                let create_info = self.runtime.method_create_info(Self::INTERFACE, #method_id);
                let params: ::std::vec::Vec<::std::boxed::Box<dyn ::std::any::Any + ::std::marker::Send>> =
                    ::std::vec![#(#params),*];
                let support = self.runtime.implementation_support();
                let result = support.implement(#rt::MethodInput::new(context, create_info, params));
                #rt::into_return::<#output>(result, Self::INTERFACE, #method_id)
            }
        }
    }

    /// Assemble and format the generated file.
    ///
    /// `constructors` pairs each interface with its implementation name.
    pub fn file(
        &self,
        classes: Vec<TokenStream>,
        metadata_json: &str,
        constructors: &[(String, String)],
    ) -> Result<String> {
        let rt = &self.runtime;
        let entries = constructors.iter().map(|(interface, implementation)| {
            let ty = format_ident!("{implementation}");
            quote! {
                #rt::ReflectiveConstructor {
                    interface: #interface,
                    implementation: #implementation,
                    construct: #ty::construct,
                }
            }
        });
        let tokens = quote! {
            /// Serialized metadata table of the generated services.
            pub const METADATA: &str = #metadata_json;

            /// Decode [`METADATA`].
            pub fn metadata() -> ::std::result::Result<#rt::AiServiceMetadata, #rt::MetadataError> {
                #rt::AiServiceMetadata::from_json(METADATA)
            }

            /// Constructors of every generated implementation.
            pub fn constructors() -> ::std::vec::Vec<#rt::ReflectiveConstructor> {
                ::std::vec![#(#entries),*]
            }

            #(#classes)*
        };
        let file = syn::parse2::<syn::File>(tokens).map_err(Error::Emit)?;
        Ok(format!("{HEADER}{}", prettyplease::unparse(&file)))
    }
}
