//! Attribute macros for AI service traits.
//!
//! The build pipeline reads the annotations from source. These macros only
//! validate them and remove the helper attributes the compiler does not know.

use proc_macro::TokenStream;
use service::{RegisterArgs, ServiceTrait};
use syn::{DeriveInput, parse_macro_input};

mod describe;
mod service;

/// Mark a trait as an AI service, for example
///
/// ```rust,ignore
/// #[aiservice::ai_service]
/// trait Assistant {
///     #[system_message("You are a polite assistant")]
///     #[user_message("Answer {{question}} in {{lang}}")]
///     fn chat(&self, question: String, #[v("lang")] language: String) -> String;
///
///     fn remember(&self, #[memory_id] user: u64, #[user_message] text: String) -> String;
/// }
/// ```
///
/// Method, parameter and trait level helpers (`system_message`,
/// `user_message`, `moderate`, `v`, `memory_id`, `user_name`, `timed`,
/// `counted`, `scope`) are stripped from the emitted trait.
#[proc_macro_attribute]
pub fn ai_service(_: TokenStream, item: TokenStream) -> TokenStream {
    let service = parse_macro_input!(item as ServiceTrait);
    service.into_token_stream()
}

/// Register a trait as a declarative AI service.
///
/// ```rust,ignore
/// #[aiservice::register_ai_service(
///     model_name = "fast",
///     tools = [Calculator, Weather],
///     chat_memory_provider_supplier = NoChatMemoryProviderSupplier,
/// )]
/// #[scope(application)]
/// trait Assistant {
///     fn chat(&self, question: String) -> String;
/// }
/// ```
///
/// Unknown keys are rejected at compile time.
#[proc_macro_attribute]
pub fn register_ai_service(args: TokenStream, item: TokenStream) -> TokenStream {
    let _ = parse_macro_input!(args as RegisterArgs);
    let service = parse_macro_input!(item as ServiceTrait);
    service.into_token_stream()
}

/// Generate an implementation for a trait no factory call refers to.
#[proc_macro_attribute]
pub fn created_aware(_: TokenStream, item: TokenStream) -> TokenStream {
    let service = parse_macro_input!(item as ServiceTrait);
    service.into_token_stream()
}

/// Expose `#[description("..")]` field annotations of a structured output
/// type as `FIELD_DESCRIPTIONS`.
#[proc_macro_derive(Describe, attributes(description))]
pub fn describe(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    describe::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
