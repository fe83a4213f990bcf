//! Helper attribute removal for service traits

use quote::ToTokens;
use syn::{
    Attribute, Expr, FnArg, ItemTrait, Result, Token, TraitItem,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

/// Attributes read by the build pipeline and unknown to the compiler.
const HELPERS: &[&str] = &[
    "system_message",
    "user_message",
    "moderate",
    "timed",
    "counted",
    "v",
    "memory_id",
    "user_name",
    "scope",
];

/// Keys accepted by `#[register_ai_service]`.
const REGISTER_KEYS: &[&str] = &[
    "chat_model_supplier",
    "model_name",
    "tools",
    "chat_memory_provider_supplier",
    "retriever",
    "audit_service_supplier",
    "moderation_model_supplier",
];

/// A service trait with its helper attributes removed
pub struct ServiceTrait {
    item: ItemTrait,
}

impl Parse for ServiceTrait {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut item: ItemTrait = input.parse()?;
        strip(&mut item.attrs);
        for trait_item in &mut item.items {
            let TraitItem::Fn(method) = trait_item else {
                continue;
            };
            strip(&mut method.attrs);
            for arg in &mut method.sig.inputs {
                match arg {
                    FnArg::Typed(typed) => strip(&mut typed.attrs),
                    FnArg::Receiver(receiver) => strip(&mut receiver.attrs),
                }
            }
        }
        Ok(Self { item })
    }
}

impl ServiceTrait {
    /// Convert the stripped trait into a TokenStream
    pub fn into_token_stream(self) -> proc_macro::TokenStream {
        self.item.into_token_stream().into()
    }
}

fn strip(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| {
        let Some(last) = attr.path().segments.last() else {
            return true;
        };
        !HELPERS.iter().any(|helper| last.ident == helper)
    });
}

/// Arguments of `#[register_ai_service]`
pub struct RegisterArgs;

impl Parse for RegisterArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let args = Punctuated::<Expr, Token![,]>::parse_terminated(input)?;
        for arg in args {
            let Expr::Assign(assign) = &arg else {
                return Err(syn::Error::new_spanned(
                    arg,
                    "expected `key = value`",
                ));
            };
            let Expr::Path(key) = &*assign.left else {
                return Err(syn::Error::new_spanned(&assign.left, "expected a key"));
            };
            let known = key
                .path
                .get_ident()
                .is_some_and(|ident| REGISTER_KEYS.iter().any(|k| ident == k));
            if !known {
                return Err(syn::Error::new_spanned(
                    key,
                    format!("unknown key, expected one of: {}", REGISTER_KEYS.join(", ")),
                ));
            }
        }
        Ok(Self)
    }
}
