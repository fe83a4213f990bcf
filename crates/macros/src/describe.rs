//! Field descriptions of structured output types

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, ExprLit, Fields, Lit, Result, Token, punctuated::Punctuated};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Describe can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Describe requires named fields",
        ));
    };

    let mut entries = Vec::new();
    for field in &fields.named {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("description")) else {
            continue;
        };
        let parts = attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)?;
        let mut text = Vec::new();
        for part in parts {
            match part {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => text.push(s.value()),
                other => {
                    return Err(syn::Error::new_spanned(other, "expected a string literal"));
                }
            }
        }
        let name = field
            .ident
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let text = text.join(" ");
        entries.push(quote! { (#name, #text) });
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Field name and description of every described field.
            pub const FIELD_DESCRIPTIONS: &'static [(&'static str, &'static str)] = &[
                #(#entries),*
            ];
        }
    })
}
