//! Implementation of the `#[derive(StacEnum)]` macro.
//!
//! This macro generates an implementation of the `StacEnum` trait plus
//! `From<E> for Literal` and `Display`, so enum values can be handed
//! straight to field setters.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_stac_attrs, ContainerAttr, VariantAttr};

/// Main implementation of the StacEnum derive macro.
pub fn stac_enum_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let enum_name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(Error::new(
                input.span(),
                "StacEnum can only be derived for enums",
            ))
        }
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "StacEnum cannot be derived for generic enums",
        ));
    }

    if variants.is_empty() {
        return Err(Error::new(
            input.span(),
            "StacEnum requires at least one variant",
        ));
    }

    let container: ContainerAttr = parse_stac_attrs(&input.attrs)?;
    let rule = container.rename_all.unwrap_or_default();

    let mut idents = Vec::with_capacity(variants.len());
    let mut values = Vec::with_capacity(variants.len());
    let mut seen: HashMap<String, String> = HashMap::new();

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new(
                variant.span(),
                "StacEnum variants cannot carry data",
            ));
        }

        let attr: VariantAttr = parse_stac_attrs(&variant.attrs)?;
        let ident = &variant.ident;
        let span = if attr.rename.is_some() {
            attr.span
        } else {
            variant.span()
        };
        let value = attr
            .rename
            .unwrap_or_else(|| rule.apply(&ident.to_string()));

        if let Some(previous) = seen.insert(value.clone(), ident.to_string()) {
            return Err(Error::new(
                span,
                format!(
                    "variants {} and {} both map to '{}'",
                    previous, ident, value
                ),
            ));
        }

        idents.push(ident);
        values.push(value);
    }

    let expanded = quote! {
        impl ::stacql::StacEnum for #enum_name {
            const VARIANTS: &'static [Self] = &[#(#enum_name::#idents),*];

            fn as_str(&self) -> &'static str {
                match self {
                    #(#enum_name::#idents => #values,)*
                }
            }
        }

        impl ::core::convert::From<#enum_name> for ::stacql::Literal {
            fn from(value: #enum_name) -> Self {
                ::stacql::Literal::String(
                    ::stacql::StacEnum::as_str(&value).to_string()
                )
            }
        }

        impl ::core::convert::From<&#enum_name> for ::stacql::Literal {
            fn from(value: &#enum_name) -> Self {
                ::stacql::Literal::String(
                    ::stacql::StacEnum::as_str(value).to_string()
                )
            }
        }

        impl ::core::fmt::Display for #enum_name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(::stacql::StacEnum::as_str(self))
            }
        }
    };

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(src: &str) -> Result<String> {
        let input: DeriveInput = syn::parse_str(src)?;
        stac_enum_derive_impl(input).map(|ts| ts.to_string())
    }

    #[test]
    fn test_default_snake_case_values() {
        let out = expand("enum OrbitState { Ascending, Descending }").unwrap();
        assert!(out.contains("\"ascending\""));
        assert!(out.contains("\"descending\""));
    }

    #[test]
    fn test_verbatim_and_rename() {
        let out = expand(
            r#"#[stac(rename_all = "verbatim")] enum Band { Ku, #[stac(rename = "ka")] Ka }"#,
        )
        .unwrap();
        assert!(out.contains("\"Ku\""));
        assert!(out.contains("\"ka\""));
    }

    #[test]
    fn test_rejects_structs() {
        assert!(expand("struct Nope { a: u8 }").is_err());
    }

    #[test]
    fn test_rejects_data_variants() {
        assert!(expand("enum Nope { A(u8), B }").is_err());
    }

    #[test]
    fn test_rejects_empty_enums() {
        assert!(expand("enum Nope {}").is_err());
    }

    #[test]
    fn test_rejects_colliding_values() {
        let err = expand(r#"enum Dup { GreenRed, #[stac(rename = "green_red")] Other }"#)
            .unwrap_err();
        assert!(err.to_string().contains("green_red"));
    }
}
