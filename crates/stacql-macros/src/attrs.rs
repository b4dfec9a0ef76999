//! Attribute parsing for the StacEnum derive macro.
//!
//! Two attribute positions are recognized:
//! - on the enum: `#[stac(rename_all = "...")]`
//! - on a variant: `#[stac(rename = "...")]`

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// How variant identifiers become wire strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameRule {
    /// `GreenRed` -> `green_red` (default)
    #[default]
    SnakeCase,
    /// `GreenRed` -> `greenred`
    Lowercase,
    /// `GreenRed` -> `GREENRED`
    Uppercase,
    /// `GreenRed` -> `GreenRed`
    Verbatim,
}

impl RenameRule {
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        match s {
            "snake_case" => Ok(RenameRule::SnakeCase),
            "lowercase" => Ok(RenameRule::Lowercase),
            "UPPERCASE" => Ok(RenameRule::Uppercase),
            "verbatim" => Ok(RenameRule::Verbatim),
            other => Err(Error::new(
                span,
                format!(
                    "unknown rename rule: '{}'. Expected one of: snake_case, lowercase, UPPERCASE, verbatim",
                    other
                ),
            )),
        }
    }

    pub fn apply(self, ident: &str) -> String {
        match self {
            RenameRule::SnakeCase => to_snake_case(ident),
            RenameRule::Lowercase => ident.to_lowercase(),
            RenameRule::Uppercase => ident.to_uppercase(),
            RenameRule::Verbatim => ident.to_string(),
        }
    }
}

/// Convert an identifier to snake_case. Digits stay attached to the
/// preceding word (`Swir16` -> `swir16`).
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_was_lower = false;
        } else {
            result.push(c);
            prev_was_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

/// Enum-level attributes from `#[stac(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    pub rename_all: Option<RenameRule>,
}

/// Variant-level attributes from `#[stac(...)]`.
#[derive(Debug, Clone)]
pub struct VariantAttr {
    /// Custom wire string for this variant.
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for VariantAttr {
    fn default() -> Self {
        VariantAttr {
            rename: None,
            span: Span::call_site(),
        }
    }
}

fn string_value(nv: &syn::MetaNameValue, what: &str) -> Result<syn::LitStr> {
    if let syn::Expr::Lit(syn::ExprLit {
        lit: Lit::Str(s), ..
    }) = &nv.value
    {
        Ok(s.clone())
    } else {
        Err(Error::new(
            nv.value.span(),
            format!("{what} must be a string literal"),
        ))
    }
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let s = string_value(nv, "rename_all")?;
                    attr.rename_all = Some(RenameRule::from_str(&s.value(), s.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown stac attribute. Expected: rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

impl Parse for VariantAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = VariantAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let s = string_value(nv, "rename")?;
                    attr.rename = Some(s.value());
                    attr.span = s.span();
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown stac attribute. Expected: rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract the `#[stac(...)]` attribute, if any.
pub fn parse_stac_attrs<T: Parse + Default>(attrs: &[Attribute]) -> Result<T> {
    for attr in attrs {
        if attr.path().is_ident("stac") {
            return attr.parse_args::<T>();
        }
    }
    Ok(T::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("Ascending"), "ascending");
        assert_eq!(to_snake_case("Swir16"), "swir16");
        assert_eq!(to_snake_case("Rededge071"), "rededge071");
        assert_eq!(to_snake_case("GreenRed"), "green_red");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::Verbatim.apply("Ku"), "Ku");
        assert_eq!(RenameRule::Lowercase.apply("GreenRed"), "greenred");
        assert_eq!(RenameRule::Uppercase.apply("Hh"), "HH");
    }

    #[test]
    fn test_container_rename_all() {
        let attr = syn::parse_str::<ContainerAttr>(r#"rename_all = "verbatim""#).unwrap();
        assert_eq!(attr.rename_all, Some(RenameRule::Verbatim));
    }

    #[test]
    fn test_unknown_rename_rule() {
        let result = syn::parse_str::<ContainerAttr>(r#"rename_all = "kebab""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_variant_rename() {
        let attr = syn::parse_str::<VariantAttr>(r#"rename = "green05""#).unwrap();
        assert_eq!(attr.rename.as_deref(), Some("green05"));
    }

    #[test]
    fn test_rename_must_be_string() {
        assert!(syn::parse_str::<VariantAttr>("rename = 5").is_err());
    }

    #[test]
    fn test_unknown_variant_attribute() {
        assert!(syn::parse_str::<VariantAttr>("skip").is_err());
    }
}
