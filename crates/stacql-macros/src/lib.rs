//! Proc macros for stacql.
//!
//! # Derive Macros
//!
//! - [`StacEnum`] - Generate `StacEnum`, `From<E> for Literal` and `Display`
//!   for a fieldless enum whose variants are the allowed values of an enum
//!   field
//!
//! Use the re-export from `stacql` rather than depending on this crate
//! directly; the generated code refers to `::stacql`.

mod attrs;
mod derive;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `StacEnum` for a fieldless enum.
///
/// # Attributes
///
/// | Attribute | Position | Description |
/// |-----------|----------|-------------|
/// | `rename_all = "..."` | enum | `snake_case` (default), `lowercase`, `UPPERCASE`, or `verbatim` |
/// | `rename = "..."` | variant | Use this exact string for the variant |
///
/// The enum must also be `Copy`.
///
/// # Example
///
/// ```ignore
/// use stacql::{FieldKind, FieldSpec, StacEnum};
///
/// #[derive(Debug, Clone, Copy, PartialEq, StacEnum)]
/// #[stac(rename_all = "UPPERCASE")]
/// enum Polarization {
///     Hh,
///     Vv,
///     Hv,
///     Vh,
/// }
///
/// let spec = FieldSpec::new("sar:polarizations", FieldKind::of_enum::<Polarization>())?;
/// assert_eq!(Polarization::Hh.to_string(), "HH");
/// ```
#[proc_macro_derive(StacEnum, attributes(stac))]
pub fn stac_enum_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::stac_enum_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
