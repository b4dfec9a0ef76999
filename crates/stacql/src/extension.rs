//! Extension namespaces.
//!
//! An [`ExtensionSpec`] declares the fields sharing a prefix (`sar:*`,
//! `eo:*`, ...). Once registered on a [`QueryBuilder`], the namespace is
//! reachable dynamically through [`ExtensionRef`], and for built-in
//! namespaces through a typed handle generated by `extension!`
//! (`q.sar().frequency_band()`).

use crate::accessor::FieldRef;
use crate::error::{QueryError, Result};
use crate::field::{is_valid_property_name, FieldSpec};
use crate::query::QueryBuilder;

/// Declaration of an extension namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionSpec {
    prefix: String,
    title: Option<String>,
    fields: Vec<FieldSpec>,
}

impl ExtensionSpec {
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.contains(':') || !is_valid_property_name(&prefix) {
            return Err(QueryError::InvalidPropertyName(prefix));
        }
        Ok(ExtensionSpec {
            prefix,
            title: None,
            fields: Vec::new(),
        })
    }

    pub(crate) fn builtin(prefix: &str, title: &str, fields: Vec<FieldSpec>) -> Self {
        ExtensionSpec {
            prefix: prefix.to_string(),
            title: Some(title.to_string()),
            fields,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds a member. Its name must be `prefix:member`.
    pub fn with_field(mut self, field: FieldSpec) -> Result<Self> {
        self.check_member(field.name())?;
        if self.fields.iter().any(|f| f.name() == field.name()) {
            return Err(QueryError::DuplicateField(field.name().to_string()));
        }
        self.fields.push(field);
        Ok(self)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub(crate) fn check_member(&self, name: &str) -> Result<()> {
        match name.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.starts_with(':') => Ok(()),
            _ => Err(QueryError::Schema(format!(
                "field {name} does not belong to extension {}",
                self.prefix
            ))),
        }
    }
}

/// A namespace registered on a query: its members are slots into the
/// query's field table, in declaration order.
#[derive(Debug, Clone)]
pub(crate) struct Extension {
    pub prefix: String,
    pub title: Option<String>,
    pub members: Vec<usize>,
}

/// Dynamic handle on a registered namespace.
pub struct ExtensionRef<'q> {
    query: &'q mut QueryBuilder,
    index: usize,
}

impl<'q> ExtensionRef<'q> {
    pub(crate) fn new(query: &'q mut QueryBuilder, index: usize) -> Self {
        ExtensionRef { query, index }
    }

    pub fn prefix(&self) -> &str {
        &self.query.extensions[self.index].prefix
    }

    pub fn title(&self) -> Option<&str> {
        self.query.extensions[self.index].title.as_deref()
    }

    /// Member names, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.query.extensions[self.index]
            .members
            .iter()
            .map(|&slot| self.query.fields[slot].spec.name())
            .collect()
    }

    /// Looks up a member by full (`sar:frequency_band`) or short
    /// (`frequency_band`) name.
    pub fn field(self, name: &str) -> Result<FieldRef<'q>> {
        let ext = &self.query.extensions[self.index];
        let full = if name.contains(':') {
            name.to_string()
        } else {
            format!("{}:{}", ext.prefix, name)
        };
        let slot = ext
            .members
            .iter()
            .copied()
            .find(|&slot| self.query.fields[slot].spec.name() == full)
            .ok_or(QueryError::UnknownField(full))?;
        Ok(FieldRef::new(self.query, slot))
    }
}

impl std::fmt::Debug for ExtensionRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRef")
            .field("prefix", &self.prefix())
            .field("fields", &self.field_names())
            .finish()
    }
}

/// Declares a built-in namespace.
///
/// Expands to:
/// - `spec()`, the namespace's [`ExtensionSpec`], built once;
/// - a typed handle with one method per member;
/// - an inherent `QueryBuilder` method returning that handle, which
///   registers the namespace on first use.
macro_rules! extension {
    (
        $(#[$handle_meta:meta])*
        handle $handle:ident, accessor $accessor:ident,
        prefix $prefix:literal, title $title:literal;
        $(
            $(#[$member_meta:meta])*
            $member:ident => $kind:expr
        ),+ $(,)?
    ) => {
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy)]
        enum Member {
            $($member),+
        }

        static SPEC: ::once_cell::sync::Lazy<$crate::ExtensionSpec> =
            ::once_cell::sync::Lazy::new(|| {
                $crate::ExtensionSpec::builtin(
                    $prefix,
                    $title,
                    vec![$(
                        $crate::FieldSpec::unchecked(
                            concat!($prefix, ":", stringify!($member)),
                            $kind,
                        )
                    ),+],
                )
            });

        #[doc = concat!("Declaration of the `", $prefix, "` namespace.")]
        pub fn spec() -> &'static $crate::ExtensionSpec {
            &SPEC
        }

        $(#[$handle_meta])*
        pub struct $handle<'q> {
            query: &'q mut $crate::QueryBuilder,
        }

        impl<'q> $handle<'q> {
            $(
                $(#[$member_meta])*
                pub fn $member(self) -> $crate::FieldRef<'q> {
                    let slot = self.query.builtin_slot(&SPEC, Member::$member as usize);
                    $crate::FieldRef::new(self.query, slot)
                }
            )+
        }

        impl $crate::QueryBuilder {
            #[doc = concat!("Fields of the `", $prefix, "` namespace.")]
            pub fn $accessor(&mut self) -> $handle<'_> {
                self.ensure_extension(&SPEC);
                $handle { query: self }
            }
        }
    };
}

pub(crate) use extension;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    #[test]
    fn members_must_carry_the_prefix() {
        let spec = ExtensionSpec::new("umbra").unwrap();
        let ok = FieldSpec::new("umbra:task_id", FieldKind::String).unwrap();
        let foreign = FieldSpec::new("sar:looks_range", FieldKind::String).unwrap();
        let spec = spec.with_field(ok).unwrap();
        assert!(matches!(
            spec.clone().with_field(foreign),
            Err(QueryError::Schema(_))
        ));
        assert_eq!(spec.fields().len(), 1);
    }

    #[test]
    fn prefix_lookalikes_are_rejected() {
        let spec = ExtensionSpec::new("sa").unwrap();
        assert!(spec.check_member("sar:looks_range").is_err());
        assert!(spec.check_member("sa:x").is_ok());
    }

    #[test]
    fn invalid_prefix() {
        assert!(ExtensionSpec::new("sar:x").is_err());
        assert!(ExtensionSpec::new("").is_err());
    }

    #[test]
    fn duplicate_member_is_rejected() {
        let field = FieldSpec::new("umbra:task_id", FieldKind::String).unwrap();
        let spec = ExtensionSpec::new("umbra")
            .unwrap()
            .with_field(field.clone())
            .unwrap();
        assert!(matches!(
            spec.with_field(field),
            Err(QueryError::DuplicateField(_))
        ));
    }
}
