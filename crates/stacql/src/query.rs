//! The query container.
//!
//! [`QueryBuilder`] owns every field, every extension namespace, the filter
//! expressions attached with [`filter`](QueryBuilder::filter), and the sort
//! key and limit. [`query_dump`](QueryBuilder::query_dump) walks all of it
//! into a [`FilterDocument`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::accessor::{Column, FieldRef};
use crate::cql2::{render, DumpOptions, FilterDocument, FilterLang, Node};
use crate::error::{QueryError, Result};
use crate::expr::Expr;
use crate::extension::{Extension, ExtensionRef, ExtensionSpec};
use crate::field::{Field, FieldSpec};
use crate::op::Op;
use crate::sort::{Dir, SortBy};
use crate::stac::{self, CoreField};

/// Builder for one CQL2-JSON filter document.
///
/// Document arguments are assembled in a fixed order:
/// 1. predicates of top-level fields, in registration order
/// 2. attached filter expressions, in the order they were added
/// 3. predicates of extension members, namespace by namespace
///
/// Dumping never mutates the builder, so repeated dumps are identical.
///
/// # Example
///
/// ```
/// use stacql::{QueryBuilder, FrequencyBand};
///
/// # fn main() -> stacql::Result<()> {
/// let mut q = QueryBuilder::new();
/// q.sar().frequency_band().equals(FrequencyBand::X)?;
/// q.eo().cloud_cover().gt(90)?.eo().cloud_cover().lt(1)?;
/// q.limit(5);
///
/// let json = q.query_dump_json()?;
/// assert!(json.contains(r#""op":"or""#));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) fields: Vec<Field>,
    pub(crate) extensions: Vec<Extension>,
    by_name: HashMap<String, usize>,
    top_level: Vec<usize>,
    filters: Vec<Expr>,
    sort: Option<SortBy>,
    limit: Option<u64>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        QueryBuilder::new()
    }
}

impl QueryBuilder {
    /// STAC core fields plus the built-in `eo`, `sar`, `view` and `sat`
    /// namespaces, registered in that order.
    pub fn new() -> Self {
        let mut q = QueryBuilder::core_only();
        for spec in stac::builtin_extensions() {
            q.ensure_extension(spec);
        }
        q
    }

    /// STAC core fields only. Built-in namespaces are attached the first
    /// time their typed accessor (`q.sar()`, ...) is used.
    pub fn core_only() -> Self {
        let mut q = QueryBuilder {
            fields: Vec::new(),
            extensions: Vec::new(),
            by_name: HashMap::new(),
            top_level: Vec::new(),
            filters: Vec::new(),
            sort: None,
            limit: None,
        };
        for spec in stac::core_fields() {
            let slot = q.push_field(spec.clone());
            q.top_level.push(slot);
        }
        q
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Adds a top-level field.
    pub fn add_field(&mut self, spec: FieldSpec) -> Result<&mut Self> {
        if self.by_name.contains_key(spec.name()) {
            return Err(QueryError::DuplicateField(spec.name().to_string()));
        }
        let slot = self.push_field(spec);
        self.top_level.push(slot);
        Ok(self)
    }

    /// Attaches an extension namespace.
    ///
    /// Fails if the prefix or any member name is already taken; nothing is
    /// registered in that case.
    pub fn register_extension(&mut self, spec: ExtensionSpec) -> Result<&mut Self> {
        if self.extension_index(spec.prefix()).is_some() {
            return Err(QueryError::DuplicateExtension(spec.prefix().to_string()));
        }
        if let Some(taken) = spec
            .fields()
            .iter()
            .find(|f| self.by_name.contains_key(f.name()))
        {
            return Err(QueryError::DuplicateField(taken.name().to_string()));
        }
        self.ensure_extension(&spec);
        Ok(self)
    }

    fn push_field(&mut self, spec: FieldSpec) -> usize {
        let slot = self.fields.len();
        self.by_name.insert(spec.name().to_string(), slot);
        self.fields.push(Field::new(Arc::new(spec)));
        slot
    }

    fn extension_index(&self, prefix: &str) -> Option<usize> {
        self.extensions.iter().position(|e| e.prefix == prefix)
    }

    /// Finds the namespace for `spec`, registering it with all its members
    /// if absent.
    pub(crate) fn ensure_extension(&mut self, spec: &ExtensionSpec) -> usize {
        if let Some(index) = self.extension_index(spec.prefix()) {
            return index;
        }
        let fresh: Vec<FieldSpec> = spec
            .fields()
            .iter()
            .filter(|f| !self.by_name.contains_key(f.name()))
            .cloned()
            .collect();
        let members = fresh.into_iter().map(|f| self.push_field(f)).collect();
        debug!(
            prefix = spec.prefix(),
            fields = spec.fields().len(),
            "registered extension"
        );
        self.extensions.push(Extension {
            prefix: spec.prefix().to_string(),
            title: spec.title().map(str::to_string),
            members,
        });
        self.extensions.len() - 1
    }

    /// Slot of member `member` of a built-in namespace, adding the field to
    /// the namespace if a user-registered namespace of the same prefix
    /// lacks it.
    pub(crate) fn builtin_slot(&mut self, spec: &ExtensionSpec, member: usize) -> usize {
        let field = &spec.fields()[member];
        if let Some(&slot) = self.by_name.get(field.name()) {
            return slot;
        }
        let index = self.ensure_extension(spec);
        let slot = self.push_field(field.clone());
        self.extensions[index].members.push(slot);
        slot
    }

    pub(crate) fn core(&mut self, field: CoreField) -> FieldRef<'_> {
        FieldRef::new(self, field as usize)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Any registered field, top-level or extension member, by full name.
    pub fn field(&mut self, name: &str) -> Result<FieldRef<'_>> {
        let slot = self.slot(name)?;
        Ok(FieldRef::new(self, slot))
    }

    /// A registered namespace by prefix.
    pub fn extension(&mut self, prefix: &str) -> Result<ExtensionRef<'_>> {
        let index = self
            .extension_index(prefix)
            .ok_or_else(|| QueryError::UnknownExtension(prefix.to_string()))?;
        Ok(ExtensionRef::new(self, index))
    }

    /// Expression handle for a registered field.
    pub fn column(&self, name: &str) -> Result<Column> {
        let slot = self.slot(name)?;
        Ok(Column::new(Arc::clone(&self.fields[slot].spec)))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn has_extension(&self, prefix: &str) -> bool {
        self.extension_index(prefix).is_some()
    }

    /// Every registered field, in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|f| f.spec.as_ref())
    }

    /// Prefixes of the registered namespaces, in registration order.
    pub fn extension_prefixes(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|e| e.prefix.as_str())
    }

    fn slot(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::UnknownField(name.to_string()))
    }

    // ========================================================================
    // Filters, sorting, limit
    // ========================================================================

    /// Attaches an expression tree as one more top-level argument.
    pub fn filter(&mut self, expr: impl Into<Expr>) -> &mut Self {
        self.filters.push(expr.into());
        self
    }

    /// Sets the `limit` member.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Sorts by a registered field. Replaces any previous sort key.
    pub fn sort_by(&mut self, name: &str, direction: Dir) -> Result<&mut Self> {
        self.slot(name)?;
        Ok(self.set_sort(SortBy {
            field: name.to_string(),
            direction,
        }))
    }

    pub(crate) fn set_sort(&mut self, key: SortBy) -> &mut Self {
        self.sort = Some(key);
        self
    }

    pub fn sort_key(&self) -> Option<&SortBy> {
        self.sort.as_ref()
    }

    /// Clears every predicate, filter, the sort key and the limit. Fields
    /// and namespaces stay registered.
    pub fn reset(&mut self) -> &mut Self {
        for field in &mut self.fields {
            field.predicate = Default::default();
        }
        self.filters.clear();
        self.sort = None;
        self.limit = None;
        self
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// The document with top-level arguments joined by `and`.
    ///
    /// Returns `None` when nothing is set: no predicates, no filters, no sort
    /// key and no limit.
    pub fn query_dump(&self) -> Option<FilterDocument> {
        self.query_dump_with(&DumpOptions::default())
    }

    pub fn query_dump_with(&self, options: &DumpOptions) -> Option<FilterDocument> {
        let args = self.collect_args();
        debug!(
            args = args.len(),
            filters = self.filters.len(),
            top_level_is_or = options.top_level_is_or,
            "assembled filter arguments"
        );

        if args.is_empty() && self.sort.is_none() && self.limit.is_none() {
            return None;
        }

        let filter = (!args.is_empty()).then(|| {
            let op = if options.top_level_is_or {
                Op::Or
            } else {
                Op::And
            };
            Node::logical(op, args)
        });

        Some(FilterDocument {
            filter_lang: filter.as_ref().map(|_| FilterLang::Cql2Json),
            filter,
            limit: self.limit,
            sortby: self.sort.iter().cloned().collect(),
        })
    }

    /// JSON text of [`query_dump`](Self::query_dump); `null` when empty.
    pub fn query_dump_json(&self) -> Result<String> {
        self.query_dump_json_with(&DumpOptions::default())
    }

    pub fn query_dump_json_with(&self, options: &DumpOptions) -> Result<String> {
        render(&self.query_dump_with(options), options)
    }

    fn collect_args(&self) -> Vec<Node> {
        let fields = self.top_level.iter().filter_map(|&slot| self.fields[slot].to_node());
        let filters = self.filters.iter().map(Expr::to_node);
        let members = self
            .extensions
            .iter()
            .flat_map(|e| e.members.iter())
            .filter_map(|&slot| self.fields[slot].to_node());
        fields.chain(filters).chain(members).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use serde_json::json;

    #[test]
    fn empty_builder_dumps_nothing() {
        let q = QueryBuilder::new();
        assert!(q.query_dump().is_none());
        assert_eq!(q.query_dump_json().unwrap(), "null");
    }

    #[test]
    fn new_registers_builtin_namespaces_in_order() {
        let q = QueryBuilder::new();
        let prefixes: Vec<_> = q.extension_prefixes().collect();
        assert_eq!(prefixes, vec!["eo", "sar", "view", "sat"]);
    }

    #[test]
    fn extension_members_dump_in_registration_order() {
        let mut q = QueryBuilder::new();
        q.sat().relative_orbit().equals(3).unwrap();
        q.view().off_nadir().lt(5).unwrap();
        let doc = serde_json::to_value(q.query_dump().unwrap()).unwrap();
        assert_eq!(
            doc["filter"]["args"],
            json!([
                {"op": "<", "args": [{"property": "view:off_nadir"}, 5]},
                {"op": "=", "args": [{"property": "sat:relative_orbit"}, 3]}
            ])
        );
    }

    #[test]
    fn core_only_attaches_namespaces_lazily() {
        let mut q = QueryBuilder::core_only();
        assert!(!q.has_extension("sar"));
        q.sar().looks_range().equals(3).unwrap();
        assert!(q.has_extension("sar"));
        assert!(!q.has_extension("eo"));
    }

    #[test]
    fn core_slots_match_names() {
        let mut q = QueryBuilder::new();
        assert_eq!(q.id().name(), "id");
        assert_eq!(q.geometry().name(), "geometry");
        assert_eq!(q.gsd().name(), "gsd");
        assert_eq!(q.mission().name(), "mission");
    }

    #[test]
    fn only_limit_yields_bare_document() {
        let mut q = QueryBuilder::new();
        q.limit(10);
        assert_eq!(q.query_dump_json().unwrap(), r#"{"limit":10}"#);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut q = QueryBuilder::new();
        let err = q
            .add_field(FieldSpec::new("platform", FieldKind::String).unwrap())
            .unwrap_err();
        assert!(matches!(err, QueryError::DuplicateField(_)));

        let sar = ExtensionSpec::new("sar").unwrap();
        assert!(matches!(
            q.register_extension(sar),
            Err(QueryError::DuplicateExtension(_))
        ));
    }

    #[test]
    fn unknown_lookups_fail() {
        let mut q = QueryBuilder::new();
        assert!(matches!(q.field("nope"), Err(QueryError::UnknownField(_))));
        assert!(matches!(
            q.extension("proj"),
            Err(QueryError::UnknownExtension(_))
        ));
        assert!(q.sort_by("nope", Dir::Asc).is_err());
    }

    #[test]
    fn custom_field_follows_core_fields() {
        let mut q = QueryBuilder::new();
        q.add_field(FieldSpec::new("collection", FieldKind::String).unwrap())
            .unwrap();
        q.field("collection").unwrap().equals("sentinel-2").unwrap();
        q.platform().equals("sentinel-2a").unwrap();
        let doc = serde_json::to_value(q.query_dump().unwrap()).unwrap();
        assert_eq!(
            doc["filter"]["args"],
            json!([
                {"op": "=", "args": [{"property": "platform"}, "sentinel-2a"]},
                {"op": "=", "args": [{"property": "collection"}, "sentinel-2"]}
            ])
        );
    }

    #[test]
    fn reset_clears_state() {
        let mut q = QueryBuilder::new();
        q.platform().equals("x").unwrap().limit(3);
        q.reset();
        assert!(q.query_dump().is_none());
    }
}
