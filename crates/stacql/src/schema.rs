//! Field metadata from STAC extension JSON Schemas.
//!
//! Only the parts needed to pick a [`FieldKind`] are read:
//!
//! | schema | kind |
//! |--------|------|
//! | `type: number` | `Number`, bounds from `minimum`/`maximum` |
//! | `type: integer` | `Integer`, same bounds |
//! | `type: string`, `format: date-time` | `Date` |
//! | `type: string` with `enum` | `Enum` (or `String` with `force_string_enum`) |
//! | `type: string` | `String` |
//! | `type: boolean` | `Boolean` |
//! | `$ref` to a GeoJSON geometry | `Spatial` |
//! | `type: array` / `object` | skipped |
//!
//! Anything else is a [`QueryError::Schema`].

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::extension::ExtensionSpec;
use crate::field::{Bounds, FieldKind, FieldSpec};

/// Options for [`extension_from_schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Treat string enums as plain strings.
    pub force_string_enum: bool,
    /// Full property names to leave out.
    pub exclude: Vec<String>,
}

/// Builds an [`ExtensionSpec`] from an extension's JSON Schema.
///
/// Field names come from `definitions.fields.properties`, sorted; the prefix
/// is taken from the first one. A field's definition is looked up under
/// `definitions.<name>` and then under `definitions.fields.properties.<name>`.
///
/// ```
/// use serde_json::json;
/// use stacql::{extension_from_schema, QueryBuilder, SchemaOptions};
///
/// # fn main() -> stacql::Result<()> {
/// let schema = json!({
///     "title": "Umbra Extension",
///     "definitions": {
///         "fields": {
///             "properties": {
///                 "umbra:task_id": {"type": "string"},
///                 "umbra:squint_angle_degrees": {"type": "number", "minimum": -90, "maximum": 90}
///             }
///         }
///     }
/// });
/// let spec = extension_from_schema(&schema, &SchemaOptions::default())?;
///
/// let mut q = QueryBuilder::core_only();
/// q.register_extension(spec)?;
/// q.extension("umbra")?.field("squint_angle_degrees")?.lt(10)?;
/// # Ok(())
/// # }
/// ```
pub fn extension_from_schema(schema: &Value, options: &SchemaOptions) -> Result<ExtensionSpec> {
    let definitions = schema
        .get("definitions")
        .and_then(Value::as_object)
        .ok_or_else(|| QueryError::Schema("schema has no definitions".to_string()))?;
    let properties = definitions
        .get("fields")
        .and_then(|f| f.get("properties"))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            QueryError::Schema("schema has no definitions.fields.properties".to_string())
        })?;

    let mut names: Vec<&String> = properties.keys().collect();
    names.sort();

    let first = names
        .first()
        .ok_or_else(|| QueryError::Schema("schema declares no fields".to_string()))?;
    let prefix = first
        .split_once(':')
        .map(|(prefix, _)| prefix)
        .ok_or_else(|| QueryError::Schema(format!("field {first} has no namespace prefix")))?;

    let mut spec = ExtensionSpec::new(prefix)?;
    if let Some(title) = schema
        .get("title")
        .or_else(|| schema.get("description"))
        .and_then(Value::as_str)
    {
        spec = spec.with_title(title);
    }

    for name in names {
        if options.exclude.iter().any(|e| e == name) {
            debug!(field = %name, "excluded schema field");
            continue;
        }
        let definition = definitions
            .get(name.as_str())
            .or_else(|| properties.get(name.as_str()))
            .and_then(Value::as_object)
            .ok_or_else(|| QueryError::Schema(format!("no definition for field {name}")))?;

        let Some(kind) = field_kind(name, definition, options)? else {
            continue;
        };
        let mut field = FieldSpec::new(name.as_str(), kind)?;
        if let Some(description) = definition.get("description").and_then(Value::as_str) {
            field = field.with_description(description);
        }
        spec = spec.with_field(field)?;
    }

    debug!(
        prefix = spec.prefix(),
        fields = spec.fields().len(),
        "loaded extension schema"
    );
    Ok(spec)
}

/// `None` for types that are deliberately not queryable.
fn field_kind(
    name: &str,
    definition: &Map<String, Value>,
    options: &SchemaOptions,
) -> Result<Option<FieldKind>> {
    if let Some(reference) = definition.get("$ref").and_then(Value::as_str) {
        if is_geometry_ref(reference) {
            return Ok(Some(FieldKind::Spatial));
        }
        return Err(QueryError::Schema(format!(
            "field {name} references unsupported schema {reference}"
        )));
    }

    let ty = schema_type(definition)
        .ok_or_else(|| QueryError::Schema(format!("field {name} has no type")))?;
    let bounds = Bounds::new(
        definition.get("minimum").and_then(Value::as_f64),
        definition.get("maximum").and_then(Value::as_f64),
    );

    let kind = match ty {
        "number" => FieldKind::Number(bounds),
        "integer" => FieldKind::Integer(bounds),
        "boolean" => FieldKind::Boolean,
        "string" if definition.get("format").and_then(Value::as_str) == Some("date-time") => {
            FieldKind::Date
        }
        "string" => match definition.get("enum").and_then(Value::as_array) {
            Some(values) if !options.force_string_enum => FieldKind::Enum(
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => FieldKind::String,
        },
        "array" | "object" => {
            debug!(field = name, kind = ty, "skipping non-scalar schema field");
            return Ok(None);
        }
        other => {
            return Err(QueryError::Schema(format!(
                "field {name} has unsupported type {other}"
            )))
        }
    };
    Ok(Some(kind))
}

/// The declared type, ignoring `"null"` in a type list.
fn schema_type(definition: &Map<String, Value>) -> Option<&str> {
    match definition.get("type")? {
        Value::String(ty) => Some(ty.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ => None,
    }
}

fn is_geometry_ref(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.contains("geojson") || lower.contains("geometry")
}
