//! Schema registry and atomic reload handle.
//!
//! The registry is an ordered set of [`GameSchema`]s; insertion order is the
//! trial order used during game detection. A dataset is parsed and validated
//! in full before it becomes visible, so readers only ever see either the
//! previous registry or the complete new one.
//!
//! ## Dataset format
//!
//! ```yaml
//! dirt_rally:
//!   display_name: DiRT Rally
//!   gear: { offset: 132, format: f, multiplier: 1.0 }
//!   rpm: { offset: 148, format: f, multiplier: 10.0 }
//!   max_rpm: { offset: 252, format: f, multiplier: 10.0 }   # optional
//!   gear_labels: { -1: R, 0: N, 1: 1, 2: 2 }                 # optional
//! ```

use serde::Deserialize;
use serde_yaml_ng::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::types::{FieldFormat, FieldSpec, GameSchema, GearLabelMap, GlyphKey};
use crate::{Result, TelemetryError};

/// Ordered, immutable collection of game schemas with unique ids.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<Arc<GameSchema>>,
}

impl SchemaRegistry {
    /// Build a registry from already-constructed schemas, keeping their order.
    pub fn new(schemas: Vec<GameSchema>) -> Result<Self> {
        let mut seen = HashSet::new();
        for schema in &schemas {
            if !seen.insert(schema.id.as_str()) {
                return Err(TelemetryError::schema_format(&schema.id, "duplicate game id"));
            }
            validate_schema(schema)?;
        }

        Ok(Self { schemas: schemas.into_iter().map(Arc::new).collect() })
    }

    /// Load a registry from a parsed schema dataset (a mapping of game id to layout).
    pub fn load(raw: &Value) -> Result<Self> {
        let mapping = match raw {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(TelemetryError::schema_format(
                    "<dataset>",
                    format!("expected a mapping of game id to schema, found {}", kind(other)),
                ));
            }
        };

        let mut schemas = Vec::with_capacity(mapping.len());
        for (key, entry) in mapping {
            let id = match key {
                Value::String(id) => id.clone(),
                other => {
                    return Err(TelemetryError::schema_format(
                        "<dataset>",
                        format!("game id must be a string, found {}", kind(other)),
                    ));
                }
            };

            let raw_schema: RawGameSchema = serde_yaml_ng::from_value(entry.clone())
                .map_err(|e| TelemetryError::schema_format(&id, e.to_string()))?;
            schemas.push(raw_schema.into_schema(id)?);
        }

        Self::new(schemas)
    }

    /// Parse and load a YAML schema dataset.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let raw: Value = serde_yaml_ng::from_str(yaml)
            .map_err(|e| TelemetryError::schema_format("<dataset>", e.to_string()))?;
        Self::load(&raw)
    }

    /// Look up a schema by id.
    pub fn get(&self, id: &str) -> Option<&Arc<GameSchema>> {
        self.schemas.iter().find(|schema| schema.id == id)
    }

    /// Look up a schema by id, failing with [`TelemetryError::UnknownSchema`].
    pub fn require(&self, id: &str) -> Result<&Arc<GameSchema>> {
        self.get(id).ok_or_else(|| TelemetryError::UnknownSchema { id: id.to_string() })
    }

    /// Schemas in trial order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<GameSchema>> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.schemas.iter().map(|schema| schema.id.as_str()).collect()
    }
}

/// Shared handle to the active registry.
///
/// Cloning the handle shares the same underlying registry. A reload swaps the
/// whole `Arc<SchemaRegistry>` in one step.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    tx: Arc<watch::Sender<Arc<SchemaRegistry>>>,
}

impl RegistryHandle {
    pub fn new(registry: SchemaRegistry) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(registry));
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the active registry.
    pub fn current(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.tx.borrow())
    }

    /// Replace the active registry.
    pub fn replace(&self, registry: SchemaRegistry) {
        info!(games = registry.len(), "Schema registry replaced");
        self.tx.send_replace(Arc::new(registry));
    }

    /// Parse `yaml` and swap it in. On failure the previous registry stays active.
    pub fn reload_yaml(&self, yaml: &str) -> Result<()> {
        match SchemaRegistry::from_yaml(yaml) {
            Ok(registry) => {
                self.replace(registry);
                Ok(())
            }
            Err(e) => {
                warn!("Schema reload rejected, keeping previous registry: {}", e);
                Err(e)
            }
        }
    }

    /// Watch for registry replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SchemaRegistry>> {
        self.tx.subscribe()
    }
}

fn validate_schema(schema: &GameSchema) -> Result<()> {
    let fields = [
        ("gear", Some(&schema.gear)),
        ("rpm", Some(&schema.rpm)),
        ("max_rpm", schema.max_rpm.as_ref()),
    ];

    for (name, field) in fields {
        let Some(field) = field else { continue };
        if !field.multiplier.is_finite() {
            return Err(TelemetryError::schema_format(
                &schema.id,
                format!("{name}.multiplier must be finite"),
            ));
        }
        if field.end().is_none() {
            return Err(TelemetryError::schema_format(
                &schema.id,
                format!("{name}.offset {} is out of range", field.offset),
            ));
        }
    }

    debug!(game = %schema.id, required_len = schema.required_len(), "Schema validated");
    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Schema entry as written in the dataset; every key optional so missing
/// ones can be reported by name.
#[derive(Debug, Deserialize)]
struct RawGameSchema {
    display_name: Option<String>,
    gear: Option<RawFieldSpec>,
    rpm: Option<RawFieldSpec>,
    max_rpm: Option<RawFieldSpec>,
    gear_labels: Option<BTreeMap<i32, RawGlyph>>,
}

#[derive(Debug, Deserialize)]
struct RawFieldSpec {
    offset: Option<usize>,
    format: Option<FieldFormat>,
    multiplier: Option<f64>,
}

/// Glyph keys may be written as `N` or as bare numbers like `3`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGlyph {
    Text(String),
    Number(i64),
}

impl RawGameSchema {
    fn into_schema(self, id: String) -> Result<GameSchema> {
        let gear = required_field(&id, "gear", self.gear)?;
        let rpm = required_field(&id, "rpm", self.rpm)?;
        let max_rpm = match self.max_rpm {
            Some(raw) => Some(raw.into_field(&id, "max_rpm")?),
            None => None,
        };

        let gear_labels = match self.gear_labels {
            Some(labels) => GearLabelMap::new(
                labels
                    .into_iter()
                    .map(|(gear, glyph)| {
                        let key = match glyph {
                            RawGlyph::Text(text) => GlyphKey::new(text),
                            RawGlyph::Number(n) => GlyphKey::new(n.to_string()),
                        };
                        (gear, key)
                    })
                    .collect(),
            ),
            None => GearLabelMap::default(),
        };

        Ok(GameSchema {
            display_name: self.display_name.unwrap_or_else(|| id.clone()),
            id,
            gear,
            rpm,
            max_rpm,
            gear_labels,
        })
    }
}

fn required_field(id: &str, name: &str, raw: Option<RawFieldSpec>) -> Result<FieldSpec> {
    let Some(raw) = raw else {
        return Err(TelemetryError::schema_format(id, format!("missing required field '{name}'")));
    };
    raw.into_field(id, name)
}

impl RawFieldSpec {
    fn into_field(self, id: &str, name: &str) -> Result<FieldSpec> {
        let missing = |key: &str| {
            TelemetryError::schema_format(id, format!("field '{name}' is missing '{key}'"))
        };

        Ok(FieldSpec {
            offset: self.offset.ok_or_else(|| missing("offset"))?,
            format: self.format.ok_or_else(|| missing("format"))?,
            multiplier: self.multiplier.ok_or_else(|| missing("multiplier"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{SAMPLE_SCHEMAS_YAML, dirt_rally_schema};

    #[test]
    fn load_preserves_dataset_order() {
        let registry = SchemaRegistry::from_yaml(SAMPLE_SCHEMAS_YAML).unwrap();
        assert_eq!(registry.ids(), vec!["dirt_rally", "big_endian_sim", "explicit_redline"]);

        let dirt = registry.get("dirt_rally").unwrap();
        assert_eq!(dirt.display_name, "DiRT Rally");
        assert_eq!(dirt.rpm, FieldSpec::new(148, FieldFormat::F32Le, 10.0));
        assert!(dirt.max_rpm.is_none());

        let explicit = registry.get("explicit_redline").unwrap();
        assert!(explicit.has_explicit_max_rpm());
        assert_eq!(explicit.glyph_for(3).map(GlyphKey::as_str), Some("3"));
        assert_eq!(explicit.glyph_for(-1).map(GlyphKey::as_str), Some("R"));
    }

    #[test]
    fn missing_rpm_is_schema_format_error() {
        let yaml = r#"
broken:
  gear: { offset: 0, format: f, multiplier: 1.0 }
"#;
        let err = SchemaRegistry::from_yaml(yaml).unwrap_err();
        match err {
            TelemetryError::SchemaFormat { game, details } => {
                assert_eq!(game, "broken");
                assert!(details.contains("rpm"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_multiplier_is_schema_format_error() {
        let yaml = r#"
broken:
  gear: { offset: 0, format: f, multiplier: 1.0 }
  rpm: { offset: 4, format: f }
"#;
        let err = SchemaRegistry::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, TelemetryError::SchemaFormat { .. }));
        assert!(err.to_string().contains("multiplier"));
    }

    #[test]
    fn unknown_format_is_schema_format_error() {
        let yaml = r#"
broken:
  gear: { offset: 0, format: q, multiplier: 1.0 }
  rpm: { offset: 4, format: f, multiplier: 1.0 }
"#;
        assert!(matches!(
            SchemaRegistry::from_yaml(yaml),
            Err(TelemetryError::SchemaFormat { .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = SchemaRegistry::new(vec![dirt_rally_schema(), dirt_rally_schema()]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn non_mapping_dataset_is_rejected() {
        assert!(SchemaRegistry::from_yaml("- a\n- b\n").is_err());
        assert!(SchemaRegistry::from_yaml("~").unwrap().is_empty());
    }

    #[test]
    fn require_reports_unknown_schema() {
        let registry = SchemaRegistry::new(vec![dirt_rally_schema()]).unwrap();
        assert!(registry.require("dirt_rally").is_ok());
        assert!(matches!(registry.require("gt7"), Err(TelemetryError::UnknownSchema { .. })));
    }

    #[test]
    fn failed_reload_keeps_previous_registry() {
        let handle = RegistryHandle::new(SchemaRegistry::from_yaml(SAMPLE_SCHEMAS_YAML).unwrap());
        let before = handle.current();

        assert!(handle.reload_yaml("broken: { gear: { offset: 0 } }").is_err());
        assert!(Arc::ptr_eq(&before, &handle.current()));

        let solo = "solo: { gear: { offset: 0, format: b, multiplier: 1 }, \
                    rpm: { offset: 1, format: H, multiplier: 1 } }";
        handle.reload_yaml(solo).unwrap();
        assert_eq!(handle.current().ids(), vec!["solo"]);
        // Readers holding the old snapshot are unaffected.
        assert_eq!(before.len(), 3);
    }
}
