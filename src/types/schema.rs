//! Per-game packet layout descriptions

use serde::{Deserialize, Serialize};

use super::{FieldSpec, GearLabelMap, GlyphKey};

/// Binary layout of one game's telemetry packet.
///
/// Immutable once loaded. The registry hands out `Arc<GameSchema>` so the
/// detector and decoder reference the same instance rather than copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSchema {
    /// Unique game identifier (e.g. `dirt_rally`)
    pub id: String,
    /// Human-readable game name
    pub display_name: String,
    /// Current gear field
    pub gear: FieldSpec,
    /// Engine RPM field
    pub rpm: FieldSpec,
    /// Explicit max RPM field; when absent the gauge adapts max RPM itself
    pub max_rpm: Option<FieldSpec>,
    /// Gear value to glyph mapping
    pub gear_labels: GearLabelMap,
}

impl GameSchema {
    /// Create a schema with the default gear labels and no max RPM field.
    pub fn new(id: impl Into<String>, gear: FieldSpec, rpm: FieldSpec) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            gear,
            rpm,
            max_rpm: None,
            gear_labels: GearLabelMap::default(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_max_rpm(mut self, max_rpm: FieldSpec) -> Self {
        self.max_rpm = Some(max_rpm);
        self
    }

    pub fn with_gear_labels(mut self, gear_labels: GearLabelMap) -> Self {
        self.gear_labels = gear_labels;
        self
    }

    /// Minimum packet length holding every referenced field.
    pub fn required_len(&self) -> usize {
        self.fields().map(|field| field.end().unwrap_or(usize::MAX)).max().unwrap_or(0)
    }

    /// Minimum packet length holding the gear and RPM fields.
    pub fn drive_len(&self) -> usize {
        [self.gear, self.rpm]
            .iter()
            .map(|field| field.end().unwrap_or(usize::MAX))
            .max()
            .unwrap_or(0)
    }

    /// Whether this game reports its own max RPM.
    pub fn has_explicit_max_rpm(&self) -> bool {
        self.max_rpm.is_some()
    }

    /// Glyph for a decoded gear value.
    pub fn glyph_for(&self, gear: i32) -> Option<&GlyphKey> {
        self.gear_labels.glyph(gear)
    }

    fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        [Some(&self.gear), Some(&self.rpm), self.max_rpm.as_ref()].into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldFormat;

    #[test]
    fn required_len_covers_max_rpm() {
        let schema = GameSchema::new(
            "test",
            FieldSpec::new(132, FieldFormat::F32Le, 1.0),
            FieldSpec::new(148, FieldFormat::F32Le, 10.0),
        );
        assert_eq!(schema.required_len(), 152);
        assert_eq!(schema.drive_len(), 152);

        let schema = schema.with_max_rpm(FieldSpec::new(252, FieldFormat::F32Le, 10.0));
        assert_eq!(schema.required_len(), 256);
        assert_eq!(schema.drive_len(), 152);
        assert!(schema.has_explicit_max_rpm());
    }

    #[test]
    fn display_name_defaults_to_id() {
        let schema = GameSchema::new(
            "forza",
            FieldSpec::new(0, FieldFormat::U8, 1.0),
            FieldSpec::new(4, FieldFormat::F32Le, 1.0),
        );
        assert_eq!(schema.display_name, "forza");
        assert_eq!(schema.glyph_for(0).map(GlyphKey::as_str), Some("N"));
    }
}
