//! Gear values and the glyphs used to display them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest gear value a plausible packet may carry (reverse).
pub const REVERSE_GEAR: i32 = -1;

/// Highest gear value a plausible packet may carry.
pub const MAX_FORWARD_GEAR: i32 = 10;

/// Key of a display glyph such as `"N"`, `"R"` or `"3"`.
///
/// The bitmap behind the key belongs to the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphKey(String);

impl GlyphKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlyphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlyphKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Mapping from decoded gear integer to display glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GearLabelMap(BTreeMap<i32, GlyphKey>);

impl GearLabelMap {
    pub fn new(labels: BTreeMap<i32, GlyphKey>) -> Self {
        Self(labels)
    }

    /// Glyph for `gear`, if the map has one.
    pub fn glyph(&self, gear: i32) -> Option<&GlyphKey> {
        self.0.get(&gear)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for GearLabelMap {
    /// `R` for reverse, `N` for neutral, digits for gears one to nine.
    fn default() -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(REVERSE_GEAR, GlyphKey::new("R"));
        labels.insert(0, GlyphKey::new("N"));
        for gear in 1..=9 {
            labels.insert(gear, GlyphKey::new(gear.to_string()));
        }
        Self(labels)
    }
}

/// Whether `gear` lies in the closed plausibility set `{-1, 0, 1, ..., 10}`.
pub fn is_plausible_gear(gear: i32) -> bool {
    (REVERSE_GEAR..=MAX_FORWARD_GEAR).contains(&gear)
}
