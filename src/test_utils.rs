//! Test utilities: sample schemas, packet builders and a recording renderer.
//!
//! Shared by the unit tests and the criterion benchmarks (behind the
//! `benchmark` feature).

#![cfg(any(test, feature = "benchmark"))]

use crate::registry::SchemaRegistry;
use crate::render::GaugeRenderer;
use crate::types::{FieldFormat, FieldSpec, GameSchema, GearLabelMap, GlyphKey, RingFill, Rgb};

/// Dataset with three games in a fixed trial order.
///
/// - `dirt_rally`: little-endian floats, RPM reported in tens
/// - `big_endian_sim`: big-endian gear integer, RPM in thousands
/// - `explicit_redline`: compact integer layout with its own max RPM field
pub const SAMPLE_SCHEMAS_YAML: &str = r#"
dirt_rally:
  display_name: DiRT Rally
  gear: { offset: 132, format: f, multiplier: 1.0 }
  rpm: { offset: 148, format: f, multiplier: 10.0 }
big_endian_sim:
  display_name: Big Endian Sim
  gear: { offset: 0, format: ">i", multiplier: 1.0 }
  rpm: { offset: 4, format: ">f", multiplier: 1000.0 }
explicit_redline:
  display_name: Explicit Redline
  gear: { offset: 0, format: B, multiplier: 1 }
  rpm: { offset: 2, format: ">H", multiplier: 1 }
  max_rpm: { offset: 4, format: ">H", multiplier: 1 }
  gear_labels: { -1: R, 0: N, 1: 1, 2: 2, 3: 3, 4: 4, 5: 5, 6: 6 }
"#;

/// Length of a full DiRT Rally packet as broadcast by the game.
pub const DIRT_RALLY_PACKET_LEN: usize = 264;

pub fn sample_registry() -> SchemaRegistry {
    SchemaRegistry::from_yaml(SAMPLE_SCHEMAS_YAML).expect("sample dataset is valid")
}

pub fn dirt_rally_schema() -> GameSchema {
    GameSchema::new(
        "dirt_rally",
        FieldSpec::new(132, FieldFormat::F32Le, 1.0),
        FieldSpec::new(148, FieldFormat::F32Le, 10.0),
    )
    .with_display_name("DiRT Rally")
}

pub fn explicit_redline_schema() -> GameSchema {
    let labels = (-1..=6)
        .map(|gear| {
            let glyph = match gear {
                -1 => GlyphKey::new("R"),
                0 => GlyphKey::new("N"),
                n => GlyphKey::new(n.to_string()),
            };
            (gear, glyph)
        })
        .collect();

    GameSchema::new(
        "explicit_redline",
        FieldSpec::new(0, FieldFormat::U8, 1.0),
        FieldSpec::new(2, FieldFormat::U16Be, 1.0),
    )
    .with_display_name("Explicit Redline")
    .with_max_rpm(FieldSpec::new(4, FieldFormat::U16Be, 1.0))
    .with_gear_labels(GearLabelMap::new(labels))
}

/// DiRT Rally packet with `gear` and `rpm_tens` at their offsets.
pub fn dirt_rally_packet(gear: f32, rpm_tens: f32) -> Vec<u8> {
    PacketBuilder::new(DIRT_RALLY_PACKET_LEN).f32_le(132, gear).f32_le(148, rpm_tens).build()
}

/// Builds zero-filled packets with values written at fixed offsets.
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    data: Vec<u8>,
}

impl PacketBuilder {
    pub fn new(len: usize) -> Self {
        Self { data: vec![0; len] }
    }

    fn put(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn u8(self, offset: usize, value: u8) -> Self {
        self.put(offset, &[value])
    }

    pub fn u16_le(self, offset: usize, value: u16) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn u16_be(self, offset: usize, value: u16) -> Self {
        self.put(offset, &value.to_be_bytes())
    }

    pub fn i32_le(self, offset: usize, value: i32) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn i32_be(self, offset: usize, value: i32) -> Self {
        self.put(offset, &value.to_be_bytes())
    }

    pub fn f32_le(self, offset: usize, value: f32) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn f32_be(self, offset: usize, value: f32) -> Self {
        self.put(offset, &value.to_be_bytes())
    }

    pub fn f64_le(self, offset: usize, value: f64) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// One call made on a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Ring { fill: RingFill, color: Rgb, brightness: f32 },
    Glyph(GlyphKey),
    ClearDisplay,
}

/// Renderer that records every call in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    pub fn ring_events(&self) -> Vec<&RenderEvent> {
        self.events.iter().filter(|e| matches!(e, RenderEvent::Ring { .. })).collect()
    }

    pub fn last_ring(&self) -> Option<&RenderEvent> {
        self.events.iter().rev().find(|e| matches!(e, RenderEvent::Ring { .. }))
    }

    pub fn glyphs(&self) -> Vec<&GlyphKey> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Glyph(glyph) => Some(glyph),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl GaugeRenderer for RecordingRenderer {
    fn set_ring(&mut self, fill: RingFill, color: Rgb, brightness: f32) {
        self.events.push(RenderEvent::Ring { fill, color, brightness });
    }

    fn render_glyph(&mut self, glyph: &GlyphKey) {
        self.events.push(RenderEvent::Glyph(glyph.clone()));
    }

    fn clear_display(&mut self) {
        self.events.push(RenderEvent::ClearDisplay);
    }
}
