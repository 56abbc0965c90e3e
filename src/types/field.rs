//! Field layout descriptors and bounds-checked extraction

use serde::{Deserialize, Serialize};

use super::FieldFormat;
use crate::{Result, TelemetryError};

/// Where and how a single value lives inside a telemetry packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Byte offset within the packet
    pub offset: usize,
    /// Numeric encoding of the raw value
    pub format: FieldFormat,
    /// Scale applied to the raw value before any truncation
    pub multiplier: f64,
}

impl FieldSpec {
    pub fn new(offset: usize, format: FieldFormat, multiplier: f64) -> Self {
        Self { offset, format, multiplier }
    }

    /// First byte past the end of this field, or `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.format.size())
    }

    /// Read the field from `data` and apply the multiplier.
    ///
    /// Never reads out of range: a packet that ends before the field does
    /// yields [`TelemetryError::TruncatedPacket`].
    pub fn read(&self, data: &[u8]) -> Result<f64> {
        let end = self.end().ok_or(TelemetryError::truncated_packet(usize::MAX, data.len()))?;

        let bytes = data
            .get(self.offset..end)
            .ok_or(TelemetryError::truncated_packet(end, data.len()))?;

        let raw = self
            .format
            .decode(bytes)
            .ok_or(TelemetryError::truncated_packet(end, data.len()))?;

        Ok(raw * self.multiplier)
    }
}
