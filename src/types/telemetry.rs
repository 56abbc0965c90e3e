//! Decoded per-packet telemetry values

use serde::{Deserialize, Serialize};

/// Values decoded from one packet.
///
/// `gear` stays the raw integer key (-1 reverse, 0 neutral, 1..N forward);
/// mapping to a glyph happens at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub gear: i32,
    pub rpm: u32,
    pub max_rpm: Option<u32>,
}

impl Telemetry {
    pub fn new(gear: i32, rpm: u32) -> Self {
        Self { gear, rpm, max_rpm: None }
    }

    pub fn with_max_rpm(mut self, max_rpm: u32) -> Self {
        self.max_rpm = Some(max_rpm);
        self
    }
}
