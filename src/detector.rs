//! Blind game detection over unlabeled telemetry packets.
//!
//! Simulator packets carry no header naming the game that sent them, so the
//! detector trials every schema in registry order and accepts the first one
//! whose gear and RPM decode into plausible ranges. Once a schema is locked
//! the detector returns it without any further decoding until the lock is
//! cleared by an idle reset or an explicit re-detection request.

use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::decoder;
use crate::registry::SchemaRegistry;
use crate::types::{GameSchema, is_plausible_gear};

/// Exclusive upper bound for a plausible RPM reading.
pub const MAX_PLAUSIBLE_RPM: u32 = 20_000;

/// Detection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Consecutive packets the same schema must match before it is locked.
    /// `1` locks on the first plausible packet.
    pub required_confirmations: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { required_confirmations: 1 }
    }
}

/// Which schema, if any, the current telemetry session is locked to.
#[derive(Debug, Clone, Default)]
pub struct DetectionState {
    locked_schema: Option<Arc<GameSchema>>,
}

impl DetectionState {
    pub fn locked_schema(&self) -> Option<&Arc<GameSchema>> {
        self.locked_schema.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked_schema.is_some()
    }
}

/// Locks onto the game producing the packet stream.
#[derive(Debug, Default)]
pub struct GameDetector {
    state: DetectionState,
    config: DetectorConfig,
    /// Leading candidate and how many consecutive packets it has matched
    candidate: Option<(Arc<GameSchema>, u32)>,
    evaluations: u64,
}

impl GameDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Return the schema for this session, trialling the registry if unlocked.
    ///
    /// Returns `None` when no schema matches; callers must then leave all
    /// telemetry state untouched for this tick.
    pub fn detect(&mut self, registry: &SchemaRegistry, packet: &[u8]) -> Option<Arc<GameSchema>> {
        if let Some(locked) = &self.state.locked_schema {
            return Some(Arc::clone(locked));
        }

        let Some(matched) = self.first_plausible(registry, packet) else {
            self.candidate = None;
            return None;
        };

        let confirmations = match &self.candidate {
            Some((previous, count)) if Arc::ptr_eq(previous, &matched) => count + 1,
            _ => 1,
        };

        if confirmations < self.config.required_confirmations.max(1) {
            debug!(
                game = %matched.id,
                confirmations,
                required = self.config.required_confirmations,
                "Detection candidate"
            );
            self.candidate = Some((matched, confirmations));
            return None;
        }

        info!(game = %matched.id, name = %matched.display_name, "Game detected, schema locked");
        self.candidate = None;
        self.state.locked_schema = Some(Arc::clone(&matched));
        Some(matched)
    }

    /// Clear the lock so the next packet is trialled against every schema.
    pub fn reset(&mut self) {
        if let Some(schema) = self.state.locked_schema.take() {
            info!(game = %schema.id, "Schema lock cleared");
        }
        self.candidate = None;
    }

    pub fn state(&self) -> &DetectionState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    pub fn locked_schema(&self) -> Option<&Arc<GameSchema>> {
        self.state.locked_schema()
    }

    /// Total number of per-schema decode trials performed so far.
    pub fn schema_evaluations(&self) -> u64 {
        self.evaluations
    }

    fn first_plausible(
        &mut self,
        registry: &SchemaRegistry,
        packet: &[u8],
    ) -> Option<Arc<GameSchema>> {
        for schema in registry.iter() {
            self.evaluations += 1;
            // A schema must be able to decode every field it declares.
            let required = schema.required_len();
            if packet.len() < required {
                trace!(game = %schema.id, required, len = packet.len(), "Packet too short");
                continue;
            }
            // Any decode failure is a non-match for this schema only.
            match decoder::decode_drive(schema, packet) {
                Ok(telemetry) if is_plausible(telemetry.gear, telemetry.rpm) => {
                    return Some(Arc::clone(schema));
                }
                Ok(telemetry) => {
                    trace!(
                        game = %schema.id,
                        gear = telemetry.gear,
                        rpm = telemetry.rpm,
                        "Implausible values"
                    );
                }
                Err(e) => {
                    trace!(game = %schema.id, "Schema trial failed: {}", e);
                }
            }
        }
        None
    }
}

/// Plausibility bounds: gear in `{-1..=10}` and RPM in the open interval `(0, 20000)`.
pub fn is_plausible(gear: i32, rpm: u32) -> bool {
    is_plausible_gear(gear) && rpm > 0 && rpm < MAX_PLAUSIBLE_RPM
}
