//! Dashboard facade tying detection, decoding and the gauge together.
//!
//! Every method runs to completion without awaiting, so one call is one
//! atomic step of the control loop. The async drivers in [`crate::driver`]
//! and [`crate::animation`] only decide *when* these steps happen.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::config::GaugeConfig;
use crate::decoder;
use crate::detector::{DetectorConfig, GameDetector};
use crate::gauge::{FlashFrame, GaugeMode, GaugeState, GaugeStateMachine, IdleEntry, MaxRpmPolicy};
use crate::registry::{RegistryHandle, SchemaRegistry};
use crate::render::GaugeRenderer;
use crate::types::Telemetry;
use crate::{Result, TelemetryError};

/// What happened to one received packet.
#[derive(Debug)]
pub enum PacketOutcome {
    /// No schema matched; nothing was updated
    Unrecognized,
    /// The locked schema could not decode this packet; nothing was updated
    Skipped(TelemetryError),
    /// Telemetry decoded and applied to the gauge
    Applied(Telemetry),
}

/// Point-in-time view of the dashboard for status observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub gauge: GaugeState,
    /// Id of the locked game, if any
    pub locked_game: Option<String>,
}

/// Dashboard shared between the cooperative tasks of one `LocalSet`.
///
/// Borrows must never be held across an `.await`.
pub type SharedDashboard<R> = Rc<RefCell<Dashboard<R>>>;

#[derive(Debug)]
pub struct Dashboard<R> {
    registry: RegistryHandle,
    detector: GameDetector,
    gauge: GaugeStateMachine,
    renderer: R,
}

impl<R: GaugeRenderer> Dashboard<R> {
    pub fn new(registry: RegistryHandle, config: GaugeConfig, renderer: R) -> Self {
        Self::with_detector(registry, config, DetectorConfig::default(), renderer)
    }

    pub fn with_detector(
        registry: RegistryHandle,
        config: GaugeConfig,
        detector: DetectorConfig,
        renderer: R,
    ) -> Self {
        Self {
            registry,
            detector: GameDetector::new(detector),
            gauge: GaugeStateMachine::new(config),
            renderer,
        }
    }

    /// Detect, decode and apply one packet.
    pub fn handle_packet(&mut self, packet: &[u8], now: Instant) -> PacketOutcome {
        let was_locked = self.detector.is_locked();
        let registry = self.registry.current();

        let Some(schema) = self.detector.detect(&registry, packet) else {
            trace!(len = packet.len(), "Packet matched no schema");
            return PacketOutcome::Unrecognized;
        };

        if !was_locked && schema.has_explicit_max_rpm() {
            match decoder::decode_max_rpm(&schema, packet) {
                Ok(Some(max_rpm)) => self.gauge.set_explicit_max_rpm(max_rpm),
                Ok(None) => {}
                Err(e) => debug!(game = %schema.id, "Max RPM unreadable at lock: {}", e),
            }
        }

        let telemetry = match decoder::decode(&schema, packet) {
            Ok(telemetry) => telemetry,
            Err(e) => {
                debug!(game = %schema.id, len = packet.len(), "Skipping packet: {}", e);
                return PacketOutcome::Skipped(e);
            }
        };

        trace!(game = %schema.id, gear = telemetry.gear, rpm = telemetry.rpm, "Telemetry");

        let policy = if schema.has_explicit_max_rpm() {
            MaxRpmPolicy::Explicit
        } else {
            MaxRpmPolicy::Adaptive
        };
        self.gauge.apply_telemetry(
            &telemetry,
            &schema.gear_labels,
            policy,
            now,
            &mut self.renderer,
        );

        PacketOutcome::Applied(telemetry)
    }

    /// Silence check. Enters idle and clears the detection lock once per episode.
    pub fn tick(&mut self, now: Instant) -> Option<IdleEntry> {
        let entry = self.gauge.check_silence(now, &mut self.renderer)?;
        self.detector.reset();
        Some(entry)
    }

    pub fn flash_tick(&mut self) -> FlashFrame {
        self.gauge.flash_tick(&mut self.renderer)
    }

    /// One idle animation frame; `false` once the episode is over.
    pub fn idle_step(&mut self, episode: u64, intensity: f32) -> bool {
        self.gauge.idle_step(episode, intensity, &mut self.renderer)
    }

    /// One start-up sweep frame.
    pub fn sweep_step(&mut self, level: f32) {
        self.gauge.render_level(level, &mut self.renderer);
    }

    /// Present the idle state without waiting for a silence timeout.
    pub fn begin_idle(&mut self) -> IdleEntry {
        self.detector.reset();
        self.gauge.enter_idle(&mut self.renderer)
    }

    /// Drop the detection lock; the next packet is trialled against every schema.
    pub fn request_redetection(&mut self) {
        info!("Re-detection requested");
        self.detector.reset();
    }

    /// Atomically replace the schema dataset. On error the old dataset stays active.
    pub fn reload_schemas(&mut self, yaml: &str) -> Result<()> {
        self.registry.reload_yaml(yaml)?;
        self.detector.reset();
        Ok(())
    }

    pub fn replace_registry(&mut self, registry: SchemaRegistry) {
        self.registry.replace(registry);
        self.detector.reset();
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            gauge: self.gauge.state().clone(),
            locked_game: self.detector.locked_schema().map(|schema| schema.id.clone()),
        }
    }

    pub fn mode(&self) -> GaugeMode {
        self.gauge.mode()
    }

    pub fn config(&self) -> &GaugeConfig {
        self.gauge.config()
    }

    pub fn detector(&self) -> &GameDetector {
        &self.detector
    }

    pub fn gauge(&self) -> &GaugeStateMachine {
        &self.gauge
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
