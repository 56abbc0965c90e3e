//! Gauge state machine.
//!
//! Owns the normalized RPM level, the displayed gear and the
//! `Idle` / `Active` / `Redline` mode. Every mutation goes through one of the
//! transition methods below; visual intents are pushed to a
//! [`GaugeRenderer`] as a side effect.
//!
//! ```text
//!            telemetry                 level >= redline
//!   Idle ───────────────► Active ◄──────────────────► Redline
//!    ▲                      │        level < redline     │
//!    └──────────────────────┴────────────────────────────┘
//!                  silence >= idle timeout
//! ```

mod bands;

pub use bands::{
    ColorBand, DEFAULT_GREEN_BREAKPOINT, DEFAULT_REDLINE_FLASH_ABOVE, DEFAULT_YELLOW_BREAKPOINT,
};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::GaugeConfig;
use crate::render::GaugeRenderer;
use crate::types::{GearLabelMap, GlyphKey, RingFill, Rgb, Telemetry};

/// Max RPM assumed until telemetry says otherwise.
pub const DEFAULT_MAX_RPM: u32 = 3000;

/// Redline flash phase counter wraps at this value.
pub const FLASH_MAX_CYCLES: u32 = 50;

/// Share of the global brightness used by the idle animation.
pub const IDLE_BRIGHTNESS_SCALE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GaugeMode {
    /// No telemetry; ambient animation or dark ring
    Idle,
    /// Live RPM bar colored by level
    Active,
    /// Level at or above the redline threshold; ring flashes red
    Redline,
}

/// Where the gauge's max RPM comes from for the locked game.
///
/// The two policies never mix: a game either reports its own max RPM or the
/// gauge learns it from the highest RPM seen this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxRpmPolicy {
    /// Raise max RPM to the highest RPM observed; never lowered until idle
    Adaptive,
    /// Take max RPM from the schema's max RPM field
    Explicit,
}

/// Externally visible gauge state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeState {
    pub mode: GaugeMode,
    /// Normalized RPM in [0, 1]
    pub level: f32,
    pub current_gear_glyph: Option<GlyphKey>,
    pub max_rpm: u32,
    pub flash_phase: u32,
}

impl Default for GaugeState {
    fn default() -> Self {
        Self {
            mode: GaugeMode::Idle,
            level: 0.0,
            current_gear_glyph: None,
            max_rpm: DEFAULT_MAX_RPM,
            flash_phase: 0,
        }
    }
}

/// A change of [`GaugeMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: GaugeMode,
    pub to: GaugeMode,
}

/// Returned whenever the gauge enters idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleEntry {
    /// Identifies this idle episode; animations stop once it is stale
    pub episode: u64,
    /// Whether an idle animation should be started
    pub animate: bool,
}

/// What one redline flash tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashFrame {
    /// Not in redline; nothing drawn
    Inactive,
    /// Ring switched off
    Off,
    /// Level bar drawn in full red
    Lit,
}

/// Normalized level `rpm / max_rpm` clamped to [0, 1]; a zero max counts as full scale.
pub fn normalized_level(rpm: u32, max_rpm: u32) -> f32 {
    if max_rpm == 0 {
        return 1.0;
    }
    (rpm as f32 / max_rpm as f32).clamp(0.0, 1.0)
}

#[derive(Debug)]
pub struct GaugeStateMachine {
    state: GaugeState,
    config: GaugeConfig,
    last_gear: Option<i32>,
    last_decode: Option<Instant>,
    idle_episode: u64,
}

impl GaugeStateMachine {
    pub fn new(config: GaugeConfig) -> Self {
        Self {
            state: GaugeState::default(),
            config,
            last_gear: None,
            last_decode: None,
            idle_episode: 0,
        }
    }

    pub fn state(&self) -> &GaugeState {
        &self.state
    }

    pub fn mode(&self) -> GaugeMode {
        self.state.mode
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn idle_episode(&self) -> u64 {
        self.idle_episode
    }

    /// Gear whose glyph is currently displayed.
    pub fn last_gear(&self) -> Option<i32> {
        self.last_gear
    }

    pub fn last_decode(&self) -> Option<Instant> {
        self.last_decode
    }

    /// Adopt a max RPM reported by the game. Zero is ignored.
    pub fn set_explicit_max_rpm(&mut self, max_rpm: u32) {
        if max_rpm > 0 && max_rpm != self.state.max_rpm {
            debug!(max_rpm, "Max RPM set from telemetry");
            self.state.max_rpm = max_rpm;
        }
    }

    /// Apply one successfully decoded packet.
    pub fn apply_telemetry<R: GaugeRenderer>(
        &mut self,
        telemetry: &Telemetry,
        labels: &GearLabelMap,
        policy: MaxRpmPolicy,
        now: Instant,
        renderer: &mut R,
    ) -> Option<ModeChange> {
        self.last_decode = Some(now);
        let from = self.state.mode;

        match policy {
            MaxRpmPolicy::Adaptive => {
                if telemetry.rpm > self.state.max_rpm {
                    self.state.max_rpm = telemetry.rpm;
                }
            }
            MaxRpmPolicy::Explicit => {
                if let Some(max_rpm) = telemetry.max_rpm {
                    self.set_explicit_max_rpm(max_rpm);
                }
            }
        }

        let level = normalized_level(telemetry.rpm, self.state.max_rpm);
        self.state.level = level;

        if level >= self.config.led_redline_flash_above {
            if from != GaugeMode::Redline {
                self.state.flash_phase = 0;
            }
            self.state.mode = GaugeMode::Redline;
        } else {
            if from == GaugeMode::Redline {
                self.state.flash_phase = 0;
            }
            self.state.mode = GaugeMode::Active;
            self.render_level(level, renderer);
        }

        if self.last_gear != Some(telemetry.gear) {
            // An unmapped gear leaves the previous glyph, and its gear, on screen.
            if let Some(glyph) = labels.glyph(telemetry.gear) {
                renderer.render_glyph(glyph);
                self.state.current_gear_glyph = Some(glyph.clone());
                self.last_gear = Some(telemetry.gear);
            }
        }

        self.mode_change(from)
    }

    /// Enter idle if telemetry has been silent for at least the idle timeout.
    ///
    /// Fires once per silence episode: while already idle it does nothing.
    pub fn check_silence<R: GaugeRenderer>(
        &mut self,
        now: Instant,
        renderer: &mut R,
    ) -> Option<IdleEntry> {
        if self.state.mode == GaugeMode::Idle {
            return None;
        }

        let last = self.last_decode?;
        if now.saturating_duration_since(last) < self.config.idle_timeout() {
            return None;
        }

        info!(
            timeout_s = self.config.idle_timeout_seconds,
            "No telemetry received, entering idle mode"
        );
        Some(self.enter_idle(renderer))
    }

    /// Reset to idle defaults and blank the outputs.
    pub fn enter_idle<R: GaugeRenderer>(&mut self, renderer: &mut R) -> IdleEntry {
        let from = self.state.mode;
        let episode = self.idle_episode + 1;

        self.state = GaugeState::default();
        self.last_gear = None;
        self.last_decode = None;
        self.idle_episode = episode;

        renderer.clear_display();
        let animate = self.config.allow_idle_animations;
        if !animate {
            renderer.clear_ring();
        }

        if from != GaugeMode::Idle {
            info!(from = ?from, episode, "Gauge mode changed to Idle");
        }
        IdleEntry { episode, animate }
    }

    /// One redline flash tick, alternating dark and full-red level bar.
    pub fn flash_tick<R: GaugeRenderer>(&mut self, renderer: &mut R) -> FlashFrame {
        if self.state.mode != GaugeMode::Redline {
            self.state.flash_phase = 0;
            return FlashFrame::Inactive;
        }

        let frame = if self.state.flash_phase % 2 == 0 {
            renderer.clear_ring();
            FlashFrame::Off
        } else {
            renderer.set_ring(
                RingFill::Bar { level: self.state.level },
                Rgb::RED,
                self.config.led_ring_brightness,
            );
            FlashFrame::Lit
        };

        self.state.flash_phase += 1;
        if self.state.flash_phase >= FLASH_MAX_CYCLES {
            self.state.flash_phase = 0;
        }
        frame
    }

    /// Draw one idle breathing frame at `intensity` in [0, 1].
    ///
    /// Returns `false` once the gauge has left the idle episode the
    /// animation belongs to; the animation must stop then.
    pub fn idle_step<R: GaugeRenderer>(
        &self,
        episode: u64,
        intensity: f32,
        renderer: &mut R,
    ) -> bool {
        if !self.is_idle_episode(episode) {
            return false;
        }
        renderer.set_ring(
            RingFill::Uniform,
            Rgb::IDLE_CYAN.scaled(intensity),
            self.config.led_ring_brightness * IDLE_BRIGHTNESS_SCALE,
        );
        true
    }

    /// Whether the gauge is idle within `episode`.
    pub fn is_idle_episode(&self, episode: u64) -> bool {
        self.state.mode == GaugeMode::Idle && self.idle_episode == episode
    }

    /// Draw a level bar with its band color, as the start-up sweep does.
    pub fn render_level<R: GaugeRenderer>(&self, level: f32, renderer: &mut R) {
        let level = level.clamp(0.0, 1.0);
        let band = ColorBand::select(
            level,
            self.config.led_green_breakpoint,
            self.config.led_yellow_breakpoint,
        );
        renderer.set_ring(RingFill::Bar { level }, band.color(), self.config.led_ring_brightness);
    }

    fn mode_change(&self, from: GaugeMode) -> Option<ModeChange> {
        let to = self.state.mode;
        if from == to {
            return None;
        }
        info!(from = ?from, to = ?to, level = self.state.level, "Gauge mode changed");
        Some(ModeChange { from, to })
    }
}
