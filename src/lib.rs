//! Schema-driven sim-racing telemetry for an RPM shift-light gauge.
//!
//! Shiftlight listens to the UDP telemetry a racing simulator broadcasts,
//! works out which game is sending it, decodes gear and engine RPM from that
//! game's binary layout and drives an LED ring plus a small gear display.
//!
//! # Features
//!
//! - **Blind detection**: packets carry no header, so each schema in the
//!   registry is trialled until one decodes to plausible gear/RPM values
//! - **Declarative layouts**: games are described in YAML (offset, numeric
//!   format, multiplier) and can be reloaded atomically at runtime
//! - **Gauge state machine**: idle, active and redline modes with
//!   color-by-level bands, a flashing redline and an idle breathing animation
//! - **Cooperative runtime**: every task runs on one thread inside a tokio
//!   `LocalSet`; no gauge state is ever locked
//!
//! ## Example
//!
//! ```rust
//! use shiftlight::{
//!     Dashboard, GaugeConfig, GaugeMode, RegistryHandle, SchemaRegistry, TracingRenderer,
//! };
//! use tokio::time::Instant;
//!
//! let registry = SchemaRegistry::from_yaml(r#"
//! dirt_rally:
//!   gear: { offset: 132, format: f, multiplier: 1.0 }
//!   rpm: { offset: 148, format: f, multiplier: 10.0 }
//! "#)?;
//! let mut dashboard = Dashboard::new(
//!     RegistryHandle::new(registry),
//!     GaugeConfig::default(),
//!     TracingRenderer::new(24),
//! );
//!
//! let mut packet = vec![0u8; 264];
//! packet[132..136].copy_from_slice(&1.0f32.to_le_bytes());
//! packet[148..152].copy_from_slice(&350.0f32.to_le_bytes());
//!
//! dashboard.handle_packet(&packet, Instant::now());
//! assert_eq!(dashboard.mode(), GaugeMode::Redline);
//! # Ok::<(), shiftlight::TelemetryError>(())
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Schema-driven decoding
pub mod decoder;
pub mod detector;
pub mod registry;

// Gauge and rendering
pub mod config;
pub mod gauge;
pub mod render;

// Cooperative runtime
pub mod animation;
pub mod dashboard;
pub mod driver;
pub mod provider;
pub mod providers;

// Core exports
pub use error::*;
pub use types::*;

pub use config::{Config, GaugeConfig};
pub use dashboard::{Dashboard, DashboardSnapshot, PacketOutcome, SharedDashboard};
pub use detector::{DetectionState, DetectorConfig, GameDetector};
pub use driver::{Driver, DriverHandle};
pub use gauge::{GaugeMode, GaugeState, GaugeStateMachine};
pub use provider::{MAX_PACKET_SIZE, PacketSource};
pub use providers::{ReplayFrame, ReplaySource, UdpPacketSource};
pub use registry::{RegistryHandle, SchemaRegistry};
pub use render::{GaugeRenderer, PixelRing, TracingRenderer};
