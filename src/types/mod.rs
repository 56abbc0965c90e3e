//! Core types for telemetry layout description and decoded values.
//!
//! ## Architecture
//!
//! - [`FieldFormat`] is the closed set of numeric encodings a field may use
//! - [`FieldSpec`] locates one value in a packet (offset, format, multiplier)
//! - [`GameSchema`] groups the gear, RPM and optional max-RPM fields of one game
//! - [`Telemetry`] is what a single packet decodes to
//! - [`Rgb`] and [`RingFill`] describe what the LED ring should show
//!
//! All reads are bounds checked; a short packet is an error value, never a panic.
//!
//! ## Usage Example
//!
//! ```rust
//! use shiftlight::types::{FieldFormat, FieldSpec};
//!
//! let mut packet = vec![0u8; 152];
//! packet[148..152].copy_from_slice(&350.0f32.to_le_bytes());
//!
//! let rpm = FieldSpec::new(148, FieldFormat::F32Le, 10.0);
//! assert_eq!(rpm.read(&packet).unwrap(), 3500.0);
//! ```

mod color;
mod field;
mod field_format;
mod gear;
mod schema;
mod telemetry;

pub use color::{RingFill, Rgb};
pub use field::FieldSpec;
pub use field_format::FieldFormat;
pub use gear::{GearLabelMap, GlyphKey, MAX_FORWARD_GEAR, REVERSE_GEAR, is_plausible_gear};
pub use schema::GameSchema;
pub use telemetry::Telemetry;
