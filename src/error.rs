//! Error types for telemetry decoding and gauge control.
//!
//! All errors implement `std::error::Error` and carry enough context to tell
//! a bad schema dataset apart from a bad packet.
//!
//! ## Error Categories
//!
//! - **Schema Errors**: the schema dataset is malformed (fatal to that reload only)
//! - **Packet Errors**: a packet is too short or decodes to a non-finite value
//!   (recovered locally as "no match this tick")
//! - **Configuration Errors**: an out-of-range gauge option
//! - **Network / File Errors**: socket or filesystem failures at the edges
//!
//! Nothing in this list is allowed to stop the control loop. "No schema
//! locked yet" and "no datagram ready" are not errors at all; they surface
//! as `None`.
//!
//! ```rust
//! use shiftlight::TelemetryError;
//!
//! let error = TelemetryError::truncated_packet(152, 64);
//! assert!(error.is_packet_error());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Invalid schema for game '{game}': {details}")]
    SchemaFormat { game: String, details: String },

    #[error("Packet truncated: need {required} bytes, got {actual}")]
    TruncatedPacket { required: usize, actual: usize },

    #[error("Field '{field}' decoded to a non-finite value")]
    NonFiniteValue { field: String },

    #[error("Schema '{id}' not found in registry")]
    UnknownSchema { id: String },

    #[error("Invalid configuration value for '{field}': {details}")]
    Config { field: String, details: String },

    #[error("Network error: {reason}")]
    Network {
        reason: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::TruncatedPacket { .. } => true,
            TelemetryError::NonFiniteValue { .. } => true,
            TelemetryError::Network { .. } => true,
            TelemetryError::SchemaFormat { .. } => false,
            TelemetryError::UnknownSchema { .. } => false,
            TelemetryError::Config { .. } => false,
            TelemetryError::Parse { .. } => false,
            TelemetryError::File { .. } => false,
        }
    }

    /// Whether the error describes a single bad packet rather than bad setup.
    pub fn is_packet_error(&self) -> bool {
        matches!(
            self,
            TelemetryError::TruncatedPacket { .. } | TelemetryError::NonFiniteValue { .. }
        )
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::SchemaFormat { .. } => vec![
                "Check every game declares gear and rpm fields",
                "Each field needs offset, format and multiplier",
                "The previously loaded schemas stay active",
            ],
            TelemetryError::TruncatedPacket { .. } => vec![
                "Check the game's UDP telemetry format setting",
                "Verify the schema offsets match the packet layout",
            ],
            TelemetryError::NonFiniteValue { .. } => vec![
                "Verify the field format and endianness in the schema",
                "Check that the offset points at the intended field",
            ],
            TelemetryError::UnknownSchema { .. } => vec![
                "Check the game id spelling",
                "Reload the schema dataset",
            ],
            TelemetryError::Config { .. } => vec![
                "Brightness and breakpoints must be within [0, 1]",
                "The green breakpoint must not exceed the yellow breakpoint",
                "The idle timeout must be positive",
            ],
            TelemetryError::Network { .. } => vec![
                "Check the bind address and port",
                "Ensure no other program is bound to the telemetry port",
                "Verify UDP telemetry is enabled in the game",
            ],
            TelemetryError::Parse { .. } => vec![
                "Check the YAML syntax",
                "Verify source data integrity",
            ],
            TelemetryError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for schema format errors.
    pub fn schema_format(game: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::SchemaFormat { game: game.into(), details: details.into() }
    }

    /// Helper constructor for truncated packets.
    pub fn truncated_packet(required: usize, actual: usize) -> Self {
        TelemetryError::TruncatedPacket { required, actual }
    }

    /// Helper constructor for configuration errors.
    pub fn config(field: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Config { field: field.into(), details: details.into() }
    }

    /// Helper constructor for network errors.
    pub fn network(reason: impl Into<String>, source: std::io::Error) -> Self {
        TelemetryError::Network { reason: reason.into(), source }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for TelemetryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TelemetryError::Parse { context: "YAML".to_string(), details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            game in "[a-z_]{1,16}",
            details in ".*",
            required in 0usize..2048,
            actual in 0usize..2048,
            field in "\\w+"
          ) {
            let schema_msg =
                TelemetryError::schema_format(game.clone(), details.clone()).to_string();
            prop_assert!(schema_msg.contains(&game));
            prop_assert!(schema_msg.contains(&details));

            let truncated_msg = TelemetryError::truncated_packet(required, actual).to_string();
            prop_assert!(truncated_msg.contains(&required.to_string()));
            prop_assert!(truncated_msg.contains(&actual.to_string()));

            let value_msg = TelemetryError::NonFiniteValue { field: field.clone() }.to_string();
            prop_assert!(value_msg.contains(&field));
          }
        }
    }

    #[test]
    fn packet_errors_are_retryable() {
        let truncated = TelemetryError::truncated_packet(152, 10);
        assert!(truncated.is_retryable());
        assert!(truncated.is_packet_error());

        let schema = TelemetryError::schema_format("dirt_rally", "missing rpm");
        assert!(!schema.is_retryable());
        assert!(!schema.is_packet_error());
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TelemetryError>();

        let error = TelemetryError::config("led_ring_brightness", "out of range");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            TelemetryError::schema_format("g", "d"),
            TelemetryError::truncated_packet(4, 0),
            TelemetryError::config("f", "d"),
            TelemetryError::network("bind", std::io::Error::other("in use")),
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn network_error_keeps_source() {
        let error = TelemetryError::network("recv", std::io::Error::other("reset"));
        let source = std::error::Error::source(&error).expect("source");
        assert_eq!(source.to_string(), "reset");
    }

    #[test]
    fn yaml_errors_convert_to_parse() {
        let err = serde_yaml_ng::from_str::<u32>("[not, a, number]").unwrap_err();
        let converted: TelemetryError = err.into();
        assert!(matches!(converted, TelemetryError::Parse { .. }));
    }
}
