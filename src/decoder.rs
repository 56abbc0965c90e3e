//! Schema-driven telemetry decoding.
//!
//! Decoding is independent of detection policy: given a schema and a packet
//! it either produces [`Telemetry`] or says why the packet is unusable.
//! Scaling is applied before truncation, so a field reported in "tens of RPM"
//! with a multiplier of 10 keeps its full resolution.

use crate::types::{FieldSpec, GameSchema, Telemetry};
use crate::{Result, TelemetryError};

/// Decode gear, RPM and (when the schema declares it) max RPM.
///
/// Fails with [`TelemetryError::TruncatedPacket`] when the packet is shorter
/// than the furthest field the schema references.
pub fn decode(schema: &GameSchema, packet: &[u8]) -> Result<Telemetry> {
    let required = schema.required_len();
    if packet.len() < required {
        return Err(TelemetryError::truncated_packet(required, packet.len()));
    }

    let mut telemetry = decode_drive(schema, packet)?;
    if let Some(field) = &schema.max_rpm {
        telemetry.max_rpm = Some(read_rpm(field, packet, "max_rpm")?);
    }

    Ok(telemetry)
}

/// Decode only gear and RPM, ignoring any max RPM field.
///
/// This is the rule used while trialling schemas during detection.
pub fn decode_drive(schema: &GameSchema, packet: &[u8]) -> Result<Telemetry> {
    let required = schema.drive_len();
    if packet.len() < required {
        return Err(TelemetryError::truncated_packet(required, packet.len()));
    }

    let gear = read_gear(&schema.gear, packet)?;
    let rpm = read_rpm(&schema.rpm, packet, "rpm")?;

    Ok(Telemetry::new(gear, rpm))
}

/// Decode only the max RPM field, if the schema has one.
pub fn decode_max_rpm(schema: &GameSchema, packet: &[u8]) -> Result<Option<u32>> {
    schema.max_rpm.as_ref().map(|field| read_rpm(field, packet, "max_rpm")).transpose()
}

fn read_gear(field: &FieldSpec, packet: &[u8]) -> Result<i32> {
    let value = finite(field.read(packet)?, "gear")?;
    // `as` saturates at the i32 bounds
    Ok(value.trunc() as i32)
}

fn read_rpm(field: &FieldSpec, packet: &[u8], name: &str) -> Result<u32> {
    let value = finite(field.read(packet)?, name)?;
    // negative readings clamp to zero
    Ok(value.trunc().max(0.0) as u32)
}

fn finite(value: f64, field: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TelemetryError::NonFiniteValue { field: field.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PacketBuilder, dirt_rally_schema, explicit_redline_schema};
    use crate::types::FieldFormat;
    use proptest::prelude::*;

    #[test]
    fn dirt_rally_packet_decodes_gear_and_scaled_rpm() {
        let packet = PacketBuilder::new(152).f32_le(132, 1.0).f32_le(148, 350.0).build();
        let telemetry = decode(&dirt_rally_schema(), &packet).unwrap();
        assert_eq!(telemetry, Telemetry::new(1, 3500));
    }

    #[test]
    fn multiplier_applies_before_truncation() {
        let packet = PacketBuilder::new(152).f32_le(132, 2.9).f32_le(148, 123.45).build();
        let telemetry = decode(&dirt_rally_schema(), &packet).unwrap();
        assert_eq!(telemetry.gear, 2);
        assert_eq!(telemetry.rpm, 1234);
    }

    #[test]
    fn reverse_gear_stays_negative() {
        let packet = PacketBuilder::new(152).f32_le(132, -1.0).f32_le(148, 90.0).build();
        assert_eq!(decode(&dirt_rally_schema(), &packet).unwrap().gear, -1);
    }

    #[test]
    fn negative_rpm_clamps_to_zero() {
        let packet = PacketBuilder::new(152).f32_le(132, 1.0).f32_le(148, -50.0).build();
        assert_eq!(decode(&dirt_rally_schema(), &packet).unwrap().rpm, 0);
    }

    #[test]
    fn nan_rpm_is_rejected() {
        let packet = PacketBuilder::new(152).f32_le(132, 1.0).f32_le(148, f32::NAN).build();
        let err = decode(&dirt_rally_schema(), &packet).unwrap_err();
        assert!(matches!(err, TelemetryError::NonFiniteValue { ref field } if field == "rpm"));
    }

    #[test]
    fn explicit_max_rpm_is_decoded() {
        let schema = explicit_redline_schema();
        let packet = PacketBuilder::new(schema.required_len())
            .u8(0, 3)
            .u16_be(2, 6200)
            .u16_be(4, 7500)
            .build();

        let telemetry = decode(&schema, &packet).unwrap();
        assert_eq!(telemetry, Telemetry::new(3, 6200).with_max_rpm(7500));
        assert_eq!(decode_max_rpm(&schema, &packet).unwrap(), Some(7500));
        assert_eq!(decode_drive(&schema, &packet).unwrap().max_rpm, None);
    }

    #[test]
    fn missing_max_rpm_bytes_fail_full_decode_only() {
        let schema = GameSchema::new(
            "short_max",
            FieldSpec::new(0, FieldFormat::U8, 1.0),
            FieldSpec::new(1, FieldFormat::U16Le, 1.0),
        )
        .with_max_rpm(FieldSpec::new(8, FieldFormat::U16Le, 1.0));
        let packet = PacketBuilder::new(3).u8(0, 2).u16_le(1, 4000).build();

        assert!(decode_drive(&schema, &packet).is_ok());
        assert!(matches!(
            decode(&schema, &packet),
            Err(TelemetryError::TruncatedPacket { required: 10, actual: 3 })
        ));
    }

    proptest! {
        #[test]
        fn prop_short_packets_fail_with_truncated(len in 0usize..152) {
            let packet = vec![0u8; len];
            let result = decode(&dirt_rally_schema(), &packet);
            let is_truncated = matches!(result, Err(TelemetryError::TruncatedPacket { .. }));
            prop_assert!(is_truncated);
        }

        #[test]
        fn prop_any_full_length_packet_decodes_or_reports_non_finite(
            data in prop::collection::vec(any::<u8>(), 152..512)
        ) {
            match decode(&dirt_rally_schema(), &data) {
                Ok(_) | Err(TelemetryError::NonFiniteValue { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }
}
