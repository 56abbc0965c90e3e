//! Numeric encodings a telemetry field can use

use serde::{Deserialize, Serialize};

/// Supported numeric encodings for a telemetry field.
///
/// Deserializes from snake-case names (`f32_le`) as well as the classic
/// struct-format codes used by most published packet layouts (`<f`, `>f`,
/// `f`, `d`, `i`, ...). A bare code without an endianness prefix means
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    /// 8-bit signed integer
    #[serde(alias = "b")]
    I8,
    /// 8-bit unsigned integer
    #[serde(alias = "B")]
    U8,
    /// 16-bit signed integer, little-endian
    #[serde(alias = "h", alias = "<h")]
    I16Le,
    /// 16-bit signed integer, big-endian
    #[serde(alias = ">h")]
    I16Be,
    /// 16-bit unsigned integer, little-endian
    #[serde(alias = "H", alias = "<H")]
    U16Le,
    /// 16-bit unsigned integer, big-endian
    #[serde(alias = ">H")]
    U16Be,
    /// 32-bit signed integer, little-endian
    #[serde(alias = "i", alias = "<i")]
    I32Le,
    /// 32-bit signed integer, big-endian
    #[serde(alias = ">i")]
    I32Be,
    /// 32-bit unsigned integer, little-endian
    #[serde(alias = "I", alias = "<I")]
    U32Le,
    /// 32-bit unsigned integer, big-endian
    #[serde(alias = ">I")]
    U32Be,
    /// 32-bit float, little-endian
    #[serde(alias = "f", alias = "<f")]
    F32Le,
    /// 32-bit float, big-endian
    #[serde(alias = ">f")]
    F32Be,
    /// 64-bit float, little-endian
    #[serde(alias = "d", alias = "<d")]
    F64Le,
    /// 64-bit float, big-endian
    #[serde(alias = ">d")]
    F64Be,
}

impl FieldFormat {
    /// Returns the size in bytes of this encoding.
    pub const fn size(&self) -> usize {
        match self {
            FieldFormat::I8 | FieldFormat::U8 => 1,
            FieldFormat::I16Le | FieldFormat::I16Be | FieldFormat::U16Le | FieldFormat::U16Be => 2,
            FieldFormat::I32Le
            | FieldFormat::I32Be
            | FieldFormat::U32Le
            | FieldFormat::U32Be
            | FieldFormat::F32Le
            | FieldFormat::F32Be => 4,
            FieldFormat::F64Le | FieldFormat::F64Be => 8,
        }
    }

    /// Whether the encoding is a floating point type (and can yield NaN).
    pub const fn is_float(&self) -> bool {
        matches!(
            self,
            FieldFormat::F32Le | FieldFormat::F32Be | FieldFormat::F64Le | FieldFormat::F64Be
        )
    }

    /// Decode `bytes` as this format.
    ///
    /// Returns `None` unless `bytes` is exactly [`size`](Self::size) long.
    pub fn decode(&self, bytes: &[u8]) -> Option<f64> {
        if bytes.len() != self.size() {
            return None;
        }

        let value = match self {
            FieldFormat::I8 => bytes[0] as i8 as f64,
            FieldFormat::U8 => bytes[0] as f64,
            FieldFormat::I16Le => i16::from_le_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::I16Be => i16::from_be_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::U16Le => u16::from_le_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::U16Be => u16::from_be_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::I32Le => i32::from_le_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::I32Be => i32::from_be_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::U32Le => u32::from_le_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::U32Be => u32::from_be_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::F32Le => f32::from_le_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::F32Be => f32::from_be_bytes(bytes.try_into().ok()?) as f64,
            FieldFormat::F64Le => f64::from_le_bytes(bytes.try_into().ok()?),
            FieldFormat::F64Be => f64::from_be_bytes(bytes.try_into().ok()?),
        };

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_codes_deserialize_to_little_endian() {
        let cases = [
            ("f", FieldFormat::F32Le),
            ("<f", FieldFormat::F32Le),
            (">f", FieldFormat::F32Be),
            ("d", FieldFormat::F64Le),
            ("I", FieldFormat::U32Le),
            ("b", FieldFormat::I8),
            ("f32_be", FieldFormat::F32Be),
            ("u16_le", FieldFormat::U16Le),
        ];

        for (code, expected) in cases {
            let parsed: FieldFormat = serde_yaml_ng::from_str(&format!("'{code}'")).unwrap();
            assert_eq!(parsed, expected, "code {code}");
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(serde_yaml_ng::from_str::<FieldFormat>("'q'").is_err());
    }

    #[test]
    fn decode_respects_endianness() {
        let le = 350.0f32.to_le_bytes();
        let be = 350.0f32.to_be_bytes();
        assert_eq!(FieldFormat::F32Le.decode(&le), Some(350.0));
        assert_eq!(FieldFormat::F32Be.decode(&be), Some(350.0));
        assert_eq!(FieldFormat::U16Be.decode(&[0x01, 0x00]), Some(256.0));
        assert_eq!(FieldFormat::I8.decode(&[0xFF]), Some(-1.0));
    }

    #[test]
    fn decode_rejects_wrong_width() {
        assert_eq!(FieldFormat::F32Le.decode(&[0, 0, 0]), None);
        assert_eq!(FieldFormat::U8.decode(&[]), None);
    }
}
