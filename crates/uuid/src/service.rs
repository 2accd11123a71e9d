//! Internal implementation of the canonical patient identifier.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical patient identifier (32 lowercase hex characters, no hyphens).
///
/// This wrapper type guarantees that once constructed, the contained UUID is
/// in canonical form. It keys every per-patient lookup in the banner system
/// and derives the sharded storage path for a patient's files.
///
/// # Construction
/// - [`PatientUuid::new`] generates a fresh canonical identifier.
/// - [`PatientUuid::parse`] validates an externally supplied identifier.
///
/// Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are
/// rejected rather than normalised, so that a given patient has exactly one
/// string representation everywhere in the system.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatientUuid(Uuid);

impl Default for PatientUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientUuid {
    /// Generates a new identifier in canonical form.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not 32 lowercase
    /// hex characters.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if Self::is_canonical(input) {
            // is_canonical guarantees valid hex, so parse_str cannot fail
            let uuid = Uuid::parse_str(input).expect("is_canonical guarantees valid UUID");
            return Ok(Self(uuid));
        }
        Err(UuidError::InvalidInput(format!(
            "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
            input
        )))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic: exactly 32 bytes, lowercase hex only.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<uuid>/` where `s1`/`s2` are the first
    /// two shard levels derived from this identifier.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for PatientUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display in canonical (simple) form
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for PatientUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientUuid::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PatientUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PatientUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_canonical_uuid() {
        let id = PatientUuid::new();
        let canonical = id.to_string();
        assert_eq!(canonical.len(), 32);
        assert!(PatientUuid::is_canonical(&canonical));
    }

    #[test]
    fn parse_accepts_canonical_form() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let id = PatientUuid::parse(canonical).expect("canonical uuid");
        assert_eq!(id.to_string(), canonical);
    }

    #[test]
    fn parse_rejects_hyphenated_form() {
        let result = PatientUuid::parse("550e8400-e29b-41d4-a716-446655440000");
        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_uppercase_and_bad_lengths() {
        assert!(PatientUuid::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(PatientUuid::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(PatientUuid::parse("550e8400e29b41d4a7164466554400000").is_err());
        assert!(PatientUuid::parse("550e8400e29b41d4a716446655440zzz").is_err());
        assert!(PatientUuid::parse("").is_err());
    }

    #[test]
    fn sharded_dir_uses_two_shard_levels() {
        let id = PatientUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        let sharded = id.sharded_dir(Path::new("/patient_data/patients"));
        assert_eq!(
            sharded,
            PathBuf::from("/patient_data/patients/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn round_trips_through_display_and_parse() {
        let original = PatientUuid::new();
        let parsed = PatientUuid::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip_is_canonical_string() {
        let id = PatientUuid::parse("00112233445566778899aabbccddeeff").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00112233445566778899aabbccddeeff\"");
        let back: PatientUuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
