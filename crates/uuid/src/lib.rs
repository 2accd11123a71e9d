//! Patient identifier and sharded-path utilities.
//!
//! Banner data is stored under sharded directories derived from the patient
//! UUID. To keep path derivation deterministic across the codebase, a
//! *canonical* UUID representation is used for storage identifiers:
//! **32 lowercase hexadecimal characters** (no hyphens).
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! Canonical form is *required* for externally supplied identifiers (CLI and
//! API inputs). Use [`PatientUuid::parse`] to validate an input string.
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, data lives under `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`,
//! for example `patient_data/patients/55/0e/550e8400e29b41d4a716446655440000/`.
//! The two shard levels keep directory fan-out bounded as record counts grow.

mod service;

pub use service::{PatientUuid, Uuid};

/// Error type for patient identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for patient identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
