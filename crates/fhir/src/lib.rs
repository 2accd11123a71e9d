//! FHIR-aligned wire/boundary support for the patient banner.
//!
//! This crate provides **wire models** and **format/translation helpers** for
//! the on-disk YAML resources the banner reads:
//! - patient demographics and contact points (`Patient`)
//! - clinical visits (`Visit`)
//!
//! This crate focuses on:
//! - FHIR semantic alignment (without FHIR JSON/REST transport)
//! - serialisation/deserialisation
//! - translation between domain primitives and wire structs
//!
//! It owns no presence or view state; those live in `banner-core`.

pub mod patient;
pub mod visit;

// Re-export facades
pub use patient::Patient;
pub use visit::Visit;

// Re-export public domain-level types
pub use patient::{Address, ContactPoint, PatientData, PatientIdentifier};
pub use visit::VisitRecord;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
