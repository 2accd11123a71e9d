//! FHIR-aligned patient wire models and translation helpers.
//!
//! Responsibilities:
//! - Define the public domain-level [`PatientData`] type the banner renders from
//! - Define a strict wire model for serialisation/deserialisation
//! - Provide translation helpers between domain primitives and the wire model
//! - Validate patient structure and enforce required fields
//!
//! The wire format supports multiple names; the flat domain structure extracts
//! the first (primary) name, which is the one the banner displays. Identifier,
//! address and telecom lists are carried whole because the contact-details
//! panel shows all of them.

use crate::{FhirError, FhirResult};
use banner_uuid::PatientUuid;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for patient demographics (flat structure).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientData {
    /// Unique identifier for this patient record.
    pub id: PatientUuid,

    /// Given names (first name, middle names) from the primary name entry.
    pub given: Vec<String>,

    /// Family name (surname) from the primary name entry.
    pub family: Option<String>,

    /// Administrative gender code (e.g. "male", "female", "other").
    pub gender: Option<String>,

    /// Patient's date of birth.
    pub birth_date: Option<NaiveDate>,

    /// Business identifiers shown in the banner (medical record numbers etc).
    pub identifiers: Vec<PatientIdentifier>,

    /// Postal addresses shown in the contact-details panel.
    pub addresses: Vec<Address>,

    /// Telecom contact points shown in the contact-details panel.
    pub telecoms: Vec<ContactPoint>,
}

/// A business identifier with a display value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientIdentifier {
    /// Display value, e.g. "100GEJ".
    pub value: String,
    /// Optional identifier-type label, e.g. "OpenMRS ID".
    pub id_type: Option<String>,
}

/// A postal address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Address {
    pub lines: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    /// Preferred address, listed first in the contact panel.
    pub preferred: bool,
}

/// A telecom contact point (phone, email, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactPoint {
    /// Contact system, e.g. "phone" or "email".
    pub system: Option<String>,
    pub value: String,
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// Zero-sized type used for namespacing; all methods are associated functions.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from YAML text.
    ///
    /// Uses `serde_path_to_error` to surface a best-effort "path" (e.g.
    /// `name.0.family`) to the failing field when the YAML does not match the
    /// wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the YAML does not represent a valid patient resource,
    /// - any field has an unexpected type or any unknown keys are present,
    /// - resourceType is not "Patient",
    /// - the id is not a canonical UUID or birthDate is not `YYYY-MM-DD`.
    pub fn parse(yaml_text: &str) -> FhirResult<PatientData> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, PatientWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Patient schema mismatch at {path}: {source}"
                )));
            }
        };

        if wire.resource_type != "Patient" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Patient', got '{}'",
                wire.resource_type
            )));
        }

        wire_to_domain(wire)
    }

    /// Render a patient resource as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    pub fn render(data: &PatientData) -> FhirResult<String> {
        let wire = domain_to_wire(data);
        serde_yaml::to_string(&wire)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise patient: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a patient resource for on-disk YAML.
///
/// This is the exact structure that is serialised to/from YAML. All structs
/// use `#[serde(deny_unknown_fields)]` for strict validation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanNameWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<IdentifierWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPointWire>,
}

/// Wire representation of a human name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct HumanNameWire {
    // Name purpose ("official", "nickname", ...). Accepted on the wire but
    // not carried into the flat domain structure.
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct IdentifierWire {
    pub value: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct AddressWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "postalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub preferred: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ContactPointWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub value: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> FhirResult<PatientData> {
    let id = PatientUuid::parse(&wire.id)
        .map_err(|e| FhirError::InvalidUuid(format!("Invalid patient ID: {e}")))?;

    let birth_date = wire
        .birth_date
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                FhirError::Translation(format!("Invalid birthDate '{s}': expected YYYY-MM-DD: {e}"))
            })
        })
        .transpose()?;

    // Flat structure extracts only the primary name entry.
    let primary_name = wire.name.first();

    Ok(PatientData {
        id,
        given: primary_name.map(|n| n.given.clone()).unwrap_or_default(),
        family: primary_name.and_then(|n| n.family.clone()),
        gender: wire.gender,
        birth_date,
        identifiers: wire
            .identifier
            .into_iter()
            .map(|i| PatientIdentifier {
                value: i.value,
                id_type: i.id_type,
            })
            .collect(),
        addresses: wire
            .address
            .into_iter()
            .map(|a| Address {
                lines: a.line,
                city: a.city,
                state: a.state,
                postal_code: a.postal_code,
                country: a.country,
                preferred: a.preferred,
            })
            .collect(),
        telecoms: wire
            .telecom
            .into_iter()
            .map(|t| ContactPoint {
                system: t.system,
                value: t.value,
            })
            .collect(),
    })
}

fn domain_to_wire(data: &PatientData) -> PatientWire {
    let name = if data.family.is_some() || !data.given.is_empty() {
        vec![HumanNameWire {
            use_type: Some("official".to_string()),
            family: data.family.clone(),
            given: data.given.clone(),
        }]
    } else {
        vec![]
    };

    PatientWire {
        resource_type: "Patient".to_string(),
        id: data.id.to_string(),
        name,
        gender: data.gender.clone(),
        birth_date: data.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
        identifier: data
            .identifiers
            .iter()
            .map(|i| IdentifierWire {
                value: i.value.clone(),
                id_type: i.id_type.clone(),
            })
            .collect(),
        address: data
            .addresses
            .iter()
            .map(|a| AddressWire {
                line: a.lines.clone(),
                city: a.city.clone(),
                state: a.state.clone(),
                postal_code: a.postal_code.clone(),
                country: a.country.clone(),
                preferred: a.preferred,
            })
            .collect(),
        telecom: data
            .telecoms
            .iter()
            .map(|t| ContactPointWire {
                system: t.system.clone(),
                value: t.value.clone(),
            })
            .collect(),
    }
}
