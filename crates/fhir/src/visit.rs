//! Visit wire models and translation helpers.
//!
//! A visit is a clinical encounter with a type label and a start timestamp;
//! it is *active* while it has no stop timestamp. The banner's presence
//! tracking and the "Active Visit" badge are driven by this resource.

use crate::{FhirError, FhirResult};
use banner_types::NonEmptyText;
use banner_uuid::PatientUuid;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain-level carrier for a clinical visit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisitRecord {
    /// Unique identifier of the visit (canonical 32-hex form).
    pub id: String,

    /// Visit-type label shown in the active-visit badge, e.g.
    /// "Initial HIV Clinic Visit".
    pub visit_type: NonEmptyText,

    /// When the visit was opened.
    pub start_datetime: DateTime<Utc>,

    /// When the visit was closed. `None` while the visit is open.
    pub stop_datetime: Option<DateTime<Utc>>,
}

impl VisitRecord {
    /// Returns true while the visit has not been closed.
    pub fn is_active(&self) -> bool {
        self.stop_datetime.is_none()
    }
}

/// Visit resource operations.
///
/// Zero-sized type used for namespacing; all methods are associated functions.
pub struct Visit;

impl Visit {
    /// Parse a visit resource from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the YAML does not match the wire schema (unknown keys, wrong types),
    /// - resourceType is not "Visit",
    /// - the id is not canonical or a timestamp cannot be parsed,
    /// - visitType is empty.
    pub fn parse(yaml_text: &str) -> FhirResult<VisitRecord> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, VisitWire>(deserializer) {
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
                    "Visit schema mismatch at {path}: {source}"
                )));
            }
        };

        if wire.resource_type != "Visit" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Visit', got '{}'",
                wire.resource_type
            )));
        }

        if !PatientUuid::is_canonical(&wire.id) {
            return Err(FhirError::InvalidUuid(format!(
                "Invalid visit ID: '{}'",
                wire.id
            )));
        }

        let visit_type = NonEmptyText::new(&wire.visit_type)
            .map_err(|_| FhirError::InvalidInput("visitType cannot be empty".into()))?;

        Ok(VisitRecord {
            id: wire.id,
            visit_type,
            start_datetime: parse_datetime("startDatetime", &wire.start_datetime)?,
            stop_datetime: wire
                .stop_datetime
                .as_deref()
                .map(|s| parse_datetime("stopDatetime", s))
                .transpose()?,
        })
    }

    /// Render a visit resource as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    pub fn render(visit: &VisitRecord) -> FhirResult<String> {
        let wire = VisitWire {
            resource_type: "Visit".to_string(),
            id: visit.id.clone(),
            visit_type: visit.visit_type.as_str().to_string(),
            start_datetime: visit.start_datetime.to_rfc3339(),
            stop_datetime: visit.stop_datetime.map(|dt| dt.to_rfc3339()),
        };
        serde_yaml::to_string(&wire)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise visit: {e}")))
    }
}

/// Wire representation of a visit resource for on-disk YAML.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct VisitWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    #[serde(rename = "visitType")]
    pub visit_type: String,

    #[serde(rename = "startDatetime")]
    pub start_datetime: String,

    #[serde(rename = "stopDatetime", skip_serializing_if = "Option::is_none")]
    pub stop_datetime: Option<String>,
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DDTHH:MM:SS` interpreted
/// as UTC (source systems are inconsistent about the offset suffix).
fn parse_datetime(field: &str, value: &str) -> FhirResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(FhirError::Translation(format!(
        "Invalid {field} '{value}': expected RFC 3339 or YYYY-MM-DDTHH:MM:SS"
    )))
}
