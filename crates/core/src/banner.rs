//! The rendered banner view model.
//!
//! [`render_banner`] is a pure function of the patient record, the presence
//! signal, the view state and the extension slots. It produces a
//! serialisable [`BannerView`] for the presentation layer; no styling or
//! layout decisions are made here.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use banner_uuid::PatientUuid;
use fhir::{Address, ContactPoint, PatientData, VisitRecord};

use crate::format;
use crate::view_state::{BannerViewState, ChevronDirection};

/// Per-patient context handed opaquely to extension renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotContext {
    pub patient_uuid: PatientUuid,
}

type SlotRenderer = Box<dyn Fn(&SlotContext) -> String>;

/// Delegated rendering slots for the patient photo and contextual actions.
///
/// The banner passes each registered renderer a [`SlotContext`] and includes
/// whatever it returns verbatim; it does not interpret the content.
/// Unregistered slots render nothing.
#[derive(Default)]
pub struct ExtensionSlots {
    photo: Option<SlotRenderer>,
    actions: Vec<SlotRenderer>,
}

impl ExtensionSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the photo renderer, replacing any previous one.
    pub fn set_photo(&mut self, renderer: impl Fn(&SlotContext) -> String + 'static) {
        self.photo = Some(Box::new(renderer));
    }

    /// Append a renderer to the actions slot.
    pub fn add_action(&mut self, renderer: impl Fn(&SlotContext) -> String + 'static) {
        self.actions.push(Box::new(renderer));
    }

    fn render_photo(&self, context: &SlotContext) -> Option<String> {
        self.photo.as_ref().map(|renderer| renderer(context))
    }

    fn render_actions(&self, context: &SlotContext) -> Vec<String> {
        self.actions.iter().map(|renderer| renderer(context)).collect()
    }
}

/// Badge shown while the patient has an active visit.
///
/// `visit_type` and `started` come from the query-sourced visit and are
/// absent when presence was derived from the broadcast alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VisitBadge {
    pub label: String,
    pub visit_type: Option<String>,
    pub started: Option<String>,
}

/// Contact-details panel content, mounted only while expanded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactPanel {
    pub patient_id: String,
    pub addresses: Vec<Address>,
    pub telecoms: Vec<ContactPoint>,
}

/// The complete banner, ready for the presentation layer.
#[derive(Debug, Serialize)]
pub struct BannerView {
    pub display_name: String,
    pub active_visit_badge: Option<VisitBadge>,
    pub demographics_line: String,
    pub identifiers_line: String,
    pub toggle_label: String,
    pub chevron: ChevronDirection,
    pub contact_details: Option<ContactPanel>,
    pub photo: Option<String>,
    pub actions: Vec<String>,
}

/// Render the banner with ages computed against today's date.
pub fn render_banner(
    patient: &PatientData,
    current_visit: Option<&VisitRecord>,
    has_active_visit: bool,
    view_state: &BannerViewState,
    slots: &ExtensionSlots,
) -> BannerView {
    render_banner_at(
        patient,
        current_visit,
        has_active_visit,
        view_state,
        slots,
        Utc::now().date_naive(),
    )
}

/// Render the banner with ages computed against an explicit `today`.
pub fn render_banner_at(
    patient: &PatientData,
    current_visit: Option<&VisitRecord>,
    has_active_visit: bool,
    view_state: &BannerViewState,
    slots: &ExtensionSlots,
    today: NaiveDate,
) -> BannerView {
    let context = SlotContext {
        patient_uuid: patient.id.clone(),
    };

    let active_visit_badge = has_active_visit.then(|| VisitBadge {
        label: "Active Visit".to_string(),
        visit_type: current_visit.map(|v| v.visit_type.to_string()),
        started: current_visit.map(|v| format::format_visit_started(&v.start_datetime)),
    });

    let contact_details = view_state.contact_details_visible().then(|| ContactPanel {
        patient_id: patient.id.to_string(),
        addresses: ordered_addresses(patient),
        telecoms: patient.telecoms.clone(),
    });

    BannerView {
        display_name: display_name(patient),
        active_visit_badge,
        demographics_line: demographics_line(patient, today),
        identifiers_line: identifiers_line(patient),
        toggle_label: view_state.toggle_label().to_string(),
        chevron: view_state.chevron(),
        contact_details,
        photo: slots.render_photo(&context),
        actions: slots.render_actions(&context),
    }
}

/// Given names joined with spaces, then the family name.
///
/// A patient with no name entry degrades to an empty string rather than
/// failing: the banner must render even when the caller contract (at least
/// one name) was broken.
fn display_name(patient: &PatientData) -> String {
    let mut parts: Vec<&str> = patient.given.iter().map(String::as_str).collect();
    if let Some(family) = patient.family.as_deref() {
        parts.push(family);
    }
    parts.join(" ")
}

/// Gender, age and formatted birth date joined with middle dots. Fields the
/// record lacks are simply omitted.
fn demographics_line(patient: &PatientData, today: NaiveDate) -> String {
    let mut parts = Vec::new();
    if let Some(gender) = patient.gender.as_deref() {
        parts.push(format::capitalize(gender));
    }
    if let Some(birth_date) = patient.birth_date {
        parts.push(format::age(birth_date, today));
        parts.push(format::format_birth_date(birth_date));
    }
    parts.join(" \u{b7} ")
}

fn identifiers_line(patient: &PatientData) -> String {
    patient
        .identifiers
        .iter()
        .map(|identifier| identifier.value.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Preferred addresses first, otherwise stored order.
fn ordered_addresses(patient: &PatientData) -> Vec<Address> {
    let mut addresses = patient.addresses.clone();
    addresses.sort_by_key(|address| !address.preferred);
    addresses
}

#[cfg(test)]
mod tests {
    use super::*;
    use banner_types::NonEmptyText;
    use chrono::TimeZone;
    use fhir::PatientIdentifier;

    fn sample_patient() -> PatientData {
        PatientData {
            id: PatientUuid::parse("90a8d1ea318041d9adb070a834d4e0f6").unwrap(),
            given: vec!["Sarah".to_string(), "Jane".to_string()],
            family: Some("Williams".to_string()),
            gender: Some("female".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1992, 3, 20),
            identifiers: vec![
                PatientIdentifier {
                    value: "100GEJ".to_string(),
                    id_type: Some("Medical Record Number".to_string()),
                },
                PatientIdentifier {
                    value: "A-7731".to_string(),
                    id_type: None,
                },
            ],
            addresses: vec![
                Address {
                    lines: vec!["1 Side Street".to_string()],
                    city: Some("Kisumu".to_string()),
                    state: None,
                    postal_code: None,
                    country: Some("KE".to_string()),
                    preferred: false,
                },
                Address {
                    lines: vec!["12 Harbour Street".to_string()],
                    city: Some("Port Elizabeth".to_string()),
                    state: None,
                    postal_code: None,
                    country: Some("ZA".to_string()),
                    preferred: true,
                },
            ],
            telecoms: vec![ContactPoint {
                system: Some("phone".to_string()),
                value: "+27 21 555 0100".to_string(),
            }],
        }
    }

    fn sample_visit() -> VisitRecord {
        VisitRecord {
            id: "17f512b4f29c49c98ccb18e4d9b56561".to_string(),
            visit_type: NonEmptyText::new("Initial HIV Clinic Visit").unwrap(),
            start_datetime: Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap(),
            stop_datetime: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
    }

    #[test]
    fn renders_name_demographics_and_identifiers() {
        let patient = sample_patient();
        let view = render_banner_at(
            &patient,
            None,
            false,
            &BannerViewState::new(),
            &ExtensionSlots::new(),
            today(),
        );

        assert_eq!(view.display_name, "Sarah Jane Williams");
        assert_eq!(
            view.demographics_line,
            "Female \u{b7} 30 yrs \u{b7} 20 - Mar - 1992"
        );
        assert_eq!(view.identifiers_line, "100GEJ, A-7731");
        assert!(view.active_visit_badge.is_none());
        assert!(view.contact_details.is_none());
    }

    #[test]
    fn active_visit_badge_carries_type_and_formatted_start() {
        let patient = sample_patient();
        let visit = sample_visit();
        let view = render_banner_at(
            &patient,
            Some(&visit),
            true,
            &BannerViewState::new(),
            &ExtensionSlots::new(),
            today(),
        );

        let badge = view.active_visit_badge.expect("badge");
        assert_eq!(badge.label, "Active Visit");
        assert_eq!(badge.visit_type.as_deref(), Some("Initial HIV Clinic Visit"));
        assert_eq!(badge.started.as_deref(), Some("01 - Jan - 2023 @ 09:00"));
    }

    #[test]
    fn broadcast_only_presence_renders_badge_without_details() {
        let patient = sample_patient();
        let view = render_banner_at(
            &patient,
            None,
            true,
            &BannerViewState::new(),
            &ExtensionSlots::new(),
            today(),
        );

        let badge = view.active_visit_badge.expect("badge");
        assert!(badge.visit_type.is_none());
        assert!(badge.started.is_none());
    }

    #[test]
    fn toggle_mounts_and_unmounts_the_contact_panel() {
        let patient = sample_patient();
        let slots = ExtensionSlots::new();
        let mut view_state = BannerViewState::new();

        view_state.toggle_contact_details();
        let expanded =
            render_banner_at(&patient, None, false, &view_state, &slots, today());
        let panel = expanded.contact_details.expect("panel");
        assert_eq!(panel.patient_id, patient.id.to_string());
        assert_eq!(panel.addresses[0].city.as_deref(), Some("Port Elizabeth"));
        assert_eq!(panel.telecoms.len(), 1);
        assert_eq!(expanded.toggle_label, "Hide all details");

        view_state.toggle_contact_details();
        let collapsed =
            render_banner_at(&patient, None, false, &view_state, &slots, today());
        assert!(collapsed.contact_details.is_none());
        assert_eq!(collapsed.toggle_label, "Show all details");
    }

    #[test]
    fn slots_receive_the_patient_context_opaquely() {
        let patient = sample_patient();
        let mut slots = ExtensionSlots::new();
        slots.set_photo(|ctx| format!("photo:{}", ctx.patient_uuid));
        slots.add_action(|_| "Start visit".to_string());
        slots.add_action(|_| "Mark deceased".to_string());

        let view = render_banner_at(
            &patient,
            None,
            false,
            &BannerViewState::new(),
            &slots,
            today(),
        );

        assert_eq!(
            view.photo.as_deref(),
            Some("photo:90a8d1ea318041d9adb070a834d4e0f6")
        );
        assert_eq!(view.actions, vec!["Start visit", "Mark deceased"]);
    }

    #[test]
    fn patient_without_names_renders_empty_display_name() {
        let mut patient = sample_patient();
        patient.given.clear();
        patient.family = None;

        let view = render_banner_at(
            &patient,
            None,
            false,
            &BannerViewState::new(),
            &ExtensionSlots::new(),
            today(),
        );

        assert_eq!(view.display_name, "");
    }
}
