//! Sharded file-backed patient and visit storage.
//!
//! Records live under `<patient_data_dir>/patients/<s1>/<s2>/<uuid>/`:
//! `patient.yaml` holds the demographics resource and an optional sibling
//! `visit.yaml` holds the patient's current visit. The two shard levels are
//! the first four hex characters of the patient UUID.
//!
//! Read paths degrade rather than interrupt: an unreadable or malformed
//! visit file answers the current-visit query with `None` (logged as a
//! warning), and listing skips entries it cannot parse. The banner must
//! render even when visit status is unknown.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use banner_uuid::PatientUuid;
use fhir::{Patient, PatientData, Visit, VisitRecord};

use crate::presence::VisitQuery;
use crate::{BannerError, BannerResult, CoreConfig};

const PATIENT_FILE: &str = "patient.yaml";
const VISIT_FILE: &str = "visit.yaml";

/// File-backed patient/visit store.
#[derive(Clone)]
pub struct PatientStore {
    cfg: Arc<CoreConfig>,
}

impl PatientStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn patient_dir(&self, patient: &PatientUuid) -> PathBuf {
        patient.sharded_dir(&self.cfg.patients_dir())
    }

    /// Write `patient.yaml` for this patient, creating the sharded directory
    /// as needed.
    pub fn save_patient(&self, patient: &PatientData) -> BannerResult<()> {
        let dir = self.patient_dir(&patient.id);
        fs::create_dir_all(&dir).map_err(BannerError::StorageDirCreation)?;
        let yaml = Patient::render(patient)?;
        fs::write(dir.join(PATIENT_FILE), yaml).map_err(BannerError::FileWrite)
    }

    /// Load the demographics resource for this patient.
    pub fn load_patient(&self, patient: &PatientUuid) -> BannerResult<PatientData> {
        let path = self.patient_dir(patient).join(PATIENT_FILE);
        let yaml = fs::read_to_string(&path).map_err(BannerError::FileRead)?;
        Ok(Patient::parse(&yaml)?)
    }

    /// Write `visit.yaml` for this patient.
    pub fn save_visit(&self, patient: &PatientUuid, visit: &VisitRecord) -> BannerResult<()> {
        let dir = self.patient_dir(patient);
        fs::create_dir_all(&dir).map_err(BannerError::StorageDirCreation)?;
        let yaml = Visit::render(visit)?;
        fs::write(dir.join(VISIT_FILE), yaml).map_err(BannerError::FileWrite)
    }

    /// Remove the visit file for this patient, if present.
    pub fn clear_visit(&self, patient: &PatientUuid) -> BannerResult<()> {
        let path = self.patient_dir(patient).join(VISIT_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BannerError::FileWrite(e)),
        }
    }

    /// The patient's current visit: the stored visit while it is still open.
    ///
    /// A missing file means no visit; a malformed file or a closed visit
    /// also answers `None`.
    pub fn current_visit_record(&self, patient: &PatientUuid) -> Option<VisitRecord> {
        let path = self.patient_dir(patient).join(VISIT_FILE);
        let yaml = fs::read_to_string(&path).ok()?;
        match Visit::parse(&yaml) {
            Ok(visit) if visit.is_active() => Some(visit),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("failed to parse visit {}: {e}", path.display());
                None
            }
        }
    }

    /// All patient records, in shard-walk order.
    ///
    /// Entries that cannot be read or parsed are logged as warnings and
    /// skipped.
    pub fn list_patients(&self) -> Vec<PatientData> {
        let mut patients = Vec::new();

        let s1_iter = match fs::read_dir(self.cfg.patients_dir()) {
            Ok(it) => it,
            Err(_) => return patients,
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_ent in id_iter.flatten() {
                    let patient_path = id_ent.path().join(PATIENT_FILE);
                    if !patient_path.is_file() {
                        continue;
                    }

                    let Ok(yaml) = fs::read_to_string(&patient_path) else {
                        continue;
                    };
                    match Patient::parse(&yaml) {
                        Ok(patient) => patients.push(patient),
                        Err(e) => {
                            tracing::warn!(
                                "skipping unparseable patient {}: {e}",
                                patient_path.display()
                            );
                        }
                    }
                }
            }
        }

        patients
    }
}

impl VisitQuery for PatientStore {
    fn current_visit(&self, patient: &PatientUuid) -> Option<VisitRecord> {
        self.current_visit_record(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banner_types::NonEmptyText;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn store() -> (TempDir, PatientStore) {
        let dir = TempDir::new().expect("tempdir");
        let cfg = Arc::new(CoreConfig::new(dir.path().to_path_buf()));
        (dir, PatientStore::new(cfg))
    }

    fn sample_patient(id: &str) -> PatientData {
        PatientData {
            id: PatientUuid::parse(id).unwrap(),
            given: vec!["Sarah".to_string()],
            family: Some("Williams".to_string()),
            gender: Some("female".to_string()),
            birth_date: chrono::NaiveDate::from_ymd_opt(1992, 3, 20),
            identifiers: vec![],
            addresses: vec![],
            telecoms: vec![],
        }
    }

    fn open_visit() -> VisitRecord {
        VisitRecord {
            id: "17f512b4f29c49c98ccb18e4d9b56561".to_string(),
            visit_type: NonEmptyText::new("Facility Visit").unwrap(),
            start_datetime: Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap(),
            stop_datetime: None,
        }
    }

    #[test]
    fn round_trips_a_patient_record() {
        let (_dir, store) = store();
        let patient = sample_patient("90a8d1ea318041d9adb070a834d4e0f6");

        store.save_patient(&patient).expect("save");
        let loaded = store.load_patient(&patient.id).expect("load");
        assert_eq!(loaded, patient);
    }

    #[test]
    fn missing_visit_file_means_no_current_visit() {
        let (_dir, store) = store();
        let id = PatientUuid::parse("90a8d1ea318041d9adb070a834d4e0f6").unwrap();
        assert!(store.current_visit_record(&id).is_none());
    }

    #[test]
    fn open_visit_answers_the_query() {
        let (_dir, store) = store();
        let patient = sample_patient("90a8d1ea318041d9adb070a834d4e0f6");
        store.save_patient(&patient).expect("save patient");
        store.save_visit(&patient.id, &open_visit()).expect("save visit");

        let visit = store.current_visit_record(&patient.id).expect("visit");
        assert_eq!(visit.visit_type.as_str(), "Facility Visit");
    }

    #[test]
    fn closed_visit_is_not_current() {
        let (_dir, store) = store();
        let patient = sample_patient("90a8d1ea318041d9adb070a834d4e0f6");
        let mut visit = open_visit();
        visit.stop_datetime = Some(Utc.with_ymd_and_hms(2023, 1, 1, 17, 0, 0).unwrap());
        store.save_visit(&patient.id, &visit).expect("save visit");

        assert!(store.current_visit_record(&patient.id).is_none());
    }

    #[test]
    fn malformed_visit_degrades_to_none() {
        let (_dir, store) = store();
        let id = PatientUuid::parse("90a8d1ea318041d9adb070a834d4e0f6").unwrap();
        let dir = store.patient_dir(&id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(VISIT_FILE), "not: [valid").unwrap();

        assert!(store.current_visit_record(&id).is_none());
    }

    #[test]
    fn clear_visit_is_idempotent() {
        let (_dir, store) = store();
        let patient = sample_patient("90a8d1ea318041d9adb070a834d4e0f6");
        store.save_visit(&patient.id, &open_visit()).expect("save visit");

        store.clear_visit(&patient.id).expect("clear");
        assert!(store.current_visit_record(&patient.id).is_none());
        store.clear_visit(&patient.id).expect("clear again");
    }

    #[test]
    fn list_skips_unparseable_patients() {
        let (_dir, store) = store();
        let good = sample_patient("90a8d1ea318041d9adb070a834d4e0f6");
        store.save_patient(&good).expect("save good");

        let bad_id = PatientUuid::parse("00112233445566778899aabbccddeeff").unwrap();
        let bad_dir = store.patient_dir(&bad_id);
        fs::create_dir_all(&bad_dir).unwrap();
        fs::write(bad_dir.join(PATIENT_FILE), "resourceType: Nope").unwrap();

        let patients = store.list_patients();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].id, good.id);
    }

    #[test]
    fn store_implements_the_visit_query_seam() {
        let (_dir, store) = store();
        let patient = sample_patient("90a8d1ea318041d9adb070a834d4e0f6");
        store.save_visit(&patient.id, &open_visit()).expect("save visit");

        let query: &dyn VisitQuery = &store;
        assert!(query.current_visit(&patient.id).is_some());
    }
}
