//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use std::path::{Path, PathBuf};

/// Name of the patients directory under the data root.
const PATIENTS_DIR_NAME: &str = "patients";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at `patient_data_dir`.
    pub fn new(patient_data_dir: PathBuf) -> Self {
        Self { patient_data_dir }
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    /// Directory holding the sharded per-patient record directories.
    pub fn patients_dir(&self) -> PathBuf {
        self.patient_data_dir.join(PATIENTS_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patients_dir_is_under_the_data_root() {
        let cfg = CoreConfig::new(PathBuf::from("/patient_data"));
        assert_eq!(cfg.patients_dir(), PathBuf::from("/patient_data/patients"));
    }
}
