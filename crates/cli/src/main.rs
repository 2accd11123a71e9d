use std::path::PathBuf;
use std::sync::Arc;

use banner_core::{
    render_banner, BannerViewState, CoreConfig, ExtensionSlots, PatientStore, VisitBroadcast,
    VisitPresenceTracker,
};
use banner_types::NonEmptyText;
use banner_uuid::PatientUuid;
use chrono::Utc;
use clap::{Parser, Subcommand};
use fhir::{PatientData, PatientIdentifier, VisitRecord};

#[derive(Parser)]
#[command(name = "banner")]
#[command(about = "Patient banner CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Print a patient's banner
    Show {
        /// Patient UUID (32 lowercase hex characters)
        patient_uuid: String,
        /// Expand the contact-details panel
        #[arg(long)]
        details: bool,
    },
    /// Create a demo patient with an active visit
    SeedDemo,
    /// Walk a presence tracker through the broadcast fallback
    Simulate {
        /// Patient UUID (32 lowercase hex characters)
        patient_uuid: String,
    },
}

fn data_dir() -> PathBuf {
    std::env::var("PATIENT_DATA_DIR")
        .unwrap_or_else(|_| "/patient_data".into())
        .into()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = PatientStore::new(Arc::new(CoreConfig::new(data_dir())));

    match cli.command {
        Some(Commands::List) => {
            let patients = store.list_patients();
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    let name = patient
                        .given
                        .iter()
                        .cloned()
                        .chain(patient.family.clone())
                        .collect::<Vec<_>>()
                        .join(" ");
                    println!("ID: {}, Name: {}", patient.id, name);
                }
            }
        }
        Some(Commands::Show {
            patient_uuid,
            details,
        }) => {
            let patient_uuid = PatientUuid::parse(&patient_uuid)?;
            let patient = store.load_patient(&patient_uuid)?;
            let current_visit = store.current_visit_record(&patient_uuid);

            let mut view_state = BannerViewState::new();
            if details {
                view_state.toggle_contact_details();
            }

            let view = render_banner(
                &patient,
                current_visit.as_ref(),
                current_visit.is_some(),
                &view_state,
                &ExtensionSlots::new(),
            );

            println!("{}", view.display_name);
            if let Some(badge) = &view.active_visit_badge {
                match (&badge.visit_type, &badge.started) {
                    (Some(visit_type), Some(started)) => {
                        println!("[{}] {} (started {})", badge.label, visit_type, started);
                    }
                    _ => println!("[{}]", badge.label),
                }
            }
            println!("{}", view.demographics_line);
            println!("{}", view.identifiers_line);
            if let Some(panel) = &view.contact_details {
                for address in &panel.addresses {
                    let mut parts = address.lines.clone();
                    parts.extend(address.city.clone());
                    parts.extend(address.country.clone());
                    println!("Address: {}", parts.join(", "));
                }
                for telecom in &panel.telecoms {
                    println!(
                        "Contact: {} ({})",
                        telecom.value,
                        telecom.system.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
        Some(Commands::SeedDemo) => {
            let patient = PatientData {
                id: PatientUuid::new(),
                given: vec!["John".to_string()],
                family: Some("Wilson".to_string()),
                gender: Some("male".to_string()),
                birth_date: chrono::NaiveDate::from_ymd_opt(1972, 4, 4),
                identifiers: vec![PatientIdentifier {
                    value: "100GEJ".to_string(),
                    id_type: Some("Medical Record Number".to_string()),
                }],
                addresses: vec![],
                telecoms: vec![],
            };
            let visit = VisitRecord {
                id: uuid::Uuid::new_v4().simple().to_string(),
                visit_type: NonEmptyText::new("Facility Visit")?,
                start_datetime: Utc::now(),
                stop_datetime: None,
            };

            store.save_patient(&patient)?;
            store.save_visit(&patient.id, &visit)?;
            println!("Seeded demo patient with UUID: {}", patient.id);
        }
        Some(Commands::Simulate { patient_uuid }) => {
            let patient_uuid = PatientUuid::parse(&patient_uuid)?;
            let broadcast = VisitBroadcast::new();
            let tracker = VisitPresenceTracker::new(patient_uuid, &store, &broadcast);

            println!("after query: has_active_visit={}", tracker.has_active_visit());
            if tracker.is_subscribed() {
                let visit = VisitRecord {
                    id: uuid::Uuid::new_v4().simple().to_string(),
                    visit_type: NonEmptyText::new("Facility Visit")?,
                    start_datetime: Utc::now(),
                    stop_datetime: None,
                };
                broadcast.publish(Some(&visit));
                println!("after visit-started: has_active_visit={}", tracker.has_active_visit());
                broadcast.publish(None);
                println!("after visit-ended: has_active_visit={}", tracker.has_active_visit());
            } else {
                println!("query was authoritative; no broadcast subscription opened");
            }
        }
        None => {
            println!("Use 'banner --help' for commands");
        }
    }

    Ok(())
}
