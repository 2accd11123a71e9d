use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};

use banner_core::{
    BannerError, BannerView, BannerViewState, CoreConfig, ExtensionSlots, PatientStore,
    render_banner,
};
use banner_uuid::PatientUuid;

/// Application state shared across REST API handlers.
#[derive(Clone)]
struct AppState {
    store: PatientStore,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_patients, patient_banner),
    components(schemas(
        HealthRes,
        ListPatientsRes,
        PatientSummary,
        BannerRes,
        VisitBadgeRes,
        ContactPanelRes,
        AddressRes,
        ContactPointRes
    ))
)]
struct ApiDoc;

/// Main entry point for the banner host.
///
/// Serves banner snapshots over REST. Presence in a snapshot comes from the
/// direct visit query; the reactive broadcast fallback is a mounted-banner
/// concern and lives in `banner-core`.
///
/// # Environment Variables
/// - `BANNER_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "/patient_data")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("banner=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("BANNER_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let data_dir = std::env::var("PATIENT_DATA_DIR").unwrap_or_else(|_| "/patient_data".into());

    tracing::info!("++ Starting banner REST on {}", rest_addr);

    let store = PatientStore::new(Arc::new(CoreConfig::new(data_dir.into())));

    let app = Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients))
        .route("/patients/:uuid/banner", get(patient_banner))
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(AppState { store });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(serde::Serialize, ToSchema)]
struct HealthRes {
    status: String,
}

#[derive(serde::Serialize, ToSchema)]
struct PatientSummary {
    id: String,
    name: String,
}

#[derive(serde::Serialize, ToSchema)]
struct ListPatientsRes {
    patients: Vec<PatientSummary>,
}

#[derive(serde::Serialize, ToSchema)]
struct VisitBadgeRes {
    label: String,
    visit_type: Option<String>,
    started: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
struct AddressRes {
    lines: Vec<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    preferred: bool,
}

#[derive(serde::Serialize, ToSchema)]
struct ContactPointRes {
    system: Option<String>,
    value: String,
}

#[derive(serde::Serialize, ToSchema)]
struct ContactPanelRes {
    patient_id: String,
    addresses: Vec<AddressRes>,
    telecoms: Vec<ContactPointRes>,
}

/// Wire shape of a rendered banner snapshot.
#[derive(serde::Serialize, ToSchema)]
struct BannerRes {
    display_name: String,
    active_visit_badge: Option<VisitBadgeRes>,
    demographics_line: String,
    identifiers_line: String,
    toggle_label: String,
    chevron: String,
    contact_details: Option<ContactPanelRes>,
    photo: Option<String>,
    actions: Vec<String>,
}

impl From<BannerView> for BannerRes {
    fn from(view: BannerView) -> Self {
        BannerRes {
            display_name: view.display_name,
            active_visit_badge: view.active_visit_badge.map(|badge| VisitBadgeRes {
                label: badge.label,
                visit_type: badge.visit_type,
                started: badge.started,
            }),
            demographics_line: view.demographics_line,
            identifiers_line: view.identifiers_line,
            toggle_label: view.toggle_label,
            chevron: match view.chevron {
                banner_core::ChevronDirection::Down => "down".to_string(),
                banner_core::ChevronDirection::Up => "up".to_string(),
            },
            contact_details: view.contact_details.map(|panel| ContactPanelRes {
                patient_id: panel.patient_id,
                addresses: panel
                    .addresses
                    .into_iter()
                    .map(|a| AddressRes {
                        lines: a.lines,
                        city: a.city,
                        state: a.state,
                        postal_code: a.postal_code,
                        country: a.country,
                        preferred: a.preferred,
                    })
                    .collect(),
                telecoms: panel
                    .telecoms
                    .into_iter()
                    .map(|t| ContactPointRes {
                        system: t.system,
                        value: t.value,
                    })
                    .collect(),
            }),
            photo: view.photo,
            actions: view.actions,
        }
    }
}

#[derive(serde::Deserialize)]
struct BannerParams {
    /// Expand the contact-details panel in this snapshot.
    #[serde(default)]
    details: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of patients", body = ListPatientsRes)
    )
)]
/// List all patients in the store.
async fn list_patients(State(state): State<AppState>) -> Json<ListPatientsRes> {
    let patients = state
        .store
        .list_patients()
        .into_iter()
        .map(|patient| {
            let name = patient
                .given
                .iter()
                .cloned()
                .chain(patient.family.clone())
                .collect::<Vec<_>>()
                .join(" ");
            PatientSummary {
                id: patient.id.to_string(),
                name,
            }
        })
        .collect();
    Json(ListPatientsRes { patients })
}

#[utoipa::path(
    get,
    path = "/patients/{uuid}/banner",
    params(
        ("uuid" = String, Path, description = "Patient UUID (32 lowercase hex characters)"),
        ("details" = Option<bool>, Query, description = "Expand the contact-details panel")
    ),
    responses(
        (status = 200, description = "Rendered banner snapshot", body = BannerRes),
        (status = 400, description = "Invalid patient UUID"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Render a banner snapshot for one patient.
async fn patient_banner(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    Query(params): Query<BannerParams>,
) -> Result<Json<BannerRes>, (StatusCode, &'static str)> {
    let patient_uuid = PatientUuid::parse(&uuid)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid patient UUID"))?;

    let patient = state.store.load_patient(&patient_uuid).map_err(|e| match e {
        BannerError::FileRead(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Patient not found")
        }
        other => {
            tracing::error!("Load patient error: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    })?;

    let current_visit = state.store.current_visit_record(&patient_uuid);

    let mut view_state = BannerViewState::new();
    if params.details {
        view_state.toggle_contact_details();
    }

    let view = render_banner(
        &patient,
        current_visit.as_ref(),
        current_visit.is_some(),
        &view_state,
        &ExtensionSlots::new(),
    );

    Ok(Json(view.into()))
}
