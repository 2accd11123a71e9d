//! # Banner Core
//!
//! Core logic for the patient identity banner:
//! - Active-visit presence tracking with a broadcast fallback ([`presence`])
//! - Contact-details visibility state ([`view_state`])
//! - The rendered banner view model and extension slots ([`banner`])
//! - A sharded file-backed patient/visit store ([`store`])
//!
//! **No API concerns**: HTTP servers and CLI surfaces belong in the host
//! binaries; this crate only produces data for them.

pub mod banner;
pub mod config;
pub mod format;
pub mod presence;
pub mod store;
pub mod view_state;

pub use banner::{render_banner, BannerView, ContactPanel, ExtensionSlots, SlotContext, VisitBadge};
pub use config::CoreConfig;
pub use presence::{Subscription, VisitBroadcast, VisitPresenceTracker, VisitQuery};
pub use store::PatientStore;
pub use view_state::{BannerViewState, ChevronDirection};

/// Errors returned by banner storage and rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum BannerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),

    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),

    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),

    #[error(transparent)]
    Fhir(#[from] fhir::FhirError),
}

/// Type alias for Results that can fail with a [`BannerError`].
pub type BannerResult<T> = Result<T, BannerError>;
