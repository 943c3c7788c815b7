//! Submitted applications: review state machine, storage contract, scoring service and
//! the administrator HTTP surface.

pub mod domain;
pub mod repository;
pub mod review;
pub mod router;
pub mod service;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationRecord, ApplicationStatus, ApplicationSubmission, ReviewAction, ReviewEntry,
    TransitionError,
};
pub use repository::{
    ApplicationDetailView, ApplicationQuery, ApplicationRepository, ApplicationStatusView,
    BoardColumn, DirectoryError, ProfileDirectory, RepositoryError, ReviewBoard, SortField,
    SortOrder,
};
pub use review::{ReviewError, MAX_SCORE};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
pub use summary::{
    ApplicationSummary, IndustryCountEntry, ScoreBand, ScoreBandEntry, StatusCountEntry,
};
