use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::super::domain::{
    ApplicantId, ApplicantProfile, ApplicationId, ProviderId, Space, SpaceProviderProfile,
};
use super::domain::{ApplicationRecord, ApplicationStatus, ApplicationSubmission, ReviewAction};
use super::repository::{
    ApplicationQuery, ApplicationRepository, ProfileDirectory, RepositoryError, SortField,
    SortOrder,
};
use super::review::ReviewError;
use super::service::{ApplicationService, ApplicationServiceError};

/// Router exposing submission, review and scoring endpoints.
pub fn application_router<R, D>(service: Arc<ApplicationService<R, D>>) -> Router
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<R, D>).get(list_handler::<R, D>),
        )
        .route("/api/v1/applications/board", get(board_handler::<R, D>))
        .route("/api/v1/applications/summary", get(summary_handler::<R, D>))
        .route(
            "/api/v1/applications/:application_id",
            get(detail_handler::<R, D>),
        )
        .route(
            "/api/v1/applications/:application_id/review",
            post(review_handler::<R, D>),
        )
        .route(
            "/api/v1/applications/:application_id/score",
            put(override_handler::<R, D>).delete(clear_override_handler::<R, D>),
        )
        .route("/api/v1/match/score", post(score_handler::<R, D>))
        .with_state(service)
}

/// Query string accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<ApplicationStatus>,
    pub provider_id: Option<String>,
    pub applicant_id: Option<String>,
    pub q: Option<String>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl From<ListParams> for ApplicationQuery {
    fn from(params: ListParams) -> Self {
        Self {
            status: params.status,
            provider_id: params.provider_id.map(ProviderId),
            applicant_id: params.applicant_id.map(ApplicantId),
            company_contains: params.q,
            sort_by: params.sort_by.unwrap_or_default(),
            order: params.order.unwrap_or_default(),
            limit: params.limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardParams {
    pub provider_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreOverrideRequest {
    pub score: u16,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub applicant: ApplicantProfile,
    pub provider: SpaceProviderProfile,
    #[serde(default)]
    pub space: Option<Space>,
}

pub(crate) async fn submit_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    match service.list(&params.into()) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(ApplicationRecord::status_view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn detail_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn review_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let id = ApplicationId(application_id);
    match service.review(&id, request.action, request.note) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn override_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ScoreOverrideRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let id = ApplicationId(application_id);
    match service.override_score(&id, request.score) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn clear_override_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let id = ApplicationId(application_id);
    match service.clear_override(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn board_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    Query(params): Query<BoardParams>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let provider_id = params.provider_id.map(ProviderId);
    match service.board(provider_id.as_ref()) {
        Ok(board) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    Query(params): Query<BoardParams>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    let provider_id = params.provider_id.map(ProviderId);
    match service.summary(provider_id.as_ref()) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_handler<R, D>(
    State(service): State<Arc<ApplicationService<R, D>>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
{
    match service.score_profiles(&request.applicant, &request.provider, request.space.as_ref()) {
        Ok(score) => (StatusCode::OK, axum::Json(score)).into_response(),
        Err(err) => error_response(err),
    }
}

impl ApplicationServiceError {
    /// HTTP status the API reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationServiceError::Repository(RepositoryError::NotFound)
            | ApplicationServiceError::UnknownApplicant(_)
            | ApplicationServiceError::UnknownProvider(_)
            | ApplicationServiceError::UnknownSpace(_) => StatusCode::NOT_FOUND,
            ApplicationServiceError::Repository(RepositoryError::Conflict)
            | ApplicationServiceError::Review(ReviewError::Transition(_)) => StatusCode::CONFLICT,
            ApplicationServiceError::Review(ReviewError::ScoreOutOfRange(_))
            | ApplicationServiceError::SpaceNotOffered { .. }
            | ApplicationServiceError::NoSpacesSelected => StatusCode::UNPROCESSABLE_ENTITY,
            ApplicationServiceError::Repository(RepositoryError::Unavailable(_))
            | ApplicationServiceError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_response(err: ApplicationServiceError) -> Response {
    let payload = json!({
        "error": err.to_string(),
    });
    (err.status_code(), axum::Json(payload)).into_response()
}
