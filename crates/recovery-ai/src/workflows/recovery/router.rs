use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{CaseId, CaseStatus, InteractionKind, PartnerId, PartnerSession};
use super::error::RecoveryError;
use super::lifecycle::CaseIntake;
use super::repository::{CaseRepository, PartnerDirectory, RepositoryError};
use super::service::{RecoveryService, RecoveryServiceError};

type SharedService<C, P> = State<Arc<RecoveryService<C, P>>>;

/// Router builder exposing the case, allocation, and partner endpoints.
pub fn recovery_router<C, P>(service: Arc<RecoveryService<C, P>>) -> Router
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/cases",
            post(ingest_handler::<C, P>).get(list_handler::<C, P>),
        )
        .route("/api/v1/cases/:case_id", get(case_handler::<C, P>))
        .route("/api/v1/cases/:case_id/score", post(score_handler::<C, P>))
        .route(
            "/api/v1/cases/:case_id/allocate",
            post(allocate_handler::<C, P>),
        )
        .route(
            "/api/v1/cases/:case_id/status",
            post(status_handler::<C, P>),
        )
        .route(
            "/api/v1/cases/:case_id/interactions",
            post(interaction_handler::<C, P>),
        )
        .route(
            "/api/v1/allocations/batch",
            post(batch_handler::<C, P>),
        )
        .route("/api/v1/partners", get(partners_handler::<C, P>))
        .route(
            "/api/v1/partners/:partner_id/cases",
            get(partner_cases_handler::<C, P>),
        )
        .route("/api/v1/insights", get(insights_handler::<C, P>))
        .with_state(service)
}

/// Optional body for the allocate endpoint; no partner means automatic allocation.
#[derive(Debug, Default, Deserialize)]
pub struct AllocateRequest {
    #[serde(default)]
    pub partner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: CaseStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub kind: InteractionKind,
    pub notes: String,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchAllocationView {
    pub allocated: usize,
    pub high_value: usize,
    pub standard: usize,
    pub assignments: BTreeMap<CaseId, PartnerId>,
}

pub(crate) fn status_for(error: &RecoveryServiceError) -> StatusCode {
    match error {
        RecoveryServiceError::Recovery(RecoveryError::InvalidInput(_))
        | RecoveryServiceError::Recovery(RecoveryError::InvalidTransition { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RecoveryServiceError::Recovery(RecoveryError::NoPartnersAvailable)
        | RecoveryServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RecoveryServiceError::Recovery(RecoveryError::UnknownPartner(_))
        | RecoveryServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RecoveryServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: RecoveryServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), Json(payload)).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({ "error": rejection.body_text() });
    (rejection.status(), Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, RecoveryServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ingest_handler<C, P>(
    State(service): SharedService<C, P>,
    intake: Result<Json<CaseIntake>, JsonRejection>,
) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    match intake {
        Ok(Json(intake)) => respond(StatusCode::CREATED, service.ingest(intake)),
        Err(rejection) => rejection_response(rejection),
    }
}

pub(crate) async fn list_handler<C, P>(State(service): SharedService<C, P>) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    respond(StatusCode::OK, service.list())
}

pub(crate) async fn case_handler<C, P>(
    State(service): SharedService<C, P>,
    Path(case_id): Path<String>,
) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    respond(StatusCode::OK, service.get(&CaseId(case_id)))
}

pub(crate) async fn score_handler<C, P>(
    State(service): SharedService<C, P>,
    Path(case_id): Path<String>,
) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    respond(StatusCode::OK, service.score(&CaseId(case_id)))
}

pub(crate) async fn allocate_handler<C, P>(
    State(service): SharedService<C, P>,
    Path(case_id): Path<String>,
    body: Bytes,
) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        AllocateRequest::default()
    } else {
        match serde_json::from_slice::<AllocateRequest>(&body) {
            Ok(request) => request,
            Err(err) => {
                let payload = json!({ "error": format!("invalid allocation request: {err}") });
                return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
            }
        }
    };

    let id = CaseId(case_id);
    let result = match request.partner_id {
        Some(partner_id) => service.allocate_manual(&id, PartnerId(partner_id)),
        None => service.allocate_auto(&id),
    };
    respond(StatusCode::OK, result)
}

pub(crate) async fn status_handler<C, P>(
    State(service): SharedService<C, P>,
    Path(case_id): Path<String>,
    request: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    respond(
        StatusCode::OK,
        service.update_status(&CaseId(case_id), request.status, request.note.as_deref()),
    )
}

pub(crate) async fn interaction_handler<C, P>(
    State(service): SharedService<C, P>,
    Path(case_id): Path<String>,
    request: Result<Json<InteractionRequest>, JsonRejection>,
) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    respond(
        StatusCode::OK,
        service.log_interaction(
            &CaseId(case_id),
            request.kind,
            &request.notes,
            request.outcome,
        ),
    )
}

pub(crate) async fn batch_handler<C, P>(State(service): SharedService<C, P>) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    let result = service.allocate_batch().map(|batch| BatchAllocationView {
        allocated: batch.assignments.len(),
        high_value: batch.high_value,
        standard: batch.standard,
        assignments: batch.assignments,
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn partners_handler<C, P>(State(service): SharedService<C, P>) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    respond(StatusCode::OK, service.partners())
}

pub(crate) async fn partner_cases_handler<C, P>(
    State(service): SharedService<C, P>,
    Path(partner_id): Path<String>,
) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    let session = PartnerSession::new(PartnerId(partner_id));
    respond(StatusCode::OK, service.partner_cases(&session))
}

pub(crate) async fn insights_handler<C, P>(State(service): SharedService<C, P>) -> Response
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    respond(StatusCode::OK, service.insights())
}
