//! Handlers for `/requests` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/requests` | Body: [`NewReviewRequest`]; returns 201 + stored request |
//! | `GET`  | `/requests/{id}` | 404 if not found |
//! | `GET`  | `/requests/{id}/choices` | Team reviewers, best candidate first |
//! | `POST` | `/requests/{id}/assign` | Body: `{"reviewer":"a@example.org","add_skip":false}` |
//! | `POST` | `/requests/{id}/close` | Body: `{"state":"withdrawn"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use revq_core::{
  policy::{AssignmentChoice, get_reviewer_queue_policy},
  review::{NewReviewRequest, ReviewRequest, ReviewRequestState},
  store::ReviewStore,
  workflow,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

async fn load<S: ReviewStore>(store: &S, id: Uuid) -> Result<ReviewRequest, ApiError> {
  store
    .get_review_request(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("review request {id} not found")))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /requests`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewReviewRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  let request = store
    .add_review_request(body)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    request = %request.request_id,
    team = %request.team,
    doc = %request.doc,
    "review requested"
  );
  Ok((StatusCode::CREATED, Json(request)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /requests/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReviewRequest>, ApiError>
where
  S: ReviewStore,
{
  Ok(Json(load(store.as_ref(), id).await?))
}

// ─── Choices ─────────────────────────────────────────────────────────────────

/// `GET /requests/{id}/choices`
pub async fn choices<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentChoice>>, ApiError>
where
  S: ReviewStore,
{
  let request = load(store.as_ref(), id).await?;
  let policy = get_reviewer_queue_policy(store.as_ref(), &request.team)
    .await
    .map_err(ApiError::from_store)?;
  let candidates = policy
    .team_reviewer_emails()
    .await
    .map_err(ApiError::from_store)?;
  let choices = policy
    .assignment_choices(&candidates, &request)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(choices))
}

// ─── Assign ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  /// Email address of the reviewer.
  pub reviewer: String,
  /// Skip the reviewer the next time their turn comes up.
  #[serde(default)]
  pub add_skip: bool,
}

/// `POST /requests/{id}/assign`
pub async fn assign<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore,
{
  let assignment =
    workflow::assign_review_request_to_reviewer(store.as_ref(), id, &body.reviewer, body.add_skip)
      .await
      .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(assignment)))
}

// ─── Close ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CloseBody {
  pub state: ReviewRequestState,
}

/// `POST /requests/{id}/close`
pub async fn close<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CloseBody>,
) -> Result<Json<ReviewRequest>, ApiError>
where
  S: ReviewStore,
{
  let request = workflow::close_review_request(store.as_ref(), id, body.state)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(request))
}
