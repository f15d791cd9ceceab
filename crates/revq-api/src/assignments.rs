//! Handlers for `/assignments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/assignments/{id}/accept` | |
//! | `POST` | `/assignments/{id}/reject` | Reviewer goes back to the top of the queue |
//! | `POST` | `/assignments/{id}/no-response` | Same as reject |
//! | `POST` | `/assignments/{id}/withdraw` | |
//! | `POST` | `/assignments/{id}/complete` | Body: `{"partial":false,"result":"Ready"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use revq_core::{review::ReviewAssignment, store::ReviewStore, workflow};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

type AssignmentResult = Result<Json<ReviewAssignment>, ApiError>;

/// `POST /assignments/{id}/accept`
pub async fn accept<S: ReviewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> AssignmentResult {
  workflow::accept_assignment(store.as_ref(), id)
    .await
    .map(Json)
    .map_err(ApiError::from_store)
}

/// `POST /assignments/{id}/reject`
pub async fn reject<S: ReviewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> AssignmentResult {
  workflow::reject_assignment(store.as_ref(), id)
    .await
    .map(Json)
    .map_err(ApiError::from_store)
}

/// `POST /assignments/{id}/no-response`
pub async fn no_response<S: ReviewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> AssignmentResult {
  workflow::mark_no_response(store.as_ref(), id)
    .await
    .map(Json)
    .map_err(ApiError::from_store)
}

/// `POST /assignments/{id}/withdraw`
pub async fn withdraw<S: ReviewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> AssignmentResult {
  workflow::withdraw_assignment(store.as_ref(), id)
    .await
    .map(Json)
    .map_err(ApiError::from_store)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompleteBody {
  pub partial: bool,
  pub result:  Option<String>,
}

/// `POST /assignments/{id}/complete`
pub async fn complete<S: ReviewStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CompleteBody>,
) -> AssignmentResult {
  workflow::complete_assignment(store.as_ref(), id, body.partial, body.result)
    .await
    .map(Json)
    .map_err(ApiError::from_store)
}
