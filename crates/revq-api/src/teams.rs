//! Handlers for `/teams` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/teams/{team}/policy` | The configured queue policy |
//! | `GET`  | `/teams/{team}/rotation` | Optional `?without_skipped=true` |
//! | `PUT`  | `/teams/{team}/reviewers/{person_id}/settings` | Body: [`SettingsBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use revq_core::{
  person::Person,
  policy::{PolicyKind, get_reviewer_queue_policy},
  reviewer::ReviewerSettings,
  store::ReviewStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Policy ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyInfo {
  pub team:   String,
  pub policy: PolicyKind,
}

/// `GET /teams/{team}/policy`
pub async fn policy<S>(
  State(store): State<Arc<S>>,
  Path(team): Path<String>,
) -> Result<Json<PolicyInfo>, ApiError>
where
  S: ReviewStore,
{
  let policy = get_reviewer_queue_policy(store.as_ref(), &team)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(PolicyInfo { team, policy: policy.kind() }))
}

// ─── Rotation ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RotationParams {
  /// Leave out reviewers whose next turn will be skipped.
  #[serde(default)]
  pub without_skipped: bool,
}

/// `GET /teams/{team}/rotation[?without_skipped=true]`
pub async fn rotation<S>(
  State(store): State<Arc<S>>,
  Path(team): Path<String>,
  Query(params): Query<RotationParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: ReviewStore,
{
  let policy = get_reviewer_queue_policy(store.as_ref(), &team)
    .await
    .map_err(ApiError::from_store)?;
  let rotation = if params.without_skipped {
    policy.default_reviewer_rotation_list_without_skipped().await
  } else {
    policy.default_reviewer_rotation_list(&[]).await
  }
  .map_err(ApiError::from_store)?;
  Ok(Json(rotation))
}

// ─── Reviewer settings ───────────────────────────────────────────────────────

/// JSON body accepted by `PUT /teams/{team}/reviewers/{person_id}/settings`.
/// Omitted fields take their default values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsBody {
  pub min_interval:                Option<u32>,
  pub filter_re:                   Option<String>,
  pub skip_next:                   u32,
  pub remind_days_before_deadline: Option<u32>,
  pub expertise:                   String,
  pub request_assignment_next:     bool,
}

/// `PUT /teams/{team}/reviewers/{person_id}/settings`
pub async fn put_settings<S>(
  State(store): State<Arc<S>>,
  Path((team, person_id)): Path<(String, Uuid)>,
  Json(body): Json<SettingsBody>,
) -> Result<Json<ReviewerSettings>, ApiError>
where
  S: ReviewStore,
{
  store
    .get_team(team.clone())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("team {team} not found")))?;
  store
    .get_person(person_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {person_id} not found")))?;

  let settings = ReviewerSettings {
    team,
    person_id,
    min_interval: body.min_interval,
    filter_re: body.filter_re.filter(|re| !re.is_empty()),
    skip_next: body.skip_next,
    remind_days_before_deadline: body.remind_days_before_deadline,
    expertise: body.expertise,
    request_assignment_next: body.request_assignment_next,
  };
  settings
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  store
    .save_reviewer_settings(settings.clone())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(settings))
}
