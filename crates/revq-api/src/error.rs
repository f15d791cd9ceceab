//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use revq_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by the domain error behind it, if there is one.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let classified = find_core(&err).and_then(|core| {
      let message = core.to_string();
      match core {
        CoreError::TeamNotFound(_)
        | CoreError::PersonNotFound(_)
        | CoreError::EmailNotFound(_)
        | CoreError::DocumentNotFound(_)
        | CoreError::RequestNotFound(_)
        | CoreError::AssignmentNotFound(_)
        | CoreError::MissingTeamSettings(_) => Some(ApiError::NotFound(message)),
        CoreError::InvalidTransition { .. } | CoreError::RequestNotOpen { .. } => {
          Some(ApiError::Conflict(message))
        }
        CoreError::WrongTeam { .. }
        | CoreError::NotAClosingState(_)
        | CoreError::InvalidFilter { .. }
        | CoreError::UnknownValue { .. } => Some(ApiError::BadRequest(message)),
        // misconfigured team
        CoreError::UnknownPolicy { .. } | CoreError::Serialization(_) => None,
      }
    });
    classified.unwrap_or_else(|| ApiError::Store(Box::new(err)))
  }
}

/// Walk the source chain looking for a [`revq_core::Error`].
fn find_core<'a>(
  err: &'a (dyn std::error::Error + 'static),
) -> Option<&'a CoreError> {
  let mut cur = Some(err);
  while let Some(e) = cur {
    if let Some(core) = e.downcast_ref::<CoreError>() {
      return Some(core);
    }
    cur = e.source();
  }
  None
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[derive(Debug, Error)]
  #[error("backend: {0}")]
  struct Wrapped(#[source] CoreError);

  #[test]
  fn domain_errors_are_found_through_sources() {
    let err = ApiError::from_store(Wrapped(CoreError::RequestNotFound(Uuid::nil())));
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = ApiError::from_store(Wrapped(CoreError::UnknownPolicy {
      team:   "secdir".into(),
      policy: "Random".into(),
    }));
    assert!(matches!(err, ApiError::Store(_)));

    let err = ApiError::from_store(std::io::Error::other("disk full"));
    assert!(matches!(err, ApiError::Store(_)));
  }
}
