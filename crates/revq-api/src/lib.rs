//! JSON REST API for revq.
//!
//! Exposes an axum [`Router`] backed by any [`revq_core::store::ReviewStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", revq_api::api_router(store.clone()))
//! ```

pub mod assignments;
pub mod error;
pub mod requests;
pub mod teams;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use revq_core::store::ReviewStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ReviewStore + 'static,
{
  Router::new()
    // Teams
    .route("/teams/{team}/policy", get(teams::policy::<S>))
    .route("/teams/{team}/rotation", get(teams::rotation::<S>))
    .route(
      "/teams/{team}/reviewers/{person_id}/settings",
      put(teams::put_settings::<S>),
    )
    // Requests
    .route("/requests", post(requests::create::<S>))
    .route("/requests/{id}", get(requests::get_one::<S>))
    .route("/requests/{id}/choices", get(requests::choices::<S>))
    .route("/requests/{id}/assign", post(requests::assign::<S>))
    .route("/requests/{id}/close", post(requests::close::<S>))
    // Assignments
    .route("/assignments/{id}/accept", post(assignments::accept::<S>))
    .route("/assignments/{id}/reject", post(assignments::reject::<S>))
    .route("/assignments/{id}/no-response", post(assignments::no_response::<S>))
    .route("/assignments/{id}/withdraw", post(assignments::withdraw::<S>))
    .route("/assignments/{id}/complete", post(assignments::complete::<S>))
    .with_state(store)
}
