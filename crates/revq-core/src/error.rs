//! Error types for `revq-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::review::{ReviewAssignmentState, ReviewRequestState};

#[derive(Debug, Error)]
pub enum Error {
  #[error("review team {0} has no settings")]
  MissingTeamSettings(String),

  #[error("review team {team} has unknown reviewer queue policy: {policy:?}")]
  UnknownPolicy { team: String, policy: String },

  #[error(
    "review request belongs to team {actual}, not to policy team {expected}"
  )]
  WrongTeam { expected: String, actual: String },

  #[error("team not found: {0}")]
  TeamNotFound(String),

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("email not found: {0}")]
  EmailNotFound(String),

  #[error("document not found: {0}")]
  DocumentNotFound(String),

  #[error("review request not found: {0}")]
  RequestNotFound(Uuid),

  #[error("review assignment not found: {0}")]
  AssignmentNotFound(Uuid),

  #[error("invalid assignment transition from {from} to {to}")]
  InvalidTransition {
    from: ReviewAssignmentState,
    to:   ReviewAssignmentState,
  },

  #[error("review request {id} is {state}, expected an open request")]
  RequestNotOpen { id: Uuid, state: ReviewRequestState },

  #[error("{0} is not a closing state for a review request")]
  NotAClosingState(ReviewRequestState),

  #[error("invalid filter regexp {pattern:?}: {source}")]
  InvalidFilter {
    pattern: String,
    #[source]
    source:  regex::Error,
  },

  #[error("unknown {kind} value: {value:?}")]
  UnknownValue { kind: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
