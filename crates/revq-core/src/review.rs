//! Review requests, review assignments and their state machines.
//!
//! A request asks a team to review a document revision. Each attempt to get a
//! particular reviewer to do it is an assignment; a request can collect
//! several over its lifetime (rejections, non-responses, reassignments).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Review type ─────────────────────────────────────────────────────────────

/// The stage of the document lifecycle at which the review happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
  Early,
  Lc,
  Telechat,
}

impl ReviewType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Early => "early",
      Self::Lc => "lc",
      Self::Telechat => "telechat",
    }
  }

  pub fn from_slug(slug: &str) -> Result<Self> {
    match slug {
      "early" => Ok(Self::Early),
      "lc" => Ok(Self::Lc),
      "telechat" => Ok(Self::Telechat),
      other => Err(Error::UnknownValue {
        kind:  "review type",
        value: other.to_string(),
      }),
    }
  }
}

// ─── Request state ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewRequestState {
  Requested,
  Assigned,
  Withdrawn,
  Overtaken,
  NoReviewVersion,
  NoReviewDocument,
}

impl ReviewRequestState {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Requested => "requested",
      Self::Assigned => "assigned",
      Self::Withdrawn => "withdrawn",
      Self::Overtaken => "overtaken",
      Self::NoReviewVersion => "no-review-version",
      Self::NoReviewDocument => "no-review-document",
    }
  }

  pub fn from_slug(slug: &str) -> Result<Self> {
    match slug {
      "requested" => Ok(Self::Requested),
      "assigned" => Ok(Self::Assigned),
      "withdrawn" => Ok(Self::Withdrawn),
      "overtaken" => Ok(Self::Overtaken),
      "no-review-version" => Ok(Self::NoReviewVersion),
      "no-review-document" => Ok(Self::NoReviewDocument),
      other => Err(Error::UnknownValue {
        kind:  "review request state",
        value: other.to_string(),
      }),
    }
  }

  /// Open requests can still be (re)assigned.
  pub fn is_open(self) -> bool { matches!(self, Self::Requested | Self::Assigned) }
}

impl std::fmt::Display for ReviewRequestState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Assignment state ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewAssignmentState {
  Assigned,
  Accepted,
  Rejected,
  Withdrawn,
  Overtaken,
  NoResponse,
  PartCompleted,
  Completed,
  Unknown,
}

impl ReviewAssignmentState {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Assigned => "assigned",
      Self::Accepted => "accepted",
      Self::Rejected => "rejected",
      Self::Withdrawn => "withdrawn",
      Self::Overtaken => "overtaken",
      Self::NoResponse => "no-response",
      Self::PartCompleted => "part-completed",
      Self::Completed => "completed",
      Self::Unknown => "unknown",
    }
  }

  pub fn from_slug(slug: &str) -> Result<Self> {
    match slug {
      "assigned" => Ok(Self::Assigned),
      "accepted" => Ok(Self::Accepted),
      "rejected" => Ok(Self::Rejected),
      "withdrawn" => Ok(Self::Withdrawn),
      "overtaken" => Ok(Self::Overtaken),
      "no-response" => Ok(Self::NoResponse),
      "part-completed" => Ok(Self::PartCompleted),
      "completed" => Ok(Self::Completed),
      "unknown" => Ok(Self::Unknown),
      other => Err(Error::UnknownValue {
        kind:  "review assignment state",
        value: other.to_string(),
      }),
    }
  }

  /// The reviewer still owes work on this assignment.
  pub fn is_open(self) -> bool { matches!(self, Self::Assigned | Self::Accepted) }

  /// States that count as "the reviewer was given this review" for rotation
  /// history and minimum-interval purposes.
  pub fn counts_as_assignment(self) -> bool {
    matches!(self, Self::Assigned | Self::Accepted | Self::Completed)
  }

  pub fn can_transition_to(self, to: Self) -> bool {
    use ReviewAssignmentState::*;
    match self {
      Assigned => matches!(
        to,
        Accepted
          | Rejected
          | Withdrawn
          | NoResponse
          | Overtaken
          | PartCompleted
          | Completed
      ),
      Accepted => matches!(
        to,
        Completed | PartCompleted | NoResponse | Withdrawn | Overtaken
      ),
      Rejected | Withdrawn | Overtaken | NoResponse | PartCompleted
      | Completed | Unknown => false,
    }
  }

  /// Check a transition, returning the target state.
  pub fn transition(self, to: Self) -> Result<Self> {
    if self.can_transition_to(to) {
      Ok(to)
    } else {
      Err(Error::InvalidTransition { from: self, to })
    }
  }
}

impl std::fmt::Display for ReviewAssignmentState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A request for a team to review a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
  pub request_id:    Uuid,
  pub doc:           String,
  pub team:          String,
  pub kind:          ReviewType,
  pub state:         ReviewRequestState,
  pub deadline:      NaiveDate,
  pub requested_rev: Option<String>,
  pub requested_by:  Uuid,
  pub requested_at:  DateTime<Utc>,
  #[serde(default)]
  pub comment:       String,
}

/// Input to [`crate::store::ReviewStore::add_review_request`].
/// The id, state and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReviewRequest {
  pub doc:           String,
  pub team:          String,
  pub kind:          ReviewType,
  pub deadline:      NaiveDate,
  pub requested_rev: Option<String>,
  pub requested_by:  Uuid,
  #[serde(default)]
  pub comment:       String,
}

/// One reviewer's assignment to a [`ReviewRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAssignment {
  pub assignment_id:   Uuid,
  pub request_id:      Uuid,
  /// Email address the assignment was made to.
  pub reviewer:        String,
  pub reviewer_person: Uuid,
  pub state:           ReviewAssignmentState,
  pub assigned_on:     DateTime<Utc>,
  pub completed_on:    Option<DateTime<Utc>>,
  pub result:          Option<String>,
}

/// An assignment joined with the request context the policy engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
  pub assignment: ReviewAssignment,
  pub doc:        String,
  pub doc_pages:  Option<u32>,
}
