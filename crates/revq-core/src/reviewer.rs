//! Per-reviewer state kept by a review team.
//!
//! None of these records is required to exist up front. Settings in
//! particular are resolved lazily: a reviewer without a stored row behaves as
//! if [`ReviewerSettings::new`] had been stored.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Settings ────────────────────────────────────────────────────────────────

/// Mutable per (team, person) reviewer configuration and queue state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerSettings {
  pub team:                        String,
  pub person_id:                   Uuid,
  /// Minimum number of days between two assignments.
  pub min_interval:                Option<u32>,
  /// Documents whose names match this regexp should not go to this reviewer.
  pub filter_re:                   Option<String>,
  /// Number of upcoming in-order assignments that should pass this reviewer.
  pub skip_next:                   u32,
  pub remind_days_before_deadline: Option<u32>,
  #[serde(default)]
  pub expertise:                   String,
  /// The reviewer asked to be picked for the next assignment.
  pub request_assignment_next:     bool,
}

impl ReviewerSettings {
  /// The default settings used when no row is stored.
  pub fn new(team: impl Into<String>, person_id: Uuid) -> Self {
    Self {
      team: team.into(),
      person_id,
      min_interval: None,
      filter_re: None,
      skip_next: 0,
      remind_days_before_deadline: None,
      expertise: String::new(),
      request_assignment_next: false,
    }
  }

  /// Compile the filter regexp, if any.
  pub fn compiled_filter(&self) -> Result<Option<Regex>> {
    match self.filter_re.as_deref().filter(|p| !p.is_empty()) {
      None => Ok(None),
      Some(pattern) => Regex::new(pattern).map(Some).map_err(|source| {
        Error::InvalidFilter { pattern: pattern.to_string(), source }
      }),
    }
  }

  /// Reject settings that could never be applied.
  pub fn validate(&self) -> Result<()> {
    self.compiled_filter().map(|_| ())
  }
}

// ─── Availability ────────────────────────────────────────────────────────────

/// How unavailable a reviewer is during an [`UnavailablePeriod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
  /// May finish reviews of documents they have reviewed before.
  Canfinish,
  /// Takes no reviews at all.
  Unavailable,
}

impl Availability {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Canfinish => "canfinish",
      Self::Unavailable => "unavailable",
    }
  }

  pub fn from_slug(slug: &str) -> Result<Self> {
    match slug {
      "canfinish" => Ok(Self::Canfinish),
      "unavailable" => Ok(Self::Unavailable),
      other => Err(Error::UnknownValue {
        kind:  "availability",
        value: other.to_string(),
      }),
    }
  }

  /// Human-readable description.
  pub fn display(self) -> &'static str {
    match self {
      Self::Canfinish => "Can do follow-ups",
      Self::Unavailable => "Completely unavailable",
    }
  }
}

/// A date range during which a reviewer is (partly) unavailable.
/// Either end may be open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailablePeriod {
  pub period_id:    Uuid,
  pub team:         String,
  pub person_id:    Uuid,
  pub start_date:   Option<NaiveDate>,
  pub end_date:     Option<NaiveDate>,
  pub availability: Availability,
  #[serde(default)]
  pub reason:       String,
}

impl UnavailablePeriod {
  /// Whether `day` falls inside the period (both ends inclusive).
  pub fn covers(&self, day: NaiveDate) -> bool {
    self.start_date.is_none_or(|start| start <= day)
      && self.end_date.is_none_or(|end| day <= end)
  }

  /// Label fragment such as `unavailable until 2024-05-01 (Can do follow-ups)`.
  pub fn describe(&self) -> String {
    let until = match self.end_date {
      Some(end) => format!("unavailable until {}", end.format("%Y-%m-%d")),
      None => "unavailable indefinitely".to_string(),
    };
    format!("{until} ({})", self.availability.display())
  }
}

// ─── Wishes & rotation pointer ───────────────────────────────────────────────

/// A reviewer's wish to review a particular document for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWish {
  pub team:      String,
  pub person_id: Uuid,
  pub doc:       String,
  pub wished_at: DateTime<Utc>,
}
