//! Review teams, their settings and role memberships.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::ReviewType;

/// A group configured to receive document review requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  /// Short identifier, e.g. `secdir`.
  pub acronym: String,
  pub name:    String,
}

/// Per-team review configuration.
///
/// The queue policy is kept as the persisted slug rather than a
/// [`PolicyKind`](crate::policy::PolicyKind) so that an unrecognised value can
/// be stored and reported when the policy is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTeamSettings {
  pub team:                  String,
  pub reviewer_queue_policy: String,
  /// Review types this team accepts requests for.
  #[serde(default)]
  pub review_types:          Vec<ReviewType>,
  /// Result names reviewers on this team may report, e.g. `ready`.
  #[serde(default)]
  pub review_results:        Vec<String>,
  /// Whether the team suggests reviewers automatically.
  #[serde(default)]
  pub autosuggest:           bool,
}

/// The name of a role a person holds in a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
  Reviewer,
  Secretary,
  Chair,
  Ad,
  Member,
  Delegate,
  Editor,
  #[serde(untagged)]
  Other(String),
}

impl RoleName {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Reviewer => "reviewer",
      Self::Secretary => "secretary",
      Self::Chair => "chair",
      Self::Ad => "ad",
      Self::Member => "member",
      Self::Delegate => "delegate",
      Self::Editor => "editor",
      Self::Other(name) => name,
    }
  }

  pub fn from_slug(slug: &str) -> Self {
    match slug {
      "reviewer" => Self::Reviewer,
      "secretary" => Self::Secretary,
      "chair" => Self::Chair,
      "ad" => Self::Ad,
      "member" => Self::Member,
      "delegate" => Self::Delegate,
      "editor" => Self::Editor,
      other => Self::Other(other.to_string()),
    }
  }
}

impl std::fmt::Display for RoleName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A person's role in a group (a review team or a working group).
///
/// Roles are live memberships: when someone leaves, the role is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub group:     String,
  pub person_id: Uuid,
  pub name:      RoleName,
  /// The address used for this role.
  pub email:     String,
}
