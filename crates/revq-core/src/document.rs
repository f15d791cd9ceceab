//! Documents under review and their replacement history.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An Internet-Draft (or RFC) that can be reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  /// Canonical name, e.g. `draft-ietf-foo-bar`.
  pub name:     String,
  pub rev:      String,
  pub title:    String,
  /// Acronym of the group responsible for the document.
  pub group:    Option<String>,
  /// Responsible Area Director.
  pub ad:       Option<Uuid>,
  pub shepherd: Option<Uuid>,
  #[serde(default)]
  pub authors:  Vec<Uuid>,
  /// Other names the document is known by, e.g. `rfc8999`.
  #[serde(default)]
  pub aliases:  Vec<String>,
  pub pages:    Option<u32>,
  /// Names of documents this one replaces.
  #[serde(default)]
  pub replaces: Vec<String>,
}

impl Document {
  /// The canonical name followed by every alias.
  pub fn all_names(&self) -> impl Iterator<Item = &str> {
    std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
  }
}

/// Follow `replaces` links transitively from `doc`.
///
/// `replaces` maps a document name to the names it directly replaces.
/// Returns every ancestor exactly once, excluding `doc` itself; cycles in the
/// history are tolerated.
pub fn complete_replaces_ancestors(
  doc: &str,
  replaces: &HashMap<String, Vec<String>>,
) -> Vec<String> {
  let mut seen: HashSet<&str> = HashSet::from([doc]);
  let mut ancestors = Vec::new();
  let mut frontier = vec![doc];

  while let Some(name) = frontier.pop() {
    for parent in replaces.get(name).into_iter().flatten() {
      if seen.insert(parent.as_str()) {
        ancestors.push(parent.clone());
        frontier.push(parent.as_str());
      }
    }
  }

  ancestors
}
