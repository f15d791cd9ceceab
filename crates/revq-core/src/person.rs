//! People and their email addresses.
//!
//! Reviewers are offered and assigned by email address, but every policy
//! decision is made per person.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generational suffixes that are never a last name.
const NAME_SUFFIXES: &[&str] = &["jr", "jr.", "sr", "sr.", "ii", "iii", "iv"];

/// A human participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  /// Full display name, e.g. "Alice B. Liddell".
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

impl Person {
  /// The family name used for alphabetical rotation.
  ///
  /// This is the last whitespace-separated token of the name, skipping
  /// trailing generational suffixes ("Jr.", "III", ...). Falls back to the
  /// whole trimmed name for single-token names.
  pub fn last_name(&self) -> &str {
    let mut tokens: Vec<&str> = self
      .name
      .split(|c: char| c.is_whitespace() || c == ',')
      .filter(|t| !t.is_empty())
      .collect();

    while tokens.len() > 1
      && tokens
        .last()
        .is_some_and(|t| NAME_SUFFIXES.contains(&t.to_lowercase().as_str()))
    {
      tokens.pop();
    }

    tokens.last().copied().unwrap_or(self.name.trim())
  }

  /// Sort key for alphabetical rotation: last name, then full name, then id
  /// so that the order is total.
  pub fn rotation_key(&self) -> (String, String, Uuid) {
    (
      self.last_name().to_lowercase(),
      self.name.to_lowercase(),
      self.person_id,
    )
  }
}

/// An email address belonging to a [`Person`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
  pub address:   String,
  pub person_id: Uuid,
  pub primary:   bool,
  pub active:    bool,
}
