//! Queue bookkeeping after an assignment.
//!
//! [`plan_assignment_update`] is pure: it turns the current rotation and
//! settings into a [`PolicyUpdate`] which the store then commits in one
//! transaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reviewer::ReviewerSettings;

use super::PolicyKind;

/// What should happen to a team's stored "next reviewer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "person_id", rename_all = "snake_case")]
pub enum NextReviewerChange {
  Unchanged,
  Set(Uuid),
  /// Delete the pointer.
  Clear,
}

/// The state changes caused by one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyUpdate {
  pub team:          String,
  /// Settings rows that changed, in person id order.
  pub settings:      Vec<ReviewerSettings>,
  pub next_reviewer: NextReviewerChange,
  /// Whether the assignee was the first eligible reviewer in the rotation.
  pub in_order:      bool,
}

fn settings_entry<'a>(
  settings: &'a mut HashMap<Uuid, ReviewerSettings>,
  team: &str,
  person_id: Uuid,
) -> &'a mut ReviewerSettings {
  settings
    .entry(person_id)
    .or_insert_with(|| ReviewerSettings::new(team, person_id))
}

/// Work out the effect of assigning a review to `assignee`.
///
/// `rotation` is the default rotation list (computed with the assignee never
/// skipped), `settings` the stored rows for any of its members; missing rows
/// are treated as defaults and only reported if they change.
pub fn plan_assignment_update(
  kind: PolicyKind,
  team: &str,
  rotation: &[Uuid],
  mut settings: HashMap<Uuid, ReviewerSettings>,
  assignee: Uuid,
  add_skip: bool,
) -> PolicyUpdate {
  let original = settings.clone();

  settings_entry(&mut settings, team, assignee).request_assignment_next = false;

  let mut in_order = false;
  let mut next_reviewer = NextReviewerChange::Unchanged;

  if let Some(idx) = rotation.iter().position(|id| *id == assignee) {
    let skip_of = |settings: &HashMap<Uuid, ReviewerSettings>, id: &Uuid| {
      settings.get(id).map_or(0, |s| s.skip_next)
    };
    let min_skip = rotation
      .iter()
      .map(|id| skip_of(&settings, id))
      .min()
      .unwrap_or(0);

    // Everyone ahead of the assignee must have been legitimately skipped.
    in_order = rotation[..idx].iter().all(|id| skip_of(&settings, id) > min_skip)
      && skip_of(&settings, &assignee) == min_skip;

    if in_order {
      for id in &rotation[..idx] {
        let s = settings_entry(&mut settings, team, *id);
        s.skip_next = s.skip_next.saturating_sub(1);
      }
    }

    if add_skip {
      settings_entry(&mut settings, team, assignee).skip_next += 1;
    }

    if kind == PolicyKind::RotateAlphabetically {
      next_reviewer = advance_pointer(&mut settings, team, rotation, idx);
    }
  } else if add_skip {
    settings_entry(&mut settings, team, assignee).skip_next += 1;
  }

  let mut changed: Vec<ReviewerSettings> = settings
    .into_values()
    .filter(|s| match original.get(&s.person_id) {
      Some(before) => before != s,
      None => *s != ReviewerSettings::new(team, s.person_id),
    })
    .collect();
  changed.sort_by_key(|s| s.person_id);

  PolicyUpdate {
    team: team.to_string(),
    settings: changed,
    next_reviewer,
    in_order,
  }
}

/// Walk the rotation after position `idx`, consuming one skip from each
/// reviewer passed over, until someone with nothing to skip is found.
fn advance_pointer(
  settings: &mut HashMap<Uuid, ReviewerSettings>,
  team: &str,
  rotation: &[Uuid],
  idx: usize,
) -> NextReviewerChange {
  let n = rotation.len();
  let others: Vec<Uuid> = (1..n).map(|k| rotation[(idx + k) % n]).collect();
  if others.is_empty() {
    return NextReviewerChange::Clear;
  }

  // Terminates: every pass over a non-zero counter decrements it.
  let mut i = 0;
  loop {
    let id = others[i % others.len()];
    let s = settings_entry(settings, team, id);
    if s.skip_next == 0 {
      return NextReviewerChange::Set(id);
    }
    s.skip_next -= 1;
    i += 1;
  }
}
