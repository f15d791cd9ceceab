//! Ranking candidate reviewers for a single review request.
//!
//! Every candidate gets a fixed-length score tuple, compared
//! lexicographically (most significant factor first, higher is better), and
//! a label explaining the factors that fired:
//!
//! | # | Factor | Score |
//! |---|--------|-------|
//! | 0 | rejected this document (or an ancestor) before | −1 if so |
//! | 1 | asked to be assigned next | +1 if so |
//! | 2 | completed a review of this document (or an ancestor) | +1 if so |
//! | 3 | wishes to review the document | +1 if so |
//! | 4 | author, shepherd, group role or AD of the document | −1 if so |
//! | 5 | filter regexp matches a document name | −1 if so |
//! | 6 | days until the minimum interval is satisfied | −days |
//! | 7 | `skip_next` | −skip_next |
//! | 8 | position in the default rotation | −index |

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  document::Document,
  person::{Email, Person},
  review::{AssignmentRecord, ReviewAssignmentState},
  reviewer::{Availability, ReviewWish, ReviewerSettings, UnavailablePeriod},
  team::Role,
};

use super::rotation::latest_assignment_by_person;

/// Number of entries in a [`ScoreTuple`].
pub const SCORE_FACTORS: usize = 9;

/// Per-candidate scores; see the module docs for the meaning of each slot.
pub type ScoreTuple = [i64; SCORE_FACTORS];

/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
  pub email:     String,
  pub person_id: Uuid,
  pub scores:    ScoreTuple,
  pub label:     String,
}

/// An entry for a reviewer selection control: email address and label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentChoice {
  pub email: String,
  pub label: String,
}

impl From<Ranking> for AssignmentChoice {
  fn from(r: Ranking) -> Self { Self { email: r.email, label: r.label } }
}

/// Everything the resolver looks at, already loaded from the store.
#[derive(Debug, Clone)]
pub struct ResolverInput {
  pub doc:         Document,
  /// Documents `doc` transitively replaces.
  pub ancestors:   Vec<String>,
  pub today:       NaiveDate,
  /// The team's default rotation list, in order.
  pub rotation:    Vec<Person>,
  /// Stored settings; reviewers without a row get defaults.
  pub settings:    Vec<ReviewerSettings>,
  /// All of the team's unavailable periods.
  pub periods:     Vec<UnavailablePeriod>,
  /// All of the team's assignments.
  pub history:     Vec<AssignmentRecord>,
  /// Wishes for `doc` by team members.
  pub wishes:      Vec<ReviewWish>,
  /// Roles in the document's group.
  pub group_roles: Vec<Role>,
}

/// Computes the assignment order for one review request.
pub struct AssignmentOrderResolver {
  team:             String,
  doc:              Document,
  today:            NaiveDate,
  rotation:         Vec<Person>,
  rotation_index:   HashMap<Uuid, usize>,
  settings:         HashMap<Uuid, ReviewerSettings>,
  periods:          HashMap<Uuid, Vec<UnavailablePeriod>>,
  history:          Vec<AssignmentRecord>,
  rejected:         HashSet<Uuid>,
  reviewed_before:  HashSet<Uuid>,
  wishes:           HashSet<Uuid>,
  connections:      HashMap<Uuid, String>,
}

impl AssignmentOrderResolver {
  pub fn new(team: impl Into<String>, input: ResolverInput) -> Self {
    let ResolverInput {
      doc,
      ancestors,
      today,
      rotation,
      settings,
      periods,
      history,
      wishes,
      group_roles,
    } = input;

    let rotation_index = rotation
      .iter()
      .enumerate()
      .map(|(i, p)| (p.person_id, i))
      .collect();

    let mut current_periods: HashMap<Uuid, Vec<UnavailablePeriod>> = HashMap::new();
    for p in periods.into_iter().filter(|p| p.covers(today)) {
      current_periods.entry(p.person_id).or_default().push(p);
    }

    let related_docs: HashSet<&str> = std::iter::once(doc.name.as_str())
      .chain(ancestors.iter().map(String::as_str))
      .collect();
    let mut rejected = HashSet::new();
    let mut reviewed_before = HashSet::new();
    for record in history.iter().filter(|r| related_docs.contains(r.doc.as_str())) {
      match record.assignment.state {
        ReviewAssignmentState::Rejected => {
          rejected.insert(record.assignment.reviewer_person);
        }
        ReviewAssignmentState::Completed => {
          reviewed_before.insert(record.assignment.reviewer_person);
        }
        _ => {}
      }
    }

    let wishes = wishes
      .into_iter()
      .filter(|w| w.doc == doc.name)
      .map(|w| w.person_id)
      .collect();

    let connections = connections_with_doc(&doc, &group_roles);

    Self {
      team: team.into(),
      settings: settings.into_iter().map(|s| (s.person_id, s)).collect(),
      doc,
      today,
      rotation,
      rotation_index,
      periods: current_periods,
      history,
      rejected,
      reviewed_before,
      wishes,
      connections,
    }
  }

  /// Rank `candidates`, best first.
  ///
  /// Candidates outside the rotation, and candidates currently unavailable
  /// (unless only `canfinish` and they reviewed the document before), are
  /// left out.
  pub fn determine_ranking(&self, candidates: &[Email]) -> Vec<Ranking> {
    let latest = latest_assignment_by_person(&self.history);
    let mut ranking: Vec<Ranking> = candidates
      .iter()
      .filter_map(|email| self.rank_email(email, &latest))
      .collect();
    ranking.sort_by(|a, b| b.scores.cmp(&a.scores));
    ranking
  }

  fn rank_email(
    &self,
    email: &Email,
    latest: &HashMap<Uuid, chrono::DateTime<chrono::Utc>>,
  ) -> Option<Ranking> {
    let person_id = email.person_id;
    let index = *self.rotation_index.get(&person_id)?;
    let person = &self.rotation[index];

    let default_settings;
    let settings = match self.settings.get(&person_id) {
      Some(s) => s,
      None => {
        default_settings = ReviewerSettings::new(self.team.clone(), person_id);
        &default_settings
      }
    };

    let periods = self.periods.get(&person_id).map(Vec::as_slice).unwrap_or(&[]);
    let reviewed_before = self.reviewed_before.contains(&person_id);
    let may_finish = reviewed_before
      && periods.iter().all(|p| p.availability == Availability::Canfinish);
    if !periods.is_empty() && !may_finish {
      return None;
    }

    let mut scores = Vec::with_capacity(SCORE_FACTORS);
    let mut explanations: Vec<String> = Vec::new();

    if !periods.is_empty() {
      explanations.push(
        periods
          .iter()
          .map(UnavailablePeriod::describe)
          .collect::<Vec<_>>()
          .join(", "),
      );
    }

    let mut add_boolean_score = |direction: i64, fired: bool, explanation: &str| {
      scores.push(if fired { direction } else { -direction });
      if fired && !explanation.is_empty() {
        explanations.push(explanation.to_string());
      }
    };

    add_boolean_score(
      -1,
      self.rejected.contains(&person_id),
      "rejected review of document before",
    );
    add_boolean_score(
      1,
      settings.request_assignment_next,
      "requested to be selected next for assignment",
    );
    add_boolean_score(1, reviewed_before, "reviewed document before");
    add_boolean_score(
      1,
      self.wishes.contains(&person_id),
      "wishes to review document",
    );
    let connection = self.connections.get(&person_id);
    add_boolean_score(
      -1,
      connection.is_some(),
      connection.map(String::as_str).unwrap_or_default(),
    );
    add_boolean_score(
      -1,
      self.filter_matches(settings),
      "filter regexp matches",
    );

    let days_needed = self.days_needed(settings, latest);
    scores.push(-days_needed);
    if days_needed > 0 {
      explanations.push(format!(
        "max frequency exceeded, ready in {days_needed} {}",
        if days_needed == 1 { "day" } else { "days" }
      ));
    }

    scores.push(-i64::from(settings.skip_next));
    if settings.skip_next > 0 {
      explanations.push(format!("skip next {}", settings.skip_next));
    }

    scores.push(-(index as i64));
    explanations.push(format!("#{}", index + 1));

    let stats = self.reviewer_stats(person_id);
    if !stats.is_empty() {
      explanations.push(stats.join(", "));
    }

    let label = format!("{}: {}", person.name, explanations.join("; "));
    let scores: ScoreTuple = scores.try_into().ok()?;

    Some(Ranking {
      email: email.address.clone(),
      person_id,
      scores,
      label,
    })
  }

  fn filter_matches(&self, settings: &ReviewerSettings) -> bool {
    match settings.compiled_filter() {
      Ok(Some(re)) => self.doc.all_names().any(|name| re.is_match(name)),
      Ok(None) => false,
      Err(e) => {
        tracing::warn!(
          team = %self.team,
          person_id = %settings.person_id,
          "ignoring reviewer filter: {e}"
        );
        false
      }
    }
  }

  fn days_needed(
    &self,
    settings: &ReviewerSettings,
    latest: &HashMap<Uuid, chrono::DateTime<chrono::Utc>>,
  ) -> i64 {
    let (Some(min_interval), Some(last)) =
      (settings.min_interval, latest.get(&settings.person_id))
    else {
      return 0;
    };
    let days_since = (self.today - last.date_naive()).num_days().max(0);
    (i64::from(min_interval) - days_since).max(0)
  }

  /// Informational workload figures; they do not affect the score.
  fn reviewer_stats(&self, person_id: Uuid) -> Vec<String> {
    use ReviewAssignmentState::*;

    let mine: Vec<&AssignmentRecord> = self
      .history
      .iter()
      .filter(|r| r.assignment.reviewer_person == person_id)
      .collect();
    let count = |state: ReviewAssignmentState| {
      mine.iter().filter(|r| r.assignment.state == state).count()
    };

    let mut stats = Vec::new();

    let open: Vec<_> = mine.iter().filter(|r| r.assignment.state.is_open()).collect();
    if !open.is_empty() {
      let pages: u32 = open.iter().filter_map(|r| r.doc_pages).sum();
      stats.push(format!("currently {} open, {pages} pages", open.len()));
    }

    let no_response = count(NoResponse);
    if no_response > 0 {
      stats.push(format!("{no_response} no response"));
    }
    let part_completed = count(PartCompleted);
    if part_completed > 0 {
      stats.push(format!("{part_completed} partially complete"));
    }
    let completed = count(Completed);
    if completed > 0 {
      stats.push(format!("{completed} fully completed"));
    }

    stats
  }
}

/// How each person is connected to `doc`, if at all.
///
/// Closer connections are inserted last so they override: author, then
/// shepherd, then a role in the document's group, then the responsible AD.
fn connections_with_doc(doc: &Document, group_roles: &[Role]) -> HashMap<Uuid, String> {
  let mut connections = HashMap::new();
  if let Some(ad) = doc.ad {
    connections.insert(ad, "is associated Area Director".to_string());
  }
  if let Some(group) = &doc.group {
    for role in group_roles.iter().filter(|r| &r.group == group) {
      connections.insert(role.person_id, format!("is group {}", role.name));
    }
  }
  if let Some(shepherd) = doc.shepherd {
    connections.insert(shepherd, "is shepherd of document".to_string());
  }
  for author in &doc.authors {
    connections.insert(*author, "is author of document".to_string());
  }
  connections
}
