//! Reviewer queue policies.
//!
//! A review team picks one of a closed set of policies by storing its slug in
//! [`ReviewTeamSettings`](crate::team::ReviewTeamSettings). The policy decides
//! the default order in which reviewers are offered work, ranks candidates for
//! a concrete request, and keeps the queue state (skip counters, "assign me
//! next" flags, the alphabetical rotation pointer) consistent as assignments
//! are made.
//!
//! The async methods on [`ReviewerQueuePolicy`] only load and store data; the
//! decisions themselves live in the pure [`rotation`], [`ranking`] and
//! [`state`] modules.

pub mod ranking;
pub mod rotation;
pub mod state;

use std::{
  collections::{HashMap, VecDeque},
  str::FromStr,
};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use ranking::{AssignmentChoice, AssignmentOrderResolver, Ranking, ResolverInput};
pub use state::{NextReviewerChange, PolicyUpdate, plan_assignment_update};

use crate::{
  Error,
  document::{Document, complete_replaces_ancestors},
  person::{Email, Person},
  review::ReviewRequest,
  reviewer::ReviewerSettings,
  store::ReviewStore,
  team::RoleName,
};

// ─── Policy kinds ────────────────────────────────────────────────────────────

/// The known reviewer queue policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
  /// Rotate through reviewers sorted by last name.
  RotateAlphabetically,
  /// Offer work to whoever was assigned longest ago.
  LeastRecentlyUsed,
}

impl PolicyKind {
  pub const ALL: [PolicyKind; 2] =
    [PolicyKind::RotateAlphabetically, PolicyKind::LeastRecentlyUsed];

  /// The slug persisted in team settings.
  pub fn as_slug(self) -> &'static str {
    match self {
      Self::RotateAlphabetically => "RotateAlphabetically",
      Self::LeastRecentlyUsed => "LeastRecentlyUsed",
    }
  }
}

impl FromStr for PolicyKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|k| k.as_slug() == s)
      .ok_or_else(|| s.to_string())
  }
}

impl std::fmt::Display for PolicyKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_slug())
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Resolve the queue policy configured for `team`.
///
/// Fails with [`Error::MissingTeamSettings`] if the team has no settings and
/// [`Error::UnknownPolicy`] if the stored slug is not a known policy.
pub async fn get_reviewer_queue_policy<'s, S: ReviewStore>(
  store: &'s S,
  team: &str,
) -> Result<ReviewerQueuePolicy<'s, S>, S::Error> {
  let settings = store
    .get_team_settings(team.to_string())
    .await?
    .ok_or_else(|| Error::MissingTeamSettings(team.to_string()))?;

  let kind = settings
    .reviewer_queue_policy
    .parse::<PolicyKind>()
    .map_err(|policy| Error::UnknownPolicy { team: team.to_string(), policy })?;

  Ok(ReviewerQueuePolicy::new(store, team, kind))
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// A team's queue policy bound to a store.
pub struct ReviewerQueuePolicy<'s, S> {
  store: &'s S,
  team:  String,
  kind:  PolicyKind,
  today: NaiveDate,
}

impl<'s, S: ReviewStore> ReviewerQueuePolicy<'s, S> {
  pub fn new(store: &'s S, team: impl Into<String>, kind: PolicyKind) -> Self {
    Self {
      store,
      team: team.into(),
      kind,
      today: Utc::now().date_naive(),
    }
  }

  /// Evaluate availability and intervals as of `today` instead of the
  /// current date.
  pub fn with_today(mut self, today: NaiveDate) -> Self {
    self.today = today;
    self
  }

  pub fn kind(&self) -> PolicyKind { self.kind }

  pub fn team(&self) -> &str { &self.team }

  pub fn today(&self) -> NaiveDate { self.today }

  fn check_team(&self, request: &ReviewRequest) -> Result<(), Error> {
    if request.team == self.team {
      Ok(())
    } else {
      Err(Error::WrongTeam {
        expected: self.team.clone(),
        actual:   request.team.clone(),
      })
    }
  }

  /// Active reviewers in the policy's default order, minus those fully
  /// unavailable today (unless listed in `dont_skip`).
  pub async fn default_reviewer_rotation_list(
    &self,
    dont_skip: &[Uuid],
  ) -> Result<Vec<Person>, S::Error> {
    let reviewers = self.store.team_reviewers(self.team.clone()).await?;

    let ordered = match self.kind {
      PolicyKind::RotateAlphabetically => {
        let next = match self.store.get_next_reviewer(self.team.clone()).await? {
          None => None,
          Some(id) => match reviewers.iter().find(|p| p.person_id == id) {
            Some(p) => Some(p.clone()),
            None => self.store.get_person(id).await?,
          },
        };
        rotation::rotate_alphabetically(reviewers, next.as_ref())
      }
      PolicyKind::LeastRecentlyUsed => {
        let history = self.store.team_assignment_history(self.team.clone()).await?;
        rotation::least_recently_used(reviewers, &history)
      }
    };

    let periods = self.store.unavailable_periods(self.team.clone()).await?;
    Ok(rotation::drop_unavailable(ordered, &periods, self.today, dont_skip))
  }

  /// The default rotation without reviewers that are due to be skipped.
  pub async fn default_reviewer_rotation_list_without_skipped(
    &self,
  ) -> Result<Vec<Person>, S::Error> {
    let rotation = self.default_reviewer_rotation_list(&[]).await?;
    let settings = self.settings_for(rotation.iter().map(|p| p.person_id)).await?;
    Ok(
      rotation
        .into_iter()
        .filter(|p| settings.get(&p.person_id).is_none_or(|s| s.skip_next == 0))
        .collect(),
    )
  }

  /// Email addresses of the team's current reviewers: the default candidate
  /// pool for [`assignment_choices`](Self::assignment_choices).
  pub async fn team_reviewer_emails(&self) -> Result<Vec<Email>, S::Error> {
    let roles = self.store.list_roles(self.team.clone()).await?;
    let mut emails = Vec::new();
    for role in roles.into_iter().filter(|r| r.name == RoleName::Reviewer) {
      let email = self
        .store
        .get_email(role.email.clone())
        .await?
        .unwrap_or(Email {
          address:   role.email,
          person_id: role.person_id,
          primary:   false,
          active:    true,
        });
      emails.push(email);
    }
    Ok(emails)
  }

  /// Rank `candidates` for `request`, best first, with score tuples.
  pub async fn rank_candidates(
    &self,
    candidates: &[Email],
    request: &ReviewRequest,
  ) -> Result<Vec<Ranking>, S::Error> {
    self.check_team(request)?;

    let doc = self
      .store
      .get_document(request.doc.clone())
      .await?
      .ok_or_else(|| Error::DocumentNotFound(request.doc.clone()))?;
    let ancestors = self.replaces_ancestors(&doc).await?;

    let rotation = self.default_reviewer_rotation_list(&[]).await?;
    let settings = self
      .settings_for(candidates.iter().map(|e| e.person_id))
      .await?
      .into_values()
      .collect();
    let group_roles = match &doc.group {
      Some(group) => self.store.list_roles(group.clone()).await?,
      None => Vec::new(),
    };

    let input = ResolverInput {
      ancestors,
      today: self.today,
      rotation,
      settings,
      periods: self.store.unavailable_periods(self.team.clone()).await?,
      history: self.store.team_assignment_history(self.team.clone()).await?,
      wishes: self
        .store
        .review_wishes(self.team.clone(), doc.name.clone())
        .await?,
      group_roles,
      doc,
    };

    let ranking =
      AssignmentOrderResolver::new(self.team.clone(), input).determine_ranking(candidates);
    tracing::debug!(
      team = %self.team,
      request = %request.request_id,
      candidates = candidates.len(),
      ranked = ranking.len(),
      "ranked reviewer candidates"
    );
    Ok(ranking)
  }

  /// Ranked `(email, label)` choices for a reviewer selection control.
  pub async fn assignment_choices(
    &self,
    candidates: &[Email],
    request: &ReviewRequest,
  ) -> Result<Vec<AssignmentChoice>, S::Error> {
    Ok(
      self
        .rank_candidates(candidates, request)
        .await?
        .into_iter()
        .map(AssignmentChoice::from)
        .collect(),
    )
  }

  /// Work out the queue changes for giving `request` to `assignee`, without
  /// writing them.
  ///
  /// Must run against the queue as it was before the assignment: under
  /// least-recently-used ordering a recorded assignment already moves the
  /// assignee to the back of the rotation.
  pub async fn plan_policy_state_for_assignment(
    &self,
    request: &ReviewRequest,
    assignee: Uuid,
    add_skip: bool,
  ) -> Result<PolicyUpdate, S::Error> {
    self.check_team(request)?;

    let rotation: Vec<Uuid> = self
      .default_reviewer_rotation_list(&[assignee])
      .await?
      .into_iter()
      .map(|p| p.person_id)
      .collect();
    let settings = self
      .settings_for(rotation.iter().copied().chain(std::iter::once(assignee)))
      .await?;

    let update =
      plan_assignment_update(self.kind, &self.team, &rotation, settings, assignee, add_skip);
    tracing::debug!(
      team = %self.team,
      assignee = %assignee,
      in_order = update.in_order,
      add_skip,
      next = ?update.next_reviewer,
      "planned reviewer queue update"
    );
    Ok(update)
  }

  /// Update skip counters, the "assign me next" flag and (for alphabetical
  /// rotation) the next-reviewer pointer after `assignee` got `request`.
  pub async fn update_policy_state_for_assignment(
    &self,
    request: &ReviewRequest,
    assignee: Uuid,
    add_skip: bool,
  ) -> Result<PolicyUpdate, S::Error> {
    let update = self
      .plan_policy_state_for_assignment(request, assignee, add_skip)
      .await?;
    self.store.apply_policy_update(update.clone()).await?;
    Ok(update)
  }

  /// Put a reviewer back at the top of the queue, e.g. after they rejected
  /// an assignment they should not have been rotated past for.
  pub async fn return_reviewer_to_rotation_top(
    &self,
    person_id: Uuid,
  ) -> Result<(), S::Error> {
    match self.kind {
      PolicyKind::RotateAlphabetically => {
        let mut settings = self
          .store
          .reviewer_settings_or_default(self.team.clone(), person_id)
          .await?;
        settings.request_assignment_next = true;
        self.store.save_reviewer_settings(settings).await
      }
      // Position follows from assignment history already.
      PolicyKind::LeastRecentlyUsed => Ok(()),
    }
  }

  /// Stored settings for the given people. People without a row are absent.
  async fn settings_for(
    &self,
    people: impl Iterator<Item = Uuid>,
  ) -> Result<HashMap<Uuid, ReviewerSettings>, S::Error> {
    let mut out = HashMap::new();
    for person_id in people {
      if out.contains_key(&person_id) {
        continue;
      }
      if let Some(s) = self
        .store
        .get_reviewer_settings(self.team.clone(), person_id)
        .await?
      {
        out.insert(person_id, s);
      }
    }
    Ok(out)
  }

  /// Every document `doc` replaces, directly or transitively.
  async fn replaces_ancestors(&self, doc: &Document) -> Result<Vec<String>, S::Error> {
    let mut graph: HashMap<String, Vec<String>> = HashMap::new();
    graph.insert(doc.name.clone(), doc.replaces.clone());

    let mut pending: VecDeque<String> = doc.replaces.iter().cloned().collect();
    while let Some(name) = pending.pop_front() {
      if graph.contains_key(&name) {
        continue;
      }
      let replaces = self
        .store
        .get_document(name.clone())
        .await?
        .map(|d| d.replaces)
        .unwrap_or_default();
      pending.extend(replaces.iter().cloned());
      graph.insert(name, replaces);
    }

    Ok(complete_replaces_ancestors(&doc.name, &graph))
  }
}
