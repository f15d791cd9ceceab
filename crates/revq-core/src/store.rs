//! The `ReviewStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `revq-store-sqlite`).
//! The policy engine, the review workflow and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  document::Document,
  person::{Email, Person},
  policy::PolicyUpdate,
  review::{
    AssignmentRecord, NewReviewRequest, ReviewAssignment, ReviewRequest,
    ReviewRequestState,
  },
  reviewer::{ReviewWish, ReviewerSettings, UnavailablePeriod},
  team::{ReviewTeamSettings, Role, RoleName, Team},
};

/// Abstraction over a review data store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). The error type must
/// absorb [`crate::Error`] so that the policy engine and workflow can report
/// domain failures through the backend's own error.
pub trait ReviewStore: Send + Sync {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Create and persist a new person.
  fn add_person(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Attach an email address to an existing person.
  fn add_email(
    &self,
    email: Email,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_email(
    &self,
    address: String,
  ) -> impl Future<Output = Result<Option<Email>, Self::Error>> + Send + '_;

  // ── Teams & roles ─────────────────────────────────────────────────────

  fn add_team(
    &self,
    team: Team,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_team(
    &self,
    acronym: String,
  ) -> impl Future<Output = Result<Option<Team>, Self::Error>> + Send + '_;

  /// Insert or replace the settings of a team.
  fn put_team_settings(
    &self,
    settings: ReviewTeamSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_team_settings(
    &self,
    team: String,
  ) -> impl Future<Output = Result<Option<ReviewTeamSettings>, Self::Error>>
  + Send
  + '_;

  fn add_role(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a role. Returns `false` if the person did not hold it.
  fn remove_role(
    &self,
    group: String,
    person_id: Uuid,
    name: RoleName,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All current roles in a group.
  fn list_roles(
    &self,
    group: String,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  /// Every person currently holding a reviewer role in `team`, in no
  /// particular order.
  fn team_reviewers(
    &self,
    team: String,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  fn add_document(
    &self,
    doc: Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_document(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  // ── Reviewer state ────────────────────────────────────────────────────

  /// The stored settings row, if any. See
  /// [`reviewer_settings_or_default`](Self::reviewer_settings_or_default).
  fn get_reviewer_settings(
    &self,
    team: String,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Option<ReviewerSettings>, Self::Error>>
  + Send
  + '_;

  /// Insert or replace a settings row.
  fn save_reviewer_settings(
    &self,
    settings: ReviewerSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Settings for a reviewer, falling back to the defaults without storing
  /// them.
  fn reviewer_settings_or_default(
    &self,
    team: String,
    person_id: Uuid,
  ) -> impl Future<Output = Result<ReviewerSettings, Self::Error>> + Send + '_ {
    async move {
      Ok(
        self
          .get_reviewer_settings(team.clone(), person_id)
          .await?
          .unwrap_or_else(|| ReviewerSettings::new(team, person_id)),
      )
    }
  }

  fn add_unavailable_period(
    &self,
    period: UnavailablePeriod,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All unavailable periods recorded for `team`, past and future.
  fn unavailable_periods(
    &self,
    team: String,
  ) -> impl Future<Output = Result<Vec<UnavailablePeriod>, Self::Error>> + Send + '_;

  fn add_review_wish(
    &self,
    wish: ReviewWish,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn review_wishes(
    &self,
    team: String,
    doc: String,
  ) -> impl Future<Output = Result<Vec<ReviewWish>, Self::Error>> + Send + '_;

  /// The person stored as next in the alphabetical rotation of `team`.
  fn get_next_reviewer(
    &self,
    team: String,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + '_;

  /// Write every settings change and the rotation pointer change of `update`
  /// in a single transaction.
  fn apply_policy_update(
    &self,
    update: PolicyUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Requests & assignments ────────────────────────────────────────────

  /// Record a new request in the `requested` state.
  fn add_review_request(
    &self,
    input: NewReviewRequest,
  ) -> impl Future<Output = Result<ReviewRequest, Self::Error>> + Send + '_;

  fn get_review_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ReviewRequest>, Self::Error>> + Send + '_;

  fn set_review_request_state(
    &self,
    id: Uuid,
    state: ReviewRequestState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Record a new `assigned` assignment of `request_id` to `reviewer`.
  /// `assigned_on` is set by the store.
  fn add_review_assignment(
    &self,
    request_id: Uuid,
    reviewer: Email,
  ) -> impl Future<Output = Result<ReviewAssignment, Self::Error>> + Send + '_;

  fn get_review_assignment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ReviewAssignment>, Self::Error>>
  + Send
  + '_;

  /// Persist the state, completion time and result of an assignment.
  fn update_review_assignment(
    &self,
    assignment: ReviewAssignment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn assignments_for_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReviewAssignment>, Self::Error>> + Send + '_;

  /// Every assignment ever made for requests of `team`, with document
  /// context.
  fn team_assignment_history(
    &self,
    team: String,
  ) -> impl Future<Output = Result<Vec<AssignmentRecord>, Self::Error>> + Send + '_;
}
