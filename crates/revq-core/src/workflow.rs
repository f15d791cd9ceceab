//! The review request / assignment lifecycle.
//!
//! These operations tie the state machines in [`crate::review`] to the queue
//! policy: assigning a reviewer updates the policy state, and a rejection or
//! non-response reopens the request and returns the reviewer to the top of
//! the rotation.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error,
  policy::get_reviewer_queue_policy,
  review::{ReviewAssignment, ReviewAssignmentState, ReviewRequest, ReviewRequestState},
  store::ReviewStore,
};

async fn load_request<S: ReviewStore>(
  store: &S,
  request_id: Uuid,
) -> Result<ReviewRequest, S::Error> {
  Ok(
    store
      .get_review_request(request_id)
      .await?
      .ok_or(Error::RequestNotFound(request_id))?,
  )
}

async fn load_assignment<S: ReviewStore>(
  store: &S,
  assignment_id: Uuid,
) -> Result<ReviewAssignment, S::Error> {
  Ok(
    store
      .get_review_assignment(assignment_id)
      .await?
      .ok_or(Error::AssignmentNotFound(assignment_id))?,
  )
}

/// Move an assignment to `to`, checking the transition first.
async fn transition<S: ReviewStore>(
  store: &S,
  mut assignment: ReviewAssignment,
  to: ReviewAssignmentState,
) -> Result<ReviewAssignment, S::Error> {
  assignment.state = assignment.state.transition(to)?;
  if matches!(
    to,
    ReviewAssignmentState::Completed | ReviewAssignmentState::PartCompleted
  ) {
    assignment.completed_on = Some(Utc::now());
  }
  store.update_review_assignment(assignment.clone()).await?;
  Ok(assignment)
}

/// Put an open request back to `requested` if nobody is working on it.
async fn reopen_if_unassigned<S: ReviewStore>(
  store: &S,
  request_id: Uuid,
) -> Result<(), S::Error> {
  let request = load_request(store, request_id).await?;
  if !request.state.is_open() {
    return Ok(());
  }
  let still_open = store
    .assignments_for_request(request_id)
    .await?
    .iter()
    .any(|a| a.state.is_open());
  if !still_open && request.state != ReviewRequestState::Requested {
    store
      .set_review_request_state(request_id, ReviewRequestState::Requested)
      .await?;
    tracing::debug!(request = %request_id, "review request reopened");
  }
  Ok(())
}

/// Assign `request_id` to the person owning `reviewer_email`.
///
/// Assigning the same address twice while the first assignment is still open
/// returns the existing assignment. Otherwise the request becomes `assigned`,
/// a new assignment is recorded and the team's queue state is updated.
pub async fn assign_review_request_to_reviewer<S: ReviewStore>(
  store: &S,
  request_id: Uuid,
  reviewer_email: &str,
  add_skip: bool,
) -> Result<ReviewAssignment, S::Error> {
  let request = load_request(store, request_id).await?;
  if !request.state.is_open() {
    return Err(Error::RequestNotOpen { id: request_id, state: request.state }.into());
  }

  let email = store
    .get_email(reviewer_email.to_string())
    .await?
    .ok_or_else(|| Error::EmailNotFound(reviewer_email.to_string()))?;

  if let Some(existing) = store
    .assignments_for_request(request_id)
    .await?
    .into_iter()
    .find(|a| a.reviewer == email.address && a.state.is_open())
  {
    return Ok(existing);
  }

  // The queue update is planned against the rotation without this
  // assignment, and before any write.
  let policy = get_reviewer_queue_policy(store, &request.team).await?;
  let person_id = email.person_id;
  let update = policy
    .plan_policy_state_for_assignment(&request, person_id, add_skip)
    .await?;

  if request.state != ReviewRequestState::Assigned {
    store
      .set_review_request_state(request_id, ReviewRequestState::Assigned)
      .await?;
  }
  let assignment = store.add_review_assignment(request_id, email).await?;
  store.apply_policy_update(update).await?;

  tracing::info!(
    request = %request_id,
    team = %request.team,
    doc = %request.doc,
    reviewer = %assignment.reviewer,
    add_skip,
    "assigned review"
  );
  Ok(assignment)
}

pub async fn accept_assignment<S: ReviewStore>(
  store: &S,
  assignment_id: Uuid,
) -> Result<ReviewAssignment, S::Error> {
  let assignment = load_assignment(store, assignment_id).await?;
  transition(store, assignment, ReviewAssignmentState::Accepted).await
}

/// Record a finished (or partially finished) review.
pub async fn complete_assignment<S: ReviewStore>(
  store: &S,
  assignment_id: Uuid,
  partial: bool,
  result: Option<String>,
) -> Result<ReviewAssignment, S::Error> {
  let mut assignment = load_assignment(store, assignment_id).await?;
  assignment.result = result;
  let to = if partial {
    ReviewAssignmentState::PartCompleted
  } else {
    ReviewAssignmentState::Completed
  };
  transition(store, assignment, to).await
}

/// The reviewer declined; reopen the request and put them back on top.
pub async fn reject_assignment<S: ReviewStore>(
  store: &S,
  assignment_id: Uuid,
) -> Result<ReviewAssignment, S::Error> {
  release(store, assignment_id, ReviewAssignmentState::Rejected).await
}

/// The reviewer never answered; same consequences as a rejection.
pub async fn mark_no_response<S: ReviewStore>(
  store: &S,
  assignment_id: Uuid,
) -> Result<ReviewAssignment, S::Error> {
  release(store, assignment_id, ReviewAssignmentState::NoResponse).await
}

async fn release<S: ReviewStore>(
  store: &S,
  assignment_id: Uuid,
  to: ReviewAssignmentState,
) -> Result<ReviewAssignment, S::Error> {
  let assignment = load_assignment(store, assignment_id).await?;
  let request = load_request(store, assignment.request_id).await?;
  let policy = get_reviewer_queue_policy(store, &request.team).await?;

  let assignment = transition(store, assignment, to).await?;
  reopen_if_unassigned(store, request.request_id).await?;
  policy
    .return_reviewer_to_rotation_top(assignment.reviewer_person)
    .await?;

  tracing::info!(
    assignment = %assignment_id,
    team = %request.team,
    reviewer = %assignment.reviewer,
    state = %to,
    "released review assignment"
  );
  Ok(assignment)
}

/// Withdraw an assignment (e.g. by the team secretary); the request reopens
/// but the rotation is left alone.
pub async fn withdraw_assignment<S: ReviewStore>(
  store: &S,
  assignment_id: Uuid,
) -> Result<ReviewAssignment, S::Error> {
  let assignment = load_assignment(store, assignment_id).await?;
  let assignment =
    transition(store, assignment, ReviewAssignmentState::Withdrawn).await?;
  reopen_if_unassigned(store, assignment.request_id).await?;
  Ok(assignment)
}

/// Close an open request, withdrawing any assignment still in progress.
pub async fn close_review_request<S: ReviewStore>(
  store: &S,
  request_id: Uuid,
  state: ReviewRequestState,
) -> Result<ReviewRequest, S::Error> {
  if state.is_open() {
    return Err(Error::NotAClosingState(state).into());
  }
  let mut request = load_request(store, request_id).await?;
  if !request.state.is_open() {
    return Err(Error::RequestNotOpen { id: request_id, state: request.state }.into());
  }

  for assignment in store.assignments_for_request(request_id).await? {
    if assignment.state.is_open() {
      transition(store, assignment, ReviewAssignmentState::Withdrawn).await?;
    }
  }
  store.set_review_request_state(request_id, state).await?;
  request.state = state;

  tracing::info!(request = %request_id, state = %state, "closed review request");
  Ok(request)
}
