//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, Utc};
use revq_core::{
  document::Document,
  person::{Email, Person},
  policy::{NextReviewerChange, PolicyKind, PolicyUpdate, get_reviewer_queue_policy},
  review::{NewReviewRequest, ReviewAssignmentState, ReviewRequest, ReviewRequestState, ReviewType},
  reviewer::{Availability, ReviewWish, ReviewerSettings, UnavailablePeriod},
  store::ReviewStore,
  team::{ReviewTeamSettings, Role, RoleName, Team},
  workflow,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

const TEAM: &str = "secdir";
const DOC: &str = "draft-ietf-opsawg-widgets";

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn email_of(p: &Person) -> String { format!("{}@example.org", p.name.to_lowercase()) }

/// A team using `policy` with reviewers named `Reviewer0..ReviewerN`.
async fn team_with_reviewers(s: &SqliteStore, policy: PolicyKind, n: usize) -> Vec<Person> {
  s.add_team(Team { acronym: TEAM.into(), name: "Security Directorate".into() })
    .await
    .unwrap();
  s.put_team_settings(ReviewTeamSettings {
    team:                  TEAM.into(),
    reviewer_queue_policy: policy.as_slug().into(),
    review_types:          vec![ReviewType::Early, ReviewType::Lc],
    review_results:        vec!["Ready".into(), "Has Issues".into()],
    autosuggest:           true,
  })
  .await
  .unwrap();

  let mut people = Vec::new();
  for i in 0..n {
    let p = s.add_person(format!("Reviewer{i}")).await.unwrap();
    add_reviewer(s, &p).await;
    people.push(p);
  }
  people
}

async fn add_reviewer(s: &SqliteStore, p: &Person) {
  let address = email_of(p);
  s.add_email(Email {
    address:   address.clone(),
    person_id: p.person_id,
    primary:   true,
    active:    true,
  })
  .await
  .unwrap();
  s.add_role(Role {
    group:     TEAM.into(),
    person_id: p.person_id,
    name:      RoleName::Reviewer,
    email:     address,
  })
  .await
  .unwrap();
}

async fn add_doc(s: &SqliteStore, name: &str, authors: Vec<Uuid>) {
  s.add_document(Document {
    name:     name.into(),
    rev:      "00".into(),
    title:    "Widgets".into(),
    group:    Some("opsawg".into()),
    ad:       None,
    shepherd: None,
    authors,
    aliases:  Vec::new(),
    pages:    Some(12),
    replaces: Vec::new(),
  })
  .await
  .unwrap();
}

async fn request(s: &SqliteStore, doc: &str, requested_by: Uuid) -> ReviewRequest {
  s.add_review_request(NewReviewRequest {
    doc:           doc.into(),
    team:          TEAM.into(),
    kind:          ReviewType::Lc,
    deadline:      NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
    requested_rev: None,
    requested_by,
    comment:       String::new(),
  })
  .await
  .unwrap()
}

async fn rotation_names(s: &SqliteStore) -> Vec<String> {
  get_reviewer_queue_policy(s, TEAM)
    .await
    .unwrap()
    .default_reviewer_rotation_list(&[])
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect()
}

async fn skip_of(s: &SqliteStore, p: &Person) -> u32 {
  s.reviewer_settings_or_default(TEAM.into(), p.person_id)
    .await
    .unwrap()
    .skip_next
}

async fn set_skip(s: &SqliteStore, p: &Person, skip_next: u32) {
  let mut settings = s
    .reviewer_settings_or_default(TEAM.into(), p.person_id)
    .await
    .unwrap();
  settings.skip_next = skip_next;
  s.save_reviewer_settings(settings).await.unwrap();
}

fn all_time_unavailable(p: &Person, availability: Availability) -> UnavailablePeriod {
  UnavailablePeriod {
    period_id: Uuid::new_v4(),
    team: TEAM.into(),
    person_id: p.person_id,
    start_date: None,
    end_date: None,
    availability,
    reason: "sabbatical".into(),
  }
}

// ─── Basic persistence ───────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;
  let p = s.add_person("Alice Adams".into()).await.unwrap();
  let fetched = s.get_person(p.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Alice Adams");
  assert!(s.get_person(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn email_requires_existing_person() {
  let s = store().await;
  let err = s
    .add_email(Email {
      address:   "ghost@example.org".into(),
      person_id: Uuid::new_v4(),
      primary:   true,
      active:    true,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::PersonNotFound(_))));
}

#[tokio::test]
async fn document_round_trips_list_columns() {
  let s = store().await;
  let author = Uuid::new_v4();
  let mut doc = Document {
    name:     DOC.into(),
    rev:      "03".into(),
    title:    "Widgets".into(),
    group:    None,
    ad:       Some(Uuid::new_v4()),
    shepherd: None,
    authors:  vec![author],
    aliases:  vec!["rfc9999".into()],
    pages:    None,
    replaces: vec!["draft-smith-widgets".into()],
  };
  s.add_document(doc.clone()).await.unwrap();
  assert_eq!(s.get_document(DOC.into()).await.unwrap(), Some(doc.clone()));

  doc.rev = "04".into();
  s.add_document(doc.clone()).await.unwrap();
  assert_eq!(s.get_document(DOC.into()).await.unwrap().unwrap().rev, "04");
}

#[tokio::test]
async fn remove_role_reports_whether_it_existed() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 2).await;
  let id = people[0].person_id;

  assert!(s.remove_role(TEAM.into(), id, RoleName::Reviewer).await.unwrap());
  assert!(!s.remove_role(TEAM.into(), id, RoleName::Reviewer).await.unwrap());
  assert_eq!(s.team_reviewers(TEAM.into()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_filter_is_rejected_on_save() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 1).await;
  let mut settings = ReviewerSettings::new(TEAM, people[0].person_id);
  settings.filter_re = Some("(".into());
  let err = s.save_reviewer_settings(settings).await.unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::InvalidFilter { .. })));
}

#[tokio::test]
async fn policy_update_is_applied_as_a_whole() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 3).await;

  let mut a = ReviewerSettings::new(TEAM, people[0].person_id);
  a.skip_next = 3;
  let mut b = ReviewerSettings::new(TEAM, people[1].person_id);
  b.request_assignment_next = true;

  s.apply_policy_update(PolicyUpdate {
    team:          TEAM.into(),
    settings:      vec![a, b],
    next_reviewer: NextReviewerChange::Set(people[2].person_id),
    in_order:      true,
  })
  .await
  .unwrap();

  assert_eq!(skip_of(&s, &people[0]).await, 3);
  assert!(
    s.reviewer_settings_or_default(TEAM.into(), people[1].person_id)
      .await
      .unwrap()
      .request_assignment_next
  );
  assert_eq!(
    s.get_next_reviewer(TEAM.into()).await.unwrap(),
    Some(people[2].person_id)
  );

  s.apply_policy_update(PolicyUpdate {
    team:          TEAM.into(),
    settings:      Vec::new(),
    next_reviewer: NextReviewerChange::Clear,
    in_order:      true,
  })
  .await
  .unwrap();
  assert_eq!(s.get_next_reviewer(TEAM.into()).await.unwrap(), None);
}

// ─── Policy selection ────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_team_settings_fail_selection() {
  let s = store().await;
  s.add_team(Team { acronym: TEAM.into(), name: "Security Directorate".into() })
    .await
    .unwrap();
  let err = get_reviewer_queue_policy(&s, TEAM).await.err().unwrap();
  assert!(matches!(err, Error::Core(revq_core::Error::MissingTeamSettings(_))));
}

#[tokio::test]
async fn unknown_policy_fails_selection() {
  let s = store().await;
  s.add_team(Team { acronym: TEAM.into(), name: "Security Directorate".into() })
    .await
    .unwrap();
  s.put_team_settings(ReviewTeamSettings {
    team:                  TEAM.into(),
    reviewer_queue_policy: "RandomChoice".into(),
    review_types:          Vec::new(),
    review_results:        Vec::new(),
    autosuggest:           false,
  })
  .await
  .unwrap();

  let err = get_reviewer_queue_policy(&s, TEAM).await.err().unwrap();
  match err {
    Error::Core(revq_core::Error::UnknownPolicy { policy, .. }) => {
      assert_eq!(policy, "RandomChoice")
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn request_of_another_team_is_refused() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 2).await;
  s.add_team(Team { acronym: "genart".into(), name: "Gen-ART".into() })
    .await
    .unwrap();
  add_doc(&s, DOC, Vec::new()).await;
  let mut req = request(&s, DOC, people[0].person_id).await;
  req.team = "genart".into();

  let policy = get_reviewer_queue_policy(&s, TEAM).await.unwrap();
  let err = policy
    .update_policy_state_for_assignment(&req, people[0].person_id, false)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::WrongTeam { .. })));
}

// ─── Rotation list ───────────────────────────────────────────────────────────

#[tokio::test]
async fn rotation_contains_every_available_reviewer() {
  let s = store().await;
  team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 5).await;
  let names = rotation_names(&s).await;
  assert_eq!(
    names,
    ["Reviewer0", "Reviewer1", "Reviewer2", "Reviewer3", "Reviewer4"]
  );
  // No state changes in between: same answer.
  assert_eq!(rotation_names(&s).await, names);
}

#[tokio::test]
async fn unavailable_reviewers_are_left_out() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 4).await;
  s.add_unavailable_period(all_time_unavailable(&people[1], Availability::Unavailable))
    .await
    .unwrap();
  s.add_unavailable_period(all_time_unavailable(&people[2], Availability::Canfinish))
    .await
    .unwrap();

  assert_eq!(
    rotation_names(&s).await,
    ["Reviewer0", "Reviewer2", "Reviewer3"]
  );

  // A period that ended yesterday no longer applies.
  let policy = get_reviewer_queue_policy(&s, TEAM)
    .await
    .unwrap()
    .with_today(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
  let mut ended = all_time_unavailable(&people[3], Availability::Unavailable);
  ended.end_date = NaiveDate::from_ymd_opt(2024, 5, 31);
  s.add_unavailable_period(ended).await.unwrap();
  let names: Vec<String> = policy
    .default_reviewer_rotation_list(&[])
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(names, ["Reviewer0", "Reviewer2", "Reviewer3"]);
}

#[tokio::test]
async fn pointer_that_left_the_team_moves_to_next_name() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 5).await;
  s.apply_policy_update(PolicyUpdate {
    team:          TEAM.into(),
    settings:      Vec::new(),
    next_reviewer: NextReviewerChange::Set(people[1].person_id),
    in_order:      true,
  })
  .await
  .unwrap();
  assert_eq!(rotation_names(&s).await[0], "Reviewer1");

  s.remove_role(TEAM.into(), people[1].person_id, RoleName::Reviewer)
    .await
    .unwrap();
  assert_eq!(
    rotation_names(&s).await,
    ["Reviewer2", "Reviewer3", "Reviewer4", "Reviewer0"]
  );

  s.remove_role(TEAM.into(), people[4].person_id, RoleName::Reviewer)
    .await
    .unwrap();
  s.apply_policy_update(PolicyUpdate {
    team:          TEAM.into(),
    settings:      Vec::new(),
    next_reviewer: NextReviewerChange::Set(people[4].person_id),
    in_order:      true,
  })
  .await
  .unwrap();
  // Nobody sorts after Reviewer4: wrap to the start.
  assert_eq!(
    rotation_names(&s).await,
    ["Reviewer0", "Reviewer2", "Reviewer3"]
  );
}

#[tokio::test]
async fn without_skipped_drops_reviewers_with_skips() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 3).await;
  set_skip(&s, &people[1], 1).await;

  let names: Vec<String> = get_reviewer_queue_policy(&s, TEAM)
    .await
    .unwrap()
    .default_reviewer_rotation_list_without_skipped()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(names, ["Reviewer0", "Reviewer2"]);
}

#[tokio::test]
async fn least_recently_used_orders_by_last_assignment() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::LeastRecentlyUsed, 3).await;
  add_doc(&s, DOC, Vec::new()).await;

  // Reviewer2 then Reviewer0 get work; Reviewer1 never does.
  for p in [&people[2], &people[0]] {
    let req = request(&s, DOC, people[1].person_id).await;
    workflow::assign_review_request_to_reviewer(&s, req.request_id, &email_of(p), false)
      .await
      .unwrap();
  }

  assert_eq!(
    rotation_names(&s).await,
    ["Reviewer1", "Reviewer2", "Reviewer0"]
  );
  // No pointer is kept for this policy.
  assert_eq!(s.get_next_reviewer(TEAM.into()).await.unwrap(), None);
}

// ─── Policy state on assignment ──────────────────────────────────────────────

#[tokio::test]
async fn alphabetical_assignments_walk_the_rotation() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 5).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;
  let policy = get_reviewer_queue_policy(&s, TEAM).await.unwrap();

  policy
    .update_policy_state_for_assignment(&req, people[0].person_id, false)
    .await
    .unwrap();
  assert_eq!(
    s.get_next_reviewer(TEAM.into()).await.unwrap(),
    Some(people[1].person_id)
  );
  for p in &people {
    assert_eq!(skip_of(&s, p).await, 0);
  }

  policy
    .update_policy_state_for_assignment(&req, people[1].person_id, true)
    .await
    .unwrap();
  assert_eq!(
    s.get_next_reviewer(TEAM.into()).await.unwrap(),
    Some(people[2].person_id)
  );
  assert_eq!(skip_of(&s, &people[1]).await, 1);

  set_skip(&s, &people[3], 2).await;
  policy
    .update_policy_state_for_assignment(&req, people[2].person_id, false)
    .await
    .unwrap();
  assert_eq!(
    s.get_next_reviewer(TEAM.into()).await.unwrap(),
    Some(people[4].person_id)
  );
  assert_eq!(skip_of(&s, &people[3]).await, 1);
}

#[tokio::test]
async fn lone_reviewer_clears_the_pointer() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 1).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;
  s.apply_policy_update(PolicyUpdate {
    team:          TEAM.into(),
    settings:      Vec::new(),
    next_reviewer: NextReviewerChange::Set(people[0].person_id),
    in_order:      true,
  })
  .await
  .unwrap();

  let update = get_reviewer_queue_policy(&s, TEAM)
    .await
    .unwrap()
    .update_policy_state_for_assignment(&req, people[0].person_id, true)
    .await
    .unwrap();
  assert_eq!(update.next_reviewer, NextReviewerChange::Clear);
  assert_eq!(s.get_next_reviewer(TEAM.into()).await.unwrap(), None);
  assert_eq!(skip_of(&s, &people[0]).await, 1);
}

#[tokio::test]
async fn unavailable_assignee_still_counts_in_the_rotation() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 3).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;
  s.add_unavailable_period(all_time_unavailable(&people[1], Availability::Unavailable))
    .await
    .unwrap();

  let update = get_reviewer_queue_policy(&s, TEAM)
    .await
    .unwrap()
    .update_policy_state_for_assignment(&req, people[1].person_id, false)
    .await
    .unwrap();
  assert_eq!(update.next_reviewer, NextReviewerChange::Set(people[2].person_id));
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn assignment_choices_rank_connected_reviewers_last() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 3).await;
  add_doc(&s, DOC, vec![people[0].person_id]).await;
  let req = request(&s, DOC, people[2].person_id).await;
  s.add_review_wish(ReviewWish {
    team:      TEAM.into(),
    person_id: people[2].person_id,
    doc:       DOC.into(),
    wished_at: Utc::now(),
  })
  .await
  .unwrap();

  let policy = get_reviewer_queue_policy(&s, TEAM).await.unwrap();
  let candidates = policy.team_reviewer_emails().await.unwrap();
  assert_eq!(candidates.len(), 3);

  let choices = policy.assignment_choices(&candidates, &req).await.unwrap();
  let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
  assert_eq!(
    labels,
    [
      "Reviewer2: wishes to review document; #3",
      "Reviewer1: #2",
      "Reviewer0: is author of document; #1",
    ]
  );
  assert_eq!(choices[0].email, email_of(&people[2]));
}

#[tokio::test]
async fn ranking_sees_history_of_replaced_documents() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::LeastRecentlyUsed, 2).await;
  add_doc(&s, "draft-smith-widgets", Vec::new()).await;
  let old = request(&s, "draft-smith-widgets", people[0].person_id).await;
  let a = workflow::assign_review_request_to_reviewer(
    &s,
    old.request_id,
    &email_of(&people[1]),
    false,
  )
  .await
  .unwrap();
  workflow::complete_assignment(&s, a.assignment_id, false, Some("Ready".into()))
    .await
    .unwrap();

  s.add_document(Document {
    name:     DOC.into(),
    rev:      "00".into(),
    title:    "Widgets".into(),
    group:    None,
    ad:       None,
    shepherd: None,
    authors:  Vec::new(),
    aliases:  Vec::new(),
    pages:    Some(30),
    replaces: vec!["draft-smith-widgets".into()],
  })
  .await
  .unwrap();
  let req = request(&s, DOC, people[0].person_id).await;

  let policy = get_reviewer_queue_policy(&s, TEAM).await.unwrap();
  let candidates = policy.team_reviewer_emails().await.unwrap();
  let ranking = policy.rank_candidates(&candidates, &req).await.unwrap();
  assert_eq!(ranking[0].person_id, people[1].person_id);
  assert!(ranking[0].label.contains("reviewed document before"));
  assert!(ranking[0].label.ends_with("1 fully completed"));
}

// ─── Workflow ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn assigning_opens_an_assignment_and_moves_the_pointer() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 3).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;

  let a = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[0]),
    false,
  )
  .await
  .unwrap();
  assert_eq!(a.state, ReviewAssignmentState::Assigned);
  assert_eq!(a.reviewer_person, people[0].person_id);
  assert_eq!(
    s.get_review_request(req.request_id).await.unwrap().unwrap().state,
    ReviewRequestState::Assigned
  );
  assert_eq!(
    s.get_next_reviewer(TEAM.into()).await.unwrap(),
    Some(people[1].person_id)
  );

  // Same address again is a no-op.
  let again = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[0]),
    false,
  )
  .await
  .unwrap();
  assert_eq!(again.assignment_id, a.assignment_id);
  assert_eq!(
    s.get_next_reviewer(TEAM.into()).await.unwrap(),
    Some(people[1].person_id)
  );
  assert_eq!(s.assignments_for_request(req.request_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn assigning_to_unknown_address_writes_nothing() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 2).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;

  let err =
    workflow::assign_review_request_to_reviewer(&s, req.request_id, "nobody@example.org", false)
      .await
      .unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::EmailNotFound(_))));
  assert_eq!(
    s.get_review_request(req.request_id).await.unwrap().unwrap().state,
    ReviewRequestState::Requested
  );
}

#[tokio::test]
async fn assigning_under_unknown_policy_writes_nothing() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 2).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;
  s.put_team_settings(ReviewTeamSettings {
    team:                  TEAM.into(),
    reviewer_queue_policy: "RandomChoice".into(),
    review_types:          vec![ReviewType::Lc],
    review_results:        Vec::new(),
    autosuggest:           false,
  })
  .await
  .unwrap();

  let err = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[1]),
    true,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::UnknownPolicy { .. })));
  assert_eq!(
    s.get_review_request(req.request_id).await.unwrap().unwrap().state,
    ReviewRequestState::Requested
  );
  assert!(s.assignments_for_request(req.request_id).await.unwrap().is_empty());
  assert_eq!(skip_of(&s, &people[1]).await, 0);
}

#[tokio::test]
async fn rejection_reopens_request_and_returns_reviewer_to_top() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 3).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;

  let a = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[0]),
    false,
  )
  .await
  .unwrap();
  let rejected = workflow::reject_assignment(&s, a.assignment_id).await.unwrap();
  assert_eq!(rejected.state, ReviewAssignmentState::Rejected);
  assert_eq!(
    s.get_review_request(req.request_id).await.unwrap().unwrap().state,
    ReviewRequestState::Requested
  );
  let settings = s
    .reviewer_settings_or_default(TEAM.into(), people[0].person_id)
    .await
    .unwrap();
  assert!(settings.request_assignment_next);

  // The flag is spent on the next assignment.
  let req2 = request(&s, DOC, people[0].person_id).await;
  workflow::assign_review_request_to_reviewer(
    &s,
    req2.request_id,
    &email_of(&people[0]),
    false,
  )
  .await
  .unwrap();
  assert!(
    !s.reviewer_settings_or_default(TEAM.into(), people[0].person_id)
      .await
      .unwrap()
      .request_assignment_next
  );
}

#[tokio::test]
async fn no_response_under_lru_leaves_settings_alone() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::LeastRecentlyUsed, 2).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;

  let a = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[1]),
    false,
  )
  .await
  .unwrap();
  workflow::mark_no_response(&s, a.assignment_id).await.unwrap();
  assert!(
    s.get_reviewer_settings(TEAM.into(), people[1].person_id)
      .await
      .unwrap()
      .is_none_or(|s| !s.request_assignment_next)
  );
  assert_eq!(
    s.get_review_request(req.request_id).await.unwrap().unwrap().state,
    ReviewRequestState::Requested
  );
}

#[tokio::test]
async fn lru_assignment_consumes_skips_of_passed_over_reviewers() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::LeastRecentlyUsed, 3).await;
  add_doc(&s, DOC, Vec::new()).await;

  for p in [&people[2], &people[0]] {
    let req = request(&s, DOC, people[1].person_id).await;
    workflow::assign_review_request_to_reviewer(&s, req.request_id, &email_of(p), false)
      .await
      .unwrap();
  }
  assert_eq!(
    rotation_names(&s).await,
    ["Reviewer1", "Reviewer2", "Reviewer0"]
  );

  // Reviewer1 is due a skip, so giving the next one to Reviewer2 is in order.
  set_skip(&s, &people[1], 1).await;
  let req = request(&s, DOC, people[0].person_id).await;
  workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[2]),
    false,
  )
  .await
  .unwrap();

  assert_eq!(skip_of(&s, &people[1]).await, 0);
  assert_eq!(
    rotation_names(&s).await,
    ["Reviewer1", "Reviewer0", "Reviewer2"]
  );
}

#[tokio::test]
async fn accepted_then_completed() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 2).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;
  let a = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[1]),
    false,
  )
  .await
  .unwrap();

  workflow::accept_assignment(&s, a.assignment_id).await.unwrap();
  let done = workflow::complete_assignment(&s, a.assignment_id, true, Some("Has Nits".into()))
    .await
    .unwrap();
  assert_eq!(done.state, ReviewAssignmentState::PartCompleted);

  let stored = s.get_review_assignment(a.assignment_id).await.unwrap().unwrap();
  assert_eq!(stored.result.as_deref(), Some("Has Nits"));
  assert!(stored.completed_on.is_some());

  let err = workflow::accept_assignment(&s, a.assignment_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::InvalidTransition { .. })));
}

#[tokio::test]
async fn closing_withdraws_open_assignments() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::RotateAlphabetically, 2).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;
  let a = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[1]),
    false,
  )
  .await
  .unwrap();

  let err = workflow::close_review_request(&s, req.request_id, ReviewRequestState::Assigned)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::NotAClosingState(_))));

  let closed = workflow::close_review_request(&s, req.request_id, ReviewRequestState::Overtaken)
    .await
    .unwrap();
  assert_eq!(closed.state, ReviewRequestState::Overtaken);
  assert_eq!(
    s.get_review_assignment(a.assignment_id).await.unwrap().unwrap().state,
    ReviewAssignmentState::Withdrawn
  );

  let err = workflow::assign_review_request_to_reviewer(
    &s,
    req.request_id,
    &email_of(&people[0]),
    false,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Core(revq_core::Error::RequestNotOpen { .. })));
}

#[tokio::test]
async fn history_carries_document_pages() {
  let s = store().await;
  let people = team_with_reviewers(&s, PolicyKind::LeastRecentlyUsed, 1).await;
  add_doc(&s, DOC, Vec::new()).await;
  let req = request(&s, DOC, people[0].person_id).await;
  workflow::assign_review_request_to_reviewer(&s, req.request_id, &email_of(&people[0]), false)
    .await
    .unwrap();

  let history = s.team_assignment_history(TEAM.into()).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].doc, DOC);
  assert_eq!(history[0].doc_pages, Some(12));
  assert!(s.team_assignment_history("genart".into()).await.unwrap().is_empty());
}
