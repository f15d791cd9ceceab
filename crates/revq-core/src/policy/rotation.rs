//! Default rotation orders.
//!
//! Pure functions over already-loaded data; the async policy methods in the
//! parent module fetch the inputs and call into these.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  person::Person,
  review::AssignmentRecord,
  reviewer::{Availability, UnavailablePeriod},
};

/// Sort by last name and start at `next`.
///
/// If `next` is no longer among `reviewers`, start at the first reviewer that
/// sorts after them, wrapping to the beginning when nobody does.
pub fn rotate_alphabetically(
  mut reviewers: Vec<Person>,
  next: Option<&Person>,
) -> Vec<Person> {
  reviewers.sort_by_cached_key(Person::rotation_key);

  let start = match next {
    None => 0,
    Some(next) => reviewers
      .iter()
      .position(|p| p.person_id == next.person_id)
      .unwrap_or_else(|| {
        let key = next.rotation_key();
        reviewers
          .iter()
          .position(|p| p.rotation_key() > key)
          .unwrap_or(0)
      }),
  };

  reviewers.rotate_left(start);
  reviewers
}

/// Sort so that whoever was assigned longest ago comes first.
///
/// Reviewers who were never assigned come before everyone else, ordered by
/// person id.
pub fn least_recently_used(
  mut reviewers: Vec<Person>,
  history: &[AssignmentRecord],
) -> Vec<Person> {
  let latest = latest_assignment_by_person(history);
  reviewers.sort_by_key(|p| (latest.get(&p.person_id).copied(), p.person_id));
  reviewers
}

/// The most recent `assigned_on` per reviewer, counting only assignments that
/// actually went to them (assigned, accepted, completed).
pub fn latest_assignment_by_person(
  history: &[AssignmentRecord],
) -> HashMap<Uuid, DateTime<Utc>> {
  let mut latest: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
  for record in history {
    let a = &record.assignment;
    if !a.state.counts_as_assignment() {
      continue;
    }
    latest
      .entry(a.reviewer_person)
      .and_modify(|at| *at = (*at).max(a.assigned_on))
      .or_insert(a.assigned_on);
  }
  latest
}

/// People with a fully `unavailable` period covering `today`.
pub fn unavailable_on(
  periods: &[UnavailablePeriod],
  today: NaiveDate,
) -> HashSet<Uuid> {
  periods
    .iter()
    .filter(|p| p.availability == Availability::Unavailable && p.covers(today))
    .map(|p| p.person_id)
    .collect()
}

/// Remove reviewers unavailable on `today`, except those in `dont_skip`.
pub fn drop_unavailable(
  rotation: Vec<Person>,
  periods: &[UnavailablePeriod],
  today: NaiveDate,
  dont_skip: &[Uuid],
) -> Vec<Person> {
  let unavailable = unavailable_on(periods, today);
  rotation
    .into_iter()
    .filter(|p| {
      !unavailable.contains(&p.person_id) || dont_skip.contains(&p.person_id)
    })
    .collect()
}
