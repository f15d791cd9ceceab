//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. List-valued document fields are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use revq_core::{
  document::Document,
  person::Person,
  review::{
    AssignmentRecord, ReviewAssignment, ReviewAssignmentState, ReviewRequest,
    ReviewRequestState, ReviewType,
  },
  reviewer::{Availability, ReviewWish, ReviewerSettings, UnavailablePeriod},
  team::{ReviewTeamSettings, Role, RoleName},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── JSON lists ──────────────────────────────────────────────────────────────

pub fn encode_list<T: serde::Serialize>(items: &[T]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list<T: serde::de::DeserializeOwned>(s: &str) -> Result<Vec<T>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:  String,
  pub name:       String,
  pub created_at: String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:  decode_uuid(&self.person_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawTeamSettings {
  pub team:                  String,
  pub reviewer_queue_policy: String,
  pub review_types:          String,
  pub review_results:        String,
  pub autosuggest:           bool,
}

impl RawTeamSettings {
  pub fn into_settings(self) -> Result<ReviewTeamSettings> {
    Ok(ReviewTeamSettings {
      team:                  self.team,
      reviewer_queue_policy: self.reviewer_queue_policy,
      review_types:          decode_list(&self.review_types)?,
      review_results:        decode_list(&self.review_results)?,
      autosuggest:           self.autosuggest,
    })
  }
}

pub struct RawRole {
  pub group:     String,
  pub person_id: String,
  pub name:      String,
  pub email:     String,
}

impl RawRole {
  pub fn into_role(self) -> Result<Role> {
    Ok(Role {
      group:     self.group,
      person_id: decode_uuid(&self.person_id)?,
      name:      RoleName::from_slug(&self.name),
      email:     self.email,
    })
  }
}

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub name:     String,
  pub rev:      String,
  pub title:    String,
  pub group:    Option<String>,
  pub ad:       Option<String>,
  pub shepherd: Option<String>,
  pub authors:  String,
  pub aliases:  String,
  pub pages:    Option<u32>,
  pub replaces: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      name:     self.name,
      rev:      self.rev,
      title:    self.title,
      group:    self.group,
      ad:       decode_opt_uuid(self.ad)?,
      shepherd: decode_opt_uuid(self.shepherd)?,
      authors:  decode_list(&self.authors)?,
      aliases:  decode_list(&self.aliases)?,
      pages:    self.pages,
      replaces: decode_list(&self.replaces)?,
    })
  }
}

pub struct RawReviewerSettings {
  pub team:                        String,
  pub person_id:                   String,
  pub min_interval:                Option<u32>,
  pub filter_re:                   Option<String>,
  pub skip_next:                   u32,
  pub remind_days_before_deadline: Option<u32>,
  pub expertise:                   String,
  pub request_assignment_next:     bool,
}

impl RawReviewerSettings {
  pub fn into_settings(self) -> Result<ReviewerSettings> {
    Ok(ReviewerSettings {
      team:                        self.team,
      person_id:                   decode_uuid(&self.person_id)?,
      min_interval:                self.min_interval,
      filter_re:                   self.filter_re,
      skip_next:                   self.skip_next,
      remind_days_before_deadline: self.remind_days_before_deadline,
      expertise:                   self.expertise,
      request_assignment_next:     self.request_assignment_next,
    })
  }
}

/// Column values for writing a `reviewer_settings` row.
pub struct EncodedReviewerSettings {
  pub team:                        String,
  pub person_id:                   String,
  pub min_interval:                Option<u32>,
  pub filter_re:                   Option<String>,
  pub skip_next:                   u32,
  pub remind_days_before_deadline: Option<u32>,
  pub expertise:                   String,
  pub request_assignment_next:     bool,
}

impl From<ReviewerSettings> for EncodedReviewerSettings {
  fn from(s: ReviewerSettings) -> Self {
    Self {
      team:                        s.team,
      person_id:                   encode_uuid(s.person_id),
      min_interval:                s.min_interval,
      filter_re:                   s.filter_re,
      skip_next:                   s.skip_next,
      remind_days_before_deadline: s.remind_days_before_deadline,
      expertise:                   s.expertise,
      request_assignment_next:     s.request_assignment_next,
    }
  }
}

pub const UPSERT_REVIEWER_SETTINGS: &str = "INSERT OR REPLACE INTO reviewer_settings (
    team, person_id, min_interval, filter_re, skip_next,
    remind_days_before_deadline, expertise, request_assignment_next
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

impl EncodedReviewerSettings {
  pub fn upsert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
    conn.execute(
      UPSERT_REVIEWER_SETTINGS,
      rusqlite::params![
        self.team,
        self.person_id,
        self.min_interval,
        self.filter_re,
        self.skip_next,
        self.remind_days_before_deadline,
        self.expertise,
        self.request_assignment_next,
      ],
    )
  }
}

pub struct RawPeriod {
  pub period_id:    String,
  pub team:         String,
  pub person_id:    String,
  pub start_date:   Option<String>,
  pub end_date:     Option<String>,
  pub availability: String,
  pub reason:       String,
}

impl RawPeriod {
  pub fn into_period(self) -> Result<UnavailablePeriod> {
    Ok(UnavailablePeriod {
      period_id:    decode_uuid(&self.period_id)?,
      team:         self.team,
      person_id:    decode_uuid(&self.person_id)?,
      start_date:   self.start_date.as_deref().map(decode_date).transpose()?,
      end_date:     self.end_date.as_deref().map(decode_date).transpose()?,
      availability: Availability::from_slug(&self.availability)?,
      reason:       self.reason,
    })
  }
}

pub struct RawWish {
  pub team:      String,
  pub person_id: String,
  pub doc:       String,
  pub wished_at: String,
}

impl RawWish {
  pub fn into_wish(self) -> Result<ReviewWish> {
    Ok(ReviewWish {
      team:      self.team,
      person_id: decode_uuid(&self.person_id)?,
      doc:       self.doc,
      wished_at: decode_dt(&self.wished_at)?,
    })
  }
}

/// Raw strings read directly from a `review_requests` row.
pub struct RawRequest {
  pub request_id:    String,
  pub doc:           String,
  pub team:          String,
  pub kind:          String,
  pub state:         String,
  pub deadline:      String,
  pub requested_rev: Option<String>,
  pub requested_by:  String,
  pub requested_at:  String,
  pub comment:       String,
}

pub const SELECT_REQUEST: &str = "SELECT request_id, doc, team, kind, state, deadline,
         requested_rev, requested_by, requested_at, comment
  FROM review_requests";

impl RawRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      request_id:    row.get(0)?,
      doc:           row.get(1)?,
      team:          row.get(2)?,
      kind:          row.get(3)?,
      state:         row.get(4)?,
      deadline:      row.get(5)?,
      requested_rev: row.get(6)?,
      requested_by:  row.get(7)?,
      requested_at:  row.get(8)?,
      comment:       row.get(9)?,
    })
  }

  pub fn into_request(self) -> Result<ReviewRequest> {
    Ok(ReviewRequest {
      request_id:    decode_uuid(&self.request_id)?,
      doc:           self.doc,
      team:          self.team,
      kind:          ReviewType::from_slug(&self.kind)?,
      state:         ReviewRequestState::from_slug(&self.state)?,
      deadline:      decode_date(&self.deadline)?,
      requested_rev: self.requested_rev,
      requested_by:  decode_uuid(&self.requested_by)?,
      requested_at:  decode_dt(&self.requested_at)?,
      comment:       self.comment,
    })
  }
}

/// Raw strings read from a `review_assignments` row, optionally joined with
/// the request's document.
pub struct RawAssignment {
  pub assignment_id:   String,
  pub request_id:      String,
  pub reviewer:        String,
  pub reviewer_person: String,
  pub state:           String,
  pub assigned_on:     String,
  pub completed_on:    Option<String>,
  pub result:          Option<String>,
}

/// Columns read by [`RawAssignment::from_row`], for a query aliasing
/// `review_assignments` as `a`.
pub const ASSIGNMENT_COLUMNS: &str = "a.assignment_id, a.request_id, a.reviewer,
  a.reviewer_person, a.state, a.assigned_on, a.completed_on, a.result";

impl RawAssignment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id:   row.get(0)?,
      request_id:      row.get(1)?,
      reviewer:        row.get(2)?,
      reviewer_person: row.get(3)?,
      state:           row.get(4)?,
      assigned_on:     row.get(5)?,
      completed_on:    row.get(6)?,
      result:          row.get(7)?,
    })
  }

  pub fn into_assignment(self) -> Result<ReviewAssignment> {
    Ok(ReviewAssignment {
      assignment_id:   decode_uuid(&self.assignment_id)?,
      request_id:      decode_uuid(&self.request_id)?,
      reviewer:        self.reviewer,
      reviewer_person: decode_uuid(&self.reviewer_person)?,
      state:           ReviewAssignmentState::from_slug(&self.state)?,
      assigned_on:     decode_dt(&self.assigned_on)?,
      completed_on:    self.completed_on.as_deref().map(decode_dt).transpose()?,
      result:          self.result,
    })
  }
}

pub struct RawAssignmentRecord {
  pub assignment: RawAssignment,
  pub doc:        String,
  pub doc_pages:  Option<u32>,
}

impl RawAssignmentRecord {
  pub fn into_record(self) -> Result<AssignmentRecord> {
    Ok(AssignmentRecord {
      assignment: self.assignment.into_assignment()?,
      doc:        self.doc,
      doc_pages:  self.doc_pages,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_use_iso_format() {
    let d = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
    assert_eq!(encode_date(d), "2024-02-09");
    assert_eq!(decode_date("2024-02-09").unwrap(), d);
    assert!(matches!(decode_date("09/02/2024"), Err(Error::DateParse(_))));
  }

  #[test]
  fn unknown_state_slug_is_a_core_error() {
    let raw = RawAssignment {
      assignment_id:   encode_uuid(Uuid::nil()),
      request_id:      encode_uuid(Uuid::nil()),
      reviewer:        "r@example.org".into(),
      reviewer_person: encode_uuid(Uuid::nil()),
      state:           "lost".into(),
      assigned_on:     encode_dt(Utc::now()),
      completed_on:    None,
      result:          None,
    };
    let err = raw.into_assignment().unwrap_err();
    assert!(err.as_core().is_some());
  }
}
