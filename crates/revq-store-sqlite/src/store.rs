//! [`SqliteStore`]: the SQLite implementation of [`ReviewStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use revq_core::{
  document::Document,
  person::{Email, Person},
  policy::{NextReviewerChange, PolicyUpdate},
  review::{
    AssignmentRecord, NewReviewRequest, ReviewAssignment, ReviewAssignmentState,
    ReviewRequest, ReviewRequestState,
  },
  reviewer::{ReviewWish, ReviewerSettings, UnavailablePeriod},
  store::ReviewStore,
  team::{ReviewTeamSettings, Role, RoleName, Team},
};

use crate::{
  Error, Result,
  encode::{
    EncodedReviewerSettings, RawAssignment, RawAssignmentRecord, RawDocument, RawPerson,
    RawPeriod, RawRequest, RawReviewerSettings, RawRole, RawTeamSettings, RawWish,
    ASSIGNMENT_COLUMNS, SELECT_REQUEST, decode_uuid, encode_date, encode_dt, encode_list,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A review store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::info!(path = %path.as_ref().display(), "opening review store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:  row.get(0)?,
    name:       row.get(1)?,
    created_at: row.get(2)?,
  })
}

fn settings_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReviewerSettings> {
  Ok(RawReviewerSettings {
    team:                        row.get(0)?,
    person_id:                   row.get(1)?,
    min_interval:                row.get(2)?,
    filter_re:                   row.get(3)?,
    skip_next:                   row.get(4)?,
    remind_days_before_deadline: row.get(5)?,
    expertise:                   row.get(6)?,
    request_assignment_next:     row.get(7)?,
  })
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, name: String) -> Result<Person> {
    let person = Person {
      person_id: Uuid::new_v4(),
      name,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(person.person_id);
    let name = person.name.clone();
    let at_str = encode_dt(person.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (person_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT person_id, name, created_at FROM persons WHERE person_id = ?1",
              rusqlite::params![id_str],
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn add_email(&self, email: Email) -> Result<()> {
    if self.get_person(email.person_id).await?.is_none() {
      return Err(revq_core::Error::PersonNotFound(email.person_id).into());
    }

    let person_str = encode_uuid(email.person_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO emails (address, person_id, is_primary, active)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![email.address, person_str, email.primary, email.active],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_email(&self, address: String) -> Result<Option<Email>> {
    let raw: Option<(String, String, bool, bool)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT address, person_id, is_primary, active FROM emails WHERE address = ?1",
              rusqlite::params![address],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(address, person_id, primary, active)| {
        Ok(Email {
          address,
          person_id: decode_uuid(&person_id)?,
          primary,
          active,
        })
      })
      .transpose()
  }

  // ── Teams & roles ─────────────────────────────────────────────────────────

  async fn add_team(&self, team: Team) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO teams (acronym, name) VALUES (?1, ?2)",
          rusqlite::params![team.acronym, team.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_team(&self, acronym: String) -> Result<Option<Team>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT acronym, name FROM teams WHERE acronym = ?1",
                rusqlite::params![acronym],
                |row| Ok(Team { acronym: row.get(0)?, name: row.get(1)? }),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn put_team_settings(&self, settings: ReviewTeamSettings) -> Result<()> {
    if self.get_team(settings.team.clone()).await?.is_none() {
      return Err(revq_core::Error::TeamNotFound(settings.team).into());
    }

    let types_str = encode_list(&settings.review_types)?;
    let results_str = encode_list(&settings.review_results)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO review_team_settings (
             team, reviewer_queue_policy, review_types, review_results, autosuggest
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            settings.team,
            settings.reviewer_queue_policy,
            types_str,
            results_str,
            settings.autosuggest,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_team_settings(&self, team: String) -> Result<Option<ReviewTeamSettings>> {
    let raw: Option<RawTeamSettings> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT team, reviewer_queue_policy, review_types, review_results, autosuggest
               FROM review_team_settings WHERE team = ?1",
              rusqlite::params![team],
              |row| {
                Ok(RawTeamSettings {
                  team:                  row.get(0)?,
                  reviewer_queue_policy: row.get(1)?,
                  review_types:          row.get(2)?,
                  review_results:        row.get(3)?,
                  autosuggest:           row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTeamSettings::into_settings).transpose()
  }

  async fn add_role(&self, role: Role) -> Result<()> {
    let person_str = encode_uuid(role.person_id);
    let name_str = role.name.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO roles (grp, person_id, name, email) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![role.group, person_str, name_str, role.email],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_role(&self, group: String, person_id: Uuid, name: RoleName) -> Result<bool> {
    let person_str = encode_uuid(person_id);
    let name_str = name.as_str().to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM roles WHERE grp = ?1 AND person_id = ?2 AND name = ?3",
          rusqlite::params![group, person_str, name_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn list_roles(&self, group: String) -> Result<Vec<Role>> {
    let raws: Vec<RawRole> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT grp, person_id, name, email FROM roles WHERE grp = ?1
           ORDER BY name, person_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group], |row| {
            Ok(RawRole {
              group:     row.get(0)?,
              person_id: row.get(1)?,
              name:      row.get(2)?,
              email:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRole::into_role).collect()
  }

  async fn team_reviewers(&self, team: String) -> Result<Vec<Person>> {
    let role_str = RoleName::Reviewer.as_str().to_owned();

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT p.person_id, p.name, p.created_at
           FROM persons p
           JOIN roles r ON r.person_id = p.person_id
           WHERE r.grp = ?1 AND r.name = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![team, role_str], person_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn add_document(&self, doc: Document) -> Result<()> {
    let ad_str = doc.ad.map(encode_uuid);
    let shepherd_str = doc.shepherd.map(encode_uuid);
    let authors_str = encode_list(&doc.authors)?;
    let aliases_str = encode_list(&doc.aliases)?;
    let replaces_str = encode_list(&doc.replaces)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO documents (
             name, rev, title, grp, ad, shepherd, authors, aliases, pages, replaces
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            doc.name,
            doc.rev,
            doc.title,
            doc.group,
            ad_str,
            shepherd_str,
            authors_str,
            aliases_str,
            doc.pages,
            replaces_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_document(&self, name: String) -> Result<Option<Document>> {
    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name, rev, title, grp, ad, shepherd, authors, aliases, pages, replaces
               FROM documents WHERE name = ?1",
              rusqlite::params![name],
              |row| {
                Ok(RawDocument {
                  name:     row.get(0)?,
                  rev:      row.get(1)?,
                  title:    row.get(2)?,
                  group:    row.get(3)?,
                  ad:       row.get(4)?,
                  shepherd: row.get(5)?,
                  authors:  row.get(6)?,
                  aliases:  row.get(7)?,
                  pages:    row.get(8)?,
                  replaces: row.get(9)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  // ── Reviewer state ────────────────────────────────────────────────────────

  async fn get_reviewer_settings(
    &self,
    team: String,
    person_id: Uuid,
  ) -> Result<Option<ReviewerSettings>> {
    let person_str = encode_uuid(person_id);

    let raw: Option<RawReviewerSettings> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT team, person_id, min_interval, filter_re, skip_next,
                      remind_days_before_deadline, expertise, request_assignment_next
               FROM reviewer_settings WHERE team = ?1 AND person_id = ?2",
              rusqlite::params![team, person_str],
              settings_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReviewerSettings::into_settings).transpose()
  }

  async fn save_reviewer_settings(&self, settings: ReviewerSettings) -> Result<()> {
    settings.validate()?;
    let row = EncodedReviewerSettings::from(settings);

    self
      .conn
      .call(move |conn| {
        row.upsert(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_unavailable_period(&self, period: UnavailablePeriod) -> Result<()> {
    let id_str = encode_uuid(period.period_id);
    let person_str = encode_uuid(period.person_id);
    let start_str = period.start_date.map(encode_date);
    let end_str = period.end_date.map(encode_date);
    let availability_str = period.availability.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO unavailable_periods (
             period_id, team, person_id, start_date, end_date, availability, reason
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            period.team,
            person_str,
            start_str,
            end_str,
            availability_str,
            period.reason,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unavailable_periods(&self, team: String) -> Result<Vec<UnavailablePeriod>> {
    let raws: Vec<RawPeriod> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT period_id, team, person_id, start_date, end_date, availability, reason
           FROM unavailable_periods WHERE team = ?1
           ORDER BY start_date IS NOT NULL, start_date, period_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![team], |row| {
            Ok(RawPeriod {
              period_id:    row.get(0)?,
              team:         row.get(1)?,
              person_id:    row.get(2)?,
              start_date:   row.get(3)?,
              end_date:     row.get(4)?,
              availability: row.get(5)?,
              reason:       row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPeriod::into_period).collect()
  }

  async fn add_review_wish(&self, wish: ReviewWish) -> Result<()> {
    let person_str = encode_uuid(wish.person_id);
    let at_str = encode_dt(wish.wished_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO review_wishes (team, person_id, doc, wished_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![wish.team, person_str, wish.doc, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn review_wishes(&self, team: String, doc: String) -> Result<Vec<ReviewWish>> {
    let raws: Vec<RawWish> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT team, person_id, doc, wished_at FROM review_wishes
           WHERE team = ?1 AND doc = ?2 ORDER BY wished_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![team, doc], |row| {
            Ok(RawWish {
              team:      row.get(0)?,
              person_id: row.get(1)?,
              doc:       row.get(2)?,
              wished_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWish::into_wish).collect()
  }

  async fn get_next_reviewer(&self, team: String) -> Result<Option<Uuid>> {
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT next_reviewer FROM next_reviewer_in_team WHERE team = ?1",
              rusqlite::params![team],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.as_deref().map(decode_uuid).transpose()
  }

  async fn apply_policy_update(&self, update: PolicyUpdate) -> Result<()> {
    for s in &update.settings {
      s.validate()?;
    }
    let rows: Vec<EncodedReviewerSettings> = update
      .settings
      .into_iter()
      .map(EncodedReviewerSettings::from)
      .collect();
    let team = update.team;
    let next = update.next_reviewer;
    tracing::debug!(
      team = %team,
      settings = rows.len(),
      next = ?next,
      "applying reviewer queue update"
    );

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for row in &rows {
          row.upsert(&tx)?;
        }
        match next {
          NextReviewerChange::Unchanged => {}
          NextReviewerChange::Set(id) => {
            tx.execute(
              "INSERT OR REPLACE INTO next_reviewer_in_team (team, next_reviewer)
               VALUES (?1, ?2)",
              rusqlite::params![team, encode_uuid(id)],
            )?;
          }
          NextReviewerChange::Clear => {
            tx.execute(
              "DELETE FROM next_reviewer_in_team WHERE team = ?1",
              rusqlite::params![team],
            )?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Requests & assignments ────────────────────────────────────────────────

  async fn add_review_request(&self, input: NewReviewRequest) -> Result<ReviewRequest> {
    if self.get_team(input.team.clone()).await?.is_none() {
      return Err(revq_core::Error::TeamNotFound(input.team).into());
    }
    if self.get_document(input.doc.clone()).await?.is_none() {
      return Err(revq_core::Error::DocumentNotFound(input.doc).into());
    }

    let request = ReviewRequest {
      request_id:    Uuid::new_v4(),
      doc:           input.doc,
      team:          input.team,
      kind:          input.kind,
      state:         ReviewRequestState::Requested,
      deadline:      input.deadline,
      requested_rev: input.requested_rev,
      requested_by:  input.requested_by,
      requested_at:  Utc::now(),
      comment:       input.comment,
    };

    let id_str = encode_uuid(request.request_id);
    let doc = request.doc.clone();
    let team = request.team.clone();
    let kind_str = request.kind.as_str().to_owned();
    let state_str = request.state.as_str().to_owned();
    let deadline_str = encode_date(request.deadline);
    let rev = request.requested_rev.clone();
    let by_str = encode_uuid(request.requested_by);
    let at_str = encode_dt(request.requested_at);
    let comment = request.comment.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO review_requests (
             request_id, doc, team, kind, state, deadline,
             requested_rev, requested_by, requested_at, comment
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            doc,
            team,
            kind_str,
            state_str,
            deadline_str,
            rev,
            by_str,
            at_str,
            comment,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn get_review_request(&self, id: Uuid) -> Result<Option<ReviewRequest>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT_REQUEST} WHERE request_id = ?1"),
              rusqlite::params![id_str],
              RawRequest::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  async fn set_review_request_state(&self, id: Uuid, state: ReviewRequestState) -> Result<()> {
    let id_str = encode_uuid(id);
    let state_str = state.as_str().to_owned();

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE review_requests SET state = ?2 WHERE request_id = ?1",
          rusqlite::params![id_str, state_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(revq_core::Error::RequestNotFound(id).into());
    }
    Ok(())
  }

  async fn add_review_assignment(
    &self,
    request_id: Uuid,
    reviewer: Email,
  ) -> Result<ReviewAssignment> {
    let assignment = ReviewAssignment {
      assignment_id:   Uuid::new_v4(),
      request_id,
      reviewer:        reviewer.address,
      reviewer_person: reviewer.person_id,
      state:           ReviewAssignmentState::Assigned,
      assigned_on:     Utc::now(),
      completed_on:    None,
      result:          None,
    };

    let id_str = encode_uuid(assignment.assignment_id);
    let request_str = encode_uuid(request_id);
    let address = assignment.reviewer.clone();
    let person_str = encode_uuid(assignment.reviewer_person);
    let state_str = assignment.state.as_str().to_owned();
    let at_str = encode_dt(assignment.assigned_on);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO review_assignments (
             assignment_id, request_id, reviewer, reviewer_person, state, assigned_on
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, request_str, address, person_str, state_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(assignment)
  }

  async fn get_review_assignment(&self, id: Uuid) -> Result<Option<ReviewAssignment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAssignment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ASSIGNMENT_COLUMNS} FROM review_assignments a
                 WHERE a.assignment_id = ?1"
              ),
              rusqlite::params![id_str],
              RawAssignment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAssignment::into_assignment).transpose()
  }

  async fn update_review_assignment(&self, assignment: ReviewAssignment) -> Result<()> {
    let id = assignment.assignment_id;
    let id_str = encode_uuid(id);
    let state_str = assignment.state.as_str().to_owned();
    let completed_str = assignment.completed_on.map(encode_dt);
    let result = assignment.result;

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE review_assignments SET state = ?2, completed_on = ?3, result = ?4
           WHERE assignment_id = ?1",
          rusqlite::params![id_str, state_str, completed_str, result],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(revq_core::Error::AssignmentNotFound(id).into());
    }
    Ok(())
  }

  async fn assignments_for_request(&self, request_id: Uuid) -> Result<Vec<ReviewAssignment>> {
    let request_str = encode_uuid(request_id);

    let raws: Vec<RawAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ASSIGNMENT_COLUMNS} FROM review_assignments a
           WHERE a.request_id = ?1 ORDER BY a.assigned_on"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![request_str], RawAssignment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn team_assignment_history(&self, team: String) -> Result<Vec<AssignmentRecord>> {
    let raws: Vec<RawAssignmentRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ASSIGNMENT_COLUMNS}, r.doc, d.pages
           FROM review_assignments a
           JOIN review_requests r ON r.request_id = a.request_id
           LEFT JOIN documents  d ON d.name       = r.doc
           WHERE r.team = ?1
           ORDER BY a.assigned_on",
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![team], |row| {
            Ok(RawAssignmentRecord {
              assignment: RawAssignment::from_row(row)?,
              doc:        row.get(8)?,
              doc_pages:  row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssignmentRecord::into_record).collect()
  }
}
