//! SQL schema for the revq SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS emails (
    address     TEXT PRIMARY KEY,
    person_id   TEXT NOT NULL REFERENCES persons(person_id),
    is_primary  INTEGER NOT NULL DEFAULT 0,
    active      INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS teams (
    acronym     TEXT PRIMARY KEY,
    name        TEXT NOT NULL
);

-- The policy slug is free text on purpose; unknown values are reported
-- when the policy is selected, not rejected here.
CREATE TABLE IF NOT EXISTS review_team_settings (
    team                  TEXT PRIMARY KEY REFERENCES teams(acronym),
    reviewer_queue_policy TEXT NOT NULL,
    review_types          TEXT NOT NULL DEFAULT '[]',  -- JSON array
    review_results        TEXT NOT NULL DEFAULT '[]',  -- JSON array
    autosuggest           INTEGER NOT NULL DEFAULT 0
);

-- Live memberships; a role row is deleted when the person leaves.
-- `grp` may name a review team or any other group (e.g. a working group).
CREATE TABLE IF NOT EXISTS roles (
    grp         TEXT NOT NULL,
    person_id   TEXT NOT NULL REFERENCES persons(person_id),
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    PRIMARY KEY (grp, person_id, name)
);

CREATE TABLE IF NOT EXISTS documents (
    name        TEXT PRIMARY KEY,
    rev         TEXT NOT NULL,
    title       TEXT NOT NULL,
    grp         TEXT,
    ad          TEXT,
    shepherd    TEXT,
    authors     TEXT NOT NULL DEFAULT '[]',  -- JSON array of person ids
    aliases     TEXT NOT NULL DEFAULT '[]',  -- JSON array of names
    pages       INTEGER,
    replaces    TEXT NOT NULL DEFAULT '[]'   -- JSON array of names
);

CREATE TABLE IF NOT EXISTS reviewer_settings (
    team                        TEXT NOT NULL REFERENCES teams(acronym),
    person_id                   TEXT NOT NULL REFERENCES persons(person_id),
    min_interval                INTEGER,
    filter_re                   TEXT,
    skip_next                   INTEGER NOT NULL DEFAULT 0,
    remind_days_before_deadline INTEGER,
    expertise                   TEXT NOT NULL DEFAULT '',
    request_assignment_next     INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (team, person_id),
    CHECK (skip_next >= 0)
);

CREATE TABLE IF NOT EXISTS unavailable_periods (
    period_id    TEXT PRIMARY KEY,
    team         TEXT NOT NULL REFERENCES teams(acronym),
    person_id    TEXT NOT NULL REFERENCES persons(person_id),
    start_date   TEXT,            -- YYYY-MM-DD or NULL (open start)
    end_date     TEXT,            -- YYYY-MM-DD or NULL (open end)
    availability TEXT NOT NULL,   -- 'canfinish' | 'unavailable'
    reason       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS review_wishes (
    team        TEXT NOT NULL REFERENCES teams(acronym),
    person_id   TEXT NOT NULL REFERENCES persons(person_id),
    doc         TEXT NOT NULL,
    wished_at   TEXT NOT NULL,
    PRIMARY KEY (team, person_id, doc)
);

CREATE TABLE IF NOT EXISTS next_reviewer_in_team (
    team          TEXT PRIMARY KEY REFERENCES teams(acronym),
    next_reviewer TEXT NOT NULL REFERENCES persons(person_id)
);

CREATE TABLE IF NOT EXISTS review_requests (
    request_id    TEXT PRIMARY KEY,
    doc           TEXT NOT NULL REFERENCES documents(name),
    team          TEXT NOT NULL REFERENCES teams(acronym),
    kind          TEXT NOT NULL,
    state         TEXT NOT NULL,
    deadline      TEXT NOT NULL,
    requested_rev TEXT,
    requested_by  TEXT NOT NULL,
    requested_at  TEXT NOT NULL,
    comment       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS review_assignments (
    assignment_id   TEXT PRIMARY KEY,
    request_id      TEXT NOT NULL REFERENCES review_requests(request_id),
    reviewer        TEXT NOT NULL,
    reviewer_person TEXT NOT NULL REFERENCES persons(person_id),
    state           TEXT NOT NULL,
    assigned_on     TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    completed_on    TEXT,
    result          TEXT
);

CREATE INDEX IF NOT EXISTS roles_person_idx        ON roles(person_id);
CREATE INDEX IF NOT EXISTS periods_team_idx        ON unavailable_periods(team);
CREATE INDEX IF NOT EXISTS requests_team_idx       ON review_requests(team);
CREATE INDEX IF NOT EXISTS assignments_request_idx ON review_assignments(request_id);

PRAGMA user_version = 1;
";
