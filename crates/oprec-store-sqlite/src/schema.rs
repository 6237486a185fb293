//! SQL schema for the oprec SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS applicants (
    applicant_id  TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'applicant',  -- 'applicant' | 'admin'
    created_at    TEXT NOT NULL
);

-- Exactly one profile per applicant, created in the same transaction.
CREATE TABLE IF NOT EXISTS profiles (
    applicant_id    TEXT PRIMARY KEY REFERENCES applicants(applicant_id),
    full_name       TEXT NOT NULL,
    nim             TEXT NOT NULL UNIQUE,
    nickname        TEXT,
    whatsapp_number TEXT,
    study_program   TEXT,
    department_id   TEXT REFERENCES departments(department_id),
    division_id     TEXT REFERENCES divisions(division_id),
    sub_division_id TEXT REFERENCES sub_divisions(sub_division_id),
    avatar_url      TEXT,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS departments (
    department_id TEXT PRIMARY KEY,
    name          TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS divisions (
    division_id   TEXT PRIMARY KEY,
    department_id TEXT NOT NULL REFERENCES departments(department_id),
    name          TEXT NOT NULL,
    UNIQUE (department_id, name)
);

CREATE TABLE IF NOT EXISTS sub_divisions (
    sub_division_id TEXT PRIMARY KEY,
    division_id     TEXT NOT NULL REFERENCES divisions(division_id),
    name            TEXT NOT NULL,
    UNIQUE (division_id, name)
);

-- Submission history per applicant; the newest row is the current one.
CREATE TABLE IF NOT EXISTS submissions (
    submission_id    TEXT PRIMARY KEY,
    applicant_id     TEXT NOT NULL REFERENCES applicants(applicant_id),
    study_plan_url   TEXT,
    formal_photo_url TEXT,
    follow_proof_url TEXT,
    share_proof_url  TEXT,
    social_link      TEXT,
    status           TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'approved' | 'rejected'
    rejection_reason TEXT,
    reviewed_by      TEXT REFERENCES applicants(applicant_id),
    reviewed_at      TEXT,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS payments (
    order_id           TEXT PRIMARY KEY,
    applicant_id       TEXT NOT NULL REFERENCES applicants(applicant_id),
    provider           TEXT NOT NULL,
    amount             INTEGER NOT NULL,
    status             TEXT NOT NULL,  -- 'pending' | 'paid' | 'failed'
    payment_url        TEXT,
    external_reference TEXT,
    paid_at            TEXT,
    created_at         TEXT NOT NULL
);

-- At most one non-failed payment per applicant. This is the backstop for
-- the check-then-create race on concurrent transaction requests.
CREATE UNIQUE INDEX IF NOT EXISTS payments_one_active_idx
    ON payments(applicant_id) WHERE status IN ('pending', 'paid');

CREATE TABLE IF NOT EXISTS timeline_events (
    event_id    TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    start_at    TEXT NOT NULL,
    end_at      TEXT NOT NULL,
    order_index INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS submissions_applicant_idx ON submissions(applicant_id);
CREATE INDEX IF NOT EXISTS payments_applicant_idx    ON payments(applicant_id);
CREATE INDEX IF NOT EXISTS timeline_order_idx        ON timeline_events(order_index);

PRAGMA user_version = 1;
";
