//! SQL schema for the Pulse SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per survey session, draft or final. The UNIQUE constraint on
-- session_id is what makes the autosave upsert overwrite in place.
CREATE TABLE IF NOT EXISTS responses (
    response_id            TEXT PRIMARY KEY,
    session_id             TEXT NOT NULL UNIQUE,
    is_draft               INTEGER NOT NULL,    -- 1 = draft, 0 = final
    demographics_json      TEXT NOT NULL,       -- {id: backend label}
    ratings_json           TEXT NOT NULL,       -- {id: 1..5}
    multiselects_json      TEXT NOT NULL,       -- {id: [tokens]}
    texts_json             TEXT NOT NULL,       -- {id: text}
    feedback_json          TEXT NOT NULL,       -- {language, entries, not_applicable}
    collaboration_feedback TEXT NOT NULL,
    additional_comments    TEXT NOT NULL,
    elapsed_seconds        INTEGER NOT NULL,
    last_autosave_at       TEXT,                -- ISO 8601 UTC
    submitted_at           TEXT                 -- ISO 8601 UTC; set exactly once
);

CREATE INDEX IF NOT EXISTS responses_draft_idx ON responses(is_draft);

PRAGMA user_version = 1;
";
