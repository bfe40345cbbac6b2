//! SQL schema for the Bulletin SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,               -- argon2 PHC string
    role          TEXT NOT NULL DEFAULT 'user',
    active        INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,
    CHECK (role IN ('user', 'moderator', 'admin'))
);

-- Rows are never deleted; a soft delete sets status = 'deleted'.
CREATE TABLE IF NOT EXISTS content (
    content_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
    body        TEXT NOT NULL CHECK (length(trim(body)) > 0),
    author      TEXT NOT NULL REFERENCES accounts(account_id),
    source      TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'pending',
    flag_reason TEXT,
    created_at  TEXT NOT NULL,
    CHECK (status IN ('pending', 'approved', 'rejected', 'flagged', 'deleted')),
    CHECK ((status = 'flagged') = (flag_reason IS NOT NULL))
);

-- Append-only audit trail; one row per status change.
CREATE TABLE IF NOT EXISTS transitions (
    transition_id TEXT PRIMARY KEY,
    content_id    INTEGER NOT NULL REFERENCES content(content_id),
    actor         TEXT NOT NULL REFERENCES accounts(account_id),
    from_status   TEXT NOT NULL,
    to_status     TEXT NOT NULL,
    reason        TEXT,
    recorded_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS content_status_idx     ON content(status);
CREATE INDEX IF NOT EXISTS content_author_idx     ON content(author);
CREATE INDEX IF NOT EXISTS transitions_content_idx ON transitions(content_id);

PRAGMA user_version = 1;
";
