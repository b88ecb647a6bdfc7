//! `SQLite` schema definitions for bloodmatch.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the users table.
///
/// Every registered user is a potential donor.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    dob TEXT,
    gender TEXT,
    phone TEXT,
    blood_group TEXT,
    location TEXT,
    email TEXT UNIQUE,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the blood requests table.
pub const CREATE_REQUESTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS blood_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    requester_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    blood_group TEXT NOT NULL,
    location TEXT NOT NULL,
    address TEXT NOT NULL,
    phone TEXT NOT NULL,
    note TEXT,
    urgency_level TEXT NOT NULL,
    request_status TEXT NOT NULL DEFAULT 'Pending',
    created_at TEXT NOT NULL
)
";

/// Index used by the donor candidate query.
pub const CREATE_USER_GROUP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_users_blood_group ON users(blood_group)
";

/// Index for listing requests by status, newest first.
pub const CREATE_REQUEST_STATUS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_requests_status ON blood_requests(request_status, created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_REQUESTS_TABLE,
    CREATE_USER_GROUP_INDEX,
    CREATE_REQUEST_STATUS_INDEX,
    CREATE_METADATA_TABLE,
];
