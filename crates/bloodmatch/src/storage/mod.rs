//! Storage layer for bloodmatch.
//!
//! This module provides `SQLite`-based persistent storage for registered users
//! and blood requests, and answers the donor candidate queries the matcher
//! needs.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::matching::DonorDirectory;
use crate::records::{
    BloodGroup, BloodRequest, Donor, NewBloodRequest, NewDonor, RequestStatus,
};

const REQUEST_COLUMNS: &str = "id, requester_id, name, blood_group, location, address, phone, \
                               note, urgency_level, request_status, created_at";

/// Storage engine for users and blood requests.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// Criteria for listing blood requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Only requests in this state.
    pub status: RequestStatus,
    /// Only requests for this blood group label.
    pub blood_group: Option<String>,
    /// Only requests in this city.
    pub location: Option<String>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a user, returning the new id.
    ///
    /// The blood group label is stored trimmed and uppercased, the same
    /// canonical form migration v2 gives older rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEmail`] if the email is already registered,
    /// or an error if the database operation fails.
    pub fn insert_donor(&self, donor: &NewDonor) -> Result<i64> {
        let email = donor.email.as_ref().map(|e| e.to_lowercase());
        let blood_group = donor.blood_group.as_deref().map(|g| g.trim().to_uppercase());

        let inserted = self.conn.execute(
            r"
            INSERT INTO users (name, dob, gender, phone, blood_group, location, email)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                donor.name,
                donor.dob,
                donor.gender,
                donor.phone,
                blood_group,
                donor.location,
                email,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation && email.is_some() =>
            {
                return Err(Error::DuplicateEmail(email.unwrap_or_default()));
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        debug!("Inserted user with id {}", id);
        Ok(id)
    }

    /// Get a user's donor view by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_donor(&self, id: i64) -> Result<Option<Donor>> {
        let donor = self
            .conn
            .query_row(
                "SELECT id, name, phone, location, blood_group FROM users WHERE id = ?1",
                [id],
                Self::row_to_donor,
            )
            .optional()?;
        Ok(donor)
    }

    /// Users whose blood group is one of `groups`, skipping `exclude_user_id`.
    ///
    /// Rows come back in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_donors(&self, groups: &[BloodGroup], exclude_user_id: i64) -> Result<Vec<Donor>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; groups.len()].join(", ");
        let sql = format!(
            "SELECT id, name, phone, location, blood_group FROM users \
             WHERE blood_group IN ({placeholders}) AND id != ? ORDER BY id"
        );

        let mut values: Vec<Value> = groups
            .iter()
            .map(|group| Value::Text(group.as_str().to_string()))
            .collect();
        values.push(Value::Integer(exclude_user_id));

        let mut stmt = self.conn.prepare(&sql)?;
        let donors = stmt
            .query_map(params_from_iter(values), Self::row_to_donor)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            "Found {} donor candidates in {} groups",
            donors.len(),
            groups.len()
        );
        Ok(donors)
    }

    /// File a blood request, returning the new id. Status starts as Pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_request(&self, request: &NewBloodRequest) -> Result<i64> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        self.conn.execute(
            r"
            INSERT INTO blood_requests
                (requester_id, name, blood_group, location, address, phone, note,
                 urgency_level, request_status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
            params![
                request.requester_id,
                request.name,
                request.blood_group,
                request.location,
                request.address,
                request.phone,
                request.note,
                request.urgency_level,
                RequestStatus::Pending.as_str(),
                created_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted blood request with id {}", id);
        Ok(id)
    }

    /// Get a blood request by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_request(&self, id: i64) -> Result<Option<BloodRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE id = ?1");
        let request = self
            .conn
            .query_row(&sql, [id], Self::row_to_request)
            .optional()?;
        Ok(request)
    }

    /// List blood requests matching `filter`, newest first.
    ///
    /// The location filter ignores ASCII case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_requests(&self, filter: &RequestFilter, limit: usize) -> Result<Vec<BloodRequest>> {
        let mut conditions = vec!["request_status = ?"];
        let mut values = vec![Value::Text(filter.status.as_str().to_string())];

        if let Some(group) = &filter.blood_group {
            conditions.push("blood_group = ?");
            values.push(Value::Text(group.clone()));
        }
        if let Some(location) = &filter.location {
            conditions.push("location = ? COLLATE NOCASE");
            values.push(Value::Text(location.clone()));
        }
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE {} \
             ORDER BY created_at DESC, id DESC LIMIT ?",
            conditions.join(" AND ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let requests = stmt
            .query_map(params_from_iter(values), Self::row_to_request)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(requests)
    }

    /// Move a request to a new state.
    ///
    /// Returns `true` if a request was updated, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_request_status(&self, id: i64, status: RequestStatus) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE blood_requests SET request_status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if affected > 0 {
            info!("Blood request {} is now {}", id, status);
        }
        Ok(affected > 0)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_users: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let total_requests: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM blood_requests", [], |row| row.get(0))?;
        let pending_requests: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM blood_requests WHERE request_status = ?1",
            [RequestStatus::Pending.as_str()],
            |row| row.get(0),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_users,
            total_requests,
            pending_requests,
            db_size_bytes,
        })
    }

    fn row_to_donor(row: &rusqlite::Row) -> rusqlite::Result<Donor> {
        Ok(Donor {
            id: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            location: row.get(3)?,
            blood_group: row.get(4)?,
        })
    }

    fn row_to_request(row: &rusqlite::Row) -> rusqlite::Result<BloodRequest> {
        let status_str: String = row.get(9)?;
        let created_at_str: String = row.get(10)?;

        let request_status: RequestStatus = status_str.parse().unwrap_or_else(|_| {
            warn!("Unknown request status: {}, defaulting to Pending", status_str);
            RequestStatus::Pending
        });
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        Ok(BloodRequest {
            id: row.get(0)?,
            requester_id: row.get(1)?,
            name: row.get(2)?,
            blood_group: row.get(3)?,
            location: row.get(4)?,
            address: row.get(5)?,
            phone: row.get(6)?,
            note: row.get(7)?,
            urgency_level: row.get(8)?,
            request_status,
            created_at,
        })
    }
}

impl DonorDirectory for Storage {
    fn request_by_id(&self, id: i64) -> Result<Option<BloodRequest>> {
        self.get_request(id)
    }

    fn donors_by_groups_excluding(
        &self,
        groups: &[BloodGroup],
        exclude_user_id: i64,
    ) -> Result<Vec<Donor>> {
        self.find_donors(groups, exclude_user_id)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Registered users.
    pub total_users: i64,
    /// Blood requests in any state.
    pub total_requests: i64,
    /// Blood requests still pending.
    pub pending_requests: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn new_donor(name: &str, group: &str, location: &str) -> NewDonor {
        NewDonor {
            name: name.to_string(),
            phone: Some("555-0101".to_string()),
            blood_group: Some(group.to_string()),
            location: Some(location.to_string()),
            ..NewDonor::default()
        }
    }

    fn new_request(requester_id: i64, group: &str, location: &str) -> NewBloodRequest {
        NewBloodRequest {
            requester_id,
            name: "Patient".to_string(),
            blood_group: group.to_string(),
            location: location.to_string(),
            address: "City Hospital".to_string(),
            phone: "555-0100".to_string(),
            note: Some("Surgery on Friday".to_string()),
            urgency_level: "High".to_string(),
        }
    }

    #[test]
    fn test_open_in_memory() {
        assert!(Storage::open_in_memory().is_ok());
    }

    #[test]
    fn test_insert_and_get_donor() {
        let storage = create_test_storage();
        let id = storage
            .insert_donor(&new_donor("Priya", "B+", "Mumbai"))
            .unwrap();

        let donor = storage.get_donor(id).unwrap().unwrap();
        assert_eq!(donor.name, "Priya");
        assert_eq!(donor.blood_group.as_deref(), Some("B+"));
        assert_eq!(donor.location.as_deref(), Some("Mumbai"));
    }

    #[test]
    fn test_get_donor_nonexistent() {
        let storage = create_test_storage();
        assert!(storage.get_donor(99999).unwrap().is_none());
    }

    #[test]
    fn test_insert_donor_duplicate_email_is_case_insensitive() {
        let storage = create_test_storage();
        let mut first = new_donor("Priya", "B+", "Mumbai");
        first.email = Some("Priya@Example.com".to_string());
        storage.insert_donor(&first).unwrap();

        let mut second = new_donor("Other Priya", "O+", "Pune");
        second.email = Some("priya@example.com".to_string());
        let err = storage.insert_donor(&second).unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(ref e) if e == "priya@example.com"));
    }

    #[test]
    fn test_insert_donor_without_email_allows_many() {
        let storage = create_test_storage();
        storage.insert_donor(&new_donor("A", "O+", "Pune")).unwrap();
        storage.insert_donor(&new_donor("B", "O+", "Pune")).unwrap();
        assert_eq!(storage.stats().unwrap().total_users, 2);
    }

    #[test]
    fn test_find_donors_filters_group_and_requester() {
        let storage = create_test_storage();
        let requester = storage.insert_donor(&new_donor("Req", "O-", "Pune")).unwrap();
        let o_neg = storage.insert_donor(&new_donor("ON", "O-", "Pune")).unwrap();
        storage.insert_donor(&new_donor("AP", "A+", "Pune")).unwrap();
        let o_pos = storage.insert_donor(&new_donor("OP", "O+", "Pune")).unwrap();

        let donors = storage
            .find_donors(&[BloodGroup::OPos, BloodGroup::ONeg], requester)
            .unwrap();
        let ids: Vec<i64> = donors.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![o_neg, o_pos]);
    }

    #[test]
    fn test_insert_donor_canonicalizes_blood_group() {
        let storage = create_test_storage();
        let lower = storage.insert_donor(&new_donor("Lower", "o-", "Pune")).unwrap();
        let padded = storage.insert_donor(&new_donor("Padded", " O- ", "Pune")).unwrap();

        let stored = storage.get_donor(lower).unwrap().unwrap();
        assert_eq!(stored.blood_group.as_deref(), Some("O-"));

        let ids: Vec<i64> = storage
            .find_donors(&[BloodGroup::ONeg], 0)
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![lower, padded]);
    }

    #[test]
    fn test_lowercase_donor_group_joins_match() {
        let storage = create_test_storage();
        let requester = storage.insert_donor(&new_donor("Req", "O-", "Pune")).unwrap();
        let donor = storage.insert_donor(&new_donor("Lower", "o-", "Pune")).unwrap();
        let request_id = storage
            .insert_request(&new_request(requester, "O-", "Pune"))
            .unwrap();

        let outcome =
            crate::matching::match_donors(&storage, request_id, crate::MatchOptions::default())
                .unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].donor.id, donor);
        assert_eq!(outcome.matches[0].score, 0);
    }

    #[test]
    fn test_find_donors_empty_groups() {
        let storage = create_test_storage();
        storage.insert_donor(&new_donor("ON", "O-", "Pune")).unwrap();
        assert!(storage.find_donors(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_find_donors_skips_users_without_group() {
        let storage = create_test_storage();
        storage
            .insert_donor(&NewDonor {
                name: "No group".to_string(),
                ..NewDonor::default()
            })
            .unwrap();
        assert!(storage
            .find_donors(&BloodGroup::ALL, 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_insert_and_get_request() {
        let storage = create_test_storage();
        let id = storage
            .insert_request(&new_request(3, "AB-", "Kolkata"))
            .unwrap();

        let request = storage.get_request(id).unwrap().unwrap();
        assert_eq!(request.requester_id, 3);
        assert_eq!(request.blood_group, "AB-");
        assert_eq!(request.urgency_level, "High");
        assert_eq!(request.note.as_deref(), Some("Surgery on Friday"));
        assert_eq!(request.request_status, RequestStatus::Pending);
    }

    #[test]
    fn test_get_request_nonexistent() {
        let storage = create_test_storage();
        assert!(storage.get_request(42).unwrap().is_none());
    }

    #[test]
    fn test_request_keeps_unrecognized_labels() {
        let storage = create_test_storage();
        let mut request = new_request(1, "Z+", "Kolkata");
        request.urgency_level = "Critical".to_string();
        let id = storage.insert_request(&request).unwrap();

        let stored = storage.get_request(id).unwrap().unwrap();
        assert_eq!(stored.blood_group, "Z+");
        assert_eq!(stored.urgency_level, "Critical");
        assert_eq!(stored.urgency(), None);
    }

    #[test]
    fn test_list_requests_defaults_to_pending() {
        let storage = create_test_storage();
        let open = storage.insert_request(&new_request(1, "A+", "Pune")).unwrap();
        let done = storage.insert_request(&new_request(1, "A+", "Pune")).unwrap();
        storage
            .update_request_status(done, RequestStatus::Fulfilled)
            .unwrap();

        let pending = storage.list_requests(&RequestFilter::default(), 10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, open);

        let fulfilled = storage
            .list_requests(
                &RequestFilter {
                    status: RequestStatus::Fulfilled,
                    ..RequestFilter::default()
                },
                10,
            )
            .unwrap();
        assert_eq!(fulfilled.len(), 1);
        assert_eq!(fulfilled[0].id, done);
    }

    #[test]
    fn test_list_requests_filters_and_orders_newest_first() {
        let storage = create_test_storage();
        let first = storage.insert_request(&new_request(1, "A+", "Pune")).unwrap();
        storage.insert_request(&new_request(1, "B+", "Pune")).unwrap();
        storage.insert_request(&new_request(1, "A+", "Delhi")).unwrap();
        let last = storage.insert_request(&new_request(1, "A+", "Pune")).unwrap();

        let filter = RequestFilter {
            blood_group: Some("A+".to_string()),
            location: Some("Pune".to_string()),
            ..RequestFilter::default()
        };
        let ids: Vec<i64> = storage
            .list_requests(&filter, 10)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![last, first]);
    }

    #[test]
    fn test_list_requests_location_ignores_case() {
        let storage = create_test_storage();
        let id = storage.insert_request(&new_request(1, "A+", "Pune")).unwrap();
        storage.insert_request(&new_request(1, "A+", "Delhi")).unwrap();

        let filter = RequestFilter {
            location: Some("PUNE".to_string()),
            ..RequestFilter::default()
        };
        let requests = storage.list_requests(&filter, 10).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, id);
    }

    #[test]
    fn test_list_requests_respects_limit() {
        let storage = create_test_storage();
        for _ in 0..5 {
            storage.insert_request(&new_request(1, "O+", "Pune")).unwrap();
        }
        assert_eq!(
            storage
                .list_requests(&RequestFilter::default(), 2)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_update_request_status_nonexistent() {
        let storage = create_test_storage();
        assert!(!storage
            .update_request_status(7, RequestStatus::Cancelled)
            .unwrap());
    }

    #[test]
    fn test_stats() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.db_size_bytes, 0);

        let user = storage.insert_donor(&new_donor("A", "O+", "Pune")).unwrap();
        let req = storage.insert_request(&new_request(user, "O+", "Pune")).unwrap();
        storage.insert_request(&new_request(user, "O+", "Pune")).unwrap();
        storage
            .update_request_status(req, RequestStatus::Cancelled)
            .unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.pending_requests, 1);
    }

    #[test]
    fn test_directory_impl_delegates() {
        let storage = create_test_storage();
        let requester = storage.insert_donor(&new_donor("Req", "A+", "Pune")).unwrap();
        let donor = storage.insert_donor(&new_donor("Don", "A+", "Pune")).unwrap();
        let id = storage
            .insert_request(&new_request(requester, "A+", "Pune"))
            .unwrap();

        let directory: &dyn DonorDirectory = &storage;
        assert_eq!(directory.request_by_id(id).unwrap().unwrap().id, id);
        let donors = directory
            .donors_by_groups_excluding(&[BloodGroup::APos], requester)
            .unwrap();
        assert_eq!(donors.len(), 1);
        assert_eq!(donors[0].id, donor);
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_file_based_persists() {
        let db_path = std::env::temp_dir().join(format!("bloodmatch_test_{}.db", std::process::id()));

        {
            let storage = Storage::open(&db_path).unwrap();
            storage.insert_donor(&new_donor("Kept", "O-", "Pune")).unwrap();
            assert_eq!(storage.path(), db_path);
        }

        let reopened = Storage::open(&db_path).unwrap();
        assert_eq!(reopened.stats().unwrap().total_users, 1);

        drop(reopened);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("bloodmatch_dirs_{}", std::process::id()));
        let nested_path = root.join("nested/db.sqlite");
        let _ = std::fs::remove_dir_all(&root);

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(storage);
        let _ = std::fs::remove_dir_all(&root);
    }
}
