//! Document store traits and the `SQLite` implementation.
//!
//! A document — the whole node list for one partition — is read and written
//! atomically as a single JSON value; there is no field-level update. The
//! store also keeps the project records whose ids serve as project
//! partition keys.

use crate::error::{Error, Result};
use crate::id::mint_project_id;
use crate::partition::PartitionKey;
use crate::tree::models::TaskNode;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trait for document storage, keyed by partition.
///
/// An absent document is `Ok(None)` — equivalent to an empty node list,
/// never an error. Failed round trips surface as errors the caller reports;
/// there is no retry here.
#[allow(clippy::missing_errors_doc)]
pub trait DocumentStore {
    /// Fetch the node list stored for a partition.
    fn fetch_document(&self, key: &PartitionKey) -> Result<Option<Vec<TaskNode>>>;

    /// Replace the document stored for a partition with `nodes`.
    fn upsert_document(&self, key: &PartitionKey, nodes: &[TaskNode]) -> Result<()>;

    /// Delete the document stored for a partition.
    ///
    /// Returns whether a document existed.
    fn delete_document(&self, key: &PartitionKey) -> Result<bool>;
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    /// Actively worked on (default).
    #[default]
    Active,
    /// Paused.
    OnHold,
    /// Finished.
    Completed,
    /// Kept for reference only.
    Archived,
}

impl ProjectStatus {
    /// Parse a status from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> std::result::Result<Self, InvalidProjectStatus> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "on-hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(InvalidProjectStatus(s.to_string())),
        }
    }

    /// Get the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid project status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProjectStatus(pub String);

impl std::fmt::Display for InvalidProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid project status: '{}' (must be one of: active, on-hold, completed, archived)",
            self.0
        )
    }
}

impl std::error::Error for InvalidProjectStatus {}

/// A project record. The record's id doubles as the project's partition
/// key; its task tree is stored as a document like any date's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Unique identifier (slug from name + 4 random hex chars).
    pub id: String,
    /// Project name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Date work started, if scheduled.
    pub start_date: Option<NaiveDate>,
    /// Date work should finish, if scheduled.
    pub target_date: Option<NaiveDate>,
    /// ISO 8601 timestamp when the project was created.
    pub created_at: String,
    /// ISO 8601 timestamp when the project was last updated.
    pub updated_at: String,
}

/// Fields that can be updated on a project record.
#[derive(Debug, Default, Clone)]
pub struct ProjectUpdate {
    /// New name (if Some).
    pub name: Option<String>,
    /// New description (if Some).
    pub description: Option<String>,
    /// New status (if Some).
    pub status: Option<ProjectStatus>,
    /// New tags (if Some).
    pub tags: Option<Vec<String>>,
    /// New start date (if Some).
    pub start_date: Option<NaiveDate>,
    /// New target date (if Some).
    pub target_date: Option<NaiveDate>,
}

impl ProjectUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.tags.is_none()
            && self.start_date.is_none()
            && self.target_date.is_none()
    }
}

/// Trait for project record storage.
#[allow(clippy::missing_errors_doc)]
pub trait ProjectStore {
    /// List all projects, most recently updated first.
    fn list_projects(&self) -> Result<Vec<ProjectRecord>>;

    /// Get a project by id.
    fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>>;

    /// Create a new project with the given name and description.
    fn create_project(&self, name: &str, description: &str) -> Result<ProjectRecord>;

    /// Update a project's fields. Returns the updated record, or `None` if
    /// the id is unknown.
    fn update_project(&self, id: &str, update: ProjectUpdate) -> Result<Option<ProjectRecord>>;

    /// Delete a project record and its document.
    ///
    /// Returns whether a record existed.
    fn delete_project(&self, id: &str) -> Result<bool>;
}

/// `SQLite`-backed store for documents and project records.
///
/// Each operation opens a new connection to the database file. This avoids
/// thread safety issues and is acceptable for the low frequency of store
/// operations.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Path to the database file.
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a store at the configured database location.
    ///
    /// Honors the `database_path` override from the engine config, falling
    /// back to the default path under the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no database location can be determined, the
    /// config exists but cannot be parsed, or the schema cannot be
    /// initialized.
    pub fn open_default() -> Result<Self> {
        let config = crate::config::EngineConfig::load_or_default()?;
        let db_path = match config.database_path {
            Some(path) => path,
            None => crate::paths::database_path().ok_or_else(|| {
                Error::Io(std::io::Error::other("home directory not available"))
            })?,
        };
        Self::with_path(db_path)
    }

    /// Create a store with a specific database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn with_path(db_path: PathBuf) -> Result<Self> {
        let store = Self { db_path };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        // Ensure parent directory exists
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            -- One row per partition; the whole node list as JSON
            CREATE TABLE IF NOT EXISTS documents (
                partition_key TEXT PRIMARY KEY,
                tree_data TEXT NOT NULL
            );

            -- Project records; id doubles as the project partition key
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'active',
                tags TEXT NOT NULL DEFAULT '[]',
                start_date TEXT,
                target_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }
}

/// ISO 8601 timestamp for the current instant.
fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Convert a parse failure inside a row mapper into a rusqlite error.
fn conversion_failure<E>(err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_stored_date(raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(conversion_failure))
        .transpose()
}

fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRecord> {
    let status_raw: String = row.get("status")?;
    let tags_raw: String = row.get("tags")?;
    let start_raw: Option<String> = row.get("start_date")?;
    let target_raw: Option<String> = row.get("target_date")?;

    Ok(ProjectRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: ProjectStatus::from_str(&status_raw).map_err(conversion_failure)?,
        tags: serde_json::from_str(&tags_raw).map_err(conversion_failure)?,
        start_date: parse_stored_date(start_raw)?,
        target_date: parse_stored_date(target_raw)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl DocumentStore for SqliteStore {
    fn fetch_document(&self, key: &PartitionKey) -> Result<Option<Vec<TaskNode>>> {
        let conn = self.open()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT tree_data FROM documents WHERE partition_key = ?1",
                params![key.storage_key()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn upsert_document(&self, key: &PartitionKey, nodes: &[TaskNode]) -> Result<()> {
        let json = serde_json::to_string(nodes)?;
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO documents (partition_key, tree_data) VALUES (?1, ?2)
             ON CONFLICT(partition_key) DO UPDATE SET tree_data = excluded.tree_data",
            params![key.storage_key(), json],
        )?;
        Ok(())
    }

    fn delete_document(&self, key: &PartitionKey) -> Result<bool> {
        let conn = self.open()?;
        let deleted = conn.execute(
            "DELETE FROM documents WHERE partition_key = ?1",
            params![key.storage_key()],
        )?;
        Ok(deleted > 0)
    }
}

impl ProjectStore for SqliteStore {
    fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, status, tags, start_date, target_date,
                    created_at, updated_at
             FROM projects ORDER BY updated_at DESC",
        )?;
        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    fn get_project(&self, id: &str) -> Result<Option<ProjectRecord>> {
        let conn = self.open()?;
        let project = conn
            .query_row(
                "SELECT id, name, description, status, tags, start_date, target_date,
                        created_at, updated_at
                 FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    fn create_project(&self, name: &str, description: &str) -> Result<ProjectRecord> {
        let now = now_timestamp();
        let record = ProjectRecord {
            id: mint_project_id(name),
            name: name.to_string(),
            description: description.to_string(),
            status: ProjectStatus::default(),
            tags: Vec::new(),
            start_date: None,
            target_date: None,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO projects (id, name, description, status, tags,
                                   start_date, target_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.name,
                record.description,
                record.status.as_str(),
                serde_json::to_string(&record.tags)?,
                Option::<String>::None,
                Option::<String>::None,
                record.created_at,
                record.updated_at,
            ],
        )?;

        Ok(record)
    }

    fn update_project(&self, id: &str, update: ProjectUpdate) -> Result<Option<ProjectRecord>> {
        let Some(mut record) = self.get_project(id)? else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(description) = update.description {
            record.description = description;
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(tags) = update.tags {
            record.tags = tags;
        }
        if let Some(start_date) = update.start_date {
            record.start_date = Some(start_date);
        }
        if let Some(target_date) = update.target_date {
            record.target_date = Some(target_date);
        }
        record.updated_at = now_timestamp();

        let conn = self.open()?;
        conn.execute(
            "UPDATE projects SET name = ?2, description = ?3, status = ?4, tags = ?5,
                                 start_date = ?6, target_date = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                record.id,
                record.name,
                record.description,
                record.status.as_str(),
                serde_json::to_string(&record.tags)?,
                record.start_date.map(|d| d.to_string()),
                record.target_date.map(|d| d.to_string()),
                record.updated_at,
            ],
        )?;

        Ok(Some(record))
    }

    fn delete_project(&self, id: &str) -> Result<bool> {
        let conn = self.open()?;
        let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        drop(conn);

        // The project's tree goes with the record.
        self.delete_document(&PartitionKey::Project(id.to_string()))?;

        Ok(deleted > 0)
    }
}
