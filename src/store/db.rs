//! SQLite persistence for documents, suggestions and the change ledger.

use std::path::Path;

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::config::Config;
use crate::error::{CopydeskError, Result};
use crate::revision::groups::ChangeGroup;
use crate::revision::ledger::{Change, ChangeStatus, ChangeType};
use crate::revision::suggestion::{Suggestion, SuggestionStatus};
use crate::utils::{debug_log, unix_now};

/// Current schema version (must match MIGRATIONS.len())
const SCHEMA_VERSION: usize = 2;

/// Each migration upgrades the schema by one version; the migration at
/// index N upgrades from version N to N+1.
const MIGRATIONS: &[&str] = &[
    // Migration 0 -> 1: documents and suggestion review
    r#"
    CREATE TABLE documents (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        revision INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE TABLE suggestions (
        id TEXT PRIMARY KEY NOT NULL,
        document_id TEXT NOT NULL REFERENCES documents(id),
        base_revision INTEGER NOT NULL,
        instruction TEXT,
        change_groups TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'accepted', 'rejected')),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX idx_suggestions_document_status
        ON suggestions(document_id, status);
    "#,
    // Migration 1 -> 2: manual change ledger
    r#"
    CREATE TABLE changes (
        id TEXT PRIMARY KEY NOT NULL,
        document_id TEXT NOT NULL REFERENCES documents(id),
        change_type TEXT NOT NULL CHECK(change_type IN ('insertion', 'deletion', 'replacement')),
        start_pos INTEGER NOT NULL,
        end_pos INTEGER NOT NULL,
        new_text TEXT,
        old_text TEXT NOT NULL,
        content_snapshot TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'approved', 'rejected')),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX idx_changes_document_status
        ON changes(document_id, status);
    "#,
];

/// A stored document. `revision` counts content writes and is what
/// suggestions pin themselves against.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub revision: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Document {
    pub fn new(title: &str, content: &str) -> Self {
        let now = unix_now();
        Document {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and brings the
    /// schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            PRAGMA busy_timeout=5000;
            "#,
        )?;

        let mut db = Database { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens the database at the configured path.
    pub fn open_default() -> Result<Self> {
        Self::open(Config::get().db_path())
    }

    fn schema_version(&self) -> Option<usize> {
        self.conn
            .query_row(
                "SELECT value FROM schema_metadata WHERE key = 'version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .ok()
            .and_then(|v| v.parse().ok())
    }

    /// Initialize schema and handle migrations. This is the only place
    /// schema changes are made; a partially migrated database is fatal.
    fn initialize_schema(&mut self) -> Result<()> {
        // Fast path: already at the current version.
        if let Some(version) = self.schema_version() {
            if version == SCHEMA_VERSION {
                return Ok(());
            }
            if version > SCHEMA_VERSION {
                return Err(CopydeskError::Generic(format!(
                    "database schema version {} is newer than supported version {}; \
                     upgrade copydesk to the latest version",
                    version, SCHEMA_VERSION
                )));
            }
        }

        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_metadata (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )?;

        let current = self.schema_version().unwrap_or(0);
        for from_version in current..SCHEMA_VERSION {
            debug_log(&format!(
                "migrating database from version {} to {}",
                from_version,
                from_version + 1
            ));
            let tx = self.conn.transaction()?;
            tx.execute_batch(MIGRATIONS[from_version])?;
            tx.execute(
                "INSERT INTO schema_metadata (key, value) VALUES ('version', ?1)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![(from_version + 1).to_string()],
            )?;
            tx.commit()?;
        }

        Ok(())
    }

    // --- documents ---

    pub fn insert_document(&self, doc: &Document) -> Result<()> {
        self.conn.execute(
            "INSERT INTO documents (id, title, content, revision, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                doc.id,
                doc.title,
                doc.content,
                doc.revision as i64,
                doc.created_at,
                doc.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let result = self.conn.query_row(
            "SELECT id, title, content, revision, created_at, updated_at
             FROM documents WHERE id = ?1",
            params![id],
            row_to_document,
        );
        match result {
            Ok(doc) => Ok(Some(doc)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, revision, created_at, updated_at
             FROM documents ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_document)?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?);
        }
        Ok(docs)
    }

    /// Replaces a document's content, bumping its revision. Returns the
    /// updated row.
    pub fn update_document_content(&mut self, id: &str, content: &str) -> Result<Document> {
        let now = unix_now();
        let tx = self.conn.transaction()?;
        let affected = tx.execute(
            "UPDATE documents SET content = ?1, revision = revision + 1, updated_at = ?2
             WHERE id = ?3",
            params![content, now, id],
        )?;
        if affected == 0 {
            return Err(CopydeskError::NotFound(format!("document {}", id)));
        }
        let doc = tx.query_row(
            "SELECT id, title, content, revision, created_at, updated_at
             FROM documents WHERE id = ?1",
            params![id],
            row_to_document,
        )?;
        tx.commit()?;
        Ok(doc)
    }

    /// Deletes a document along with its suggestions and ledger entries.
    /// Returns false when the document did not exist.
    pub fn delete_document(&mut self, id: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM suggestions WHERE document_id = ?1",
            params![id],
        )?;
        tx.execute("DELETE FROM changes WHERE document_id = ?1", params![id])?;
        let affected = tx.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(affected > 0)
    }

    // --- suggestions ---

    pub fn insert_suggestion(&self, suggestion: &Suggestion) -> Result<()> {
        let groups_json = serde_json::to_string(&suggestion.groups)?;
        self.conn.execute(
            "INSERT INTO suggestions (
                id, document_id, base_revision, instruction,
                change_groups, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                suggestion.id,
                suggestion.document_id,
                suggestion.base_revision as i64,
                suggestion.instruction,
                groups_json,
                suggestion.status.as_str(),
                suggestion.created_at,
                suggestion.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_suggestion(&self, id: &str) -> Result<Option<Suggestion>> {
        let result = self.conn.query_row(
            "SELECT id, document_id, base_revision, instruction,
                    change_groups, status, created_at, updated_at
             FROM suggestions WHERE id = ?1",
            params![id],
            row_to_suggestion,
        );
        match result {
            Ok(suggestion) => Ok(Some(suggestion)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persists group decisions and aggregate status for an existing
    /// suggestion.
    pub fn update_suggestion(&self, suggestion: &Suggestion) -> Result<()> {
        let groups_json = serde_json::to_string(&suggestion.groups)?;
        let affected = self.conn.execute(
            "UPDATE suggestions SET change_groups = ?1, status = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                groups_json,
                suggestion.status.as_str(),
                suggestion.updated_at,
                suggestion.id,
            ],
        )?;
        if affected == 0 {
            return Err(CopydeskError::NotFound(format!(
                "suggestion {}",
                suggestion.id
            )));
        }
        Ok(())
    }

    pub fn pending_suggestions_for(&self, document_id: &str) -> Result<Vec<Suggestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document_id, base_revision, instruction,
                    change_groups, status, created_at, updated_at
             FROM suggestions WHERE document_id = ?1 AND status = 'pending'
             ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![document_id], row_to_suggestion)?;

        let mut suggestions = Vec::new();
        for row in rows {
            suggestions.push(row?);
        }
        Ok(suggestions)
    }

    pub fn suggestions_for_document(&self, document_id: &str) -> Result<Vec<Suggestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document_id, base_revision, instruction,
                    change_groups, status, created_at, updated_at
             FROM suggestions WHERE document_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![document_id], row_to_suggestion)?;

        let mut suggestions = Vec::new();
        for row in rows {
            suggestions.push(row?);
        }
        Ok(suggestions)
    }

    /// Writes an accepted suggestion and the merged document content in
    /// one transaction, bumping the document revision.
    pub fn finalize_accepted_suggestion(
        &mut self,
        suggestion: &Suggestion,
        new_content: &str,
    ) -> Result<Document> {
        let groups_json = serde_json::to_string(&suggestion.groups)?;
        let now = unix_now();
        let tx = self.conn.transaction()?;
        let affected = tx.execute(
            "UPDATE suggestions SET change_groups = ?1, status = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                groups_json,
                suggestion.status.as_str(),
                suggestion.updated_at,
                suggestion.id,
            ],
        )?;
        if affected == 0 {
            return Err(CopydeskError::NotFound(format!(
                "suggestion {}",
                suggestion.id
            )));
        }
        let affected = tx.execute(
            "UPDATE documents SET content = ?1, revision = revision + 1, updated_at = ?2
             WHERE id = ?3",
            params![new_content, now, suggestion.document_id],
        )?;
        if affected == 0 {
            return Err(CopydeskError::NotFound(format!(
                "document {}",
                suggestion.document_id
            )));
        }
        let doc = tx.query_row(
            "SELECT id, title, content, revision, created_at, updated_at
             FROM documents WHERE id = ?1",
            params![suggestion.document_id],
            row_to_document,
        )?;
        tx.commit()?;
        Ok(doc)
    }

    // --- change ledger ---

    pub fn insert_change(&self, change: &Change) -> Result<()> {
        self.conn.execute(
            "INSERT INTO changes (
                id, document_id, change_type, start_pos, end_pos,
                new_text, old_text, content_snapshot, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                change.id,
                change.document_id,
                change.change_type.as_str(),
                change.start_pos as i64,
                change.end_pos as i64,
                change.new_text,
                change.old_text,
                change.content_snapshot,
                change.status.as_str(),
                change.created_at,
                change.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_change(&self, id: &str) -> Result<Option<Change>> {
        let result = self.conn.query_row(
            "SELECT id, document_id, change_type, start_pos, end_pos,
                    new_text, old_text, content_snapshot, status,
                    created_at, updated_at
             FROM changes WHERE id = ?1",
            params![id],
            row_to_change,
        );
        match result {
            Ok(change) => Ok(Some(change)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_change(&self, change: &Change) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE changes SET start_pos = ?1, end_pos = ?2, new_text = ?3,
                    status = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                change.start_pos as i64,
                change.end_pos as i64,
                change.new_text,
                change.status.as_str(),
                change.updated_at,
                change.id,
            ],
        )?;
        if affected == 0 {
            return Err(CopydeskError::NotFound(format!("change {}", change.id)));
        }
        Ok(())
    }

    pub fn changes_for_document(&self, document_id: &str) -> Result<Vec<Change>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, document_id, change_type, start_pos, end_pos,
                    new_text, old_text, content_snapshot, status,
                    created_at, updated_at
             FROM changes WHERE document_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![document_id], row_to_change)?;

        let mut changes = Vec::new();
        for row in rows {
            changes.push(row?);
        }
        Ok(changes)
    }

    /// Writes an approved change and the spliced document content in one
    /// transaction, bumping the document revision.
    pub fn commit_change_approval(
        &mut self,
        change: &Change,
        new_content: &str,
    ) -> Result<Document> {
        let now = unix_now();
        let tx = self.conn.transaction()?;
        let affected = tx.execute(
            "UPDATE changes SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![change.status.as_str(), change.updated_at, change.id],
        )?;
        if affected == 0 {
            return Err(CopydeskError::NotFound(format!("change {}", change.id)));
        }
        let affected = tx.execute(
            "UPDATE documents SET content = ?1, revision = revision + 1, updated_at = ?2
             WHERE id = ?3",
            params![new_content, now, change.document_id],
        )?;
        if affected == 0 {
            return Err(CopydeskError::NotFound(format!(
                "document {}",
                change.document_id
            )));
        }
        let doc = tx.query_row(
            "SELECT id, title, content, revision, created_at, updated_at
             FROM documents WHERE id = ?1",
            params![change.document_id],
            row_to_document,
        )?;
        tx.commit()?;
        Ok(doc)
    }
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        revision: row.get::<_, i64>(3)? as u64,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_suggestion(row: &rusqlite::Row<'_>) -> rusqlite::Result<Suggestion> {
    let groups_json: String = row.get(4)?;
    let groups: Vec<ChangeGroup> = serde_json::from_str(&groups_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let status_str: String = row.get(5)?;
    let status = SuggestionStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown suggestion status {:?}", status_str).into(),
        )
    })?;

    Ok(Suggestion {
        id: row.get(0)?,
        document_id: row.get(1)?,
        base_revision: row.get::<_, i64>(2)? as u64,
        instruction: row.get(3)?,
        groups,
        status,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn row_to_change(row: &rusqlite::Row<'_>) -> rusqlite::Result<Change> {
    let type_str: String = row.get(2)?;
    let change_type = ChangeType::parse(&type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown change type {:?}", type_str).into(),
        )
    })?;

    let status_str: String = row.get(8)?;
    let status = ChangeStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            8,
            rusqlite::types::Type::Text,
            format!("unknown change status {:?}", status_str).into(),
        )
    })?;

    Ok(Change {
        id: row.get(0)?,
        document_id: row.get(1)?,
        change_type,
        start_pos: row.get::<_, i64>(3)? as usize,
        end_pos: row.get::<_, i64>(4)? as usize,
        new_text: row.get(5)?,
        old_text: row.get(6)?,
        content_snapshot: row.get(7)?,
        status,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::groups::compute_change_groups;
    use tempfile::TempDir;

    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(&temp_dir.path().join("test.db")).unwrap();
        (db, temp_dir)
    }

    fn sample_suggestion(doc: &Document, proposed: &str) -> Suggestion {
        let groups = compute_change_groups(&doc.content, proposed);
        Suggestion::new(&doc.id, doc.revision, None, groups)
    }

    #[test]
    fn test_initialize_schema() {
        let (db, _temp_dir) = create_test_db();

        let count: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('documents', 'suggestions', 'changes')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);

        let version: String = db
            .conn
            .query_row(
                "SELECT value FROM schema_metadata WHERE key = 'version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, "2");
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.db");

        let db = Database::open(&path).unwrap();
        let doc = Document::new("Notes", "hello");
        db.insert_document(&doc).unwrap();
        drop(db);

        let db = Database::open(&path).unwrap();
        let fetched = db.get_document(&doc.id).unwrap().unwrap();
        assert_eq!(fetched.content, "hello");
    }

    #[test]
    fn test_document_roundtrip() {
        let (db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "The cat sat on the mat.");
        db.insert_document(&doc).unwrap();

        let fetched = db.get_document(&doc.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Draft");
        assert_eq!(fetched.content, "The cat sat on the mat.");
        assert_eq!(fetched.revision, 0);

        assert!(db.get_document("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_update_content_bumps_revision() {
        let (mut db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "v0");
        db.insert_document(&doc).unwrap();

        let updated = db.update_document_content(&doc.id, "v1").unwrap();
        assert_eq!(updated.revision, 1);
        assert_eq!(updated.content, "v1");

        let updated = db.update_document_content(&doc.id, "v2").unwrap();
        assert_eq!(updated.revision, 2);
    }

    #[test]
    fn test_delete_document_cascades() {
        let (mut db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "The cat sat on the mat.");
        db.insert_document(&doc).unwrap();
        let suggestion = sample_suggestion(&doc, "The dog sat on the mat.");
        db.insert_suggestion(&suggestion).unwrap();

        assert!(db.delete_document(&doc.id).unwrap());
        assert!(db.get_document(&doc.id).unwrap().is_none());
        assert!(db.get_suggestion(&suggestion.id).unwrap().is_none());

        assert!(!db.delete_document(&doc.id).unwrap());
    }

    #[test]
    fn test_suggestion_roundtrip() {
        let (db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "The cat sat on the mat.");
        db.insert_document(&doc).unwrap();

        let mut suggestion = sample_suggestion(&doc, "The dog sat on the mat quickly.");
        suggestion.instruction = Some("make it livelier".to_string());
        db.insert_suggestion(&suggestion).unwrap();

        let fetched = db.get_suggestion(&suggestion.id).unwrap().unwrap();
        assert_eq!(fetched.document_id, doc.id);
        assert_eq!(fetched.base_revision, 0);
        assert_eq!(fetched.instruction.as_deref(), Some("make it livelier"));
        assert_eq!(fetched.groups.len(), 2);
        assert_eq!(fetched.status, SuggestionStatus::Pending);
    }

    #[test]
    fn test_update_suggestion_persists_decisions() {
        let (db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "The cat sat on the mat.");
        db.insert_document(&doc).unwrap();
        let mut suggestion = sample_suggestion(&doc, "The dog sat on the mat.");
        db.insert_suggestion(&suggestion).unwrap();

        suggestion.accept_group(0).unwrap();
        db.update_suggestion(&suggestion).unwrap();

        let fetched = db.get_suggestion(&suggestion.id).unwrap().unwrap();
        assert!(fetched.is_fully_resolved());
        assert_eq!(fetched.status, SuggestionStatus::Pending);
    }

    #[test]
    fn test_pending_filter() {
        let (db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "The cat sat on the mat.");
        db.insert_document(&doc).unwrap();

        let mut first = sample_suggestion(&doc, "The dog sat on the mat.");
        first.reject_all_pending().unwrap();
        db.insert_suggestion(&first).unwrap();

        let second = sample_suggestion(&doc, "The fox sat on the mat.");
        db.insert_suggestion(&second).unwrap();

        let pending = db.pending_suggestions_for(&doc.id).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);

        let all = db.suggestions_for_document(&doc.id).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_finalize_accepted_suggestion() {
        let (mut db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "The cat sat on the mat.");
        db.insert_document(&doc).unwrap();
        let mut suggestion = sample_suggestion(&doc, "The dog sat on the mat.");
        db.insert_suggestion(&suggestion).unwrap();

        suggestion.accept_all_pending().unwrap();
        let merged = suggestion.preview_content(&doc.content).unwrap();
        let updated = db.finalize_accepted_suggestion(&suggestion, &merged).unwrap();

        assert_eq!(updated.content, "The dog sat on the mat.");
        assert_eq!(updated.revision, 1);

        let fetched = db.get_suggestion(&suggestion.id).unwrap().unwrap();
        assert_eq!(fetched.status, SuggestionStatus::Accepted);
    }

    #[test]
    fn test_change_roundtrip() {
        let (db, _temp_dir) = create_test_db();

        let doc = Document::new("Draft", "ABCDE");
        db.insert_document(&doc).unwrap();

        let change = Change::new(
            &doc.id,
            ChangeType::Insertion,
            2,
            2,
            Some("X".to_string()),
            String::new(),
            &doc.content,
        );
        db.insert_change(&change).unwrap();

        let fetched = db.get_change(&change.id).unwrap().unwrap();
        assert_eq!(fetched.change_type, ChangeType::Insertion);
        assert_eq!(fetched.start_pos, 2);
        assert_eq!(fetched.new_text.as_deref(), Some("X"));
        assert_eq!(fetched.content_snapshot, "ABCDE");
        assert_eq!(fetched.status, ChangeStatus::Pending);

        let listed = db.changes_for_document(&doc.id).unwrap();
        assert_eq!(listed.len(), 1);
    }
}
