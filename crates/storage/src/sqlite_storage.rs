//! SQLite storage backend for WorkTrack.
//!
//! Comments are stored as JSON documents; revisions live in an append-only
//! table whose `AUTOINCREMENT` sequence is the ordering key. No statement in
//! this module updates or deletes a revision row.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, Sqlite, Transaction};
use tracing::debug;
use worktrack_core::{Comment, CommentId, IdentityId, Revision, RevisionType};

use super::trait_::{CommentStore, Result, RevisionStore, StorageError};

/// SQLite storage implementation.
#[derive(Clone)]
pub struct SqliteStorage {
    /// Database connection pool
    pool: sqlx::SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance from a database URL or path.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Database)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Create a new SQLite storage instance from a file path.
    pub async fn new_from_path(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Create an in-memory SQLite storage for testing.
    ///
    /// A single pooled connection keeps the shared in-memory database alive.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Initialize the database schema.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS comment_revisions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                comment_id TEXT NOT NULL,
                data TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_comment_revisions_comment
             ON comment_revisions(comment_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Check if the database is healthy.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    /// Load a comment inside an open transaction, or fail with `NotFound`.
    async fn load_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        id: CommentId,
    ) -> Result<Comment> {
        let row = sqlx::query("SELECT data FROM comments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("comment {id}")))?;
        let data: String = row.try_get("data")?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Append one revision row inside an open transaction.
    async fn append_revision(
        tx: &mut Transaction<'_, Sqlite>,
        revision: &Revision,
    ) -> Result<()> {
        let data = serde_json::to_string(revision)?;
        sqlx::query("INSERT INTO comment_revisions (comment_id, data) VALUES (?, ?)")
            .bind(revision.comment_id.to_string())
            .bind(data)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CommentStore for SqliteStorage {
    async fn create(&self, comment: &Comment, creator: IdentityId) -> Result<()> {
        debug!(comment_id = %comment.id, %creator, "creating comment");
        let data = serde_json::to_string(comment)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO comments (id, data, created_at, updated_at)
            VALUES (?, ?, ?, ?)",
        )
        .bind(comment.id.to_string())
        .bind(data)
        .bind(comment.created_at.to_rfc3339())
        .bind(comment.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let revision = Revision::snapshot(RevisionType::Create, comment, creator);
        Self::append_revision(&mut tx, &revision).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn save(&self, comment: &Comment, modifier: IdentityId) -> Result<Comment> {
        debug!(comment_id = %comment.id, %modifier, "saving comment");
        let mut tx = self.pool.begin().await?;

        // The row must be current before it can be updated.
        Self::load_in_tx(&mut tx, comment.id).await?;

        let mut updated = comment.clone();
        updated.updated_at = chrono::Utc::now();
        let data = serde_json::to_string(&updated)?;

        sqlx::query("UPDATE comments SET data = ?, updated_at = ? WHERE id = ?")
            .bind(data)
            .bind(updated.updated_at.to_rfc3339())
            .bind(updated.id.to_string())
            .execute(&mut *tx)
            .await?;

        // The snapshot is the post-update state, taken in the same
        // transaction as the entity write.
        let revision = Revision::snapshot(RevisionType::Update, &updated, modifier);
        Self::append_revision(&mut tx, &revision).await?;
        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: CommentId, modifier: IdentityId) -> Result<()> {
        debug!(comment_id = %id, %modifier, "deleting comment");
        let mut tx = self.pool.begin().await?;

        let last_known = Self::load_in_tx(&mut tx, id).await?;

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        let revision = Revision::deletion(&last_known, modifier);
        Self::append_revision(&mut tx, &revision).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn load(&self, id: CommentId) -> Result<Option<Comment>> {
        let row = sqlx::query("SELECT data FROM comments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: String = row.try_get("data")?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RevisionStore for SqliteStorage {
    async fn list(&self, comment_id: CommentId) -> Result<Vec<Revision>> {
        let rows = sqlx::query(
            "SELECT data FROM comment_revisions WHERE comment_id = ? ORDER BY seq ASC",
        )
        .bind(comment_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let data: String = row.try_get("data")?;
                Ok(serde_json::from_str(&data)?)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worktrack_core::{Markup, WorkItemId};

    #[tokio::test]
    async fn store_comment_revisions() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let creator = IdentityId::new();
        let editor = IdentityId::new();
        let remover = IdentityId::new();

        // given a comment
        let comment = Comment::new(WorkItemId::new(), "B0", Markup::Markdown, creator);
        storage.create(&comment, creator).await.unwrap();

        // modify the comment
        let mut comment = comment;
        comment.body = "B1".to_string();
        comment.markup = Markup::PlainText;
        let comment = storage.save(&comment, editor).await.unwrap();

        // modify again
        let mut comment = comment;
        comment.body = "B2".to_string();
        comment.markup = Markup::Markdown;
        let comment = storage.save(&comment, editor).await.unwrap();

        // delete the comment
        storage.delete(comment.id, remover).await.unwrap();

        // when
        let revisions = storage.list(comment.id).await.unwrap();

        // then
        assert_eq!(revisions.len(), 4);

        let rev = &revisions[0];
        assert_eq!(rev.comment_id, comment.id);
        assert_eq!(rev.comment_work_item_id, comment.work_item_id);
        assert_eq!(rev.revision_type, RevisionType::Create);
        assert_eq!(rev.comment_body.as_deref(), Some("B0"));
        assert_eq!(rev.comment_markup, Some(Markup::Markdown));
        assert_eq!(rev.modifier_id, creator);

        let rev = &revisions[1];
        assert_eq!(rev.revision_type, RevisionType::Update);
        assert_eq!(rev.comment_body.as_deref(), Some("B1"));
        assert_eq!(rev.comment_markup, Some(Markup::PlainText));
        assert_eq!(rev.modifier_id, editor);

        let rev = &revisions[2];
        assert_eq!(rev.revision_type, RevisionType::Update);
        assert_eq!(rev.comment_body.as_deref(), Some("B2"));
        assert_eq!(rev.comment_markup, Some(Markup::Markdown));
        assert_eq!(rev.modifier_id, editor);

        let rev = &revisions[3];
        assert_eq!(rev.revision_type, RevisionType::Delete);
        assert!(rev.comment_body.is_none());
        assert!(rev.comment_markup.is_none());
        assert_eq!(rev.modifier_id, remover);
    }

    #[tokio::test]
    async fn store_child_comment_revisions() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let creator = IdentityId::new();
        let editor = IdentityId::new();
        let remover = IdentityId::new();

        // a parent comment, then a child replying to it
        let parent = Comment::new(WorkItemId::new(), "root", Markup::Markdown, creator);
        storage.create(&parent, creator).await.unwrap();

        let child = Comment::reply_to(&parent, "leaf", Markup::PlainText, creator);
        storage.create(&child, creator).await.unwrap();

        let mut child = child;
        child.body = "leaf, edited".to_string();
        let child = storage.save(&child, editor).await.unwrap();

        storage.delete(child.id, remover).await.unwrap();

        // every child revision carries the parent linkage as of its snapshot
        let revisions = storage.list(child.id).await.unwrap();
        assert_eq!(revisions.len(), 3);
        for rev in &revisions {
            assert_eq!(rev.comment_parent_comment_id, Some(parent.id));
        }

        // top-level comment revisions carry no parent linkage
        let revisions = storage.list(parent.id).await.unwrap();
        assert_eq!(revisions.len(), 1);
        assert!(revisions[0].comment_parent_comment_id.is_none());
    }

    #[tokio::test]
    async fn unchanged_save_still_appends_a_revision() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let author = IdentityId::new();

        let comment = Comment::new(WorkItemId::new(), "same", Markup::PlainText, author);
        storage.create(&comment, author).await.unwrap();
        storage.save(&comment, author).await.unwrap();

        let revisions = storage.list(comment.id).await.unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[1].revision_type, RevisionType::Update);
        assert_eq!(revisions[1].comment_body.as_deref(), Some("same"));
    }

    #[tokio::test]
    async fn list_unknown_comment_is_empty() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let revisions = storage.list(CommentId::new()).await.unwrap();
        assert!(revisions.is_empty());
    }

    #[tokio::test]
    async fn mutating_a_missing_comment_fails() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let author = IdentityId::new();
        let ghost = Comment::new(WorkItemId::new(), "ghost", Markup::PlainText, author);

        assert!(matches!(
            storage.save(&ghost, author).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.delete(ghost.id, author).await,
            Err(StorageError::NotFound(_))
        ));
        // a failed mutation leaves no trace in the audit trail
        assert!(storage.list(ghost.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleted_comment_is_no_longer_current_but_history_remains() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let author = IdentityId::new();

        let comment = Comment::new(WorkItemId::new(), "bye", Markup::PlainText, author);
        storage.create(&comment, author).await.unwrap();
        assert!(storage.load(comment.id).await.unwrap().is_some());

        storage.delete(comment.id, author).await.unwrap();
        assert!(storage.load(comment.id).await.unwrap().is_none());
        assert_eq!(storage.list(comment.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn file_backed_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worktrack.db");
        let storage = SqliteStorage::new_from_path(&path).await.unwrap();
        let author = IdentityId::new();

        let comment = Comment::new(WorkItemId::new(), "persisted", Markup::Markdown, author);
        storage.create(&comment, author).await.unwrap();

        let loaded = storage.load(comment.id).await.unwrap().unwrap();
        assert_eq!(loaded, comment);
    }

    #[tokio::test]
    async fn health_check_reports_ok() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        assert!(storage.health_check().await);
    }
}
