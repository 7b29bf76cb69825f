//! Storage trait abstraction.

use async_trait::async_trait;
use worktrack_core::{Comment, CommentId, IdentityId, Revision};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Repository operations for comments.
///
/// Every mutation appends exactly one [`Revision`] in the same transaction
/// as the entity write. There is no deduplication: an update that changes
/// nothing still produces a revision.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a new comment and record its `Create` revision.
    async fn create(&self, comment: &Comment, creator: IdentityId) -> Result<()>;

    /// Persist an updated comment and record an `Update` revision holding
    /// the post-update state. Returns the stored comment (with its bumped
    /// `updated_at`).
    async fn save(&self, comment: &Comment, modifier: IdentityId) -> Result<Comment>;

    /// Remove a comment and record a `Delete` revision. The comment ceases
    /// to be current but its history remains.
    async fn delete(&self, id: CommentId, modifier: IdentityId) -> Result<()>;

    /// Load a comment by id, `None` if it is not current.
    async fn load(&self, id: CommentId) -> Result<Option<Comment>>;
}

/// Query operations over the comment audit trail.
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// All revisions of a comment, oldest first.
    ///
    /// An unknown comment id yields an empty vec, not an error.
    async fn list(&self, comment_id: CommentId) -> Result<Vec<Revision>>;
}
