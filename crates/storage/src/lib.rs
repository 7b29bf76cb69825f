//! Storage abstraction and SQLite backend for WorkTrack.
//!
//! Comment mutations and their revision snapshots commit in one transaction,
//! so the audit trail can never diverge from the entity state.

#![warn(missing_docs)]

pub mod sqlite_storage;
pub mod trait_;

pub use sqlite_storage::SqliteStorage;
pub use trait_::{CommentStore, Result, RevisionStore, StorageError};
