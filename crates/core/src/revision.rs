//! Revision model - immutable audit snapshots of a comment's lifecycle.

use serde::{Deserialize, Serialize};

use crate::id::{CommentId, IdentityId, RevisionId, WorkItemId};
use crate::{Comment, Markup, Time};

/// Classification of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionType {
    /// The comment was created
    Create,
    /// The comment was updated
    Update,
    /// The comment was deleted
    Delete,
}

/// A point-in-time snapshot of a comment, recorded at one lifecycle
/// transition.
///
/// Once written a revision is never mutated or deleted. A `Delete` revision
/// carries no body and no markup: the absence of content is the delete
/// marker, not an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Unique identifier
    pub id: RevisionId,

    /// What transition this revision records
    pub revision_type: RevisionType,

    /// Identity that performed the transition
    pub modifier_id: IdentityId,

    /// When the transition happened
    pub time: Time,

    /// The comment this revision belongs to
    pub comment_id: CommentId,

    /// The work item the comment belonged to at snapshot time
    pub comment_work_item_id: WorkItemId,

    /// Comment body at snapshot time; `None` for `Delete`
    pub comment_body: Option<String>,

    /// Body dialect at snapshot time; `None` for `Delete`
    pub comment_markup: Option<Markup>,

    /// Parent comment linkage as it was at snapshot time
    pub comment_parent_comment_id: Option<CommentId>,
}

impl Revision {
    /// Snapshot `comment` as it stands, classified as `revision_type`.
    ///
    /// Used for `Create` and `Update` transitions, where the snapshot is the
    /// post-transition state.
    pub fn snapshot(revision_type: RevisionType, comment: &Comment, modifier: IdentityId) -> Self {
        Self {
            id: RevisionId::new(),
            revision_type,
            modifier_id: modifier,
            time: chrono::Utc::now(),
            comment_id: comment.id,
            comment_work_item_id: comment.work_item_id,
            comment_body: Some(comment.body.clone()),
            comment_markup: Some(comment.markup),
            comment_parent_comment_id: comment.parent_comment_id,
        }
    }

    /// Record the deletion of `comment`.
    ///
    /// Body and markup are explicitly absent; the parent linkage still
    /// reflects the last-known state.
    pub fn deletion(comment: &Comment, modifier: IdentityId) -> Self {
        Self {
            id: RevisionId::new(),
            revision_type: RevisionType::Delete,
            modifier_id: modifier,
            time: chrono::Utc::now(),
            comment_id: comment.id,
            comment_work_item_id: comment.work_item_id,
            comment_body: None,
            comment_markup: None,
            comment_parent_comment_id: comment.parent_comment_id,
        }
    }
}
