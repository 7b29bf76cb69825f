//! Comment model - a revisable entity attached to a work item.

use serde::{Deserialize, Serialize};

use crate::id::{CommentId, IdentityId, WorkItemId};
use crate::{Markup, Time};

/// A comment on a work item, optionally replying to another comment.
///
/// Comments are mutable; every lifecycle transition is snapshotted into an
/// immutable [`crate::Revision`] by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: CommentId,

    /// The work item this comment belongs to
    pub work_item_id: WorkItemId,

    /// The comment this one replies to; `None` for top-level comments
    pub parent_comment_id: Option<CommentId>,

    /// Comment text
    pub body: String,

    /// Dialect the body is written in
    pub markup: Markup,

    /// Identity that created the comment
    pub creator: IdentityId,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

impl Comment {
    /// Create a new top-level comment.
    pub fn new(
        work_item_id: WorkItemId,
        body: impl Into<String>,
        markup: Markup,
        creator: IdentityId,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: CommentId::new(),
            work_item_id,
            parent_comment_id: None,
            body: body.into(),
            markup,
            creator,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a comment replying to `parent`.
    pub fn reply_to(
        parent: &Comment,
        body: impl Into<String>,
        markup: Markup,
        creator: IdentityId,
    ) -> Self {
        let mut comment = Self::new(parent.work_item_id, body, markup, creator);
        comment.parent_comment_id = Some(parent.id);
        comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_carries_parent_linkage() {
        let author = IdentityId::new();
        let parent = Comment::new(WorkItemId::new(), "root", Markup::Markdown, author);
        let child = Comment::reply_to(&parent, "child", Markup::PlainText, author);
        assert_eq!(child.parent_comment_id, Some(parent.id));
        assert_eq!(child.work_item_id, parent.work_item_id);
        assert!(parent.parent_comment_id.is_none());
    }
}
