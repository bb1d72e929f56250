use uuid::Uuid;

use crate::{Author, Error, Time, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn stub() -> PostId {
        PostId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

/// One node of a discussion thread.
///
/// A thread is a forest of these: an ordered `Vec<Comment>` of top-level
/// comments, each the root of its own reply subtree via `children`. Reply
/// order within `children` is insertion order and is never re-sorted.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub created_at: Time,

    /// Comment this one replies to, `None` for top-level comments
    pub parent_id: Option<CommentId>,

    /// Child comments, in reply order
    #[serde(default)]
    pub children: Vec<Comment>,

    pub likes_count: u32,
    pub dislikes_count: u32,
    pub liked_by_user: bool,
    pub disliked_by_user: bool,

    pub author: Author,
}

impl Comment {
    /// Recursively looks up the comment with this id anywhere in the forest
    pub fn find_in<'a>(forest: &'a [Comment], id: &CommentId) -> Option<&'a Comment> {
        for c in forest {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in(&c.children, id) {
                return Some(res);
            }
        }
        None
    }

    pub fn find_in_mut<'a>(forest: &'a mut [Comment], id: &CommentId) -> Option<&'a mut Comment> {
        for c in forest {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in_mut(&mut c.children, id) {
                return Some(res);
            }
        }
        None
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub content: String,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)
    }
}
