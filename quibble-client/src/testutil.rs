//! Helpers shared by the unit tests of this crate.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::api::{Author, Comment, CommentId, Time};

pub(crate) fn t0() -> Time {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

pub(crate) fn id(id: u128) -> CommentId {
    CommentId(Uuid::from_u128(id))
}

/// A comment with a deterministic id and a creation time that increases with
/// the id, so chronological order follows numeric order.
pub(crate) fn comment(n: u128) -> Comment {
    Comment {
        id: id(n),
        content: format!("comment {n}"),
        created_at: t0() + Duration::seconds(n as i64),
        parent_id: None,
        children: Vec::new(),
        likes_count: 0,
        dislikes_count: 0,
        liked_by_user: false,
        disliked_by_user: false,
        author: Author::stub(),
    }
}
