use std::cmp::Reverse;

use crate::api::Comment;

/// Ordering applied to the top-level comments of a thread. Replies always
/// stay in reply order, whatever the selected order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ThreadOrder {
    /// Descending likes count
    MostLiked,
    /// Descending creation time
    Newest,
}

impl ThreadOrder {
    /// Stable sort of the top-level sequence only, so re-applying the same
    /// order never shuffles ties.
    pub fn sort(&self, forest: &mut [Comment]) {
        match self {
            ThreadOrder::MostLiked => forest.sort_by_key(|c| Reverse(c.likes_count)),
            ThreadOrder::Newest => forest.sort_by_key(|c| Reverse(c.created_at)),
        }
    }
}
