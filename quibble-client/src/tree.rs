//! Mutations over a thread forest.
//!
//! The forest is owned by [`Thread`](crate::Thread) alone; everything here
//! takes it by `&mut` and leaves it in a state where the tree invariants
//! (unique reachability, acyclicity, sibling order) still hold. A target id
//! that matches no node is a silent no-op, not an error: the caller validated
//! the target against its own forest before issuing the operation, so a miss
//! only means the node was removed in between.

use crate::api::{Comment, CommentId};

/// A subtree detached by [`remove_comment`], with enough position data to put
/// it back where it was if the server refuses the deletion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Detached {
    /// Parent the node hung under, `None` for a top-level comment
    pub parent_id: Option<CommentId>,
    /// Index among its siblings at the time of removal
    pub index: usize,
    pub node: Comment,
}

/// Appends `node` to the children of the comment with id `parent`, anywhere
/// in the forest. Returns whether a parent was found.
pub fn insert_reply(forest: &mut [Comment], parent: &CommentId, node: Comment) -> bool {
    match Comment::find_in_mut(forest, parent) {
        Some(p) => {
            p.children.push(node);
            true
        }
        None => {
            tracing::debug!(?parent, "ignoring reply to comment not in thread");
            false
        }
    }
}

/// Removes the comment with id `target` together with its whole reply
/// subtree, in one pass. Returns the detached subtree and its prior position,
/// or `None` if the target is not in the forest.
pub fn remove_comment(forest: &mut Vec<Comment>, target: &CommentId) -> Option<Detached> {
    remove_in(forest, None, target)
}

fn remove_in(
    siblings: &mut Vec<Comment>,
    parent_id: Option<CommentId>,
    target: &CommentId,
) -> Option<Detached> {
    if let Some(index) = siblings.iter().position(|c| c.id == *target) {
        let node = siblings.remove(index);
        return Some(Detached {
            parent_id,
            index,
            node,
        });
    }
    for c in siblings.iter_mut() {
        let id = c.id;
        if let Some(res) = remove_in(&mut c.children, Some(id), target) {
            return Some(res);
        }
    }
    None
}

/// Puts a detached subtree back at the position it was removed from. Returns
/// false (and drops the subtree) if its parent is itself gone from the forest
/// in the meantime.
pub fn restore_comment(forest: &mut Vec<Comment>, detached: Detached) -> bool {
    let siblings = match detached.parent_id {
        None => forest,
        Some(parent) => match Comment::find_in_mut(forest, &parent) {
            Some(p) => &mut p.children,
            None => {
                tracing::warn!(
                    ?parent,
                    "cannot restore subtree, its parent is no longer in the thread"
                );
                return false;
            }
        },
    };
    let index = detached.index.min(siblings.len());
    siblings.insert(index, detached.node);
    true
}

/// Replaces the comment with id `target` wholesale by `canonical`, which may
/// carry a different id (an optimistic temp node confirmed by the server).
///
/// A canonical record arriving without children must not erase replies we
/// already know about locally, so in that case the local children are kept.
/// Returns whether a node was replaced.
pub fn replace_comment(forest: &mut [Comment], target: &CommentId, mut canonical: Comment) -> bool {
    match Comment::find_in_mut(forest, target) {
        Some(local) => {
            if canonical.children.is_empty() {
                canonical.children = std::mem::take(&mut local.children);
            }
            *local = canonical;
            true
        }
        None => {
            tracing::debug!(?target, "ignoring replacement of comment not in thread");
            false
        }
    }
}

/// Total number of comments in the forest, all depths included
pub fn count_all(forest: &[Comment]) -> usize {
    forest.iter().map(subtree_len).sum()
}

/// Number of comments in this subtree, the root included
pub fn subtree_len(c: &Comment) -> usize {
    1 + count_all(&c.children)
}
