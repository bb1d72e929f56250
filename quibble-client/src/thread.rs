use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::{Api, Author, Comment, CommentId, Error, NewComment, PostId},
    reaction,
    tree::{self, Detached},
    Reaction, ReactionKind, ThreadOrder,
};

/// Everything that can happen to a thread: user actions, and the outcomes of
/// the network calls those actions triggered. The driver feeds outcomes back
/// as messages, so overlapping calls never interleave mid-mutation.
#[derive(Debug)]
pub enum ThreadMsg {
    /// Ask for a (re)fetch of the whole thread
    Refresh,
    /// Canonical forest received, replaces the local one wholesale
    ThreadLoaded(Vec<Comment>),
    LoadFailed {
        error: Error,
    },

    SetOrder(ThreadOrder),
    SubmitComment {
        content: String,
    },
    SubmitReply {
        parent: CommentId,
        content: String,
    },
    Delete(CommentId),
    ToggleLike(CommentId),
    ToggleDislike(CommentId),

    CreateConfirmed {
        local_id: CommentId,
        canonical: Comment,
    },
    CreateFailed {
        local_id: CommentId,
        error: Error,
    },
    DeleteConfirmed(CommentId),
    DeleteFailed {
        comment: CommentId,
        error: Error,
    },
    ToggleConfirmed {
        comment: CommentId,
        seq: u64,
        canonical: Comment,
    },
    ToggleFailed {
        comment: CommentId,
        seq: u64,
        error: Error,
    },
}

/// A network call the driver must run on behalf of the thread. Each carries
/// what the outcome message needs to reconcile: the optimistic temp id for
/// creates, the per-comment sequence number for toggles.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Fetch,
    Create {
        local_id: CommentId,
        new: NewComment,
    },
    Delete(CommentId),
    ToggleLike {
        comment: CommentId,
        seq: u64,
    },
    ToggleDislike {
        comment: CommentId,
        seq: u64,
    },
}

struct PendingToggle {
    from: Reaction,
    to: Reaction,
}

/// One news post's discussion thread: the single owner of the forest.
///
/// All mutations go through [`Thread::update`], which applies the optimistic
/// local change synchronously and returns the network commands to run. No
/// other component holds a reference into the forest across a call.
pub struct Thread {
    post: PostId,
    /// Author stamped on optimistic nodes until the canonical record arrives
    me: Author,
    forest: Vec<Comment>,
    order: ThreadOrder,
    /// Running comment count, kept consistent with `tree::count_all`
    total: usize,

    /// Latest toggle sequence number issued per comment; outcomes with any
    /// other number are stale and get discarded
    toggle_seq: HashMap<CommentId, u64>,
    pending_toggles: HashMap<CommentId, PendingToggle>,
    pending_deletes: HashMap<CommentId, Detached>,

    last_error: Option<Error>,
}

impl Thread {
    pub fn new(post: PostId, me: Author, order: ThreadOrder) -> Thread {
        Thread {
            post,
            me,
            forest: Vec::new(),
            order,
            total: 0,
            toggle_seq: HashMap::new(),
            pending_toggles: HashMap::new(),
            pending_deletes: HashMap::new(),
            last_error: None,
        }
    }

    pub fn post(&self) -> PostId {
        self.post
    }

    pub fn comments(&self) -> &[Comment] {
        &self.forest
    }

    pub fn order(&self) -> ThreadOrder {
        self.order
    }

    /// Total number of comments in the thread, nested replies included
    pub fn total_count(&self) -> usize {
        self.total
    }

    /// Last failure surfaced by a network outcome or a validation check.
    /// Non-fatal: the thread stays usable, the caller decides how to show it.
    pub fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    pub fn update(&mut self, msg: ThreadMsg) -> Vec<Command> {
        match msg {
            ThreadMsg::Refresh => return vec![Command::Fetch],
            ThreadMsg::ThreadLoaded(mut forest) => {
                self.order.sort(&mut forest);
                self.forest = forest;
                self.total = tree::count_all(&self.forest);
                // every outstanding call predates the canonical snapshot
                self.toggle_seq.clear();
                self.pending_toggles.clear();
                self.pending_deletes.clear();
            }
            ThreadMsg::LoadFailed { error } => {
                self.last_error = Some(error);
            }
            ThreadMsg::SetOrder(order) => {
                self.order = order;
                self.order.sort(&mut self.forest);
            }
            ThreadMsg::SubmitComment { content } => {
                if let Err(e) = crate::api::validate_content(&content) {
                    self.last_error = Some(e);
                    return Vec::new();
                }
                let node = self.synthetic_node(content.clone(), None);
                let local_id = node.id;
                self.forest.push(node);
                self.total += 1;
                return vec![Command::Create {
                    local_id,
                    new: NewComment {
                        content,
                        parent_id: None,
                    },
                }];
            }
            ThreadMsg::SubmitReply { parent, content } => {
                if let Err(e) = crate::api::validate_content(&content) {
                    self.last_error = Some(e);
                    return Vec::new();
                }
                let node = self.synthetic_node(content.clone(), Some(parent));
                let local_id = node.id;
                if !tree::insert_reply(&mut self.forest, &parent, node) {
                    // parent vanished since the user started typing
                    return Vec::new();
                }
                self.total += 1;
                return vec![Command::Create {
                    local_id,
                    new: NewComment {
                        content,
                        parent_id: Some(parent),
                    },
                }];
            }
            ThreadMsg::Delete(comment) => {
                let Some(detached) = tree::remove_comment(&mut self.forest, &comment) else {
                    tracing::debug!(?comment, "ignoring delete of comment not in thread");
                    return Vec::new();
                };
                self.total -= tree::subtree_len(&detached.node);
                self.pending_deletes.insert(comment, detached);
                return vec![Command::Delete(comment)];
            }
            ThreadMsg::ToggleLike(comment) => return self.toggle(comment, ReactionKind::Like),
            ThreadMsg::ToggleDislike(comment) => {
                return self.toggle(comment, ReactionKind::Dislike)
            }
            ThreadMsg::CreateConfirmed {
                local_id,
                canonical,
            } => {
                if tree::replace_comment(&mut self.forest, &local_id, canonical) {
                    // the canonical record may carry children of its own
                    self.total = tree::count_all(&self.forest);
                }
            }
            ThreadMsg::CreateFailed { local_id, error } => {
                if let Some(detached) = tree::remove_comment(&mut self.forest, &local_id) {
                    self.total -= tree::subtree_len(&detached.node);
                }
                self.last_error = Some(error);
            }
            ThreadMsg::DeleteConfirmed(comment) => {
                self.pending_deletes.remove(&comment);
            }
            ThreadMsg::DeleteFailed { comment, error } => {
                if let Some(detached) = self.pending_deletes.remove(&comment) {
                    let restored = tree::subtree_len(&detached.node);
                    if tree::restore_comment(&mut self.forest, detached) {
                        self.total += restored;
                    }
                }
                self.last_error = Some(error);
            }
            ThreadMsg::ToggleConfirmed {
                comment,
                seq,
                canonical,
            } => {
                if !self.is_latest_toggle(&comment, seq) {
                    return Vec::new();
                }
                self.pending_toggles.remove(&comment);
                tree::replace_comment(&mut self.forest, &comment, canonical);
            }
            ThreadMsg::ToggleFailed {
                comment,
                seq,
                error,
            } => {
                if !self.is_latest_toggle(&comment, seq) {
                    return Vec::new();
                }
                if let Some(pending) = self.pending_toggles.remove(&comment) {
                    if let Some(node) = Comment::find_in_mut(&mut self.forest, &comment) {
                        // exact structural inverse of the optimistic transition
                        reaction::apply(node, pending.to, pending.from);
                    }
                }
                self.last_error = Some(error);
            }
        }
        Vec::new()
    }

    fn toggle(&mut self, comment: CommentId, kind: ReactionKind) -> Vec<Command> {
        let Some(node) = Comment::find_in_mut(&mut self.forest, &comment) else {
            tracing::debug!(?comment, "ignoring toggle on comment not in thread");
            return Vec::new();
        };
        let from = Reaction::of(node);
        let to = from.toggled(kind);
        reaction::apply(node, from, to);

        let seq = self.toggle_seq.entry(comment).or_insert(0);
        *seq += 1;
        let seq = *seq;
        self.pending_toggles
            .insert(comment, PendingToggle { from, to });

        vec![match kind {
            ReactionKind::Like => Command::ToggleLike { comment, seq },
            ReactionKind::Dislike => Command::ToggleDislike { comment, seq },
        }]
    }

    fn is_latest_toggle(&self, comment: &CommentId, seq: u64) -> bool {
        match self.toggle_seq.get(comment) {
            Some(latest) if *latest == seq => true,
            _ => {
                tracing::debug!(?comment, seq, "discarding stale toggle outcome");
                false
            }
        }
    }

    fn synthetic_node(&self, content: String, parent_id: Option<CommentId>) -> Comment {
        Comment {
            id: CommentId(Uuid::new_v4()),
            content,
            created_at: Utc::now(),
            parent_id,
            children: Vec::new(),
            likes_count: 0,
            dislikes_count: 0,
            liked_by_user: false,
            disliked_by_user: false,
            author: self.me.clone(),
        }
    }
}

/// Runs one command against the transport and turns its result into the
/// outcome message to feed back into [`Thread::update`].
pub async fn run_command<A>(api: &A, post: PostId, cmd: Command) -> ThreadMsg
where
    A: Api + Sync,
{
    match cmd {
        Command::Fetch => match api.fetch_comments(post).await {
            Ok(forest) => ThreadMsg::ThreadLoaded(forest),
            Err(error) => ThreadMsg::LoadFailed { error },
        },
        Command::Create { local_id, new } => match api.create_comment(post, new).await {
            Ok(canonical) => ThreadMsg::CreateConfirmed {
                local_id,
                canonical,
            },
            Err(error) => ThreadMsg::CreateFailed { local_id, error },
        },
        Command::Delete(comment) => match api.delete_comment(comment).await {
            Ok(()) => ThreadMsg::DeleteConfirmed(comment),
            Err(error) => ThreadMsg::DeleteFailed { comment, error },
        },
        Command::ToggleLike { comment, seq } => match api.toggle_like(comment).await {
            Ok(canonical) => ThreadMsg::ToggleConfirmed {
                comment,
                seq,
                canonical,
            },
            Err(error) => ThreadMsg::ToggleFailed {
                comment,
                seq,
                error,
            },
        },
        Command::ToggleDislike { comment, seq } => match api.toggle_dislike(comment).await {
            Ok(canonical) => ThreadMsg::ToggleConfirmed {
                comment,
                seq,
                canonical,
            },
            Err(error) => ThreadMsg::ToggleFailed {
                comment,
                seq,
                error,
            },
        },
    }
}
