//! In-memory stand-in for the comments backend, used by the integration
//! tests. It holds the canonical forest per post and recomputes counts and
//! reaction flags authoritatively, so whatever it returns is exactly what a
//! real server would make the thread reconcile against. Failures can be
//! injected to drive the rollback paths.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use quibble_client::{
    api::{Api, Author, Comment, CommentId, Error, NewComment, PostId},
    reaction::{self, Reaction, ReactionKind},
    tree,
};

pub struct MockServer(Mutex<State>);

struct State {
    posts: BTreeMap<PostId, Vec<Comment>>,
    /// Number of upcoming calls that must fail with a network error
    fail_next: usize,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(State {
            posts: BTreeMap::new(),
            fail_next: 0,
        }))
    }

    /// Make the next `n` calls fail with `Error::Network`
    pub fn test_fail_next(&self, n: usize) {
        self.0.lock().fail_next = n;
    }

    /// Seed a post with a canonical forest, returning its id
    pub fn test_add_post(&self, forest: Vec<Comment>) -> PostId {
        let post = PostId(Uuid::new_v4());
        self.0.lock().posts.insert(post, forest);
        post
    }

    /// Snapshot of the canonical forest for this post
    pub fn test_forest(&self, post: PostId) -> Vec<Comment> {
        self.0.lock().posts.get(&post).cloned().unwrap_or_default()
    }

    fn maybe_fail(&self, state: &mut State) -> Result<(), Error> {
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(Error::Network(String::from("injected failure")));
        }
        Ok(())
    }

    fn toggle(&self, comment: CommentId, kind: ReactionKind) -> Result<Comment, Error> {
        let mut state = self.0.lock();
        self.maybe_fail(&mut state)?;
        for forest in state.posts.values_mut() {
            if let Some(node) = Comment::find_in_mut(forest, &comment) {
                let from = Reaction::of(node);
                reaction::apply(node, from, from.toggled(kind));
                // canonical records from the toggle endpoint carry no replies
                let mut canonical = node.clone();
                canonical.children = Vec::new();
                return Ok(canonical);
            }
        }
        Err(Error::CommentNotFound(comment))
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl Api for MockServer {
    async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, Error> {
        let mut state = self.0.lock();
        self.maybe_fail(&mut state)?;
        Ok(state.posts.get(&post).cloned().unwrap_or_default())
    }

    async fn create_comment(&self, post: PostId, new: NewComment) -> Result<Comment, Error> {
        new.validate()?;
        let mut state = self.0.lock();
        self.maybe_fail(&mut state)?;
        let forest = state.posts.entry(post).or_default();
        let canonical = Comment {
            id: CommentId(Uuid::new_v4()),
            content: new.content,
            created_at: Utc::now(),
            parent_id: new.parent_id,
            children: Vec::new(),
            likes_count: 0,
            dislikes_count: 0,
            liked_by_user: false,
            disliked_by_user: false,
            author: Author::stub(),
        };
        match new.parent_id {
            None => forest.push(canonical.clone()),
            Some(parent) => {
                if !tree::insert_reply(forest, &parent, canonical.clone()) {
                    return Err(Error::CommentNotFound(parent));
                }
            }
        }
        Ok(canonical)
    }

    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error> {
        let mut state = self.0.lock();
        self.maybe_fail(&mut state)?;
        for forest in state.posts.values_mut() {
            if tree::remove_comment(forest, &comment).is_some() {
                return Ok(());
            }
        }
        Err(Error::CommentNotFound(comment))
    }

    async fn toggle_like(&self, comment: CommentId) -> Result<Comment, Error> {
        self.toggle(comment, ReactionKind::Like)
    }

    async fn toggle_dislike(&self, comment: CommentId) -> Result<Comment, Error> {
        self.toggle(comment, ReactionKind::Dislike)
    }
}
