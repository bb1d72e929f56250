use crate::api::Comment;

/// The current user's reaction to one comment. `liked_by_user` and
/// `disliked_by_user` are never both set, which leaves exactly these three
/// states reachable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reaction {
    Neutral,
    Liked,
    Disliked,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl Reaction {
    pub fn of(c: &Comment) -> Reaction {
        match (c.liked_by_user, c.disliked_by_user) {
            (false, false) => Reaction::Neutral,
            (true, false) => Reaction::Liked,
            (false, true) => Reaction::Disliked,
            (true, true) => {
                // canonical data should never carry both flags
                tracing::warn!(id = ?c.id, "comment is both liked and disliked, treating as liked");
                Reaction::Liked
            }
        }
    }

    /// Where a toggle of `kind` leads from this state. Toggling the reaction
    /// already held clears it; toggling the other one switches to it.
    pub fn toggled(self, kind: ReactionKind) -> Reaction {
        match (self, kind) {
            (Reaction::Liked, ReactionKind::Like) => Reaction::Neutral,
            (_, ReactionKind::Like) => Reaction::Liked,
            (Reaction::Disliked, ReactionKind::Dislike) => Reaction::Neutral,
            (_, ReactionKind::Dislike) => Reaction::Disliked,
        }
    }
}

/// Rewrites the comment's flags and counts for the `from -> to` transition.
///
/// Switching from one reaction to the other removes the prior one in the same
/// transition, so a Disliked -> Liked move bumps `likes_count` and drops
/// `dislikes_count` at once. The inverse transition (`to -> from`) undoes it
/// exactly, which is what the rollback path relies on.
pub fn apply(c: &mut Comment, from: Reaction, to: Reaction) {
    match from {
        Reaction::Liked => {
            c.likes_count = c.likes_count.saturating_sub(1);
            c.liked_by_user = false;
        }
        Reaction::Disliked => {
            c.dislikes_count = c.dislikes_count.saturating_sub(1);
            c.disliked_by_user = false;
        }
        Reaction::Neutral => (),
    }
    match to {
        Reaction::Liked => {
            c.likes_count += 1;
            c.liked_by_user = true;
        }
        Reaction::Disliked => {
            c.dislikes_count += 1;
            c.disliked_by_user = true;
        }
        Reaction::Neutral => (),
    }
}
