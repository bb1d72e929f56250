use async_trait::async_trait;

use crate::{Comment, CommentId, Error, NewComment, PostId};

/// The transport contract the thread engine drives.
///
/// Every `Comment` returned from these calls is canonical: counts and both
/// reaction flags are recomputed server-side, and the caller must replace its
/// local node with it rather than merge field by field. The one exception is
/// `children`: a canonical record returned without children must not erase
/// the replies already known locally.
#[async_trait]
pub trait Api {
    async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>, Error>;
    async fn create_comment(&self, post: PostId, new: NewComment) -> Result<Comment, Error>;
    async fn delete_comment(&self, comment: CommentId) -> Result<(), Error>;
    async fn toggle_like(&self, comment: CommentId) -> Result<Comment, Error>;
    async fn toggle_dislike(&self, comment: CommentId) -> Result<Comment, Error>;
}
