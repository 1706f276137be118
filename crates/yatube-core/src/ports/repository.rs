use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Comment, CommentEntry, FeedFilter, FollowCounts, Group, NewComment, NewGroup, NewPost,
    Post, PostEntry, User,
};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Lookup shared by every repository keyed by a primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User accounts.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Store a new account. A taken username is a `RepoError::Constraint`.
    async fn create(&self, user: User) -> Result<User, RepoError>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<(), RepoError>;
}

#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;

    /// A taken slug is a `RepoError::Constraint`.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;
}

#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Store a new post; the publication date is assigned here.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Persist text, group and image of an existing post.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// One page of posts, newest first, ties in insertion order.
    async fn feed(
        &self,
        filter: FeedFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments on a post, newest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Get-or-create the `(user, author)` row. Returns whether a row was
    /// created; an existing row is left as is.
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    /// Delete the `(user, author)` row if present. Returns whether one was removed.
    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    async fn counts(&self, user_id: Uuid) -> Result<FollowCounts, RepoError>;
}
