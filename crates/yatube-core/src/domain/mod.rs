//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::{Comment, CommentEntry, NewComment};
pub use follow::{Follow, FollowCounts};
pub use group::{Group, GroupRef, NewGroup, slugify};
pub use post::{FeedFilter, NewPost, Post, PostChanges, PostEntry};
pub use user::{ROLE_STAFF, ROLE_USER, User};
