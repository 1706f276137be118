use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::GroupRef;

/// Post entity - a user-authored text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    /// Set once when the post is stored, never updated.
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    /// Media-relative path of the attached image.
    pub image: Option<String>,
}

impl Post {
    /// Apply an author's edit. The publication date is left untouched.
    pub fn apply(&mut self, changes: PostChanges) {
        self.text = changes.text;
        self.group_id = changes.group_id;
        if let Some(image) = changes.image {
            self.image = Some(image);
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// Data for a post that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Fields an author may change on an existing post.
///
/// `image: None` keeps whatever image the post already has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    /// Every post.
    All,
    /// Posts tagged with the group.
    Group(i64),
    /// Posts written by the user.
    Author(Uuid),
    /// Posts written by anyone the user follows.
    FollowedBy(Uuid),
}

/// A post together with what a listing shows about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: String,
    pub group: Option<GroupRef>,
}
