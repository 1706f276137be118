use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Follow entity - `user` wants to see `author`'s posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub user_id: Uuid,
    pub author_id: Uuid,
}

impl Follow {
    /// A user can never follow themselves.
    pub fn is_allowed(user_id: Uuid, author_id: Uuid) -> bool {
        user_id != author_id
    }
}

/// Follow statistics of a single user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
    /// Rows where the user is the author.
    pub followers: u64,
    /// Rows where the user is the follower.
    pub following: u64,
}
