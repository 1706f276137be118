//! In-memory repositories - used when no database is configured, and by tests.
//!
//! One [`InMemoryDatabase`] holds every table behind a single lock, so the
//! listing queries can join users and groups the way SQL would.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{
    Comment, CommentEntry, FeedFilter, Follow, FollowCounts, Group, GroupRef, NewComment,
    NewGroup, NewPost, Post, PostEntry, User,
};
use yatube_core::error::RepoError;
use yatube_core::pagination::{Page, PageRequest};
use yatube_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username(&self, id: Uuid) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.as_str())
    }

    fn entry(&self, post: &Post) -> Option<PostEntry> {
        let author = self.username(post.author_id)?.to_string();
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
            .map(GroupRef::from);
        Some(PostEntry {
            post: post.clone(),
            author,
            group,
        })
    }

    fn matches(&self, filter: FeedFilter, post: &Post) -> bool {
        match filter {
            FeedFilter::All => true,
            FeedFilter::Group(group_id) => post.group_id == Some(group_id),
            FeedFilter::Author(author_id) => post.author_id == author_id,
            FeedFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }
}

/// Every table in process memory. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                user.username
            )));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Group, i64> for InMemoryDatabase {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryDatabase {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let mut groups = self.tables.read().await.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "group slug {} already exists",
                group.slug
            )));
        }
        let group = Group {
            id: tables.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.push(group.clone());
        Ok(group)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryDatabase {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryDatabase {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.username(post.author_id).is_none() {
            return Err(RepoError::Constraint("post author does not exist".into()));
        }
        let post = Post {
            id: tables.next_id(),
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        stored.text = post.text;
        stored.group_id = post.group_id;
        stored.image = post.image;
        Ok(stored.clone())
    }

    async fn feed(
        &self,
        filter: FeedFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        let tables = self.tables.read().await;

        // Rows sit in insertion order, and the sort is stable.
        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| tables.matches(filter, p))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

        let entries = posts.into_iter().filter_map(|p| tables.entry(p)).collect();
        Ok(Page::from_ordered(entries, page))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .count() as u64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryDatabase {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".into()));
        }
        let comment = Comment {
            id: tables.next_id(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<CommentEntry> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                Some(CommentEntry {
                    author: tables.username(c.author_id)?.to_string(),
                    comment: c.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.comment
                .created
                .cmp(&a.comment.created)
                .then(b.comment.id.cmp(&a.comment.id))
        });
        Ok(entries)
    }
}

#[async_trait]
impl FollowRepository for InMemoryDatabase {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }
        let id = tables.next_id();
        tables.follows.push(Follow {
            id,
            user_id,
            author_id,
        });
        Ok(true)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() < before)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn counts(&self, user_id: Uuid) -> Result<FollowCounts, RepoError> {
        let tables = self.tables.read().await;
        Ok(FollowCounts {
            followers: tables.follows.iter().filter(|f| f.author_id == user_id).count() as u64,
            following: tables.follows.iter().filter(|f| f.user_id == user_id).count() as u64,
        })
    }
}
