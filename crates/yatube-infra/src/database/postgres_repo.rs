//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use yatube_core::domain::{
    Comment, CommentEntry, FeedFilter, FollowCounts, Group, GroupRef, NewComment, NewGroup,
    NewPost, Post, PostEntry, User,
};
use yatube_core::error::RepoError;
use yatube_core::pagination::{Page, PageRequest};
use yatube_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL follow repository.
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = user.into();
        let model = active.insert(&self.db).await.map_err(db_err)?;
        tracing::info!(user_id = %model.id, username = %model.username, "User registered");
        Ok(model.into())
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(
                user::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .order_by_asc(group::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let active: group::ActiveModel = group.into();
        let model = active.insert(&self.db).await.map_err(db_err)?;
        Ok(model.into())
    }
}

impl PostgresPostRepository {
    /// Attach author usernames and group references to a page of posts.
    async fn entries(&self, posts: Vec<post::Model>) -> Result<Vec<PostEntry>, RepoError> {
        let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let group_ids: Vec<i64> = posts.iter().filter_map(|p| p.group_id).collect();

        let authors: HashMap<Uuid, String> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            UserEntity::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect()
        };

        let groups: HashMap<i64, GroupRef> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|g| {
                    let group: Group = g.into();
                    (group.id, GroupRef::from(&group))
                })
                .collect()
        };

        Ok(posts
            .into_iter()
            .filter_map(|model| {
                let author = authors.get(&model.author_id)?.clone();
                let group = model.group_id.and_then(|id| groups.get(&id).cloned());
                Some(PostEntry {
                    post: model.into(),
                    author,
                    group,
                })
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let active: post::ActiveModel = post.into();
        let model = active.insert(&self.db).await.map_err(db_err)?;
        tracing::info!(post_id = model.id, author_id = %model.author_id, "Post created");
        Ok(model.into())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        // pub_date stays NotSet so the UPDATE never touches it.
        let active = post::ActiveModel {
            id: sea_orm::ActiveValue::Unchanged(post.id),
            text: Set(post.text),
            group_id: Set(post.group_id),
            image: Set(post.image),
            ..Default::default()
        };
        let model = active.update(&self.db).await.map_err(db_err)?;
        tracing::info!(post_id = model.id, "Post updated");
        Ok(model.into())
    }

    async fn feed(
        &self,
        filter: FeedFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        let query = match filter {
            FeedFilter::All => PostEntity::find(),
            FeedFilter::Group(group_id) => {
                PostEntity::find().filter(post::Column::GroupId.eq(group_id))
            }
            FeedFilter::Author(author_id) => {
                PostEntity::find().filter(post::Column::AuthorId.eq(author_id))
            }
            FeedFilter::FollowedBy(user_id) => {
                PostEntity::find().filter(
                    post::Column::AuthorId.in_subquery(
                        Query::select()
                            .column(follow::Column::AuthorId)
                            .from(FollowEntity)
                            .and_where(follow::Column::UserId.eq(user_id))
                            .to_owned(),
                    ),
                )
            }
        };

        let paginator = query
            .order_by_desc(post::Column::PubDate)
            .order_by_asc(post::Column::Id)
            .paginate(&self.db, page.per_page());

        let total = paginator.num_items().await.map_err(db_err)?;
        let number = page.resolve(total);
        let posts = paginator.fetch_page(number - 1).await.map_err(db_err)?;

        Ok(Page::new(self.entries(posts).await?, page, total))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let active: comment::ActiveModel = comment.into();
        let model = active.insert(&self.db).await.map_err(db_err)?;
        tracing::info!(comment_id = model.id, post_id = model.post_id, "Comment added");
        Ok(model.into())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::Created)
            .order_by_desc(comment::Column::Id)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(comment, author)| {
                Some(CommentEntry {
                    author: author?.username,
                    comment: comment.into(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let row = follow::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        };

        let inserted = FollowEntity::insert(row)
            .on_conflict(
                OnConflict::columns([follow::Column::UserId, follow::Column::AuthorId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        Ok(inserted > 0)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let rows = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows > 0)
    }

    async fn counts(&self, user_id: Uuid) -> Result<FollowCounts, RepoError> {
        let followers = FollowEntity::find()
            .filter(follow::Column::AuthorId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let following = FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(FollowCounts {
            followers,
            following,
        })
    }
}
