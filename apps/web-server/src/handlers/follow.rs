use actix_web::{HttpResponse, web};

use yatube_core::domain::{FeedFilter, Follow};

use super::posts::{find_user, render_feed};
use super::{PageQuery, redirect, render_page};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates::page_context;

/// GET /follow/ - posts by everyone the viewer follows.
pub async fn follow_index(
    identity: Identity,
    state: web::Data<AppState>,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .feed(FeedFilter::FollowedBy(identity.user_id), query.request())
        .await?;

    let mut context = page_context(Some(&identity));
    context.insert("feed", &render_feed(page)?);
    render_page("posts/follow.html", &context)
}

/// GET /{username}/follow
pub async fn profile_follow(
    identity: Identity,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let author = find_user(&state, &path.into_inner()).await?;

    if Follow::is_allowed(identity.user_id, author.id) {
        let created = state.follows.follow(identity.user_id, author.id).await?;
        if created {
            tracing::info!(user = %identity.username, author = %author.username, "Followed");
        }
    }

    Ok(redirect(format!("/{}/", author.username)))
}

/// GET /{username}/unfollow
pub async fn profile_unfollow(
    identity: Identity,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let author = find_user(&state, &path.into_inner()).await?;

    if state.follows.unfollow(identity.user_id, author.id).await? {
        tracing::info!(user = %identity.username, author = %author.username, "Unfollowed");
    }

    Ok(redirect(format!("/{}/", author.username)))
}
