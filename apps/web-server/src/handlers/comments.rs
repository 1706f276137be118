use actix_web::{HttpRequest, HttpResponse, web};

use yatube_core::domain::NewComment;

use super::form_data::read_comment_form;
use super::posts::{find_user, post_url};
use super::redirect;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /{username}/{post_id}/comment/
///
/// An invalid or unreadable comment is dropped; either way the viewer lands
/// back on the post.
pub async fn add_comment(
    identity: Identity,
    path: web::Path<(String, i64)>,
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let author = find_user(&state, &username).await?;
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .filter(|post| post.is_authored_by(author.id))
        .ok_or_else(|| AppError::not_found(post_url(&username, post_id)))?;

    let form = read_comment_form(&req, payload).await;
    match form.validate() {
        Ok(text) => {
            state
                .comments
                .create(NewComment {
                    post_id: post.id,
                    author_id: identity.user_id,
                    text,
                })
                .await?;
        }
        Err(errors) => {
            tracing::debug!(user = %identity.username, post_id, ?errors, "Comment rejected");
        }
    }

    Ok(redirect(post_url(&username, post_id)))
}

/// GET /{username}/{post_id}/comment/ - comments are only ever posted.
pub async fn comment_redirect(
    _identity: Identity,
    path: web::Path<(String, i64)>,
) -> HttpResponse {
    let (username, post_id) = path.into_inner();
    redirect(post_url(&username, post_id))
}
