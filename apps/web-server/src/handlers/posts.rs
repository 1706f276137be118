//! Feeds, post pages and the post form.

use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;

use yatube_core::DomainError;
use yatube_core::domain::{
    FeedFilter, GroupRef, NewPost, Post, PostChanges, PostEntry, User,
};
use yatube_core::forms::{CleanPost, FormErrors, PostForm};
use yatube_core::pagination::Page;
use yatube_shared::{AuthorCard, CommentView, GroupView, PageView, PostView};

use super::form_data::read_post_form;
use super::{PageQuery, redirect, render_page};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::page_cache::{self, page_key};
use crate::state::AppState;
use crate::templates::{self, page_context};

pub(crate) fn post_url(username: &str, post_id: i64) -> String {
    format!("/{username}/{post_id}/")
}

/// Render the feed fragment shared by every listing page.
pub(crate) fn render_feed(page: Page<PostEntry>) -> AppResult<String> {
    let mut context = Context::new();
    context.insert("page", &PageView::<PostView>::from_page(page));
    Ok(templates::render("includes/feed.html", &context)?)
}

pub(crate) async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    Ok(state
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", username))?)
}

/// The post `post_id`, provided it was written by `author`.
async fn find_post(state: &AppState, author: &User, post_id: i64) -> AppResult<Post> {
    Ok(state
        .posts
        .find_by_id(post_id)
        .await?
        .filter(|post| post.is_authored_by(author.id))
        .ok_or_else(|| DomainError::not_found("post", post_id.to_string()))?)
}

async fn entry(state: &AppState, post: Post, author: &User) -> AppResult<PostEntry> {
    let group = match post.group_id {
        Some(id) => state
            .groups
            .find_by_id(id)
            .await?
            .map(|group| GroupRef::from(&group)),
        None => None,
    };
    Ok(PostEntry {
        post,
        author: author.username.clone(),
        group,
    })
}

/// Post count and follow counts of `author`, as seen by `viewer`.
pub(crate) async fn author_card(
    state: &AppState,
    author: &User,
    viewer: Option<&Identity>,
) -> AppResult<AuthorCard> {
    let counts = state.follows.counts(author.id).await?;
    let is_following = match viewer {
        Some(viewer) => state.follows.is_following(viewer.user_id, author.id).await?,
        None => false,
    };

    Ok(AuthorCard {
        username: author.username.clone(),
        posts_count: state.posts.count_by_author(author.id).await?,
        followers: counts.followers,
        following: counts.following,
        is_following,
        is_self: viewer.is_some_and(|v| v.user_id == author.id),
    })
}

/// GET / - the home feed, cached per path and query.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let key = page_key(&req);
    let feed = page_cache::cached(&state, &key, async {
        let page = state.posts.feed(FeedFilter::All, query.request()).await?;
        render_feed(page)
    })
    .await?;

    let mut context = page_context(viewer.viewer());
    context.insert("feed", &feed);
    render_page("posts/index.html", &context)
}

/// GET /group/{slug}/
pub async fn group_posts(
    path: web::Path<String>,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("group", &slug))?;

    let page = state
        .posts
        .feed(FeedFilter::Group(group.id), query.request())
        .await?;

    let mut context = page_context(viewer.viewer());
    context.insert("feed", &render_feed(page)?);
    context.insert("group", &GroupView::from(group));
    render_page("posts/group.html", &context)
}

/// GET /{username}/
pub async fn profile(
    path: web::Path<String>,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let author = find_user(&state, &path.into_inner()).await?;
    let page = state
        .posts
        .feed(FeedFilter::Author(author.id), query.request())
        .await?;

    let mut context = page_context(viewer.viewer());
    context.insert("feed", &render_feed(page)?);
    context.insert("author", &author_card(&state, &author, viewer.viewer()).await?);
    render_page("posts/profile.html", &context)
}

/// GET /{username}/{post_id}/
pub async fn post_view(
    path: web::Path<(String, i64)>,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let author = find_user(&state, &username).await?;
    let post = find_post(&state, &author, post_id).await?;

    let comments: Vec<CommentView> = state
        .comments
        .list_for_post(post.id)
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();

    let mut context = page_context(viewer.viewer());
    context.insert("post", &PostView::from(entry(&state, post, &author).await?));
    context.insert("author", &author_card(&state, &author, viewer.viewer()).await?);
    context.insert("comments", &comments);
    render_page("posts/post.html", &context)
}

/// Render the create/edit form. `post` is the post being edited, if any.
async fn render_post_form(
    state: &AppState,
    identity: &Identity,
    form: &PostForm,
    errors: &FormErrors,
    post: Option<PostView>,
) -> AppResult<HttpResponse> {
    let groups: Vec<GroupView> = state
        .groups
        .list()
        .await?
        .into_iter()
        .map(GroupView::from)
        .collect();
    let selected_group = form
        .group
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());

    let mut context = page_context(Some(identity));
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("groups", &groups);
    context.insert("selected_group", &selected_group);
    context.insert("post", &post);
    render_page("posts/post_form.html", &context)
}

/// Validate a submitted post form, storing the image once it passes.
///
/// Returns the cleaned post and the stored image path, or the field errors.
async fn clean_post(
    state: &AppState,
    form: &PostForm,
) -> AppResult<Result<(CleanPost, Option<String>), FormErrors>> {
    let groups = state.groups.list().await?;
    let clean = match form.validate(&groups) {
        Ok(clean) => clean,
        Err(errors) => return Ok(Err(errors)),
    };

    let image = match &clean.image {
        Some(file) => Some(state.media.save(file).await?),
        None => None,
    };
    Ok(Ok((clean, image)))
}

/// GET /new/
pub async fn new_post_form(
    identity: Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    render_post_form(
        &state,
        &identity,
        &PostForm::default(),
        &FormErrors::new(),
        None,
    )
    .await
}

/// POST /new/
pub async fn new_post(
    identity: Identity,
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let form = read_post_form(&req, payload).await?;

    let (clean, image) = match clean_post(&state, &form).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            tracing::debug!(user = %identity.username, ?errors, "Post form rejected");
            return render_post_form(&state, &identity, &form, &errors, None).await;
        }
    };

    state
        .posts
        .create(NewPost {
            author_id: identity.user_id,
            text: clean.text,
            group_id: clean.group_id,
            image,
        })
        .await?;

    Ok(redirect("/"))
}

/// Load the post behind an edit URL. `Err` is the response to send instead:
/// non-authors are sent to the read-only page.
async fn editable_post(
    state: &AppState,
    identity: &Identity,
    username: &str,
    post_id: i64,
) -> AppResult<Result<(Post, User), HttpResponse>> {
    let author = find_user(state, username).await?;
    let post = find_post(state, &author, post_id).await?;

    if !post.is_authored_by(identity.user_id) {
        tracing::debug!(user = %identity.username, post_id, "Edit by non-author refused");
        return Ok(Err(redirect(post_url(username, post_id))));
    }
    Ok(Ok((post, author)))
}

/// GET /{username}/{post_id}/edit/
pub async fn post_edit_form(
    identity: Identity,
    path: web::Path<(String, i64)>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let (post, author) = match editable_post(&state, &identity, &username, post_id).await? {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };

    let form = PostForm {
        text: post.text.clone(),
        group: post.group_id.map(|id| id.to_string()),
        image: None,
    };
    let view = PostView::from(entry(&state, post, &author).await?);
    render_post_form(&state, &identity, &form, &FormErrors::new(), Some(view)).await
}

/// POST /{username}/{post_id}/edit/
pub async fn post_edit(
    identity: Identity,
    path: web::Path<(String, i64)>,
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let (mut post, author) = match editable_post(&state, &identity, &username, post_id).await? {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };

    let form = read_post_form(&req, payload).await?;
    let (clean, image) = match clean_post(&state, &form).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            let view = PostView::from(entry(&state, post, &author).await?);
            return render_post_form(&state, &identity, &form, &errors, Some(view)).await;
        }
    };

    post.apply(PostChanges {
        text: clean.text,
        group_id: clean.group_id,
        image,
    });
    state.posts.update(post).await?;

    Ok(redirect(post_url(&author.username, post_id)))
}
