//! HTTP handlers and route configuration.

mod about;
mod accounts;
mod admin;
mod comments;
mod follow;
mod form_data;
mod health;
mod media;
mod posts;

#[cfg(test)]
mod tests;

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use tera::Context;

use yatube_core::pagination::PageRequest;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::rate_limit::LoginThrottle;
use crate::templates;

/// `?page=` of the paginated feeds, kept raw so garbage means page one.
/// A repeated parameter takes its last value; an unparsable query string
/// reads as no page at all.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn parse(query: &str) -> Self {
        let page = web::Query::<Vec<(String, String)>>::from_query(query)
            .ok()
            .and_then(|pairs| {
                pairs
                    .into_inner()
                    .into_iter()
                    .rev()
                    .find(|(key, _)| key == "page")
                    .map(|(_, value)| value)
            });
        Self { page }
    }

    pub fn request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref())
    }
}

impl FromRequest for PageQuery {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::parse(req.query_string())))
    }
}

/// 302 to `location`.
pub(crate) fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

/// Render a template into a 200 HTML response.
pub(crate) fn render_page(template: &str, context: &Context) -> AppResult<HttpResponse> {
    let body = templates::render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::not_found(req.path()))
}

/// Configure all application routes.
///
/// Fixed paths are registered before the `/{username}/...` patterns so they
/// win the match.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/", web::get().to(posts::index))
        .service(
            web::resource("/new/")
                .route(web::get().to(posts::new_post_form))
                .route(web::post().to(posts::new_post)),
        )
        .route("/follow/", web::get().to(follow::follow_index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login/")
                        .wrap(LoginThrottle)
                        .route(web::get().to(accounts::login_form))
                        .route(web::post().to(accounts::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(accounts::logout))
                        .route(web::post().to(accounts::logout)),
                )
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(accounts::signup_form))
                        .route(web::post().to(accounts::signup)),
                )
                .service(
                    web::resource("/password_change/")
                        .route(web::get().to(accounts::password_change_form))
                        .route(web::post().to(accounts::password_change)),
                )
                .route(
                    "/password_change/done/",
                    web::get().to(accounts::password_change_done),
                ),
        )
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/spec/", web::get().to(about::tech)),
        )
        .route("/about-author/", web::get().to(about::author))
        .route("/about-spec/", web::get().to(about::tech))
        .service(
            web::scope("/admin")
                .service(
                    web::resource("/groups/new/")
                        .route(web::get().to(admin::group_form))
                        .route(web::post().to(admin::create_group)),
                )
                .route("/cache/clear/", web::post().to(admin::clear_cache)),
        )
        .route("/media/{path:.*}", web::get().to(media::serve))
        .route("/{username}/", web::get().to(posts::profile))
        .route("/{username}/follow", web::get().to(follow::profile_follow))
        .route("/{username}/unfollow", web::get().to(follow::profile_unfollow))
        .route("/{username}/{post_id}/", web::get().to(posts::post_view))
        .service(
            web::resource("/{username}/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/{username}/{post_id}/comment/")
                .route(web::get().to(comments::comment_redirect))
                .route(web::post().to(comments::add_comment)),
        );
}
