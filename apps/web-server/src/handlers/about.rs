//! Static informational pages.

use actix_web::HttpResponse;

use super::render_page;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::templates::page_context;

/// GET /about/author/
pub async fn author(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    render_page("about/author.html", &page_context(viewer.viewer()))
}

/// GET /about/spec/
pub async fn tech(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    render_page("about/tech.html", &page_context(viewer.viewer()))
}
