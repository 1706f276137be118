//! Embedded Tera templates and the layout context every page receives.

use std::sync::LazyLock;

use chrono::Datelike;
use serde::Serialize;
use tera::{Context, Tera};

use crate::middleware::auth::Identity;

/// Template sources compiled into the binary, keyed by template name.
const SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("includes/feed.html", include_str!("../templates/includes/feed.html")),
    ("posts/index.html", include_str!("../templates/posts/index.html")),
    ("posts/group.html", include_str!("../templates/posts/group.html")),
    ("posts/profile.html", include_str!("../templates/posts/profile.html")),
    ("posts/follow.html", include_str!("../templates/posts/follow.html")),
    ("posts/post.html", include_str!("../templates/posts/post.html")),
    ("posts/post_form.html", include_str!("../templates/posts/post_form.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/logged_out.html", include_str!("../templates/users/logged_out.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
    (
        "users/password_change.html",
        include_str!("../templates/users/password_change.html"),
    ),
    (
        "users/password_change_done.html",
        include_str!("../templates/users/password_change_done.html"),
    ),
    ("about/author.html", include_str!("../templates/about/author.html")),
    ("about/tech.html", include_str!("../templates/about/tech.html")),
    ("admin/group_form.html", include_str!("../templates/admin/group_form.html")),
    ("core/404.html", include_str!("../templates/core/404.html")),
    ("core/500.html", include_str!("../templates/core/500.html")),
    ("core/error.html", include_str!("../templates/core/error.html")),
];

static TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.set_escape_fn(escape_html);
    if let Err(e) = tera.add_raw_templates(SOURCES.iter().copied()) {
        tracing::error!(error = %e, "Failed to compile templates");
    }
    tera
});

/// HTML escaping that leaves `/` alone so paths and media URLs read as written.
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

/// Render a named template.
pub fn render(name: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(name, context)
}

/// Who is looking at the page, as the layout sees it.
#[derive(Debug, Serialize)]
struct Viewer<'a> {
    username: &'a str,
    is_staff: bool,
}

/// Context with the values the shared layout needs: `year` and `viewer`.
pub fn page_context(viewer: Option<&Identity>) -> Context {
    let mut context = Context::new();
    context.insert("year", &chrono::Utc::now().year());
    context.insert(
        "viewer",
        &viewer.map(|identity| Viewer {
            username: &identity.username,
            is_staff: identity.is_staff(),
        }),
    );
    context
}
