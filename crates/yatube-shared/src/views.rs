//! Template view models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use yatube_core::domain::{CommentEntry, Group, GroupRef, PostEntry};
use yatube_core::pagination::Page;

/// Display format for publication dates, e.g. `04 Mar 2021`.
pub const DATE_FORMAT: &str = "%d %b %Y";

/// URL under which an uploaded file is served.
pub fn media_url(path: &str) -> String {
    format!("/media/{path}")
}

fn display_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A post as shown in feeds and on its detail page.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: String,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image_url: Option<String>,
}

impl From<PostEntry> for PostView {
    fn from(entry: PostEntry) -> Self {
        Self {
            id: entry.post.id,
            pub_date: display_date(&entry.post.pub_date),
            image_url: entry.post.image.as_deref().map(media_url),
            text: entry.post.text,
            author: entry.author,
            group: entry.group,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupView {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub author: String,
    pub text: String,
    pub created: String,
}

impl From<CommentEntry> for CommentView {
    fn from(entry: CommentEntry) -> Self {
        Self {
            created: display_date(&entry.comment.created),
            text: entry.comment.text,
            author: entry.author,
        }
    }
}

/// Sidebar shown on profile and post pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthorCard {
    pub username: String,
    pub posts_count: u64,
    pub followers: u64,
    pub following: u64,
    /// Whether the viewer follows this author.
    pub is_following: bool,
    /// Whether the viewer is this author.
    pub is_self: bool,
}

/// A page with its navigation flags flattened for the paginator template.
#[derive(Debug, Clone, Serialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_number: Option<u64>,
    pub next_number: Option<u64>,
    pub page_range: Vec<u64>,
}

impl<T> PageView<T> {
    pub fn from_page<S>(page: Page<S>) -> Self
    where
        T: From<S>,
    {
        Self {
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous_number: page.previous_number(),
            next_number: page.next_number(),
            page_range: (1..=page.num_pages).collect(),
            number: page.number,
            num_pages: page.num_pages,
            total: page.total,
            items: page.items.into_iter().map(T::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use yatube_core::domain::Post;
    use yatube_core::pagination::PageRequest;

    use super::*;

    fn entry(id: i64, image: Option<&str>) -> PostEntry {
        PostEntry {
            post: Post {
                id,
                text: format!("post {id}"),
                pub_date: Utc.with_ymd_and_hms(2021, 3, 4, 12, 0, 0).unwrap(),
                author_id: Default::default(),
                group_id: None,
                image: image.map(String::from),
            },
            author: "leo".into(),
            group: None,
        }
    }

    #[test]
    fn test_post_view_formats_date_and_image() {
        let view = PostView::from(entry(1, Some("posts/abc.gif")));
        assert_eq!(view.pub_date, "04 Mar 2021");
        assert_eq!(view.image_url.as_deref(), Some("/media/posts/abc.gif"));
        assert_eq!(view.author, "leo");

        assert!(PostView::from(entry(2, None)).image_url.is_none());
    }

    #[test]
    fn test_page_view_flags() {
        let rows = (1..=25).map(|id| entry(id, None)).collect();
        let page = Page::from_ordered(rows, PageRequest::new(2));
        let view: PageView<PostView> = PageView::from_page(page);

        assert_eq!(view.items.len(), 10);
        assert_eq!(view.items[0].id, 11);
        assert_eq!(view.previous_number, Some(1));
        assert_eq!(view.next_number, Some(3));
        assert_eq!(view.page_range, vec![1, 2, 3]);
    }
}
