use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};

use yatube_core::domain::{FeedFilter, NewGroup, NewPost, Post, User};
use yatube_core::pagination::PageRequest;

use super::{PageQuery, configure_routes, not_found};
use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::error::error_pages;
use crate::state::AppState;

const PASSWORD: &str = "correct-horse-battery";

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(error_pages())
                .app_data($state.clone())
                .configure(configure_routes)
                .default_service(web::to(not_found)),
        )
        .await
    };
}

fn state() -> web::Data<AppState> {
    web::Data::new(AppState::in_memory(Duration::from_secs(20)))
}

/// A stored user and a session token for them.
async fn user(state: &AppState, username: &str, staff: bool) -> (User, String) {
    let hash = state.passwords.hash(PASSWORD).unwrap();
    let mut user = User::new(username.into(), format!("{username}@example.com"), hash);
    user.is_staff = staff;
    let user = state.users.create(user).await.unwrap();
    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.roles())
        .unwrap();
    (user, token)
}

async fn post(state: &AppState, author: &User, text: &str) -> Post {
    state
        .posts
        .create(NewPost {
            author_id: author.id,
            text: text.into(),
            group_id: None,
            image: None,
        })
        .await
        .unwrap()
}

fn session(token: &str) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, token.to_string())
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn body<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn multipart(boundary: &str, text: &str, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\n{text}\r\n"
    )
    .into_bytes();
    if let Some((filename, data)) = image {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: image/gif\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

#[actix_web::test]
async fn test_new_post_is_visible_everywhere() {
    let state = state();
    let app = app!(state);
    let (leo, token) = user(&state, "leo", false).await;

    let req = TestRequest::post()
        .uri("/new/")
        .cookie(session(&token))
        .set_form([("text", "Hello from leo"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let stored = state
        .posts
        .feed(FeedFilter::Author(leo.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(stored.total, 1);
    let post_id = stored.items[0].post.id;

    for uri in ["/".to_string(), "/leo/".to_string(), format!("/leo/{post_id}/")] {
        let resp = test::call_service(&app, TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert!(body(resp).await.contains("Hello from leo"), "{uri}");
    }
}

#[actix_web::test]
async fn test_home_feed_is_served_from_cache() {
    let state = state();
    let app = app!(state);
    let (leo, _) = user(&state, "leo", false).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert!(!body(resp).await.contains("Cached away"));

    let created = post(&state, &leo, "Cached away").await;

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert!(!body(resp).await.contains("Cached away"));

    let resp = test::call_service(&app, TestRequest::get().uri("/leo/").to_request()).await;
    assert!(body(resp).await.contains("Cached away"));
    let detail = format!("/leo/{}/", created.id);
    let resp = test::call_service(&app, TestRequest::get().uri(&detail).to_request()).await;
    assert!(body(resp).await.contains("Cached away"));

    state.cache.clear().await.unwrap();
    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert!(body(resp).await.contains("Cached away"));
}

#[actix_web::test]
async fn test_cache_is_keyed_by_query() {
    let state = state();
    let app = app!(state);
    let (leo, _) = user(&state, "leo", false).await;

    test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    post(&state, &leo, "Fresh on another key").await;

    let resp = test::call_service(&app, TestRequest::get().uri("/?page=1").to_request()).await;
    assert!(body(resp).await.contains("Fresh on another key"));
}

#[actix_web::test]
async fn test_author_edits_and_non_author_is_redirected() {
    let state = state();
    let app = app!(state);
    let (leo, leo_token) = user(&state, "leo", false).await;
    let (_, mia_token) = user(&state, "mia", false).await;
    let created = post(&state, &leo, "Original text").await;
    let edit_uri = format!("/leo/{}/edit/", created.id);
    let detail_uri = format!("/leo/{}/", created.id);

    let req = TestRequest::get()
        .uri(&edit_uri)
        .cookie(session(&leo_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body(resp).await.contains("Original text"));

    let req = TestRequest::post()
        .uri(&edit_uri)
        .cookie(session(&mia_token))
        .set_form([("text", "Hijacked")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), detail_uri);
    let unchanged = state.posts.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "Original text");

    let req = TestRequest::post()
        .uri(&edit_uri)
        .cookie(session(&leo_token))
        .set_form([("text", "Edited text")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), detail_uri);

    let edited = state.posts.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(edited.text, "Edited text");
    assert_eq!(edited.pub_date, created.pub_date);

    state.cache.clear().await.unwrap();
    for uri in ["/", "/leo/", detail_uri.as_str()] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        let html = body(resp).await;
        assert!(html.contains("Edited text"), "{uri}");
        assert!(!html.contains("Original text"), "{uri}");
    }
}

#[actix_web::test]
async fn test_anonymous_user_is_sent_to_login() {
    let state = state();
    let app = app!(state);
    let (leo, _) = user(&state, "leo", false).await;
    let created = post(&state, &leo, "Hello").await;

    let resp = test::call_service(&app, TestRequest::get().uri("/new/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/new/");

    let comment_uri = format!("/leo/{}/comment/", created.id);
    let req = TestRequest::post()
        .uri(&comment_uri)
        .set_form([("text", "Anonymous comment")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/auth/login/?next={comment_uri}"));
    assert!(state.comments.list_for_post(created.id).await.unwrap().is_empty());

    let resp = test::call_service(&app, TestRequest::get().uri("/follow/").to_request()).await;
    assert_eq!(location(&resp), "/auth/login/?next=/follow/");
}

#[actix_web::test]
async fn test_follow_feed() {
    let state = state();
    let app = app!(state);
    let (_, a_token) = user(&state, "alice", false).await;
    let (bob, _) = user(&state, "bob", false).await;
    let (_, c_token) = user(&state, "carol", false).await;
    post(&state, &bob, "Bob writes").await;

    let req = TestRequest::get()
        .uri("/bob/follow")
        .cookie(session(&a_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/bob/");

    let feed = |token: String| {
        TestRequest::get()
            .uri("/follow/")
            .cookie(session(&token))
            .to_request()
    };

    let resp = test::call_service(&app, feed(a_token.clone())).await;
    assert!(body(resp).await.contains("Bob writes"));
    let resp = test::call_service(&app, feed(c_token.clone())).await;
    assert!(!body(resp).await.contains("Bob writes"));

    let req = TestRequest::get()
        .uri("/bob/unfollow")
        .cookie(session(&a_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/bob/");

    let resp = test::call_service(&app, feed(a_token)).await;
    assert!(!body(resp).await.contains("Bob writes"));
}

#[actix_web::test]
async fn test_follow_twice_and_self_follow() {
    let state = state();
    let app = app!(state);
    let (alice, a_token) = user(&state, "alice", false).await;
    let (bob, _) = user(&state, "bob", false).await;

    for uri in ["/bob/follow", "/bob/follow", "/alice/follow"] {
        let req = TestRequest::get()
            .uri(uri)
            .cookie(session(&a_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    }

    assert_eq!(state.follows.counts(bob.id).await.unwrap().followers, 1);
    let alice_counts = state.follows.counts(alice.id).await.unwrap();
    assert_eq!(alice_counts.following, 1);
    assert_eq!(alice_counts.followers, 0);

    let req = TestRequest::get()
        .uri("/nobody/follow")
        .cookie(session(&a_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_empty_image_fails_validation() {
    let state = state();
    let app = app!(state);
    let (leo, token) = user(&state, "leo", false).await;
    let boundary = "yatube-test-boundary";

    let req = TestRequest::post()
        .uri("/new/")
        .cookie(session(&token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart(boundary, "With empty image", Some(("empty.gif", b""))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body(resp).await.contains("The submitted file is empty."));
    assert_eq!(state.posts.count_by_author(leo.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_post_with_image_is_served() {
    let state = state();
    let app = app!(state);
    let (leo, token) = user(&state, "leo", false).await;
    let boundary = "yatube-test-boundary";

    let req = TestRequest::post()
        .uri("/new/")
        .cookie(session(&token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart(boundary, "With image", Some(("small.gif", SMALL_GIF))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let stored = state
        .posts
        .feed(FeedFilter::Author(leo.id), PageRequest::default())
        .await
        .unwrap();
    let image = stored.items[0].post.image.clone().unwrap();
    assert!(image.starts_with("posts/") && image.ends_with(".gif"));

    let resp = test::call_service(&app, TestRequest::get().uri("/leo/").to_request()).await;
    assert!(body(resp).await.contains(&format!("/media/{image}")));

    let media_uri = format!("/media/{image}");
    let resp = test::call_service(&app, TestRequest::get().uri(&media_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/gif");
    assert_eq!(test::read_body(resp).await.as_ref(), SMALL_GIF);

    // Editing without a new image keeps the stored one.
    let edit_uri = format!("/leo/{}/edit/", stored.items[0].post.id);
    let req = TestRequest::post()
        .uri(&edit_uri)
        .cookie(session(&token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart(boundary, "Still with image", None))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    let edited = state
        .posts
        .find_by_id(stored.items[0].post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edited.image.as_deref(), Some(image.as_str()));
}

#[actix_web::test]
async fn test_pagination_clamps_page_numbers() {
    let state = state();
    let app = app!(state);
    let (leo, _) = user(&state, "leo", false).await;
    for i in 0..13 {
        post(&state, &leo, &format!("post number {i:02}")).await;
    }

    let cards = |html: &str| html.matches("<article class=\"card\">").count();

    for (uri, expected) in [
        ("/leo/", 10),
        ("/leo/?page=2", 3),
        ("/leo/?page=99", 3),
        ("/leo/?page=abc", 10),
        ("/leo/?page=-1", 10),
        ("/?page=0", 10),
        ("/leo/?page=1&page=2", 3),
        ("/leo/?page=99999999999999999999", 3),
    ] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert_eq!(cards(&body(resp).await), expected, "{uri}");
    }
}

#[test]
fn test_page_query_takes_last_value() {
    assert_eq!(PageQuery::parse("page=1&page=2").page.as_deref(), Some("2"));
    assert_eq!(PageQuery::parse("sort=new&page=3").page.as_deref(), Some("3"));
    assert_eq!(PageQuery::parse("").page, None);
    assert_eq!(PageQuery::parse("page=%ZZ&page").request(), PageRequest::default());
}

#[actix_web::test]
async fn test_login_sets_cookie_and_honours_local_next() {
    let state = state();
    let app = app!(state);

    let req = TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("username", "leo"),
            ("email", "leo@example.com"),
            ("password1", PASSWORD),
            ("password2", PASSWORD),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/");

    let req = TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "leo"), ("password", PASSWORD), ("next", "/new/")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/new/");
    let token = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap();

    let req = TestRequest::get()
        .uri("/new/")
        .cookie(session(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "leo"),
            ("password", PASSWORD),
            ("next", "https://evil.example/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/");

    let req = TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "leo"), ("password", "wrong-password")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body(resp).await.contains("Please enter a correct username and password"));
}

#[actix_web::test]
async fn test_signup_rejects_taken_username() {
    let state = state();
    let app = app!(state);
    user(&state, "leo", false).await;

    let req = TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("username", "leo"),
            ("email", "other@example.com"),
            ("password1", PASSWORD),
            ("password2", PASSWORD),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body(resp).await.contains("already exists"));
}

#[actix_web::test]
async fn test_password_change() {
    let state = state();
    let app = app!(state);
    let (leo, token) = user(&state, "leo", false).await;

    let req = TestRequest::post()
        .uri("/auth/password_change/")
        .cookie(session(&token))
        .set_form([
            ("old_password", "not-the-password"),
            ("new_password1", "brand-new-secret"),
            ("new_password2", "brand-new-secret"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body(resp).await.contains("old password was entered incorrectly"));

    let req = TestRequest::post()
        .uri("/auth/password_change/")
        .cookie(session(&token))
        .set_form([
            ("old_password", PASSWORD),
            ("new_password1", "brand-new-secret"),
            ("new_password2", "brand-new-secret"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/auth/password_change/done/");

    let stored = state.users.find_by_id(leo.id).await.unwrap().unwrap();
    assert!(
        state
            .passwords
            .verify("brand-new-secret", &stored.password_hash)
            .unwrap()
    );
}

#[actix_web::test]
async fn test_comments() {
    let state = state();
    let app = app!(state);
    let (leo, token) = user(&state, "leo", false).await;
    let created = post(&state, &leo, "Hello").await;
    let comment_uri = format!("/leo/{}/comment/", created.id);
    let detail_uri = format!("/leo/{}/", created.id);

    for text in ["Nice post", "   "] {
        let req = TestRequest::post()
            .uri(&comment_uri)
            .cookie(session(&token))
            .set_form([("text", text)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), detail_uri);
    }

    let comments = state.comments.list_for_post(created.id).await.unwrap();
    assert_eq!(comments.len(), 1);

    let resp = test::call_service(&app, TestRequest::get().uri(&detail_uri).to_request()).await;
    assert!(body(resp).await.contains("Nice post"));

    let req = TestRequest::get()
        .uri(&comment_uri)
        .cookie(session(&token))
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), detail_uri);

    let req = TestRequest::post()
        .uri("/leo/999/comment/")
        .cookie(session(&token))
        .set_form([("text", "Lost")])
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_comment_body_in_any_encoding_redirects() {
    let state = state();
    let app = app!(state);
    let (leo, token) = user(&state, "leo", false).await;
    let created = post(&state, &leo, "Hello").await;
    let comment_uri = format!("/leo/{}/comment/", created.id);
    let detail_uri = format!("/leo/{}/", created.id);
    let boundary = "yatube-test-boundary";

    let req = TestRequest::post()
        .uri(&comment_uri)
        .cookie(session(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), detail_uri);
    assert!(state.comments.list_for_post(created.id).await.unwrap().is_empty());

    let req = TestRequest::post()
        .uri(&comment_uri)
        .cookie(session(&token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart(boundary, "Sent as multipart", None))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), detail_uri);

    let comments = state.comments.list_for_post(created.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.text, "Sent as multipart");

    let req = TestRequest::post()
        .uri(&comment_uri)
        .cookie(session(&token))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"text":"json"}"#)
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), detail_uri);
    assert_eq!(state.comments.list_for_post(created.id).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_not_found_pages() {
    let state = state();
    let app = app!(state);
    let (leo, _) = user(&state, "leo", false).await;
    user(&state, "mia", false).await;
    let created = post(&state, &leo, "Hello").await;

    let wrong_author = format!("/mia/{}/", created.id);
    for uri in ["/group/missing/", "/nobody/", "/leo/999/", wrong_author.as_str(), "/a/b/c/d/"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(body(resp).await.contains(uri), "{uri}");
    }
}

#[actix_web::test]
async fn test_group_feed() {
    let state = state();
    let app = app!(state);
    let (leo, _) = user(&state, "leo", false).await;
    let group = state
        .groups
        .create(NewGroup {
            title: "Cats".into(),
            slug: "cats".into(),
            description: "All about cats".into(),
        })
        .await
        .unwrap();
    state
        .posts
        .create(NewPost {
            author_id: leo.id,
            text: "Meow".into(),
            group_id: Some(group.id),
            image: None,
        })
        .await
        .unwrap();
    post(&state, &leo, "Woof").await;

    let resp = test::call_service(&app, TestRequest::get().uri("/group/cats/").to_request()).await;
    let html = body(resp).await;
    assert!(html.contains("Meow"));
    assert!(!html.contains("Woof"));
}

#[actix_web::test]
async fn test_operator_actions_need_staff() {
    let state = state();
    let app = app!(state);
    let (_, staff_token) = user(&state, "admin", true).await;
    let (_, user_token) = user(&state, "leo", false).await;

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/admin/groups/new/").to_request(),
    )
    .await;
    assert_eq!(location(&resp), "/auth/login/?next=/admin/groups/new/");

    let req = TestRequest::get()
        .uri("/admin/groups/new/")
        .cookie(session(&user_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = TestRequest::post()
        .uri("/admin/groups/new/")
        .cookie(session(&staff_token))
        .set_form([("title", "Rust News"), ("slug", ""), ("description", "Crabs")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/group/rust-news/");
    assert!(state.groups.find_by_slug("rust-news").await.unwrap().is_some());

    let req = TestRequest::post()
        .uri("/admin/groups/new/")
        .cookie(session(&staff_token))
        .set_form([("title", "Rust News"), ("slug", ""), ("description", "Again")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body(resp).await.contains("already exists"));

    state.cache.set("page:/?", "stale", None).await.unwrap();
    let req = TestRequest::post()
        .uri("/admin/cache/clear/")
        .cookie(session(&staff_token))
        .to_request();
    assert_eq!(location(&test::call_service(&app, req).await), "/");
    assert!(!state.cache.exists("page:/?").await);
}

#[actix_web::test]
async fn test_login_is_throttled() {
    let state = state();
    let app = app!(state);

    let mut last = StatusCode::OK;
    for _ in 0..15 {
        let req = TestRequest::post()
            .uri("/auth/login/")
            .set_form([("username", "nobody"), ("password", "nothing")])
            .to_request();
        last = test::call_service(&app, req).await.status();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);

    let resp = test::call_service(&app, TestRequest::get().uri("/auth/login/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_static_pages_and_health() {
    let state = state();
    let app = app!(state);

    for uri in ["/about/author/", "/about/spec/", "/about-author/", "/about-spec/"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], false);
}

#[actix_web::test]
async fn test_layout_shows_viewer() {
    let state = state();
    let app = app!(state);
    let (_, token) = user(&state, "leo", false).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert!(body(resp).await.contains("Log in"));

    // The cached feed must not carry the anonymous layout to a signed-in viewer.
    let req = TestRequest::get().uri("/").cookie(session(&token)).to_request();
    let html = body(test::call_service(&app, req).await).await;
    assert!(html.contains("@leo"));
    assert!(html.contains("Log out"));
}
