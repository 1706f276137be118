//! Whole-page snapshot cache for the home feed.
//!
//! Entries are keyed by request path and query string and expire on a
//! wall-clock TTL. Writes never invalidate them.

use std::future::Future;

use actix_web::HttpRequest;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Cache key of the page served for `req`.
pub fn page_key(req: &HttpRequest) -> String {
    format!("page:{}?{}", req.path(), req.query_string())
}

/// Return the cached snapshot under `key`, or render, store and return a
/// fresh one.
pub async fn cached<F>(state: &AppState, key: &str, render: F) -> AppResult<String>
where
    F: Future<Output = AppResult<String>>,
{
    if let Some(html) = state.cache.get(key).await {
        tracing::debug!(key, "Page cache hit");
        return Ok(html);
    }

    let html = render.await?;
    if let Err(e) = state
        .cache
        .set(key, &html, Some(state.page_cache_ttl))
        .await
    {
        tracing::warn!(key, error = %e, "Failed to store page snapshot");
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_key_includes_query() {
        let req = TestRequest::get().uri("/?page=2").to_http_request();
        assert_eq!(page_key(&req), "page:/?page=2");

        let req = TestRequest::get().uri("/").to_http_request();
        assert_eq!(page_key(&req), "page:/?");
    }

    #[actix_web::test]
    async fn test_snapshot_served_until_expiry() {
        let state = AppState::in_memory(Duration::from_millis(50));

        let first = cached(&state, "page:/?", async { Ok("one".to_string()) })
            .await
            .unwrap();
        let second = cached(&state, "page:/?", async { Ok("two".to_string()) })
            .await
            .unwrap();
        assert_eq!(first, "one");
        assert_eq!(second, "one");

        tokio::time::sleep(Duration::from_millis(80)).await;
        let third = cached(&state, "page:/?", async { Ok("three".to_string()) })
            .await
            .unwrap();
        assert_eq!(third, "three");
    }
}
