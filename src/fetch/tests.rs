//! Tests for the fetch module

use super::*;
use crate::error::Error;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_http_fetcher_config_default() {
    let config = HttpFetcherConfig::default();
    assert_eq!(config.page_param, "page");
    assert_eq!(config.limit_param, "limit");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.rate_limit.is_none());
}

#[test]
fn test_http_fetcher_config_builder() {
    let config = HttpFetcherConfig::builder("https://api.example.com")
        .path("/v1/items")
        .params("p", "per_page")
        .query("sort", "name")
        .header("X-Custom", "value")
        .timeout(Duration::from_secs(5))
        .rate_limit(RateLimiterConfig::new(5, 5))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.path, "/v1/items");
    assert_eq!(config.page_param, "p");
    assert_eq!(config.limit_param, "per_page");
    assert_eq!(config.query.get("sort"), Some(&"name".to_string()));
    assert_eq!(
        config.headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_page_url_includes_params() {
    let fetcher = HttpPageFetcher::new(
        HttpFetcherConfig::builder("https://api.example.com/")
            .path("/items")
            .query("q", "rust")
            .build(),
    )
    .unwrap();

    let url = fetcher.page_url(3, 25);
    assert_eq!(
        url.as_str(),
        "https://api.example.com/items?q=rust&page=3&limit=25"
    );
    assert!(!fetcher.has_rate_limiter());
}

#[test]
fn test_http_fetcher_rejects_bad_base_url() {
    let result = HttpPageFetcher::new(HttpFetcherConfig::builder("").build());
    assert!(matches!(result, Err(Error::InvalidConfigValue { .. })));

    let result = HttpPageFetcher::new(HttpFetcherConfig::builder("not a url").build());
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn test_http_fetcher_sends_page_and_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseObject": {"items": [{"id": 11}], "totalPages": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(
        HttpFetcherConfig::builder(mock_server.uri())
            .path("items")
            .header("X-Api-Key", "secret")
            .build(),
    )
    .unwrap();

    let body = fetcher.fetch(2, 10).await.unwrap();
    assert_eq!(body["responseObject"]["items"][0]["id"], 11);
}

#[tokio::test]
async fn test_http_fetcher_status_error_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "limit too large"})),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(
        HttpFetcherConfig::builder(mock_server.uri())
            .path("items")
            .build(),
    )
    .unwrap();

    let err = fetcher.fetch(1, 1000).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 400, .. }));
    assert_eq!(err.user_message(), "limit too large");
}

#[tokio::test]
async fn test_http_fetcher_does_not_retry_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(
        HttpFetcherConfig::builder(mock_server.uri())
            .path("items")
            .build(),
    )
    .unwrap();

    let err = fetcher.fetch(1, 20).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_http_fetcher_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(HttpFetcherConfig::builder(mock_server.uri()).build())
        .unwrap();

    let err = fetcher.fetch(1, 20).await.unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 7
        }
    ));
}

#[tokio::test]
async fn test_http_fetcher_non_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new(HttpFetcherConfig::builder(mock_server.uri()).build())
        .unwrap();

    let err = fetcher.fetch(1, 20).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_fn_fetcher_passes_arguments() {
    let fetcher = FnFetcher::new(|page: u32, limit: u32| async move {
        Ok::<Value, Error>(json!({"page": page, "limit": limit}))
    });

    let body = fetcher.fetch(4, 15).await.unwrap();
    assert_eq!(body, json!({"page": 4, "limit": 15}));
}

#[tokio::test]
async fn test_arc_fetcher_delegates() {
    let fetcher: std::sync::Arc<dyn PageFetcher<Value>> =
        std::sync::Arc::new(FnFetcher::new(|page: u32, _limit: u32| async move {
            if page > 1 {
                Err(Error::Other("boom".to_string()))
            } else {
                Ok(json!([]))
            }
        }));

    assert!(fetcher.fetch(1, 10).await.is_ok());
    assert!(fetcher.fetch(2, 10).await.is_err());
}
