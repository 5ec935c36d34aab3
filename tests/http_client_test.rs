// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - HTTP Client Tests
 * Status handling, rate-limit retries, cancellation and transport failures
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use lonkero_recon::errors::{HttpError, NetworkError, SourceError};
use lonkero_recon::http_client::{HttpClient, HttpRequest};
use lonkero_recon::rate_limiter::{AdaptiveRateLimiter, RateLimiterConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn test_http_client_get_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Success"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 1).unwrap();
    let url = format!("{}/test", &mock_server.uri());
    let response = client.get("crtsh", &url, &CancellationToken::new()).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "Success");
}

#[tokio::test]
async fn test_http_client_post_with_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/search"))
        .and(header("X-QuakeToken", "token-1"))
        .and(body_string_contains("domain: example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"code\":0}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 1).unwrap();
    let url = format!("{}/api/v3/search", &mock_server.uri());
    let headers = [("X-QuakeToken", "token-1")];
    let request = HttpRequest::post(&url, "{\"query\":\"domain: example.com\"}".to_string())
        .with_headers(&headers);

    let response = client
        .execute("quake", request, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.body, "{\"code\":0}");
}

#[tokio::test]
async fn test_http_client_client_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 3).unwrap();
    let err = client
        .get("anubis", &mock_server.uri(), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        SourceError::Http(HttpError::ClientError { status_code, message, .. }) => {
            assert_eq!(status_code, 404);
            assert_eq!(message, "not here");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_http_client_retries_after_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let limiter = Arc::new(AdaptiveRateLimiter::new(RateLimiterConfig {
        default_source_rps: Some(10),
        ..Default::default()
    }));
    let client = HttpClient::new(30, 1).unwrap().with_rate_limiter(Arc::clone(&limiter));

    let response = client
        .get("virustotal", &mock_server.uri(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.body, "ok");

    // Backed off from the 429
    assert!(limiter.get_current_rps("virustotal").await.unwrap() < 10);
}

#[tokio::test]
async fn test_http_client_rate_limit_exhausts_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 0).unwrap();
    let err = client
        .get("hunter", &mock_server.uri(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SourceError::Http(HttpError::ServerError { status_code: 503, .. })
    ));
}

#[tokio::test]
async fn test_http_client_cancelled_before_send() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let client = HttpClient::new(30, 1).unwrap();
    let err = client.get("crtsh", &mock_server.uri(), &cancel).await.unwrap_err();
    assert!(matches!(err, SourceError::Cancelled));
}

#[tokio::test]
async fn test_http_client_cancelled_while_waiting() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let client = HttpClient::new(60, 1).unwrap();
    let started = std::time::Instant::now();
    let err = client.get("crtsh", &mock_server.uri(), &cancel).await.unwrap_err();

    assert!(matches!(err, SourceError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_http_client_connection_refused() {
    let client = HttpClient::new(5, 1).unwrap();
    let err = client
        .get("crtsh", "http://127.0.0.1:1/", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(err, SourceError::Network(NetworkError::ConnectionRefused { .. })));
}
