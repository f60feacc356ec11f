//! Gatekeeper behavior through the full middleware stack.

use axum::body::Body;
use axum::http::StatusCode;

mod common;
use common::{body_json, get, header, send};

#[tokio::test]
async fn test_unknown_locale_redirects_with_cookie() {
    let response = send(get("/xx/dashboard").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header(&response, "location"), Some("/en/dashboard"));
    assert_eq!(header(&response, "x-locale"), Some("en"));
    let cookie = header(&response, "set-cookie").unwrap();
    assert!(cookie.starts_with("locale=en;"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=63072000"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_auth_error_goes_to_localized_error_page() {
    let request = get("/en/auth/signin?error=OAuthAccountNotLinked")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        header(&response, "location"),
        Some("/en/auth/error?error=OAuthAccountNotLinked")
    );
}

#[tokio::test]
async fn test_auth_error_uses_cookie_locale() {
    let request = get("/api/auth/callback/github?error=AccessDenied")
        .header("cookie", "locale=es")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(
        header(&response, "location"),
        Some("/es/auth/error?error=AccessDenied")
    );
    assert!(header(&response, "set-cookie").is_none());
}

#[tokio::test]
async fn test_traversal_never_reaches_location() {
    let response = send(get("/../../../etc/passwd").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = header(&response, "location").unwrap();
    assert!(location.starts_with("/en/"));
    assert!(!location.contains(".."));
}

#[tokio::test]
async fn test_hostile_cookie_falls_back_to_default() {
    let request = get("/")
        .header("cookie", "locale=<script>")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(header(&response, "location"), Some("/en"));
    assert_eq!(header(&response, "x-locale"), Some("en"));
}

#[tokio::test]
async fn test_localized_page_is_forwarded_and_decorated() {
    let request = get("/es/dashboard")
        .header("cookie", "locale=es")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-locale"), Some("es"));
    assert_eq!(header(&response, "x-content-type-options"), Some("nosniff"));
    assert_eq!(header(&response, "x-frame-options"), Some("DENY"));
    assert_eq!(header(&response, "x-xss-protection"), Some("1; mode=block"));
    assert!(header(&response, "set-cookie").is_none());
    assert!(header(&response, "x-request-id").is_some());

    let body = body_json(response).await;
    assert_eq!(body["locale"], "es");
    assert_eq!(body["locale_source"], "path");
}

#[tokio::test]
async fn test_forwarded_page_refreshes_stale_cookie() {
    let request = get("/es/dashboard")
        .header("cookie", "locale=en")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "set-cookie").unwrap().starts_with("locale=es;"));
}

#[tokio::test]
async fn test_static_assets_are_untouched() {
    let response = send(get("/_next/static/chunks/app.js").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "x-locale").is_none());
    assert!(header(&response, "x-frame-options").is_none());
    assert!(header(&response, "set-cookie").is_none());

    let body = body_json(response).await;
    assert!(body["locale"].is_null());
}

#[tokio::test]
async fn test_api_routes_forward_with_negotiated_locale() {
    let request = get("/api/users")
        .header("accept-language", "es-ES,es;q=0.9,en;q=0.5")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-locale"), Some("es"));
    let body = body_json(response).await;
    assert_eq!(body["locale_source"], "accept_language");
}

#[tokio::test]
async fn test_redirect_preserves_method_and_query() {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/search?q=rust&page=2")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(header(&response, "location"), Some("/en/search?q=rust&page=2"));
}
