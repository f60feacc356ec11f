//! End-to-end tests against a real listener.

use locale_gatekeeper::config::{Environment, GatekeeperConfig};

mod common;
use common::{client, start_server};

#[tokio::test]
async fn test_redirect_then_follow() {
    let server = start_server(GatekeeperConfig::default()).await;
    let client = client();

    let res = client
        .get(server.url("/"))
        .header("accept-language", "es-MX,es;q=0.9")
        .send()
        .await
        .expect("gatekeeper unreachable");
    assert_eq!(res.status(), 307);
    assert_eq!(res.headers()["location"], "/es");
    assert!(res.headers().contains_key("x-request-id"));

    let res = client
        .get(server.url("/es"))
        .header("cookie", "locale=es")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-locale"], "es");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/es");
    assert_eq!(body["locale"], "es");

    server.stop().await;
}

#[tokio::test]
async fn test_production_cookie_is_secure() {
    let config = GatekeeperConfig {
        environment: Environment::Production,
        ..GatekeeperConfig::default()
    };
    let server = start_server(config).await;

    let res = client().get(server.url("/pricing")).send().await.unwrap();
    assert_eq!(res.status(), 307);
    assert_eq!(res.headers()["location"], "/en/pricing");
    let cookie = res.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.ends_with("; Secure"));

    server.stop().await;
}

#[tokio::test]
async fn test_shared_limiter_is_reachable_from_state() {
    let server = locale_gatekeeper::HttpServer::new(GatekeeperConfig::default()).unwrap();
    let limiter = server.state().login_limiter.clone();
    for _ in 0..10 {
        assert!(limiter.check_and_record_failure("user@example.com").is_allowed());
    }
    assert!(!limiter.check_and_record_failure("user@example.com").is_allowed());
}
