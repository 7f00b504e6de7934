//! End-to-end tests: real proxy listener, raw TCP mock backends, reqwest client.

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

mod common;

async fn get_body(client: &reqwest::Client, url: &str) -> (StatusCode, String) {
    let res = client.get(url).send().await.expect("Proxy unreachable");
    let status = res.status();
    (status, res.text().await.unwrap())
}

#[tokio::test]
async fn test_round_robin_spreads_requests() {
    let b1 = common::start_mock_backend().await;
    let b2 = common::start_mock_backend().await;
    let b3 = common::start_mock_backend().await;
    let config = common::config(
        "round-robin",
        vec![common::backend(b1), common::backend(b2), common::backend(b3)],
    );
    let proxy = common::start_proxy(config).await;
    let client = common::client();

    let mut served = Vec::new();
    for _ in 0..6 {
        let (status, body) = get_body(&client, &proxy.url("/")).await;
        assert_eq!(status, StatusCode::OK);
        served.push(body);
    }

    // The cursor is advanced before the first pick.
    let expected: Vec<String> = [b2, b3, b1, b2, b3, b1]
        .iter()
        .map(|a| format!("http://{}", a))
        .collect();
    assert_eq!(served, expected);
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_weighted_round_robin_follows_weights() {
    let light = common::start_mock_backend().await;
    let heavy = common::start_mock_backend().await;
    let mut heavy_config = common::backend(heavy);
    heavy_config.weight = 3;
    let config = common::config(
        "weighted-round-robin",
        vec![common::backend(light), heavy_config],
    );
    let proxy = common::start_proxy(config).await;
    let client = common::client();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..8 {
        let (_, body) = get_body(&client, &proxy.url("/work")).await;
        *counts.entry(body).or_default() += 1;
    }

    assert_eq!(counts[&format!("http://{}", light)], 2);
    assert_eq!(counts[&format!("http://{}", heavy)], 6);
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_forward_failure_demotes_backend() {
    let dead = common::dead_address().await;
    let live = common::start_mock_backend().await;
    let config = common::config(
        "round-robin",
        vec![common::backend(live), common::backend(dead)],
    );
    let proxy = common::start_proxy(config).await;
    let client = common::client();

    // Round robin starts at the second backend, which refuses connections.
    let (status, body) = get_body(&client, &proxy.url("/")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, "The server is down");

    let dead_url = Url::parse(&format!("http://{}", dead)).unwrap();
    let demoted = proxy.pool.find(&dead_url).unwrap();
    assert!(!demoted.is_alive());
    assert_eq!(demoted.active_connections(), 0);

    for _ in 0..3 {
        let (status, body) = get_body(&client, &proxy.url("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("http://{}", live));
    }
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_no_alive_backend_is_503() {
    let live = common::start_mock_backend().await;
    let mut down = common::backend(live);
    down.alive = false;
    let proxy = common::start_proxy(common::config("least-conn", vec![down])).await;
    let client = common::client();

    let (status, body) = get_body(&client, &proxy.url("/")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "Service unavailable");

    let empty = common::start_proxy(common::config("round-robin", Vec::new())).await;
    let (status, _) = get_body(&client, &empty.url("/")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    proxy.shutdown.trigger();
    empty.shutdown.trigger();
}

#[tokio::test]
async fn test_sticky_session_pins_client() {
    let backends = [
        common::start_mock_backend().await,
        common::start_mock_backend().await,
        common::start_mock_backend().await,
    ];
    let mut config = common::config(
        "round-robin",
        backends.iter().map(|a| common::backend(*a)).collect(),
    );
    config.sticky = true;
    let proxy = common::start_proxy(config).await;
    let client = common::client();

    let res = client.get(proxy.url("/")).send().await.unwrap();
    let set_cookie = res
        .headers()
        .get(SET_COOKIE)
        .expect("sticky mode issues a cookie")
        .to_str()
        .unwrap()
        .to_string();
    let first = res.text().await.unwrap();
    assert!(set_cookie.starts_with("proxy_session="));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=3600"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    for _ in 0..5 {
        let res = client
            .get(proxy.url("/"))
            .header(COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        assert!(res.headers().get(SET_COOKIE).is_none());
        assert_eq!(res.text().await.unwrap(), first);
    }

    // A cookie naming no known backend falls back to the strategy.
    let res = client
        .get(proxy.url("/"))
        .header(COOKIE, "proxy_session=0123456789abcdef0123456789abcdef")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(SET_COOKIE).is_some());
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_health_check_revives_backend() {
    let live = common::start_mock_backend().await;
    let mut down = common::backend(live);
    down.alive = false;
    let mut config = common::config("round-robin", vec![down]);
    config.health_check.enabled = true;
    config.health_check.probe_timeout_ms = 500;
    config.health_check_frequency = "300ms".to_string();
    let client = common::client();
    let proxy = common::start_proxy(config).await;

    let backend = proxy.pool.snapshot()[0].clone();
    assert!(!backend.is_alive(), "configured liveness holds until the first health check");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !backend.is_alive() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "health monitor should mark the backend alive"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    let (status, body) = get_body(&client, &proxy.url("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("http://{}", live));
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_returned_to_client() {
    let live = common::start_mock_backend().await;
    let proxy = common::start_proxy(common::config("round-robin", vec![common::backend(live)])).await;
    let client = common::client();

    let res = client.get(proxy.url("/")).send().await.unwrap();
    let id = res.headers().get("x-request-id").expect("request id header");
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());

    let res = client
        .get(proxy.url("/"))
        .header("x-request-id", "client-chosen")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "client-chosen");
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_listener() {
    let live = common::start_mock_backend().await;
    let proxy = common::start_proxy(common::config("round-robin", vec![common::backend(live)])).await;
    let client = common::client();

    let (status, _) = get_body(&client, &proxy.url("/")).await;
    assert_eq!(status, StatusCode::OK);

    proxy.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(client.get(proxy.url("/")).send().await.is_err());
}
