use httpmock::prelude::*;
use stackctl::domain::model::HealthEndpoint;
use stackctl::domain::ports::HealthProbe;
use stackctl::HttpHealthProbe;
use std::time::Duration;

fn endpoint(name: &str, url: String) -> HealthEndpoint {
    HealthEndpoint {
        name: name.to_string(),
        url,
    }
}

#[tokio::test]
async fn test_healthy_endpoint() {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"status": "ok"}));
    });

    let probe = HttpHealthProbe::new(Duration::from_secs(5)).unwrap();
    let report = probe.check(&endpoint("backend", server.url("/health"))).await;

    health_mock.assert();
    assert!(report.healthy);
    assert_eq!(report.status, Some(200));
    assert_eq!(report.name, "backend");
    assert_eq!(report.detail, "200 OK");
}

#[tokio::test]
async fn test_error_status_is_unhealthy() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(503);
    });

    let probe = HttpHealthProbe::new(Duration::from_secs(5)).unwrap();
    let report = probe.check(&endpoint("gateway", server.url("/health"))).await;

    assert!(!report.healthy);
    assert_eq!(report.status, Some(503));
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    // 取得一個空閒埠後立即釋放，確保沒有服務在監聽
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let probe = HttpHealthProbe::new(Duration::from_secs(2)).unwrap();
    let report = probe
        .check(&endpoint("backend", format!("http://127.0.0.1:{}/health", port)))
        .await;

    assert!(!report.healthy);
    assert_eq!(report.status, None);
}
