use api_connector::core::{Transport, TransportResponse};
use api_connector::{
    ApiBody, ApiConnector, ApiError, Credentials, HttpMethod, Model, Paginated, ReqwestTransport,
    RequestConfig, StaticHost,
};
use httpmock::prelude::*;
use httpmock::Method::HEAD;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    #[serde(flatten)]
    model: Model,
    name: String,
}

fn connector_for(server: &MockServer) -> ApiConnector<ReqwestTransport, StaticHost> {
    ApiConnector::new(
        ReqwestTransport::new("http"),
        StaticHost::new(server.address().to_string()),
    )
}

fn opts() -> RequestConfig {
    RequestConfig::new()
}

#[tokio::test]
async fn test_fetch_paginated_users() {
    // Setup mock HTTP server
    let server = MockServer::start_async().await;
    let mock_data = serde_json::json!({
        "total": 2,
        "page": 1,
        "limit": 10,
        "items": [
            {"id": "u1", "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-02T00:00:00Z", "name": "Ada"},
            {"id": "u2", "createdAt": "2024-01-03T00:00:00Z", "updatedAt": "2024-01-04T00:00:00Z", "name": "Grace"}
        ]
    });

    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/users");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        })
        .await;

    let connector = connector_for(&server);
    let page: Paginated<User> = connector.fetch_api("users", opts(), None).await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].model.id, "u1");
    assert_eq!(page.items[1].name, "Grace");
}

#[tokio::test]
async fn test_post_sends_json_body_and_content_type() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/users")
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"name": "Ada"}));
            then.status(201)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id": 1}));
        })
        .await;

    let connector = connector_for(&server);
    let body = serde_json::json!({"name": "Ada"});
    let result: ApiBody<serde_json::Value> = connector
        .post_api("users", Some(&body), opts().header("Content-Type", "text/plain"), None)
        .await
        .unwrap();

    api_mock.assert_async().await;
    assert_eq!(result, ApiBody::Parsed(serde_json::json!({"id": 1})));
}

#[tokio::test]
async fn test_post_without_body_sends_empty_object() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/ping").body("{}");
            then.status(200).json_body(serde_json::json!({"pong": true}));
        })
        .await;

    let connector = connector_for(&server);
    let result: ApiBody<serde_json::Value> = connector
        .post_api::<serde_json::Value, _>("ping", None, opts(), None)
        .await
        .unwrap();

    api_mock.assert_async().await;
    assert_eq!(result.parsed().unwrap()["pong"], true);
}

#[tokio::test]
async fn test_patch_with_no_content_returns_raw_text() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/users/1");
            then.status(204);
        })
        .await;

    let connector = connector_for(&server);
    let result: ApiBody<serde_json::Value> = connector
        .patch_api("users/1", Some(&serde_json::json!({"name": "B"})), opts(), None)
        .await
        .unwrap();

    api_mock.assert_async().await;
    assert_eq!(result, ApiBody::Raw(String::new()));
}

#[tokio::test]
async fn test_delete_parses_json_response() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/users/1")
                .header("content-type", "application/json");
            then.status(200).json_body(serde_json::json!({"deleted": "users/1"}));
        })
        .await;

    let connector = connector_for(&server);
    let result: serde_json::Value = connector.delete_api("users/1", opts(), None).await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(result["deleted"], "users/1");
}

#[tokio::test]
async fn test_not_found_is_http_error() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/missing");
            then.status(404).body("{\"error\": \"nope\"}");
        })
        .await;

    let connector = connector_for(&server);
    let err = connector
        .fetch_api::<serde_json::Value>("missing", opts(), None)
        .await
        .unwrap_err();

    api_mock.assert_async().await;
    assert_eq!(
        err,
        ApiError::Http {
            status: 404,
            status_text: "Not Found".to_string(),
        }
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_json() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/broken");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("{\"unterminated\": ");
        })
        .await;

    let connector = connector_for(&server);
    let err = connector
        .fetch_api::<serde_json::Value>("broken", opts(), None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "fetchApi: bad JSON");
}

#[tokio::test]
async fn test_get_returns_text_without_prefix() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200).body("ok");
        })
        .await;

    let connector = connector_for(&server);
    let text = connector.get_api("health", opts(), Some("")).await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_head_reports_inverted_status() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/api/present");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/api/absent");
            then.status(404);
        })
        .await;

    let connector = connector_for(&server);

    assert!(!connector.head_api("present", opts(), None).await.unwrap());
    assert!(connector.head_api("absent", opts(), None).await.unwrap());
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let server = MockServer::start_async().await;
    let payload: Vec<u8> = vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff, 0xfe];

    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/report.pdf");
            then.status(200)
                .header("Content-Type", "application/pdf")
                .body(payload.clone());
        })
        .await;

    let connector = connector_for(&server);
    let bytes = connector
        .download_api("report.pdf", opts(), Some("files"))
        .await
        .unwrap();

    assert_eq!(bytes, payload);
}

#[tokio::test]
async fn test_set_host_redirects_later_requests() {
    let first = MockServer::start_async().await;
    let second = MockServer::start_async().await;

    let first_mock = first
        .mock_async(|when, then| {
            when.method(GET).path("/api/who");
            then.status(200).body("first");
        })
        .await;
    let second_mock = second
        .mock_async(|when, then| {
            when.method(GET).path("/api/who");
            then.status(200).body("second");
        })
        .await;

    let connector = connector_for(&first);
    let pending = connector.get_api("who", opts(), None);
    connector.set_host(Some(&second.address().to_string()));

    assert_eq!(pending.await.unwrap(), "first");
    assert_eq!(connector.get_api("who", opts(), None).await.unwrap(), "second");

    first_mock.assert_hits_async(1).await;
    second_mock.assert_hits_async(1).await;

    connector.set_host(None);
    assert_eq!(connector.host(), first.address().to_string());
}

#[tokio::test]
async fn test_connector_forces_credentials_include() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/private")
                .header("authorization", "Bearer token");
            then.status(200).body("secret");
        })
        .await;

    let connector = connector_for(&server);
    let text = connector
        .get_api(
            "private",
            opts()
                .header("Authorization", "Bearer token")
                .credentials(Credentials::Omit)
                .method(HttpMethod::Delete),
            None,
        )
        .await
        .unwrap();

    api_mock.assert_async().await;
    assert_eq!(text, "secret");
}

#[tokio::test]
async fn test_transport_omit_strips_credential_headers() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/raw")
                .header("x-trace", "1")
                .header_missing("authorization")
                .header_missing("cookie");
            then.status(200).body("anonymous");
        })
        .await;

    let transport = ReqwestTransport::new("http");
    let config = opts()
        .header("Authorization", "Bearer token")
        .header("Cookie", "session=1")
        .header("X-Trace", "1")
        .credentials(Credentials::Omit);
    let response = transport
        .request(&format!("//{}/raw", server.address()), config)
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "anonymous");
    api_mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let connector = ApiConnector::new(
        ReqwestTransport::new("http"),
        StaticHost::new(address.to_string()),
    );

    let fetched = connector
        .fetch_api::<serde_json::Value>("users", opts(), None)
        .await
        .unwrap_err();
    let head = connector.head_api("users", opts(), None).await.unwrap_err();

    assert!(fetched.is_network());
    assert!(head.is_network());
}

/// Serves one canned HTTP response on a raw socket and returns the address.
async fn serve_raw_once(response: &'static str) -> std::net::SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    address
}

#[tokio::test]
async fn test_http_error_keeps_server_status_text() {
    let address = serve_raw_once(
        "HTTP/1.1 404 Gone Fishing\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
    )
    .await;

    let connector = ApiConnector::new(
        ReqwestTransport::new("http"),
        StaticHost::new(address.to_string()),
    );
    let err = connector.get_api("lake", opts(), None).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Http {
            status: 404,
            status_text: "Gone Fishing".to_string(),
        }
    );
}

#[tokio::test]
async fn test_fetch_api_sends_overridden_put() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(PUT).path("/api/users/1").body("{\"name\":\"Ada\"}");
            then.status(200).json_body(serde_json::json!({"replaced": true}));
        })
        .await;

    let connector = connector_for(&server);
    let result: serde_json::Value = connector
        .fetch_api(
            "users/1",
            opts().method(HttpMethod::Put).body("{\"name\":\"Ada\"}"),
            None,
        )
        .await
        .unwrap();

    api_mock.assert_async().await;
    assert_eq!(result["replaced"], true);
}

#[tokio::test]
async fn test_fetch_api_sends_overridden_options() {
    let server = MockServer::start_async().await;

    let api_mock = server
        .mock_async(|when, then| {
            when.method(OPTIONS).path("/api/users");
            then.status(200).json_body(serde_json::json!(["GET", "POST"]));
        })
        .await;

    let connector = connector_for(&server);
    let allowed: Vec<String> = connector
        .fetch_api("users", opts().method(HttpMethod::Options), None)
        .await
        .unwrap();

    api_mock.assert_async().await;
    assert_eq!(allowed, vec!["GET".to_string(), "POST".to_string()]);
}
