//! Integration tests for request dispatch using wiremock
//!
//! These tests mock both backend hosts to verify headers, host routing and
//! status classification.

use ekvastu_client::{
    ApiEndpoint, ApiError, ClientConfig, Dispatcher, RequestDescriptor, TokenStore,
};
use reqwest::Method;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn dispatcher(config: &ClientConfig) -> (Dispatcher, Arc<TokenStore>) {
    let tokens = Arc::new(TokenStore::in_memory("Bearer"));
    let dispatcher = Dispatcher::new(config, tokens.clone()).unwrap();
    (dispatcher, tokens)
}

#[tokio::test]
async fn test_static_and_auth_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/properties"))
        .and(header("authorization", "Bearer abc"))
        .and(header("content-type", "application/json"))
        .and(header("origin", "https://marksampletest.me.com:9001"))
        .and(header("referer", "https://marksampletest.me.com:9001/"))
        .and(header("sec-fetch-dest", "empty"))
        .and(header("sec-fetch-mode", "cors"))
        .and(header("sec-fetch-site", "cross-site"))
        .and(header("sec-gpc", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new().with_base_url(mock_server.uri());
    let (dispatcher, tokens) = dispatcher(&config);
    tokens.store_tokens("abc", "def");

    let value: Value = dispatcher
        .send(&RequestDescriptor::get(ApiEndpoint::Properties))
        .await
        .unwrap();
    assert_eq!(value["success"], true);

    let requests = mock_server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    assert_eq!(headers["accept"], "application/json, text/plain, */*");
    assert_eq!(headers["accept-language"], "en-US,en;q=0.9");
    let user_agent = headers["user-agent"].to_str().unwrap();
    assert!(user_agent.contains("iPhone OS 17_0"));
}

#[tokio::test]
async fn test_no_authorization_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/snode/tenant/ping"))
        .and(query_param("name", "marksampletest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new().with_base_url(mock_server.uri());
    let (dispatcher, _) = dispatcher(&config);

    let _: Value = dispatcher
        .send(&RequestDescriptor::get(ApiEndpoint::TenantPing {
            name: "marksampletest".to_string(),
        }))
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_hosts_are_routed_by_endpoint() {
    let auth_server = MockServer::start().await;
    let domain_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/smobile/tenant/plogin"))
        .and(body_json(json!({"hello": "auth"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"host": "auth"})))
        .expect(1)
        .mount(&auth_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"host": "domain"})))
        .expect(1)
        .mount(&domain_server)
        .await;

    let config = ClientConfig {
        auth_base_url: auth_server.uri(),
        domain_base_url: domain_server.uri(),
        ..Default::default()
    };
    let (dispatcher, _) = dispatcher(&config);

    let auth: Value = dispatcher
        .send(
            &RequestDescriptor::post(ApiEndpoint::SignIn)
                .with_json(&json!({"hello": "auth"}))
                .unwrap(),
        )
        .await
        .unwrap();
    let domain: Value = dispatcher
        .send(&RequestDescriptor::get(ApiEndpoint::Room("r-1".to_string())))
        .await
        .unwrap();

    assert_eq!(auth["host"], "auth");
    assert_eq!(domain["host"], "domain");
}

#[tokio::test]
async fn test_caller_headers_override_static() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("accept-language", "hi-IN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new().with_base_url(mock_server.uri());
    let (dispatcher, _) = dispatcher(&config);

    let _: Value = dispatcher
        .send(&RequestDescriptor::get(ApiEndpoint::Profile).with_header("Accept-Language", "hi-IN"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_status_classification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rooms/unauthorized"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/broken"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new().with_base_url(mock_server.uri());
    let (dispatcher, _) = dispatcher(&config);
    let room = |id: &str| RequestDescriptor::get(ApiEndpoint::Room(id.to_string()));

    let result = dispatcher.send::<Value>(&room("unauthorized")).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));

    match dispatcher.send::<Value>(&room("missing")).await {
        Err(ApiError::ServerError {
            status_code,
            message,
        }) => {
            assert_eq!(status_code, 404);
            assert_eq!(message, "not here");
        }
        other => panic!("unexpected: {:?}", other),
    }

    let result = dispatcher.send::<Value>(&room("broken")).await;
    assert!(matches!(
        result,
        Err(ApiError::ServerError {
            status_code: 503,
            ..
        })
    ));

    let result = dispatcher.send::<Value>(&room("garbled")).await;
    assert!(matches!(result, Err(ApiError::DecodingError(_))));
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/properties"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = ClientConfig::new().with_base_url(mock_server.uri());
    config.http.timeout_secs = 1;
    let (dispatcher, _) = dispatcher(&config);

    let result = dispatcher
        .send::<Value>(&RequestDescriptor::get(ApiEndpoint::Properties))
        .await;
    assert!(matches!(result, Err(ApiError::Timeout)));
}

#[tokio::test]
async fn test_network_error() {
    let config = ClientConfig::new().with_base_url("http://127.0.0.1:1");
    let (dispatcher, _) = dispatcher(&config);

    let result = dispatcher
        .send::<Value>(&RequestDescriptor::get(ApiEndpoint::Properties))
        .await;
    assert!(matches!(result, Err(ApiError::NetworkError(_))));
}

#[tokio::test]
async fn test_send_url_shares_headers_and_classification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/custom/path"))
        .and(header("authorization", "Bearer abc"))
        .and(header("sec-gpc", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("custom failure"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new().with_base_url(mock_server.uri());
    let (dispatcher, tokens) = dispatcher(&config);
    tokens.store_tokens("abc", "def");

    let url = format!("{}/custom/path", mock_server.uri());
    let result = dispatcher
        .send_url::<Value>(Method::DELETE, &url, None, &[])
        .await;
    assert!(matches!(
        result,
        Err(ApiError::ServerError {
            status_code: 500,
            ..
        })
    ));
}

#[tokio::test]
async fn test_send_url_invalid() {
    let config = ClientConfig::default();
    let (dispatcher, _) = dispatcher(&config);

    let result = dispatcher
        .send_url::<Value>(Method::GET, "::not a url::", None, &[])
        .await;
    assert!(matches!(result, Err(ApiError::InvalidURL)));
}
