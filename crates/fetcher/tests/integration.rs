//! Integration tests against a mockito server through the reqwest transport

use fetcher::{
    CallOptions, FetchError, Fetcher, Headers, Multipart, Params, RequestOptions, ResponseKind,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: u32,
    name: String,
}

fn client_for(server: &mockito::ServerGuard) -> Fetcher {
    Fetcher::builder().base_url(server.url()).build()
}

#[tokio::test]
async fn get_decodes_a_json_response() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/items/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1, "name": "first"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .get("/api/items/1", CallOptions::default())
        .await
        .expect("request should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(
        response.json::<Item>().expect("typed decode"),
        Item {
            id: 1,
            name: "first".to_string()
        }
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn post_sends_an_encoded_json_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/api/items")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(json!({"name": "n"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 5, "name": "n"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .post("/api/items", json!({"name": "n"}), CallOptions::default())
        .await
        .expect("request should succeed");

    assert_eq!(response.status, 201);
    assert_eq!(response.data.as_json(), Some(&json!({"id": 5, "name": "n"})));

    mock.assert_async().await;
}

#[tokio::test]
async fn query_params_reach_the_server() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/items")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("a".to_string(), "1".to_string()),
            mockito::Matcher::UrlEncoded("tag".to_string(), "new".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let client = client_for(&server);
    client
        .get(
            "/api/items",
            CallOptions {
                params: Some(Params::new().param("a", 1).param("tag", "new")),
                ..Default::default()
            },
        )
        .await
        .expect("request should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn default_headers_are_sent() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/secure")
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let mut client = client_for(&server);
    client.set_defaults(RequestOptions {
        headers: Some(Headers::from([("X-Api-Key", "secret")])),
        ..Default::default()
    });

    client
        .get("/api/secure", CallOptions::default())
        .await
        .expect("request should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn multipart_bodies_carry_a_transport_boundary() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/api/upload")
        .match_header(
            "content-type",
            mockito::Matcher::Regex("multipart/form-data; boundary=.*".to_string()),
        )
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let client = client_for(&server);
    client
        .post(
            "/api/upload",
            Multipart::new().text("kind", "avatar"),
            CallOptions::default(),
        )
        .await
        .expect("request should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn error_statuses_carry_the_decoded_json_payload() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/items/9")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "missing"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .get("/api/items/9", CallOptions::default())
        .await
        .expect_err("request should fail");

    assert_eq!(err.status(), 404);
    assert_eq!(err.data(), Some(&json!({"error": "missing"})));
    assert!(matches!(err, FetchError::Status { .. }));

    mock.assert_async().await;
}

#[tokio::test]
async fn text_mode_decodes_plain_text() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/motd")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("hello, world")
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .get(
            "/api/motd",
            CallOptions {
                response_type: Some(ResponseKind::Text),
                ..Default::default()
            },
        )
        .await
        .expect("request should succeed");

    assert_eq!(response.data.as_text(), Some("hello, world"));

    mock.assert_async().await;
}

#[tokio::test]
async fn bytes_mode_collects_a_binary_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/blob")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(vec![0x01, 0x02, 0x03, 0x04])
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .get(
            "/api/blob",
            CallOptions {
                response_type: Some(ResponseKind::Bytes),
                ..Default::default()
            },
        )
        .await
        .expect("request should succeed");

    assert_eq!(response.data.as_bytes(), Some(&[1u8, 2, 3, 4][..]));

    mock.assert_async().await;
}

#[tokio::test]
async fn head_requests_yield_no_payload() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("HEAD", "/api/items")
        .with_status(200)
        .with_header("content-type", "application/json")
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .head("/api/items", CallOptions::default())
        .await
        .expect("request should succeed");

    assert_eq!(response.status, 200);
    assert!(response.data.is_none());

    mock.assert_async().await;
}

#[tokio::test]
async fn non_json_content_type_yields_no_payload_in_json_mode() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/page")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<p>hi</p>")
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .get("/api/page", CallOptions::default())
        .await
        .expect("request should succeed");

    assert_eq!(response.status, 200);
    assert!(response.data.is_none());

    mock.assert_async().await;
}

#[tokio::test]
async fn error_normalizer_applies_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/items")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let mut client = client_for(&server);
    client.set_error_normalizer(|err, url| FetchError::Network {
        name: "Upstream".to_string(),
        message: format!("{url}: {err}"),
    });

    let err = client
        .get("/api/items", CallOptions::default())
        .await
        .expect_err("request should fail");

    assert_eq!(err.name(), "Upstream");
    assert!(err.to_string().contains("/api/items"));

    mock.assert_async().await;
}
