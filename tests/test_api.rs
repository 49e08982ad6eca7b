mod helpers;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use helpers::*;
use serde_json::{json, Value};
use tallybook::infrastructure::http::build_router;
use tower::ServiceExt;

const BODY_LIMIT: usize = 1024 * 1024;

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    (status, body.to_vec())
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

async fn login_token(router: &Router, code: &str) -> String {
    let (status, body) = send(
        router,
        json_request("POST", "/api/login", None, json!({ "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    parse(&body)["token"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());

    let (status, body) = send(&router, get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());

    let (status, body) = send(&router, get_request("/api/books", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parse(&body)["error"], "Unauthorized");

    let (status, _) = send(&router, get_request("/api/books", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_profile() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());

    let (status, _) = send(
        &router,
        json_request("POST", "/api/login", None, json!({ "code": REJECTED_CODE })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login_token(&router, "alice").await;
    let (status, body) = send(&router, get_request("/api/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["nickname"], "nick-alice");
}

#[tokio::test]
async fn test_book_lifecycle_over_http() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());
    let token = login_token(&router, "alice").await;

    let (status, body) = send(
        &router,
        json_request("POST", "/api/books", Some(&token), json!({ "title": "Travel" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let book_id = parse(&body)["id"].as_str().unwrap().to_string();

    let (status, body) = send(&router, get_request("/api/books?admin=1", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body).as_array().unwrap().len(), 2);

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/api/books",
            Some(&token),
            json!({ "title": "A title that is far too long" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        json_request("POST", &format!("/api/books/{}/invite", book_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = parse(&body)["code"].as_str().unwrap().to_string();

    // Invite details are public
    let (status, body) = send(&router, get_request(&format!("/api/invites/{}", code), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["title"], "Travel");

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/books/{}", book_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_record_and_month_list_over_http() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());
    let token = login_token(&router, "alice").await;
    let uid = app.state.user_service.authenticate(&token).await.unwrap().id;
    let book_id = default_book_id(&app, &uid).await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/records",
            Some(&token),
            json!({
                "book_id": book_id,
                "category_id": "00000000-0000-0000-0000-000000000101",
                "kind": "expense",
                "amount_cents": 4200,
                "date": "2024-03-07",
                "comment": "dinner"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record = parse(&body);
    assert_eq!(record["category_title"], "Food");

    let (status, body) = send(
        &router,
        get_request(
            &format!("/api/books/{}/records?month=2024-03&page=0&page_size=10", book_id),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = parse(&body);
    assert_eq!(list["pay_cents"], 4200);
    assert_eq!(list["days"][0]["list"][0]["id"], record["id"]);

    let (status, body) = send(
        &router,
        get_request(
            &format!("/api/books/{}/statistics?kind=expense&month=2024-03", book_id),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["total_cents"], 4200);
}

#[tokio::test]
async fn test_upload_is_stored_and_served() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());
    let token = login_token(&router, "alice").await;

    let boundary = "tallybook-boundary";
    let content = b"\x89PNG\r\n\x1a\nnot really a png";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"receipt.PNG\"\r\nContent-Type: image/png\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let uploaded = parse(&body);
    let url = uploaded["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/upload/"));
    assert!(url.ends_with(".png"));
    assert_eq!(uploaded["cdn"], format!("https://cdn.example.com{}", url));

    let (status, served) = send(&router, get_request(&url, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, content.to_vec());
}

#[tokio::test]
async fn test_upload_rejects_other_file_types() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());
    let token = login_token(&router, "alice").await;

    let boundary = "tallybook-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscription_over_http() {
    let app = setup_test_app().await;
    let router = build_router(app.state.clone());
    let token = login_token(&router, "alice").await;

    let (status, body) = send(&router, get_request("/api/subscription", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse(&body),
        json!({ "email": "", "weekly": false, "monthly": false })
    );

    let (status, _) = send(
        &router,
        json_request(
            "PUT",
            "/api/subscription",
            Some(&token),
            json!({ "email": "nope", "weekly": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        json_request(
            "PUT",
            "/api/subscription",
            Some(&token),
            json!({ "email": "Me@Example.com", "weekly": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["email"], "me@example.com");

    let (_, body) = send(&router, get_request("/api/subscription", Some(&token))).await;
    assert_eq!(
        parse(&body),
        json!({ "email": "me@example.com", "weekly": true, "monthly": false })
    );
}
