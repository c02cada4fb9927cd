//! Authentication and authorization behaviour at the HTTP surface.
//!
//! Every test here fails before any query runs: missing or bad tokens
//! are rejected by the extractor, and role checks read the claims. The
//! pool is lazy and never connects.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, build_test_app, get, get_with_token, lazy_pool, token_for};
use tower::ServiceExt;

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    for uri in [
        "/api/v1/assets",
        "/api/v1/licenses",
        "/api/v1/users",
        "/api/v1/companies",
        "/api/v1/sections",
        "/api/v1/locations",
        "/api/v1/documents",
        "/api/v1/auth/me",
    ] {
        let app = build_test_app(lazy_pool());
        let response = get(app, uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "GET {uri}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() {
    let app = build_test_app(lazy_pool());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/assets")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let app = build_test_app(lazy_pool());
    let response = get_with_token(app, "/api/v1/assets", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    use stocktake_api::auth::jwt::{generate_access_token, JwtConfig};

    let other = JwtConfig {
        secret: "a-different-secret-entirely".to_string(),
        access_token_expiry_mins: 60,
    };
    let token = generate_access_token(1, &["admin".to_string()], &other).unwrap();

    let app = build_test_app(lazy_pool());
    let response = get_with_token(app, "/api/v1/assets", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn document_upload_is_mounted_at_its_own_path() {
    // The multipart upload lives at /documents/upload; the collection
    // root only lists. Both checks run before any query.
    let app = build_test_app(lazy_pool());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/documents/upload")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = build_test_app(lazy_pool());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/documents")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn admin_routes_reject_non_admin_roles() {
    // A manager token passes authentication but not the admin check.
    let token = token_for(7, &["manager"]);
    let app = build_test_app(lazy_pool());
    let response = get_with_token(app, "/api/v1/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn staff_cannot_reach_admin_routes_either() {
    let token = token_for(8, &["staff"]);
    let app = build_test_app(lazy_pool());
    let response = get_with_token(app, "/api/v1/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_is_public() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/health").await;
    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header");
    // UUIDs are 36 characters with hyphens.
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}
