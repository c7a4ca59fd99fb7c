//! REST API scenario tests
//!
//! Drives the full router in-process: routing, extractors, auth, facade
//! and the in-memory store together.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use hbnb::auth::JwtConfig;
use hbnb::http_server::{build_router, AppState, HttpServerConfig};
use hbnb::repository::StorageConfig;
use hbnb::services::{CreateUser, HbnbFacade, UpdateUser};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Test Utilities
// =============================================================================

const ADMIN_EMAIL: &str = "admin@hbnb.io";
const ADMIN_PASSWORD: &str = "admin1234";

struct TestApp {
    router: Router,
    facade: Arc<HbnbFacade>,
}

impl TestApp {
    fn new() -> Self {
        let facade = Arc::new(HbnbFacade::new(&StorageConfig::Memory).unwrap());
        facade
            .create_user(CreateUser {
                first_name: "Admin".to_string(),
                last_name: "HBnB".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                is_admin: true,
            })
            .unwrap();
        let state = AppState::new(facade.clone(), JwtConfig::default());
        let router = build_router(&HttpServerConfig::default(), state);
        Self { router, facade }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Create a regular user through the admin route and log them in
    async fn user(&self, first: &str, email: &str) -> (String, String) {
        let admin = self.admin_token().await;
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/users/",
                Some(&admin),
                Some(json!({
                    "first_name": first,
                    "last_name": "Tester",
                    "email": email,
                    "password": "secret123"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let id = body["id"].as_str().unwrap().to_string();
        (id, self.login(email, "secret123").await)
    }

    async fn place(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/places/",
                Some(token),
                Some(json!({
                    "title": title,
                    "description": "Sea view",
                    "price": 150.0,
                    "latitude": 25.76,
                    "longitude": -80.19
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[tokio::test]
async fn test_john_doe_lists_a_beach_house() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, john) = app
        .send(
            Method::POST,
            "/api/v1/users/",
            Some(&admin),
            Some(json!({
                "first_name": "John",
                "last_name": "Doe",
                "email": "john.doe@example.com",
                "password": "secret123"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let john_id = john["id"].as_str().unwrap().to_string();
    assert!(john.get("password").is_none());
    assert!(john.get("password_hash").is_none());

    let token = app.login("john.doe@example.com", "secret123").await;

    let (status, places) = app.send(Method::GET, "/api/v1/places/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(places, json!([]));

    let (status, place) = app
        .send(
            Method::POST,
            "/api/v1/places/",
            Some(&token),
            Some(json!({
                "title": "Beach House",
                "description": "Steps from the sand",
                "price": 150.0,
                "latitude": 25.76,
                "longitude": -80.19
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(place["owner_id"], json!(john_id));

    let (status, error) = app
        .send(
            Method::POST,
            "/api/v1/places/",
            Some(&token),
            Some(json!({
                "title": "Polar Hut",
                "price": 80.0,
                "latitude": 91.0,
                "longitude": 0.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("Latitude"));
    assert_eq!(error["code"], json!(400));

    let (_, places) = app.send(Method::GET, "/api/v1/places", None, None).await;
    assert_eq!(places.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_place_detail_embeds_owner_amenities_and_rating() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, host) = app.user("Host", "host@example.com").await;
    let (_, guest) = app.user("Guest", "guest@example.com").await;

    let (status, wifi) = app
        .send(
            Method::POST,
            "/api/v1/amenities/",
            Some(&admin),
            Some(json!({"name": "Wi-Fi"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, place) = app
        .send(
            Method::POST,
            "/api/v1/places/",
            Some(&host),
            Some(json!({
                "title": "Loft",
                "price": 90.0,
                "latitude": 48.85,
                "longitude": 2.35,
                "amenities": [wifi["id"]]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", place);
    let place_id = place["id"].as_str().unwrap();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/reviews/",
            Some(&guest),
            Some(json!({"text": "Great", "rating": 4, "place_id": place_id})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, detail) = app
        .send(Method::GET, &format!("/api/v1/places/{}", place_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["owner"]["first_name"], json!("Host"));
    assert_eq!(detail["amenities"][0]["name"], json!("Wi-Fi"));
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(detail["average_rating"], json!(4.0));

    let (status, reviews) = app
        .send(
            Method::GET,
            &format!("/api/v1/places/{}/reviews", place_id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews[0]["rating"], json!(4));
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_non_owner_cannot_update_place() {
    let app = TestApp::new();
    let (_, owner) = app.user("Owner", "owner@example.com").await;
    let (_, other) = app.user("Other", "other@example.com").await;
    let place_id = app.place(&owner, "Cabin").await;
    let uri = format!("/api/v1/places/{}", place_id);

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&other), Some(json!({"title": "Mine now"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("Unauthorized action"));

    let (_, detail) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(detail["title"], json!("Cabin"));

    let (status, updated) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({"price": 200.0})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], json!(200.0));
}

#[tokio::test]
async fn test_admin_namespace_bypasses_ownership() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, owner) = app.user("Owner", "owner@example.com").await;
    let place_id = app.place(&owner, "Cabin").await;

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/api/v1/admin/places/{}", place_id),
            Some(&admin),
            Some(json!({"title": "Moderated"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], json!("Moderated"));

    let (status, users) = app
        .send(Method::GET, "/api/v1/admin/users", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, _) = app
        .send(Method::GET, "/api/v1/admin/users", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_demoted_admin_token_loses_admin_rights() {
    let app = TestApp::new();
    let (_, owner) = app.user("Owner", "owner@example.com").await;
    let place_id = app.place(&owner, "Cabin").await;
    let (mod_id, _) = app.user("Moderator", "mod@example.com").await;
    let mod_id = mod_id.parse().unwrap();

    let set_admin = |is_admin| {
        app.facade
            .update_user(
                mod_id,
                UpdateUser {
                    is_admin: Some(is_admin),
                    ..Default::default()
                },
            )
            .unwrap()
    };
    set_admin(true);
    let token = app.login("mod@example.com", "secret123").await;
    set_admin(false);

    let (status, _) = app
        .send(Method::GET, "/api/v1/admin/users", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/v1/places/{}", place_id);
    let (status, body) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({"title": "Taken"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("Unauthorized action"));

    let (_, detail) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(detail["title"], json!("Cabin"));
}

#[tokio::test]
async fn test_regular_users_cannot_manage_users_or_amenities() {
    let app = TestApp::new();
    let (user_id, token) = app.user("Regular", "regular@example.com").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/amenities/",
            Some(&token),
            Some(json!({"name": "Sauna"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/v1/users/{}", user_id),
            Some(&token),
            Some(json!({"first_name": "Root", "is_admin": true})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!app
        .facade
        .get_user(user_id.parse().unwrap())
        .unwrap()
        .is_admin);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_401() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/v1/auth/protected", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(401));

    let (status, _) = app
        .send(Method::GET, "/api/v1/users/", Some("not.a.token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.admin_token().await;
    let (status, body) = app
        .send(Method::GET, "/api/v1/auth/protected", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], json!(true));
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_second_review_is_rejected() {
    let app = TestApp::new();
    let (_, owner) = app.user("Owner", "owner@example.com").await;
    let (_, guest) = app.user("Guest", "guest@example.com").await;
    let place_id = app.place(&owner, "Cabin").await;
    let review = json!({"text": "Cosy", "rating": 5, "place_id": place_id});

    let (status, _) = app
        .send(Method::POST, "/api/v1/reviews/", Some(&guest), Some(review.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::POST, "/api/v1/reviews/", Some(&guest), Some(review))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("You have already reviewed this place."));

    let (_, reviews) = app.send(Method::GET, "/api/v1/reviews/", None, None).await;
    assert_eq!(reviews.as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/reviews/",
            Some(&owner),
            Some(json!({"text": "Mine is best", "rating": 5, "place_id": place_id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("You cannot review your own place."));
}

#[tokio::test]
async fn test_review_update_and_delete_by_author_only() {
    let app = TestApp::new();
    let (_, owner) = app.user("Owner", "owner@example.com").await;
    let (_, guest) = app.user("Guest", "guest@example.com").await;
    let place_id = app.place(&owner, "Cabin").await;

    let (_, review) = app
        .send(
            Method::POST,
            "/api/v1/reviews/",
            Some(&guest),
            Some(json!({"text": "Fine", "rating": 3, "place_id": place_id})),
        )
        .await;
    let uri = format!("/api/v1/reviews/{}", review["id"].as_str().unwrap());

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&owner), Some(json!({"rating": 1})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .send(Method::PUT, &uri, Some(&guest), Some(json!({"rating": 4})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], json!(4));

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&guest), Some(json!({"rating": 9})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Review deleted successfully"));

    let (status, _) = app.send(Method::GET, &uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_for_unknown_place_is_404() {
    let app = TestApp::new();
    let (_, guest) = app.user("Guest", "guest@example.com").await;
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/reviews/",
            Some(&guest),
            Some(json!({
                "text": "Ghost",
                "rating": 3,
                "place_id": "00000000-0000-4000-8000-000000000000"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Place not found"));
}

// =============================================================================
// Input handling
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_400_not_422() {
    let app = TestApp::new();
    let (_, token) = app.user("Host", "host@example.com").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/places/")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": \"Broken\""))
        .unwrap();
    let (status, body) = app.dispatch(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid input payload"));

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/places/",
            Some(&token),
            Some(json!({"title": "Typed", "price": "cheap", "latitude": 0, "longitude": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let app = TestApp::new();
    for uri in [
        "/api/v1/places/not-a-uuid",
        "/api/v1/amenities/00000000-0000-4000-8000-000000000000",
    ] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert!(body["error"].as_str().unwrap().ends_with("not found"));
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    for uri in ["/health", "/api/v1/health"] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
    }
}
