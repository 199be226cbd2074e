use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use domain::core::Tracker;
use domain::user::User;
use in_memory_adapter::InMemoryStore;
use tower::ServiceExt;

use crate::services::TrackerHandle;

fn create_test_setup() -> Router {
    let mut store = InMemoryStore::new();
    store.add_user("raj_investor", "Raj", "Patel", "ABCDE1234F", "Mumbai", "Maharashtra");
    store.add_user("priya_trader", "Priya", "Sharma", "FGHIJ5678K", "New Delhi", "Delhi");

    let handle = TrackerHandle::new(Tracker::new(Arc::new(store)));
    let (router, _api) = crate::api::user::router(handle.clone()).split_for_parts();
    router.with_state(handle)
}

#[tokio::test]
async fn test_get_users() {
    let app = create_test_setup();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let users: Vec<User> = serde_json::from_slice(&body).unwrap();

    assert_eq!(users.len(), 2);
    let raj = users.iter().find(|u| u.username == "raj_investor").unwrap();
    assert_eq!(raj.first_name, "Raj");
    assert_eq!(raj.city, "Mumbai");
    assert_eq!(raj.pan_number, "ABCDE1234F");
}
