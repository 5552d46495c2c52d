mod common;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{admin_client, client_with_token, envelope, token, ADMIN_ID};
use entity_admin::auth::TokenStore;
use entity_admin::error::Error;
use entity_admin::routes::Route;

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let mock_server = MockServer::start().await;
    let bearer = token(ADMIN_ID, true, 3600);

    Mock::given(method("GET"))
        .and(path("/child-users"))
        .and(header("Authorization", format!("Bearer {}", bearer).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{ "id": "c1" }]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (admin, _) = client_with_token(&mock_server, Some(&bearer));
    let response = admin.api().get::<Value>("/child-users").await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.into_data(), Some(json!([{ "id": "c1" }])));
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "messages": [{ "type": "error", "message": "Token expired" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (admin, store) = admin_client(&mock_server);
    admin.navigator().navigate(Route::Dashboard);

    let result = admin.api().get::<Value>("/users").await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(admin.api().credentials().token(), None);
    assert_eq!(store.load("token").unwrap(), None);
    assert_eq!(admin.navigator().current(), Route::Login);
}

#[tokio::test]
async fn test_error_envelope_message_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/child-users"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": 400,
            "messages": [
                { "type": "info", "message": "Checked payload" },
                { "type": "error", "title": "Bad request", "message": "Parent does not exist" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let (admin, _) = admin_client(&mock_server);
    let result = admin
        .api()
        .post::<Value, _>("/child-users", Some(&json!({ "parent": "nobody" })))
        .await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Parent does not exist");
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert!(admin.api().credentials().token().is_some());
}

#[tokio::test]
async fn test_plain_error_body_is_used_as_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/child-users/c1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&mock_server)
        .await;

    let (admin, _) = admin_client(&mock_server);
    let result = admin.api().delete::<Value, Value>("/child-users/c1", None).await;

    assert!(matches!(
        result,
        Err(Error::Api { status: 500, ref message }) if message == "database unavailable"
    ));
}

#[tokio::test]
async fn test_empty_body_yields_empty_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/exercises/letter/l1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let (admin, _) = admin_client(&mock_server);
    let response = admin
        .api()
        .delete::<Value, Value>("/exercises/letter/l1", None)
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(response.into_data(), None);
}

#[tokio::test]
async fn test_unauthorized_drops_cached_lists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/exercises"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let (admin, _) = admin_client(&mock_server);
    admin
        .cache()
        .fetch("child-users", || async { Ok(json!([{ "id": "c1" }])) })
        .await
        .unwrap();

    let result = admin.api().get::<Value>("/exercises").await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert!(admin.cache().get("child-users").await.is_none());
}
