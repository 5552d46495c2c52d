#![allow(dead_code)]

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

use entity_admin::auth::{MemoryTokenStore, TokenStore};
use entity_admin::config::ClientOptions;
use entity_admin::AdminClient;

pub const ADMIN_ID: &str = "admin-0001-aaaa";

/// A signed token for `id`, expiring `ttl` seconds from now
pub fn token(id: &str, is_admin: bool, ttl: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "id": id,
        "email": format!("{}@example.com", id),
        "isAdmin": is_admin,
        "iat": now,
        "exp": now + ttl,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}

pub fn profile(id: &str, is_admin: bool) -> Value {
    json!({
        "id": id,
        "email": format!("{}@example.com", id),
        "firstName": "Ada",
        "emailVerified": true,
        "isAdmin": is_admin
    })
}

pub fn envelope(data: Value) -> Value {
    json!({ "status": 200, "data": data })
}

/// A client for `server` with `token` already stored
pub fn client_with_token(server: &MockServer, token: Option<&str>) -> (AdminClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    if let Some(token) = token {
        store.save("token", token).unwrap();
    }
    let options = ClientOptions::default().with_api_url(&server.uri());
    let client = AdminClient::with_token_store(options, store.clone()).unwrap();
    (client, store)
}

/// A client logged in as an admin
pub fn admin_client(server: &MockServer) -> (AdminClient, Arc<MemoryTokenStore>) {
    client_with_token(server, Some(&token(ADMIN_ID, true, 3600)))
}
