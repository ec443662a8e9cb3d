//! Shared helpers for the API tests.
//!
//! Every test binary gets one Rocket instance backed by a SQLite file in a
//! temporary directory. Tests register their own users, so they don't depend
//! on each other's data.

#![allow(dead_code)]

use microposts::config;
use once_cell::sync::OnceCell;
use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::{Client, LocalResponse};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

pub const PASSWORD: &str = "smoketest";

#[macro_export]
macro_rules! json_string {
    ($value:tt) => {
        serde_json::to_string(&serde_json::json!($value)).expect("cannot json stringify")
    };
}

struct TestApp {
    client: Mutex<Client>,
    _dir: TempDir,
}

pub fn test_client() -> MutexGuard<'static, Client> {
    static INSTANCE: OnceCell<TestApp> = OnceCell::new();
    let app = INSTANCE.get_or_init(|| {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("microposts.sqlite");
        let figment = config::figment_for(path.to_str().expect("utf-8 temp path"));
        let client =
            Client::tracked(microposts::rocket_with(figment)).expect("valid rocket instance");
        TestApp {
            client: Mutex::new(client),
            _dir: dir,
        }
    });
    // A failed test must not take the others down with it.
    app.client.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Unique suffix so every registration gets its own email.
pub fn unique(name: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!("{}{}", name, COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub struct TestUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn auth(&self) -> Header<'static> {
        token_header(&self.token)
    }
}

pub fn register(client: &Client, name: &str) -> TestUser {
    let name = unique(name);
    let email = format!("{}@example.com", name);
    let response = client
        .post("/api/users")
        .header(ContentType::JSON)
        .body(json_string!({"user": {"name": name, "email": email, "password": PASSWORD}}))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let value = response_json_value(response);
    let user = &value["user"];
    TestUser {
        id: user["id"].as_i64().expect("user id"),
        name,
        email,
        token: user["token"].as_str().expect("user token").to_string(),
    }
}

pub fn post_micropost(client: &Client, user: &TestUser, content: &str) -> i64 {
    let response = client
        .post("/api/microposts")
        .header(ContentType::JSON)
        .header(user.auth())
        .body(json_string!({"micropost": {"content": content}}))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let value = response_json_value(response);
    value["micropost"]["id"].as_i64().expect("micropost id")
}

pub fn token_header(token: &str) -> Header<'static> {
    Header::new("authorization", format!("Token {}", token))
}

/// Helper function for converting response to json value.
pub fn response_json_value(response: LocalResponse) -> Value {
    let body = response.into_string().expect("response body");
    serde_json::from_str(&body).expect("can't parse value")
}

/// Ids of the objects in a serialized page.
pub fn page_ids(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .expect("page items")
        .iter()
        .map(|item| item["id"].as_i64().expect("item id"))
        .collect()
}
