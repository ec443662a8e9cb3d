use crate::auth::Auth;
use crate::database::Db;
use crate::errors::Result;
use crate::graph;
use rocket::serde::json::{json, Value};

/// Following twice or following yourself answers `changed: false`, not an
/// error, so a double-submitted button is harmless.
#[post("/users/<id>/follow")]
pub async fn follow(auth: Auth, id: i32, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let changed = graph::follow(conn, auth.id, id)?;
        let following = graph::is_following(conn, auth.id, id)?;
        Ok(json!({ "changed": changed, "following": following }))
    })
    .await
}

#[delete("/users/<id>/follow")]
pub async fn unfollow(auth: Auth, id: i32, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let changed = graph::unfollow(conn, auth.id, id)?;
        let following = graph::is_following(conn, auth.id, id)?;
        Ok(json!({ "changed": changed, "following": following }))
    })
    .await
}
