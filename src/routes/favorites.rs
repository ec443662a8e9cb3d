use crate::auth::Auth;
use crate::database::Db;
use crate::errors::Result;
use crate::graph;
use rocket::serde::json::{json, Value};

#[post("/microposts/<id>/favorite")]
pub async fn favorite(auth: Auth, id: i32, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let changed = graph::favorite(conn, auth.id, id)?;
        let favorited = graph::is_favorite(conn, auth.id, id)?;
        Ok(json!({ "changed": changed, "favorited": favorited }))
    })
    .await
}

#[delete("/microposts/<id>/favorite")]
pub async fn unfavorite(auth: Auth, id: i32, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let changed = graph::unfavorite(conn, auth.id, id)?;
        let favorited = graph::is_favorite(conn, auth.id, id)?;
        Ok(json!({ "changed": changed, "favorited": favorited }))
    })
    .await
}
