use crate::auth::Auth;
use crate::database::{self, Db, Paging};
use crate::errors::{FieldValidator, Result};
use crate::feed;
use rocket::serde::json::{json, Json, Value};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct NewMicropost {
    micropost: NewMicropostData,
}

#[derive(Deserialize, Validate)]
struct NewMicropostData {
    #[validate(length(min = 1, max = 255))]
    content: Option<String>,
}

/// The current user's feed: their own microposts and those of everyone they
/// follow, newest first.
#[get("/microposts?<page>")]
pub async fn get_feed(auth: Auth, page: Option<i64>, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let authors = feed::feed_author_ids(conn, auth.id)?;
        let microposts = database::microposts::by_authors(conn, &authors, Paging::new(page))?;
        let microposts = database::microposts::with_details(conn, auth.id, microposts)?;
        Ok(json!({ "microposts": microposts }))
    })
    .await
}

#[post("/microposts", format = "json", data = "<new_micropost>")]
pub async fn post_microposts(
    auth: Auth,
    new_micropost: Json<NewMicropost>,
    db: Db,
) -> Result<Value> {
    let new_micropost = new_micropost.into_inner().micropost;

    let mut extractor = FieldValidator::validate(&new_micropost);
    let content = extractor.extract("content", new_micropost.content);
    extractor.check()?;

    db.run(move |conn| -> Result<Value> {
        let micropost = database::microposts::create(conn, auth.id, &content)?;
        let micropost = database::microposts::detail(conn, auth.id, micropost)?;
        Ok(json!({ "micropost": micropost }))
    })
    .await
}

#[delete("/microposts/<id>")]
pub async fn delete_micropost(auth: Auth, id: i32, db: Db) -> Result<()> {
    db.run(move |conn| database::microposts::delete(conn, auth.id, id))
        .await
}
