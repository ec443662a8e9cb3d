use crate::auth::Auth;
use crate::config::AppState;
use crate::database::{self, Db, Paging};
use crate::errors::{Error, Errors, FieldValidator, Result};
use crate::graph;
use crate::models::user::User;
use diesel::prelude::*;
use rocket::serde::json::{json, Json, Value};
use rocket::State;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct NewUser {
    user: NewUserData,
}

#[derive(Deserialize, Validate)]
struct NewUserData {
    #[validate(length(min = 1, max = 255))]
    name: Option<String>,
    #[validate(email)]
    email: Option<String>,
    #[validate(length(min = 8))]
    password: Option<String>,
}

#[post("/users", format = "json", data = "<new_user>")]
pub async fn post_users(
    new_user: Json<NewUser>,
    db: Db,
    state: &State<AppState>,
) -> Result<Value> {
    let new_user = new_user.into_inner().user;

    let mut extractor = FieldValidator::validate(&new_user);
    let name = extractor.extract("name", new_user.name);
    let email = extractor.extract("email", new_user.email);
    let password = extractor.extract("password", new_user.password);

    extractor.check()?;

    let user = db
        .run(move |conn| database::users::create(conn, &name, &email, &password))
        .await?;
    Ok(json!({ "user": user.to_user_auth(&state.secret)? }))
}

#[derive(Deserialize)]
pub struct LoginUser {
    user: LoginUserData,
}

#[derive(Deserialize)]
struct LoginUserData {
    email: Option<String>,
    password: Option<String>,
}

#[post("/users/login", format = "json", data = "<user>")]
pub async fn post_users_login(
    user: Json<LoginUser>,
    db: Db,
    state: &State<AppState>,
) -> Result<Value> {
    let user = user.into_inner().user;

    let mut extractor = FieldValidator::default();
    let email = extractor.extract("email", user.email);
    let password = extractor.extract("password", user.password);
    extractor.check()?;

    let user = db
        .run(move |conn| database::users::login(conn, &email, &password))
        .await
        .ok_or_else(|| Errors::new(&[("email or password", "is invalid")]))?;
    Ok(json!({ "user": user.to_user_auth(&state.secret)? }))
}

#[get("/user")]
pub async fn get_user(auth: Auth, db: Db, state: &State<AppState>) -> Result<Value> {
    let user = db.run(move |conn| load_user(conn, auth.id)).await?;
    Ok(json!({ "user": user.to_user_auth(&state.secret)? }))
}

#[get("/users?<page>")]
pub async fn get_users(_auth: Auth, page: Option<i64>, db: Db) -> Result<Value> {
    let users = db
        .run(move |conn| database::users::paginate(conn, Paging::new(page)))
        .await?;
    Ok(json!({ "users": users.map(|user| user.to_json()) }))
}

#[get("/users/<id>?<page>")]
pub async fn get_user_profile(auth: Auth, id: i32, page: Option<i64>, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let profile = load_profile(conn, auth.id, id)?;
        let microposts = database::microposts::by_author(conn, id, Paging::new(page))?;
        let microposts = database::microposts::with_details(conn, auth.id, microposts)?;
        Ok(json!({ "user": profile, "microposts": microposts }))
    })
    .await
}

#[get("/users/<id>/followings?<page>")]
pub async fn get_followings(auth: Auth, id: i32, page: Option<i64>, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let profile = load_profile(conn, auth.id, id)?;
        let users = database::users::followings(conn, id, Paging::new(page))?;
        Ok(json!({ "user": profile, "users": users.map(|user| user.to_json()) }))
    })
    .await
}

#[get("/users/<id>/followers?<page>")]
pub async fn get_followers(auth: Auth, id: i32, page: Option<i64>, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let profile = load_profile(conn, auth.id, id)?;
        let users = database::users::followers(conn, id, Paging::new(page))?;
        Ok(json!({ "user": profile, "users": users.map(|user| user.to_json()) }))
    })
    .await
}

#[get("/users/<id>/favorites?<page>")]
pub async fn get_favorites(auth: Auth, id: i32, page: Option<i64>, db: Db) -> Result<Value> {
    db.run(move |conn| -> Result<Value> {
        let profile = load_profile(conn, auth.id, id)?;
        let microposts = database::microposts::favorites(conn, id, Paging::new(page))?;
        let microposts = database::microposts::with_details(conn, auth.id, microposts)?;
        Ok(json!({ "user": profile, "microposts": microposts }))
    })
    .await
}

fn load_user(conn: &mut SqliteConnection, id: i32) -> Result<User> {
    database::users::find(conn, id)
        .optional()?
        .ok_or(Error::NotFound("user"))
}

/// The user's profile as seen by `viewer`.
fn load_profile(conn: &mut SqliteConnection, viewer: i32, id: i32) -> Result<Value> {
    let user = load_user(conn, id)?;
    let counts = database::users::relationship_counts(conn, id)?;
    let following = graph::is_following(conn, viewer, id)?;
    Ok(json!(user.to_profile(following, counts)))
}
