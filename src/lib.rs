#[macro_use]
extern crate rocket;
#[macro_use]
extern crate rocket_sync_db_pools;

#[macro_use]
extern crate diesel;

#[macro_use]
extern crate validator_derive;

use rocket::figment::Figment;
use rocket::serde::json::{json, Value};
use rocket::{Build, Rocket};
use rocket_cors::Cors;

mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod feed;
pub mod graph;
pub mod models;
mod routes;
mod schema;

#[catch(401)]
fn unauthorized() -> Value {
    json!({
        "status": "error",
        "reason": "Sign in required."
    })
}

#[catch(404)]
fn not_found() -> Value {
    json!({
        "status": "error",
        "reason": "Resource was not found."
    })
}

fn cors_fairing() -> Cors {
    Cors::from_options(&Default::default()).expect("Cors fairing cannot be created")
}

pub fn rocket() -> Rocket<Build> {
    rocket_with(config::from_env())
}

/// Builds the app on top of an explicit config, e.g. one from
/// `config::figment_for`.
pub fn rocket_with(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .mount(
            "/api",
            routes![
                routes::users::post_users,
                routes::users::post_users_login,
                routes::users::get_user,
                routes::users::get_users,
                routes::users::get_user_profile,
                routes::users::get_followings,
                routes::users::get_followers,
                routes::users::get_favorites,
                routes::follows::follow,
                routes::follows::unfollow,
                routes::microposts::get_feed,
                routes::microposts::post_microposts,
                routes::microposts::delete_micropost,
                routes::favorites::favorite,
                routes::favorites::unfavorite,
            ],
        )
        .attach(database::Db::fairing())
        .attach(database::migrations())
        .attach(cors_fairing())
        .attach(config::AppState::manage())
        .register("/", catchers![unauthorized, not_found])
}
