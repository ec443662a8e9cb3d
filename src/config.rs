use rocket::config::Config;
use rocket::fairing::AdHoc;
use rocket::figment::util::map;
use rocket::figment::value::{Map, Value};
use rocket::figment::Figment;
use std::env;

/// Debug only secret for JWT encoding & decoding.
const SECRET: &str = "8Xui8SN4mI+7egV/9dlfYYLGQJeEx4+DwmSQLwDVXJg=";

/// Millisecond precision, UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub const TOKEN_PREFIX: &str = "Token ";

pub const TOKEN_LIFETIME_DAYS: i64 = 60;

/// Rows per page for every paginated listing.
pub const PER_PAGE: i64 = 10;

pub const DATABASE_NAME: &str = "sqlite_database";

pub struct AppState {
    pub secret: Vec<u8>,
}

impl AppState {
    pub fn manage() -> AdHoc {
        AdHoc::on_ignite("Manage config", |rocket| async move {
            // Rocket doesn't expose it's own secret_key, so we use our own here.
            let secret = env::var("SECRET_KEY").unwrap_or_else(|err| {
                if cfg!(debug_assertions) {
                    SECRET.to_string()
                } else {
                    panic!("No SECRET_KEY environment variable found: {:?}", err)
                }
            });

            rocket.manage(AppState {
                secret: secret.into_bytes(),
            })
        })
    }
}

/// Create rocket config from environment variables
pub fn from_env() -> Figment {
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse::<u16>()
        .expect("PORT environment variable should parse to an integer");

    let database_url =
        env::var("DATABASE_URL").expect("No DATABASE_URL environment variable found");

    figment_for(&database_url).merge(("port", port))
}

/// Rocket config pointing the pool at `database_url`, a SQLite file path.
pub fn figment_for(database_url: &str) -> Figment {
    let database: Map<_, Value> = map! {
        "url" => database_url.into(),
    };

    Config::figment().merge(("databases", map![DATABASE_NAME => database]))
}
