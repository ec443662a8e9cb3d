use crate::config::{AppState, TOKEN_PREFIX};
use jsonwebtoken as jwt;
use jwt::{DecodingKey, EncodingKey};
use rocket::http::Status;
use rocket::request::{self, FromRequest, Outcome, Request};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims of a signed-in user. Resolving this guard is the only way a route
/// learns who the actor is.
#[derive(Debug, Deserialize, Serialize)]
pub struct Auth {
    /// timestamp
    pub exp: i64,
    /// user id
    pub id: i32,
    pub name: String,
}

impl Auth {
    pub fn token(&self, secret: &[u8]) -> Result<String, jwt::errors::Error> {
        let encoding_key = EncodingKey::from_secret(secret);
        jwt::encode(&jwt::Header::default(), self, &encoding_key)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Auth {
    type Error = ();

    /// Extract Auth token from the "Authorization" header.
    ///
    /// Handlers with Auth guard will fail with 401 error.
    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Auth, Self::Error> {
        let state = match request.rocket().state::<AppState>() {
            Some(state) => state,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };
        if let Some(auth) = extract_auth_from_request(request, &state.secret) {
            Outcome::Success(auth)
        } else {
            Outcome::Error((Status::Unauthorized, ()))
        }
    }
}

fn extract_auth_from_request(request: &Request, secret: &[u8]) -> Option<Auth> {
    request
        .headers()
        .get_one("authorization")
        .and_then(extract_token_from_header)
        .and_then(|token| decode_token(token, secret))
}

fn extract_token_from_header(header: &str) -> Option<&str> {
    header.strip_prefix(TOKEN_PREFIX)
}

/// Decode token into `Auth` struct. If any error is encountered, log it
/// and return None.
fn decode_token(token: &str, secret: &[u8]) -> Option<Auth> {
    use jwt::{Algorithm, Validation};

    jwt::decode(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|err| debug!("Auth decode error: {:?}", err))
    .ok()
    .map(|token_data| token_data.claims)
}
