use crate::auth::Auth;
use crate::config::{DATE_FORMAT, TOKEN_LIFETIME_DAYS};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Queryable)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize)]
pub struct UserAuth<'a> {
    id: i32,
    name: &'a str,
    email: &'a str,
    token: String,
}

/// Public view of a user, as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct UserJson {
    pub id: i32,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    pub microposts: i64,
    pub followings: i64,
    pub followers: i64,
    pub favorites: i64,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: UserJson,
    pub following: bool,
    pub counts: UserCounts,
}

impl User {
    pub fn to_user_auth(&self, secret: &[u8]) -> Result<UserAuth, jsonwebtoken::errors::Error> {
        let exp = Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS);
        let token = Auth {
            id: self.id,
            name: self.name.clone(),
            exp: exp.timestamp(),
        }
        .token(secret)?;

        Ok(UserAuth {
            id: self.id,
            name: &self.name,
            email: &self.email,
            token,
        })
    }

    pub fn to_json(&self) -> UserJson {
        UserJson {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn to_profile(&self, following: bool, counts: UserCounts) -> Profile {
        Profile {
            user: self.to_json(),
            following,
            counts,
        }
    }
}
