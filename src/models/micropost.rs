use crate::config::DATE_FORMAT;
use crate::models::user::UserJson;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Queryable)]
pub struct Micropost {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Micropost {
    pub fn attach(self, author: UserJson, favorited: bool) -> MicropostJson {
        MicropostJson {
            id: self.id,
            content: self.content,
            author,
            favorited,
            created_at: self.created_at.format(DATE_FORMAT).to_string(),
            updated_at: self.updated_at.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MicropostJson {
    pub id: i32,
    pub content: String,
    pub author: UserJson,
    pub favorited: bool,
    pub created_at: String,
    pub updated_at: String,
}
