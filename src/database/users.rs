use crate::database::relationships::{self, EdgeKind};
use crate::database::{OffsetLimit, Page, Paging};
use crate::models::user::{User, UserCounts};
use crate::schema::{microposts, users};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error};
use rand::rngs::OsRng;
use scrypt::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use scrypt::Scrypt;
use tracing::{info, warn};

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub hash: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug)]
pub enum UserCreationError {
    DuplicatedEmail,
    Hashing(String),
    Database(Error),
}

impl From<Error> for UserCreationError {
    fn from(err: Error) -> UserCreationError {
        if let Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
            if info.message().contains("users.email") {
                return UserCreationError::DuplicatedEmail;
            }
        }
        UserCreationError::Database(err)
    }
}

pub fn create(
    conn: &mut SqliteConnection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, UserCreationError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| UserCreationError::Hashing(err.to_string()))?
        .to_string();

    let now = Utc::now().naive_utc();
    let new_user = &NewUser {
        name,
        email,
        hash: &hash,
        created_at: now,
        updated_at: now,
    };

    let user = diesel::insert_into(users::table)
        .values(new_user)
        .get_result::<User>(conn)?;
    info!(user = user.id, "registered user");
    Ok(user)
}

pub fn login(conn: &mut SqliteConnection, email: &str, password: &str) -> Option<User> {
    let user = users::table
        .filter(users::email.eq(email))
        .get_result::<User>(conn)
        .map_err(|err| warn!("login_user: {}", err))
        .ok()?;

    let parsed_hash = PasswordHash::new(&user.hash)
        .map_err(|err| warn!("login_user: malformed hash for {}: {}", user.id, err))
        .ok()?;
    let password_matches = Scrypt
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| warn!("login_user: scrypt_check: {}", err))
        .is_ok();

    if password_matches {
        Some(user)
    } else {
        warn!(
            "login attempt for '{}' failed: password doesn't match",
            email
        );
        None
    }
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<User> {
    users::table.find(id).get_result(conn)
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(users::table.find(id))).get_result(conn)
}

/// Loads users in the order of `ids`, skipping ids that don't exist.
pub fn find_many(conn: &mut SqliteConnection, ids: &[i32]) -> QueryResult<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut found = users::table
        .filter(users::id.eq_any(ids))
        .load::<User>(conn)?;
    found.sort_by_key(|user| ids.iter().position(|id| *id == user.id));
    Ok(found)
}

/// All users, newest first.
pub fn paginate(conn: &mut SqliteConnection, paging: Paging) -> QueryResult<Page<User>> {
    users::table
        .select(users::all_columns)
        .order(users::id.desc())
        .paginate(paging)
        .load_page::<User>(conn)
}

/// Users `id` follows, as a page of records.
pub fn followings(conn: &mut SqliteConnection, id: i32, paging: Paging) -> QueryResult<Page<User>> {
    let page = relationships::list_by_subject(conn, EdgeKind::Follow, id, paging)?;
    let records = find_many(conn, &page.items)?;
    Ok(page.with_items(records))
}

/// Users following `id`, as a page of records.
pub fn followers(conn: &mut SqliteConnection, id: i32, paging: Paging) -> QueryResult<Page<User>> {
    let page = relationships::list_by_object(conn, EdgeKind::Follow, id, paging)?;
    let records = find_many(conn, &page.items)?;
    Ok(page.with_items(records))
}

pub fn relationship_counts(conn: &mut SqliteConnection, id: i32) -> QueryResult<UserCounts> {
    let microposts = microposts::table
        .filter(microposts::user_id.eq(id))
        .count()
        .get_result(conn)?;

    Ok(UserCounts {
        microposts,
        followings: relationships::count_by_subject(conn, EdgeKind::Follow, id)?,
        followers: relationships::count_by_object(conn, EdgeKind::Follow, id)?,
        favorites: relationships::count_by_subject(conn, EdgeKind::Favorite, id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing;

    #[test]
    fn register_and_login() {
        let mut conn = testing::connection();
        let user = create(&mut conn, "alice", "alice@example.com", "correct horse").unwrap();
        assert_ne!(user.hash, "correct horse");

        assert_eq!(user.name, "alice");
        assert_eq!(user.email, "alice@example.com");

        let logged_in = login(&mut conn, "alice@example.com", "correct horse").unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(login(&mut conn, "alice@example.com", "battery staple").is_none());
        assert!(login(&mut conn, "nobody@example.com", "correct horse").is_none());
    }

    #[test]
    fn duplicated_email_is_reported() {
        let mut conn = testing::connection();
        create(&mut conn, "alice", "alice@example.com", "password1").unwrap();
        let err = create(&mut conn, "alice2", "alice@example.com", "password2").unwrap_err();
        assert!(matches!(err, UserCreationError::DuplicatedEmail));
    }

    #[test]
    fn listing_is_newest_first() {
        let mut conn = testing::connection();
        let first = testing::user(&mut conn, "first");
        let second = testing::user(&mut conn, "second");

        let page = paginate(&mut conn, Paging::default()).unwrap();
        let ids: Vec<i32> = page.items.iter().map(|user| user.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn find_many_keeps_requested_order() {
        let mut conn = testing::connection();
        let a = testing::user(&mut conn, "a");
        let b = testing::user(&mut conn, "b");
        let c = testing::user(&mut conn, "c");

        let found = find_many(&mut conn, &[c.id, a.id, 999, b.id]).unwrap();
        let ids: Vec<i32> = found.iter().map(|user| user.id).collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);
    }

    #[test]
    fn counts_cover_every_relationship() {
        let mut conn = testing::connection();
        let alice = testing::user(&mut conn, "alice");
        let bob = testing::user(&mut conn, "bob");
        let post = testing::micropost(&mut conn, bob.id, "hi");
        testing::micropost(&mut conn, alice.id, "hello");

        relationships::add_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap();
        relationships::add_edge(&mut conn, EdgeKind::Favorite, alice.id, post.id).unwrap();

        assert_eq!(
            relationship_counts(&mut conn, alice.id).unwrap(),
            UserCounts {
                microposts: 1,
                followings: 1,
                followers: 0,
                favorites: 1,
            }
        );
        assert_eq!(
            relationship_counts(&mut conn, bob.id).unwrap(),
            UserCounts {
                microposts: 1,
                followings: 0,
                followers: 1,
                favorites: 0,
            }
        );
    }
}
