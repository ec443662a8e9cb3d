//! Follow and favorite edges.
//!
//! Both kinds are stored as `(subject, object)` pairs with a composite primary
//! key, so the database is the one place that decides whether an edge exists.
//! Inserts and deletes report through affected-row counts instead of a
//! separate existence read.

use crate::database::{OffsetLimit, Page, Paging};
use crate::schema::{favorites, follows};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `follower` follows `followed`, both users.
    Follow,
    /// `user` favorited `micropost`.
    Favorite,
}

#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("edge already exists")]
    DuplicateEdge,
    #[error("edge not found")]
    EdgeNotFound,
    /// The subject or the object has no row of its own.
    #[error("edge endpoint does not exist")]
    MissingEndpoint,
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

pub fn add_edge(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    subject: i32,
    object: i32,
) -> Result<(), EdgeError> {
    let now = Utc::now().naive_utc();
    let inserted = match kind {
        EdgeKind::Follow => diesel::insert_or_ignore_into(follows::table)
            .values((
                follows::follower.eq(subject),
                follows::followed.eq(object),
                follows::created_at.eq(now),
            ))
            .execute(conn),
        EdgeKind::Favorite => diesel::insert_or_ignore_into(favorites::table)
            .values((
                favorites::user.eq(subject),
                favorites::micropost.eq(object),
                favorites::created_at.eq(now),
            ))
            .execute(conn),
    };

    let inserted = match inserted {
        Ok(inserted) => inserted,
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            return Err(EdgeError::MissingEndpoint)
        }
        Err(err) => return Err(err.into()),
    };
    if inserted == 0 {
        return Err(EdgeError::DuplicateEdge);
    }
    Ok(())
}

pub fn remove_edge(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    subject: i32,
    object: i32,
) -> Result<(), EdgeError> {
    let deleted = match kind {
        EdgeKind::Follow => {
            diesel::delete(follows::table.find((subject, object))).execute(conn)?
        }
        EdgeKind::Favorite => {
            diesel::delete(favorites::table.find((subject, object))).execute(conn)?
        }
    };

    if deleted == 0 {
        return Err(EdgeError::EdgeNotFound);
    }
    Ok(())
}

pub fn edge_exists(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    subject: i32,
    object: i32,
) -> QueryResult<bool> {
    use diesel::dsl::exists;

    match kind {
        EdgeKind::Follow => {
            diesel::select(exists(follows::table.find((subject, object)))).get_result(conn)
        }
        EdgeKind::Favorite => {
            diesel::select(exists(favorites::table.find((subject, object)))).get_result(conn)
        }
    }
}

/// Objects the subject points at, by ascending id.
pub fn list_by_subject(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    subject: i32,
    paging: Paging,
) -> QueryResult<Page<i32>> {
    match kind {
        EdgeKind::Follow => follows::table
            .filter(follows::follower.eq(subject))
            .select(follows::followed)
            .order(follows::followed.asc())
            .paginate(paging)
            .load_page::<i32>(conn),
        EdgeKind::Favorite => favorites::table
            .filter(favorites::user.eq(subject))
            .select(favorites::micropost)
            .order(favorites::micropost.asc())
            .paginate(paging)
            .load_page::<i32>(conn),
    }
}

/// Subjects pointing at the object, by ascending id.
pub fn list_by_object(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    object: i32,
    paging: Paging,
) -> QueryResult<Page<i32>> {
    match kind {
        EdgeKind::Follow => follows::table
            .filter(follows::followed.eq(object))
            .select(follows::follower)
            .order(follows::follower.asc())
            .paginate(paging)
            .load_page::<i32>(conn),
        EdgeKind::Favorite => favorites::table
            .filter(favorites::micropost.eq(object))
            .select(favorites::user)
            .order(favorites::user.asc())
            .paginate(paging)
            .load_page::<i32>(conn),
    }
}

pub fn all_by_subject(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    subject: i32,
) -> QueryResult<Vec<i32>> {
    match kind {
        EdgeKind::Follow => follows::table
            .filter(follows::follower.eq(subject))
            .select(follows::followed)
            .order(follows::followed.asc())
            .load(conn),
        EdgeKind::Favorite => favorites::table
            .filter(favorites::user.eq(subject))
            .select(favorites::micropost)
            .order(favorites::micropost.asc())
            .load(conn),
    }
}

pub fn count_by_subject(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    subject: i32,
) -> QueryResult<i64> {
    match kind {
        EdgeKind::Follow => follows::table
            .filter(follows::follower.eq(subject))
            .count()
            .get_result(conn),
        EdgeKind::Favorite => favorites::table
            .filter(favorites::user.eq(subject))
            .count()
            .get_result(conn),
    }
}

pub fn count_by_object(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    object: i32,
) -> QueryResult<i64> {
    match kind {
        EdgeKind::Follow => follows::table
            .filter(follows::followed.eq(object))
            .count()
            .get_result(conn),
        EdgeKind::Favorite => favorites::table
            .filter(favorites::micropost.eq(object))
            .count()
            .get_result(conn),
    }
}

/// The subset of `objects` the subject has an edge to.
pub fn existing_objects(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    subject: i32,
    objects: &[i32],
) -> QueryResult<Vec<i32>> {
    if objects.is_empty() {
        return Ok(Vec::new());
    }

    match kind {
        EdgeKind::Follow => follows::table
            .filter(follows::follower.eq(subject))
            .filter(follows::followed.eq_any(objects))
            .select(follows::followed)
            .load(conn),
        EdgeKind::Favorite => favorites::table
            .filter(favorites::user.eq(subject))
            .filter(favorites::micropost.eq_any(objects))
            .select(favorites::micropost)
            .load(conn),
    }
}

pub fn remove_all_by_object(
    conn: &mut SqliteConnection,
    kind: EdgeKind,
    object: i32,
) -> QueryResult<usize> {
    match kind {
        EdgeKind::Follow => {
            diesel::delete(follows::table.filter(follows::followed.eq(object))).execute(conn)
        }
        EdgeKind::Favorite => {
            diesel::delete(favorites::table.filter(favorites::micropost.eq(object))).execute(conn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing;

    #[test]
    fn add_then_exists() {
        let mut conn = testing::connection();
        let alice = testing::user(&mut conn, "alice");
        let bob = testing::user(&mut conn, "bob");

        assert!(!edge_exists(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap());
        add_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap();
        assert!(edge_exists(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap());
        // Directed.
        assert!(!edge_exists(&mut conn, EdgeKind::Follow, bob.id, alice.id).unwrap());
    }

    #[test]
    fn duplicate_insert_is_rejected_by_the_key() {
        let mut conn = testing::connection();
        let alice = testing::user(&mut conn, "alice");
        let bob = testing::user(&mut conn, "bob");

        add_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap();
        let err = add_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap_err();
        assert!(matches!(err, EdgeError::DuplicateEdge));
        assert_eq!(count_by_subject(&mut conn, EdgeKind::Follow, alice.id).unwrap(), 1);
    }

    #[test]
    fn edges_need_both_endpoints() {
        let mut conn = testing::connection();
        let alice = testing::user(&mut conn, "alice");

        let err = add_edge(&mut conn, EdgeKind::Follow, 999, alice.id).unwrap_err();
        assert!(matches!(err, EdgeError::MissingEndpoint));
        let err = add_edge(&mut conn, EdgeKind::Favorite, alice.id, 999).unwrap_err();
        assert!(matches!(err, EdgeError::MissingEndpoint));
        assert_eq!(count_by_object(&mut conn, EdgeKind::Follow, alice.id).unwrap(), 0);
    }

    #[test]
    fn remove_missing_edge() {
        let mut conn = testing::connection();
        let alice = testing::user(&mut conn, "alice");
        let bob = testing::user(&mut conn, "bob");

        let err = remove_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap_err();
        assert!(matches!(err, EdgeError::EdgeNotFound));

        add_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap();
        remove_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap();
        assert!(!edge_exists(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap());
    }

    #[test]
    fn both_directions_are_listed() {
        let mut conn = testing::connection();
        let alice = testing::user(&mut conn, "alice");
        let bob = testing::user(&mut conn, "bob");
        let carol = testing::user(&mut conn, "carol");

        add_edge(&mut conn, EdgeKind::Follow, alice.id, carol.id).unwrap();
        add_edge(&mut conn, EdgeKind::Follow, alice.id, bob.id).unwrap();
        add_edge(&mut conn, EdgeKind::Follow, bob.id, carol.id).unwrap();

        let followings =
            list_by_subject(&mut conn, EdgeKind::Follow, alice.id, Paging::default()).unwrap();
        assert_eq!(followings.items, vec![bob.id, carol.id]);
        assert_eq!(followings.total, 2);

        let followers =
            list_by_object(&mut conn, EdgeKind::Follow, carol.id, Paging::default()).unwrap();
        assert_eq!(followers.items, vec![alice.id, bob.id]);
        assert_eq!(count_by_object(&mut conn, EdgeKind::Follow, carol.id).unwrap(), 2);
    }

    #[test]
    fn listing_is_paginated() {
        let mut conn = testing::connection();
        let fan = testing::user(&mut conn, "fan");
        let author = testing::user(&mut conn, "author");
        let mut posts = Vec::new();
        for i in 0..12 {
            let post = testing::micropost(&mut conn, author.id, &format!("post {}", i));
            add_edge(&mut conn, EdgeKind::Favorite, fan.id, post.id).unwrap();
            posts.push(post.id);
        }

        let first = list_by_subject(&mut conn, EdgeKind::Favorite, fan.id, Paging::new(Some(1)))
            .unwrap();
        let second = list_by_subject(&mut conn, EdgeKind::Favorite, fan.id, Paging::new(Some(2)))
            .unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.items, posts[..10].to_vec());
        assert_eq!(second.items, posts[10..].to_vec());
        assert_eq!(
            all_by_subject(&mut conn, EdgeKind::Favorite, fan.id).unwrap(),
            posts
        );
    }

    #[test]
    fn existing_objects_filters_to_edges() {
        let mut conn = testing::connection();
        let fan = testing::user(&mut conn, "fan");
        let first = testing::micropost(&mut conn, fan.id, "first");
        let second = testing::micropost(&mut conn, fan.id, "second");

        add_edge(&mut conn, EdgeKind::Favorite, fan.id, second.id).unwrap();
        let found =
            existing_objects(&mut conn, EdgeKind::Favorite, fan.id, &[first.id, second.id])
                .unwrap();
        assert_eq!(found, vec![second.id]);
        assert!(existing_objects(&mut conn, EdgeKind::Favorite, fan.id, &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn remove_all_pointing_at_object() {
        let mut conn = testing::connection();
        let alice = testing::user(&mut conn, "alice");
        let bob = testing::user(&mut conn, "bob");
        let post = testing::micropost(&mut conn, alice.id, "hello");

        add_edge(&mut conn, EdgeKind::Favorite, alice.id, post.id).unwrap();
        add_edge(&mut conn, EdgeKind::Favorite, bob.id, post.id).unwrap();
        assert_eq!(
            remove_all_by_object(&mut conn, EdgeKind::Favorite, post.id).unwrap(),
            2
        );
        assert_eq!(count_by_object(&mut conn, EdgeKind::Favorite, post.id).unwrap(), 0);
    }
}
