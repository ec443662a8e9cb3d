use crate::database::relationships::{self, EdgeKind};
use crate::database::{users, OffsetLimit, Page, Paging};
use crate::errors::{Error, Result};
use crate::models::micropost::{Micropost, MicropostJson};
use crate::schema::microposts;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::info;

#[derive(Insertable)]
#[diesel(table_name = microposts)]
struct NewMicropost<'a> {
    user_id: i32,
    content: &'a str,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub fn create(conn: &mut SqliteConnection, author: i32, content: &str) -> QueryResult<Micropost> {
    let now = Utc::now().naive_utc();
    let new_micropost = &NewMicropost {
        user_id: author,
        content,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(microposts::table)
        .values(new_micropost)
        .get_result(conn)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Micropost> {
    microposts::table.find(id).get_result(conn)
}

pub fn exists(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(microposts::table.find(id))).get_result(conn)
}

/// Deletes a micropost written by `actor`, along with every favorite of it.
pub fn delete(conn: &mut SqliteConnection, actor: i32, id: i32) -> Result<()> {
    conn.transaction(|conn| -> Result<()> {
        let micropost = find(conn, id)
            .optional()?
            .ok_or(Error::NotFound("micropost"))?;
        if micropost.user_id != actor {
            return Err(Error::Forbidden);
        }

        let unfavorited = relationships::remove_all_by_object(conn, EdgeKind::Favorite, id)?;
        diesel::delete(microposts::table.find(id)).execute(conn)?;
        info!(micropost = id, unfavorited, "deleted micropost");
        Ok(())
    })
}

/// Loads microposts in the order of `ids`, skipping ids that don't exist.
pub fn find_many(conn: &mut SqliteConnection, ids: &[i32]) -> QueryResult<Vec<Micropost>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut found = microposts::table
        .filter(microposts::id.eq_any(ids))
        .load::<Micropost>(conn)?;
    found.sort_by_key(|micropost| ids.iter().position(|id| *id == micropost.id));
    Ok(found)
}

/// Microposts of a single author, newest first.
pub fn by_author(
    conn: &mut SqliteConnection,
    author: i32,
    paging: Paging,
) -> QueryResult<Page<Micropost>> {
    microposts::table
        .filter(microposts::user_id.eq(author))
        .select(microposts::all_columns)
        .order((microposts::created_at.desc(), microposts::id.desc()))
        .paginate(paging)
        .load_page::<Micropost>(conn)
}

/// Microposts of any of `authors`, newest first.
pub fn by_authors(
    conn: &mut SqliteConnection,
    authors: &[i32],
    paging: Paging,
) -> QueryResult<Page<Micropost>> {
    if authors.is_empty() {
        return Ok(Page::empty(paging));
    }

    microposts::table
        .filter(microposts::user_id.eq_any(authors))
        .select(microposts::all_columns)
        .order((microposts::created_at.desc(), microposts::id.desc()))
        .paginate(paging)
        .load_page::<Micropost>(conn)
}

/// Microposts `user` favorited, in the order the store lists them.
pub fn favorites(
    conn: &mut SqliteConnection,
    user: i32,
    paging: Paging,
) -> QueryResult<Page<Micropost>> {
    let page = relationships::list_by_subject(conn, EdgeKind::Favorite, user, paging)?;
    let records = find_many(conn, &page.items)?;
    Ok(page.with_items(records))
}

/// Attaches the author and the viewer's favorite flag to one micropost.
pub fn detail(
    conn: &mut SqliteConnection,
    viewer: i32,
    micropost: Micropost,
) -> QueryResult<MicropostJson> {
    let author = users::find(conn, micropost.user_id)?.to_json();
    let favorited =
        relationships::edge_exists(conn, EdgeKind::Favorite, viewer, micropost.id)?;
    Ok(micropost.attach(author, favorited))
}

/// Attaches authors and the viewer's favorite flags to a page of microposts.
pub fn with_details(
    conn: &mut SqliteConnection,
    viewer: i32,
    mut page: Page<Micropost>,
) -> QueryResult<Page<MicropostJson>> {
    let records = std::mem::take(&mut page.items);

    let ids: Vec<i32> = records.iter().map(|micropost| micropost.id).collect();
    let favorited: HashSet<i32> =
        relationships::existing_objects(conn, EdgeKind::Favorite, viewer, &ids)?
            .into_iter()
            .collect();

    let mut author_ids: Vec<i32> = records.iter().map(|micropost| micropost.user_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors: HashMap<i32, _> = users::find_many(conn, &author_ids)?
        .into_iter()
        .map(|user| (user.id, user.to_json()))
        .collect();

    let items = records
        .into_iter()
        .filter_map(|micropost| {
            let author = authors.get(&micropost.user_id)?;
            let is_favorite = favorited.contains(&micropost.id);
            Some(micropost.attach(author.clone(), is_favorite))
        })
        .collect();
    Ok(page.with_items(items))
}
