pub mod microposts;
pub mod relationships;
pub mod users;

#[database("sqlite_database")]
pub struct Db(diesel::SqliteConnection);

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::query_builder::*;
use diesel::query_dsl::methods::LoadQuery;
use diesel::sql_types::BigInt;
use diesel::sqlite::Sqlite;
use rocket::fairing::AdHoc;
use serde::Serialize;

use crate::config::PER_PAGE;

const SCHEMA: &str = include_str!("../../migrations/2024-01-01-000000_create_tables/up.sql");

/// Creates the tables and indexes that don't exist yet.
///
/// Also turns on foreign key enforcement for `conn`. Pooled connections get
/// it from the pool itself.
pub fn migrate(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    conn.batch_execute(SCHEMA)
}

pub fn migrations() -> AdHoc {
    AdHoc::try_on_ignite("Run migrations", |rocket| async move {
        let db = match Db::get_one(&rocket).await {
            Some(db) => db,
            None => {
                tracing::error!("no database connection available for migrations");
                return Err(rocket);
            }
        };
        match db.run(migrate).await {
            Ok(()) => Ok(rocket),
            Err(err) => {
                tracing::error!("migrations failed: {}", err);
                Err(rocket)
            }
        }
    })
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub per_page: i64,
}

impl Paging {
    pub fn new(page: Option<i64>) -> Self {
        Paging {
            page: page.unwrap_or(1).max(1),
            per_page: PER_PAGE,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for Paging {
    fn default() -> Self {
        Paging::new(None)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn empty(paging: Paging) -> Self {
        Page {
            items: Vec::new(),
            total: 0,
            page: paging.page,
            per_page: paging.per_page,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Replaces the items, keeping the paging metadata.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

pub trait OffsetLimit: Sized {
    fn offset_and_limit(self, offset: i64, limit: i64) -> OffsetLimited<Self>;

    fn paginate(self, paging: Paging) -> OffsetLimited<Self> {
        self.offset_and_limit(paging.offset(), paging.per_page)
    }
}

impl<T> OffsetLimit for T {
    fn offset_and_limit(self, offset: i64, limit: i64) -> OffsetLimited<Self> {
        OffsetLimited {
            query: self,
            limit,
            offset,
        }
    }
}

#[derive(Debug, Clone, Copy, QueryId)]
pub struct OffsetLimited<T> {
    query: T,
    offset: i64,
    limit: i64,
}

impl<T> OffsetLimited<T> {
    pub fn load_and_count<'a, U>(self, conn: &mut SqliteConnection) -> QueryResult<(Vec<U>, i64)>
    where
        Self: LoadQuery<'a, SqliteConnection, (U, i64)>,
    {
        let results = self.load::<(U, i64)>(conn)?;
        let total = results.first().map(|x| x.1).unwrap_or(0);
        let records = results.into_iter().map(|x| x.0).collect();
        Ok((records, total))
    }

    /// Loads one page. A page past the end comes back empty but still
    /// reports the total of the whole listing.
    pub fn load_page<'a, U>(self, conn: &mut SqliteConnection) -> QueryResult<Page<U>>
    where
        T: Clone,
        Self: LoadQuery<'a, SqliteConnection, (U, i64)>,
    {
        let per_page = self.limit;
        let offset = self.offset;
        let page = if per_page > 0 { offset / per_page + 1 } else { 1 };
        let head = OffsetLimited {
            query: self.query.clone(),
            offset: 0,
            limit: 1,
        };

        let (items, mut total) = self.load_and_count(conn)?;
        if items.is_empty() && offset > 0 {
            total = head.load_and_count::<U>(conn)?.1;
        }
        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }
}

impl<T: Query> Query for OffsetLimited<T> {
    type SqlType = (T::SqlType, BigInt);
}

impl<T> RunQueryDsl<SqliteConnection> for OffsetLimited<T> {}

impl<T> QueryFragment<Sqlite> for OffsetLimited<T>
where
    T: QueryFragment<Sqlite>,
{
    fn walk_ast<'a>(&'a self, mut out: AstPass<'_, 'a, Sqlite>) -> QueryResult<()> {
        out.push_sql("SELECT *, COUNT(*) OVER () FROM (");
        self.query.walk_ast(out.reborrow())?;
        out.push_sql(") t LIMIT ");
        out.push_bind_param::<BigInt, _>(&self.limit)?;
        out.push_sql(" OFFSET ");
        out.push_bind_param::<BigInt, _>(&self.offset)?;
        Ok(())
    }
}
