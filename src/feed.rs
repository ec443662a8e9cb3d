//! Authors whose microposts make up a user's feed.

use crate::database::relationships::{self, EdgeKind};
use diesel::prelude::*;

/// Everyone `user` follows, then `user` itself.
///
/// The result is a filter for `microposts::by_authors`, so it isn't paginated.
/// No id repeats: a user can never follow themselves.
pub fn feed_author_ids(conn: &mut SqliteConnection, user: i32) -> QueryResult<Vec<i32>> {
    let mut authors = relationships::all_by_subject(conn, EdgeKind::Follow, user)?;
    authors.push(user);
    Ok(authors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{microposts, testing, Paging};
    use crate::graph;

    #[test]
    fn feed_is_self_plus_followings() {
        let mut conn = testing::connection();
        let me = testing::user(&mut conn, "me");
        let a = testing::user(&mut conn, "a");
        let b = testing::user(&mut conn, "b");
        testing::user(&mut conn, "stranger");

        graph::follow(&mut conn, me.id, a.id).unwrap();
        graph::follow(&mut conn, me.id, b.id).unwrap();
        // Being followed back doesn't widen the feed.
        graph::follow(&mut conn, a.id, me.id).unwrap();

        let mut authors = feed_author_ids(&mut conn, me.id).unwrap();
        authors.sort_unstable();
        let mut expected = vec![me.id, a.id, b.id];
        expected.sort_unstable();
        assert_eq!(authors, expected);
    }

    #[test]
    fn lonely_user_sees_own_posts() {
        let mut conn = testing::connection();
        let me = testing::user(&mut conn, "me");
        assert_eq!(feed_author_ids(&mut conn, me.id).unwrap(), vec![me.id]);
    }

    #[test]
    fn feed_lists_followed_posts_newest_first() {
        let mut conn = testing::connection();
        let me = testing::user(&mut conn, "me");
        let friend = testing::user(&mut conn, "friend");
        let stranger = testing::user(&mut conn, "stranger");
        graph::follow(&mut conn, me.id, friend.id).unwrap();

        let mine = testing::micropost(&mut conn, me.id, "mine");
        testing::micropost(&mut conn, stranger.id, "hidden");
        let theirs = testing::micropost(&mut conn, friend.id, "theirs");

        let authors = feed_author_ids(&mut conn, me.id).unwrap();
        let page = microposts::by_authors(&mut conn, &authors, Paging::default()).unwrap();
        let ids: Vec<i32> = page.items.iter().map(|micropost| micropost.id).collect();
        assert_eq!(ids, vec![theirs.id, mine.id]);
        assert_eq!(page.total, 2);
    }
}
