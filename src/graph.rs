//! Follow and favorite actions on behalf of an actor.
//!
//! Every operation answers with a bool: `true` when the call changed the
//! graph, `false` when it was a no-op (self-follow, following twice,
//! unfavoriting something that was never favorited). Only a missing actor or
//! target, or a database failure, is an error.

use crate::database::relationships::{self, EdgeError, EdgeKind};
use crate::database::{microposts, users};
use crate::errors::{Error, Result};
use diesel::SqliteConnection;
use tracing::{debug, info};

pub fn follow(conn: &mut SqliteConnection, actor: i32, target: i32) -> Result<bool> {
    if actor == target {
        debug!(actor, "ignoring self-follow");
        return Ok(false);
    }
    ensure_user(conn, target)?;

    match relationships::add_edge(conn, EdgeKind::Follow, actor, target) {
        Ok(()) => {
            info!(actor, target, "followed");
            Ok(true)
        }
        Err(EdgeError::DuplicateEdge) => {
            debug!(actor, target, "already following");
            Ok(false)
        }
        Err(EdgeError::MissingEndpoint) => Err(Error::NotFound("user")),
        Err(err) => Err(err.into()),
    }
}

pub fn unfollow(conn: &mut SqliteConnection, actor: i32, target: i32) -> Result<bool> {
    if actor == target {
        debug!(actor, "ignoring self-unfollow");
        return Ok(false);
    }
    ensure_user(conn, target)?;

    match relationships::remove_edge(conn, EdgeKind::Follow, actor, target) {
        Ok(()) => {
            info!(actor, target, "unfollowed");
            Ok(true)
        }
        Err(EdgeError::EdgeNotFound) => {
            debug!(actor, target, "not following");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn is_following(conn: &mut SqliteConnection, actor: i32, target: i32) -> Result<bool> {
    Ok(relationships::edge_exists(conn, EdgeKind::Follow, actor, target)?)
}

/// Authors may favorite their own microposts.
pub fn favorite(conn: &mut SqliteConnection, actor: i32, micropost: i32) -> Result<bool> {
    ensure_micropost(conn, micropost)?;

    match relationships::add_edge(conn, EdgeKind::Favorite, actor, micropost) {
        Ok(()) => {
            info!(actor, micropost, "favorited");
            Ok(true)
        }
        Err(EdgeError::DuplicateEdge) => {
            debug!(actor, micropost, "already a favorite");
            Ok(false)
        }
        Err(EdgeError::MissingEndpoint) => Err(Error::NotFound("user")),
        Err(err) => Err(err.into()),
    }
}

pub fn unfavorite(conn: &mut SqliteConnection, actor: i32, micropost: i32) -> Result<bool> {
    ensure_micropost(conn, micropost)?;

    match relationships::remove_edge(conn, EdgeKind::Favorite, actor, micropost) {
        Ok(()) => {
            info!(actor, micropost, "unfavorited");
            Ok(true)
        }
        Err(EdgeError::EdgeNotFound) => {
            debug!(actor, micropost, "not a favorite");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn is_favorite(conn: &mut SqliteConnection, actor: i32, micropost: i32) -> Result<bool> {
    Ok(relationships::edge_exists(conn, EdgeKind::Favorite, actor, micropost)?)
}

fn ensure_user(conn: &mut SqliteConnection, id: i32) -> Result<()> {
    if users::exists(conn, id)? {
        Ok(())
    } else {
        Err(Error::NotFound("user"))
    }
}

fn ensure_micropost(conn: &mut SqliteConnection, id: i32) -> Result<()> {
    if microposts::exists(conn, id)? {
        Ok(())
    } else {
        Err(Error::NotFound("micropost"))
    }
}
