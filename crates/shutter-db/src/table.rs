//! Statically known table identifiers.
//!
//! Every statement touching a table chosen at runtime comes from one of the
//! fixed templates below, so no caller-supplied text ever reaches SQL.

use std::fmt;

/// Tables whose rows carry their own integer `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    User,
    Photo,
    Comment,
}

impl Table {
    pub(crate) fn exists_sql(self) -> &'static str {
        match self {
            Self::User => "SELECT count(*) FROM users WHERE id = ?1",
            Self::Photo => "SELECT count(*) FROM photos WHERE id = ?1",
            Self::Comment => "SELECT count(*) FROM comments WHERE id = ?1",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Photo => "photo",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Directed user-to-user edges ("targeting").
///
/// Statement parameters are always `(actor, target)`: the follower/banning
/// user first, the followed/banned user second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Follow,
    Ban,
}

impl Relation {
    pub(crate) fn exists_sql(self) -> &'static str {
        match self {
            Self::Follow => "SELECT count(*) FROM follows WHERE follower = ?1 AND following = ?2",
            Self::Ban => "SELECT count(*) FROM bans WHERE banning = ?1 AND banned = ?2",
        }
    }

    pub(crate) fn insert_sql(self) -> &'static str {
        match self {
            Self::Follow => "INSERT INTO follows (follower, following) VALUES (?1, ?2)",
            Self::Ban => "INSERT INTO bans (banning, banned) VALUES (?1, ?2)",
        }
    }

    pub(crate) fn delete_sql(self) -> &'static str {
        match self {
            Self::Follow => "DELETE FROM follows WHERE follower = ?1 AND following = ?2",
            Self::Ban => "DELETE FROM bans WHERE banning = ?1 AND banned = ?2",
        }
    }

    /// Users targeted by `?1`, alphabetically.
    pub(crate) fn targets_sql(self) -> &'static str {
        match self {
            Self::Follow => {
                "SELECT u.id, u.username FROM follows f
                 JOIN users u ON u.id = f.following
                 WHERE f.follower = ?1
                 ORDER BY u.username"
            }
            Self::Ban => {
                "SELECT u.id, u.username FROM bans b
                 JOIN users u ON u.id = b.banned
                 WHERE b.banning = ?1
                 ORDER BY u.username"
            }
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Ban => "ban",
        }
    }
}
