use rusqlite::Connection;
use tracing::debug;

use crate::error::{DbError, DbResult, OptionalExt, on_duplicate};
use crate::models::{ProfileCounters, UserProfile, UserRow};
use crate::photos::query_user_photos;
use crate::table::Relation;
use crate::Database;

impl Database {
    /// Get-or-create by username. Returns the id and whether the user was created.
    pub fn login(&self, username: &str) -> DbResult<(i64, bool)> {
        self.with_tx(|tx| {
            if let Some(user) = query_user_by_username(tx, username)? {
                return Ok((user.id, false));
            }

            tx.execute("INSERT INTO users (username) VALUES (?1)", [username])?;
            let id = tx.last_insert_rowid();
            debug!("Created user {} ({})", id, username);
            Ok((id, true))
        })
    }

    #[cfg(test)]
    pub(crate) fn find_user_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    #[cfg(test)]
    pub(crate) fn get_user(&self, id: i64) -> DbResult<UserRow> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn change_username(&self, id: i64, username: &str) -> DbResult<()> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("UPDATE users SET username = ?1 WHERE id = ?2", rusqlite::params![username, id])
                .map_err(|e| on_duplicate(e, "Username already taken"))?;
            if changed == 0 {
                return Err(DbError::not_found("User not found"));
            }
            Ok(())
        })
    }

    /// Case-insensitive substring match over usernames, hiding users who
    /// banned `caller`.
    pub fn do_search(&self, pattern: &str, caller: i64) -> DbResult<Vec<UserRow>> {
        let like = format!("%{}%", escape_like(pattern));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username FROM users u
                 WHERE u.username LIKE ?1 ESCAPE '\\'
                   AND NOT EXISTS (SELECT 1 FROM bans b WHERE b.banning = u.id AND b.banned = ?2)
                 ORDER BY u.username",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![like, caller], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Users that `user` follows or has banned.
    pub fn get_users_list(&self, user: i64, relation: Relation) -> DbResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(relation.targets_sql())?;
            let rows = stmt
                .query_map([user], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_followers(&self, user: i64) -> DbResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username FROM follows f
                 JOIN users u ON u.id = f.follower
                 WHERE f.following = ?1
                 ORDER BY u.username",
            )?;
            let rows = stmt
                .query_map([user], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Profile row, one page of photos (newest first) and the counters,
    /// read under one lock so the three parts agree with each other.
    pub fn get_user_profile(&self, id: i64, amount: i64, offset: i64) -> DbResult<UserProfile> {
        self.with_conn(|conn| {
            let user = query_user_by_id(conn, id)?;
            let photos = query_user_photos(conn, id, amount, offset)?;
            let counters = query_profile_counters(conn, id)?;
            Ok(UserProfile {
                user,
                photos,
                counters,
            })
        })
    }
}

pub(crate) fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> DbResult<Option<UserRow>> {
    conn.query_row(
        "SELECT id, username FROM users WHERE username = ?1",
        [username],
        user_from_row,
    )
    .optional()
}

fn query_user_by_id(conn: &Connection, id: i64) -> DbResult<UserRow> {
    conn.query_row("SELECT id, username FROM users WHERE id = ?1", [id], user_from_row)
        .optional()?
        .ok_or_else(|| DbError::not_found("User not found"))
}

fn query_profile_counters(conn: &Connection, id: i64) -> DbResult<ProfileCounters> {
    let counters = conn.query_row(
        "SELECT
            (SELECT count(*) FROM photos WHERE owner = ?1),
            (SELECT count(*) FROM follows WHERE following = ?1),
            (SELECT count(*) FROM follows WHERE follower = ?1)",
        [id],
        |r| {
            Ok(ProfileCounters {
                photos: r.get(0)?,
                followers: r.get(1)?,
                following: r.get(2)?,
            })
        },
    )?;
    Ok(counters)
}

/// Escape LIKE wildcards so the pattern matches literally.
fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
