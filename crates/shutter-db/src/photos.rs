use rusqlite::Connection;
use tracing::debug;

use crate::error::{DbError, DbResult, OptionalExt};
use crate::models::PhotoRow;
use crate::Database;

pub(crate) const PHOTO_BELONGING_MESSAGE: &str = "Photo does not belong to that user";

const PHOTO_COLUMNS: &str = "p.id, p.owner, u.username, p.uploaded_at,
        (SELECT count(*) FROM likes l WHERE l.photo = p.id),
        (SELECT count(*) FROM comments c WHERE c.photo = p.id)";

impl Database {
    pub fn insert_photo(&self, image: &[u8], owner: i64) -> DbResult<i64> {
        if image.is_empty() {
            return Err(DbError::bad_input("Empty image"));
        }

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO photos (owner, image) VALUES (?1, ?2)",
                rusqlite::params![owner, image],
            )?;
            let id = conn.last_insert_rowid();
            debug!("Stored photo {} for user {} ({} bytes)", id, owner, image.len());
            Ok(id)
        })
    }

    /// Raw image bytes, only if `photo` is owned by `owner`.
    pub fn get_image(&self, photo: i64, owner: i64) -> DbResult<Vec<u8>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT image FROM photos WHERE id = ?1 AND owner = ?2",
                [photo, owner],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| DbError::conflict(PHOTO_BELONGING_MESSAGE))
        })
    }

    pub fn delete_photo(&self, photo: i64, owner: i64) -> DbResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM photos WHERE id = ?1 AND owner = ?2",
                [photo, owner],
            )?;
            if deleted == 0 {
                return Err(DbError::conflict(PHOTO_BELONGING_MESSAGE));
            }
            debug!("Deleted photo {} of user {}", photo, owner);
            Ok(())
        })
    }

    pub fn get_user_photos(&self, owner: i64, amount: i64, offset: i64) -> DbResult<Vec<PhotoRow>> {
        self.with_conn(|conn| query_user_photos(conn, owner, amount, offset))
    }

    /// Photos owned by anyone `user` follows, newest first.
    pub fn get_my_stream(&self, user: i64, offset: i64, amount: i64) -> DbResult<Vec<PhotoRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PHOTO_COLUMNS}
                 FROM photos p
                 JOIN users u ON u.id = p.owner
                 WHERE p.owner IN (SELECT following FROM follows WHERE follower = ?1)
                 ORDER BY p.uploaded_at DESC, p.id DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user, amount, offset], photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

pub(crate) fn query_user_photos(
    conn: &Connection,
    owner: i64,
    amount: i64,
    offset: i64,
) -> DbResult<Vec<PhotoRow>> {
    let sql = format!(
        "SELECT {PHOTO_COLUMNS}
         FROM photos p
         JOIN users u ON u.id = p.owner
         WHERE p.owner = ?1
         ORDER BY p.uploaded_at DESC, p.id DESC
         LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([owner, amount, offset], photo_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Fails with `Conflict` unless `photo` exists and is owned by `owner`.
pub(crate) fn ensure_photo_owner(conn: &Connection, photo: i64, owner: i64) -> DbResult<()> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM photos WHERE id = ?1 AND owner = ?2",
        [photo, owner],
        |r| r.get(0),
    )?;
    if count == 0 {
        return Err(DbError::conflict(PHOTO_BELONGING_MESSAGE));
    }
    Ok(())
}

fn photo_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PhotoRow> {
    Ok(PhotoRow {
        id: row.get(0)?,
        owner: row.get(1)?,
        owner_username: row.get(2)?,
        uploaded_at: row.get(3)?,
        likes: row.get(4)?,
        comments: row.get(5)?,
    })
}
