use rusqlite::Connection;

use crate::error::{DbError, DbResult, OptionalExt, on_duplicate};
use crate::models::CommentRow;
use crate::photos::ensure_photo_owner;
use crate::relations::ensure_not_banned;
use crate::Database;

impl Database {
    // -- Likes --

    pub fn like_photo(&self, user: i64, photo: i64, photo_owner: i64) -> DbResult<()> {
        self.with_tx(|tx| {
            ensure_not_banned(tx, photo_owner, user)?;
            ensure_photo_owner(tx, photo, photo_owner)?;
            tx.execute("INSERT INTO likes (owner, photo) VALUES (?1, ?2)", [user, photo])
                .map_err(|e| on_duplicate(e, "User already liked that photo"))?;
            Ok(())
        })
    }

    pub fn unlike_photo(&self, user: i64, photo: i64, photo_owner: i64) -> DbResult<()> {
        self.with_tx(|tx| {
            ensure_not_banned(tx, photo_owner, user)?;
            ensure_photo_owner(tx, photo, photo_owner)?;
            let deleted =
                tx.execute("DELETE FROM likes WHERE owner = ?1 AND photo = ?2", [user, photo])?;
            if deleted == 0 {
                return Err(DbError::not_found("There is no like from that user on that photo"));
            }
            Ok(())
        })
    }

    // -- Comments --

    pub fn comment_photo(
        &self,
        user: i64,
        photo: i64,
        photo_owner: i64,
        content: &str,
    ) -> DbResult<i64> {
        self.with_tx(|tx| {
            ensure_not_banned(tx, photo_owner, user)?;
            ensure_photo_owner(tx, photo, photo_owner)?;
            tx.execute(
                "INSERT INTO comments (owner, photo, content) VALUES (?1, ?2, ?3)",
                rusqlite::params![user, photo, content],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Remove `comment` from `photo`. Only the comment's author may do so.
    /// Like every interaction, refused while the photo owner bans the caller.
    pub fn delete_comment(
        &self,
        photo: i64,
        photo_owner: i64,
        caller: i64,
        comment: i64,
    ) -> DbResult<()> {
        self.with_tx(|tx| {
            ensure_not_banned(tx, photo_owner, caller)?;
            ensure_photo_owner(tx, photo, photo_owner)?;

            let (comment_photo, comment_owner): (i64, i64) = tx
                .query_row(
                    "SELECT photo, owner FROM comments WHERE id = ?1",
                    [comment],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .optional()?
                .ok_or_else(|| DbError::not_found("Comment not found"))?;

            if comment_photo != photo {
                return Err(DbError::conflict("Comment does not belong to that photo"));
            }
            if comment_owner != caller {
                return Err(DbError::forbidden("Only the author can delete a comment"));
            }

            tx.execute("DELETE FROM comments WHERE id = ?1", [comment])?;
            Ok(())
        })
    }

    /// Comments on `photo`, oldest first.
    pub fn get_photo_comments(&self, photo: i64, photo_owner: i64) -> DbResult<Vec<CommentRow>> {
        self.with_conn(|conn| {
            ensure_photo_owner(conn, photo, photo_owner)?;
            query_comments(conn, photo)
        })
    }
}

fn query_comments(conn: &Connection, photo: i64) -> DbResult<Vec<CommentRow>> {
    // JOIN users to fetch the author name in a single query
    let mut stmt = conn.prepare(
        "SELECT c.id, c.owner, u.username, c.photo, c.content, c.created_at
         FROM comments c
         JOIN users u ON u.id = c.owner
         WHERE c.photo = ?1
         ORDER BY c.created_at, c.id",
    )?;

    let rows = stmt
        .query_map([photo], |row| {
            Ok(CommentRow {
                id: row.get(0)?,
                owner: row.get(1)?,
                owner_username: row.get(2)?,
                photo: row.get(3)?,
                content: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use crate::{DbError, Relation, Table};

    #[test]
    fn double_like_conflicts() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let pic = photo(&db, alice);

        db.like_photo(bob, pic, alice).unwrap();
        let err = db.like_photo(bob, pic, alice).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn unlike_without_like_is_not_found() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let pic = photo(&db, alice);

        let err = db.unlike_photo(bob, pic, alice).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        db.like_photo(bob, pic, alice).unwrap();
        db.unlike_photo(bob, pic, alice).unwrap();
    }

    #[test]
    fn like_checks_photo_owner() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let pic = photo(&db, alice);

        let err = db.like_photo(alice, pic, bob).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
        let err = db.unlike_photo(alice, pic, bob).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn comments_listed_with_authors() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let pic = photo(&db, alice);

        let first = db.comment_photo(bob, pic, alice, "nice").unwrap();
        let second = db.comment_photo(alice, pic, alice, "thanks").unwrap();

        let comments = db.get_photo_comments(pic, alice).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, first);
        assert_eq!(comments[0].owner_username, "bob");
        assert_eq!(comments[1].id, second);
        assert_eq!(comments[1].content, "thanks");

        let err = db.get_photo_comments(pic, bob).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn delete_comment_rules() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let pic = photo(&db, alice);
        let other = photo(&db, alice);
        let comment = db.comment_photo(bob, pic, alice, "hey").unwrap();

        // wrong photo
        let err = db.delete_comment(other, alice, bob, comment).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        // not the author, even as photo owner
        let err = db.delete_comment(pic, alice, alice, comment).unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));

        // missing comment
        let err = db.delete_comment(pic, alice, bob, comment + 100).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        db.delete_comment(pic, alice, bob, comment).unwrap();
        assert!(!db.entity_exists(comment, Table::Comment).unwrap());
    }

    #[test]
    fn banned_caller_cannot_interact() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let pic = photo(&db, alice);

        db.like_photo(bob, pic, alice).unwrap();
        let comment = db.comment_photo(bob, pic, alice, "hi").unwrap();
        db.target_user(alice, bob, Relation::Ban).unwrap();

        let err = db.like_photo(bob, pic, alice).unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));
        let err = db.unlike_photo(bob, pic, alice).unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));
        let err = db.comment_photo(bob, pic, alice, "hi again").unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));
        let err = db.delete_comment(pic, alice, bob, comment).unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));

        // nothing changed behind the refusals
        assert!(db.entity_exists(comment, Table::Comment).unwrap());
        assert_eq!(db.get_photo_comments(pic, alice).unwrap().len(), 1);

        db.untarget_user(alice, bob, Relation::Ban).unwrap();
        db.unlike_photo(bob, pic, alice).unwrap();
        db.delete_comment(pic, alice, bob, comment).unwrap();
    }

    #[test]
    fn ban_does_not_block_the_banner() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let pic = photo(&db, bob);

        db.target_user(alice, bob, Relation::Ban).unwrap();
        db.like_photo(alice, pic, bob).unwrap();
        db.comment_photo(alice, pic, bob, "still here").unwrap();
    }
}
