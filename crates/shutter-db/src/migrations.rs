use rusqlite::Connection;
use tracing::info;

use crate::error::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE
            );

            CREATE TABLE photos (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                owner       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                image       BLOB NOT NULL,
                uploaded_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_photos_owner
                ON photos(owner, uploaded_at);

            CREATE TABLE comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                owner       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                photo       INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_comments_photo
                ON comments(photo);

            CREATE TABLE likes (
                owner       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                photo       INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
                PRIMARY KEY (owner, photo)
            );

            CREATE INDEX idx_likes_photo
                ON likes(photo);

            CREATE TABLE follows (
                follower    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                following   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                PRIMARY KEY (follower, following),
                CHECK (follower <> following)
            );

            CREATE INDEX idx_follows_following
                ON follows(following);

            CREATE TABLE bans (
                banning     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                banned      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                PRIMARY KEY (banning, banned),
                CHECK (banning <> banned)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);

        let rows: i64 = conn
            .query_row("SELECT count(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn self_follow_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        conn.execute("INSERT INTO users (username) VALUES ('alice')", []).unwrap();

        let res = conn.execute("INSERT INTO follows (follower, following) VALUES (1, 1)", []);
        assert!(res.is_err());
    }
}
