pub mod error;
pub mod migrations;
pub mod models;
pub mod table;

mod interactions;
mod photos;
mod relations;
mod users;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::info;

pub use error::{DbError, DbResult};
pub use table::{Relation, Table};

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> DbResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Run a single statement (or a read-only sequence) on the shared connection.
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run a check-then-mutate sequence atomically. The write lock is taken
    /// up front; any error rolls the whole sequence back.
    pub fn with_tx<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> DbResult<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn ping(&self) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
            Ok(())
        })
    }

    pub fn entity_exists(&self, id: i64, table: Table) -> DbResult<bool> {
        self.with_conn(|conn| entity_exists(conn, id, table))
    }
}

pub(crate) fn entity_exists(conn: &Connection, id: i64, table: Table) -> DbResult<bool> {
    let count: i64 = conn.query_row(table.exists_sql(), [id], |r| r.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn user(db: &Database, name: &str) -> i64 {
        db.login(name).unwrap().0
    }

    pub fn photo(db: &Database, owner: i64) -> i64 {
        db.insert_photo(b"\x89PNG\r\n\x1a\nfake", owner).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn ping_in_memory() {
        db().ping().unwrap();
    }

    #[test]
    fn entity_exists_per_table() {
        let db = db();
        let alice = user(&db, "alice");
        let pic = photo(&db, alice);

        assert!(db.entity_exists(alice, Table::User).unwrap());
        assert!(db.entity_exists(pic, Table::Photo).unwrap());
        assert!(!db.entity_exists(pic + 1, Table::Photo).unwrap());
        assert!(!db.entity_exists(1, Table::Comment).unwrap());
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let db = db();
        let res: DbResult<()> = db.with_tx(|tx| {
            tx.execute("INSERT INTO users (username) VALUES ('ghost')", [])?;
            Err(DbError::conflict("abort"))
        });
        assert!(res.is_err());
        assert_eq!(db.find_user_by_username("ghost").unwrap(), None);
    }
}
