use rusqlite::Connection;
use tracing::debug;

use crate::error::{DbError, DbResult, on_duplicate};
use crate::table::{Relation, Table};
use crate::{Database, entity_exists};

impl Database {
    /// Whether `actor` follows/bans `target`.
    pub fn is_user_targeted(&self, target: i64, actor: i64, relation: Relation) -> DbResult<bool> {
        self.with_conn(|conn| query_targeted(conn, target, actor, relation))
    }

    /// Create a follow or ban edge from `actor` to `target`.
    ///
    /// A ban takes precedence over follows: nobody can follow across a ban in
    /// either direction, and banning drops any existing follow between the two.
    pub fn target_user(&self, actor: i64, target: i64, relation: Relation) -> DbResult<()> {
        if actor == target {
            return Err(DbError::forbidden(format!("A user can't {} themselves", relation.verb())));
        }

        self.with_tx(|tx| {
            if !entity_exists(tx, target, Table::User)? {
                return Err(DbError::not_found("User not found"));
            }

            if relation == Relation::Follow {
                if query_targeted(tx, actor, target, Relation::Ban)? {
                    return Err(DbError::forbidden("Can't follow a user that banned you"));
                }
                if query_targeted(tx, target, actor, Relation::Ban)? {
                    return Err(DbError::forbidden("Can't follow a user you banned"));
                }
            }

            tx.execute(relation.insert_sql(), [actor, target]).map_err(|e| {
                on_duplicate(e, &format!("User already targeted by {}", relation.verb()))
            })?;

            if relation == Relation::Ban {
                let dropped = tx.execute(Relation::Follow.delete_sql(), [actor, target])?
                    + tx.execute(Relation::Follow.delete_sql(), [target, actor])?;
                if dropped > 0 {
                    debug!("Ban {} -> {} dropped {} follow edge(s)", actor, target, dropped);
                }
            }

            Ok(())
        })
    }

    pub fn untarget_user(&self, actor: i64, target: i64, relation: Relation) -> DbResult<()> {
        if actor == target {
            return Err(DbError::forbidden(format!("A user can't un{} themselves", relation.verb())));
        }

        self.with_conn(|conn| {
            let deleted = conn.execute(relation.delete_sql(), [actor, target])?;
            if deleted == 0 {
                return Err(DbError::not_found(format!("No {} relation with that user", relation.verb())));
            }
            Ok(())
        })
    }
}

/// Fails with `Forbidden` when `owner` has banned `caller`.
pub(crate) fn ensure_not_banned(conn: &Connection, owner: i64, caller: i64) -> DbResult<()> {
    if query_targeted(conn, caller, owner, Relation::Ban)? {
        return Err(DbError::forbidden("The owner of that photo banned you"));
    }
    Ok(())
}

pub(crate) fn query_targeted(
    conn: &Connection,
    target: i64,
    actor: i64,
    relation: Relation,
) -> DbResult<bool> {
    let count: i64 = conn.query_row(relation.exists_sql(), [actor, target], |r| r.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use crate::{DbError, Relation};

    #[test]
    fn targeting_is_irreflexive() {
        let db = db();
        let alice = user(&db, "alice");
        for relation in [Relation::Follow, Relation::Ban] {
            let err = db.target_user(alice, alice, relation).unwrap_err();
            assert!(matches!(err, DbError::Forbidden(_)));
            let err = db.untarget_user(alice, alice, relation).unwrap_err();
            assert!(matches!(err, DbError::Forbidden(_)));
        }
    }

    #[test]
    fn duplicate_follow_is_conflict() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");

        db.target_user(alice, bob, Relation::Follow).unwrap();
        assert!(db.is_user_targeted(bob, alice, Relation::Follow).unwrap());
        assert!(!db.is_user_targeted(alice, bob, Relation::Follow).unwrap());

        let err = db.target_user(alice, bob, Relation::Follow).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn untarget_missing_is_not_found() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");

        let err = db.untarget_user(alice, bob, Relation::Ban).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        db.target_user(alice, bob, Relation::Ban).unwrap();
        db.untarget_user(alice, bob, Relation::Ban).unwrap();
        assert!(!db.is_user_targeted(bob, alice, Relation::Ban).unwrap());
    }

    #[test]
    fn target_missing_user_is_not_found() {
        let db = db();
        let alice = user(&db, "alice");
        let err = db.target_user(alice, 999, Relation::Follow).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn ban_blocks_follow_both_ways() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");

        db.target_user(alice, bob, Relation::Ban).unwrap();

        let err = db.target_user(bob, alice, Relation::Follow).unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));
        let err = db.target_user(alice, bob, Relation::Follow).unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));
    }

    #[test]
    fn ban_drops_existing_follows() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");

        db.target_user(alice, bob, Relation::Follow).unwrap();
        db.target_user(bob, alice, Relation::Follow).unwrap();
        db.target_user(alice, bob, Relation::Ban).unwrap();

        assert!(!db.is_user_targeted(bob, alice, Relation::Follow).unwrap());
        assert!(!db.is_user_targeted(alice, bob, Relation::Follow).unwrap());

        // unfollow is still answered, there is just nothing left to remove
        let err = db.untarget_user(bob, alice, Relation::Follow).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn duplicate_ban_is_conflict() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");

        db.target_user(alice, bob, Relation::Ban).unwrap();
        let err = db.target_user(alice, bob, Relation::Ban).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
        assert!(db.is_user_targeted(bob, alice, Relation::Ban).unwrap());
    }
}
