//! Row → wire conversions.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use shutter_db::models::{CommentRow, PhotoRow, ProfileCounters, UserProfile, UserRow};
use shutter_types::api;

pub fn user(row: UserRow) -> api::User {
    api::User {
        identifier: row.id,
        username: row.username,
    }
}

pub fn users(rows: Vec<UserRow>) -> api::UserList {
    api::UserList {
        users: rows.into_iter().map(user).collect(),
    }
}

pub fn photo(row: PhotoRow) -> api::Photo {
    let uploaded_at = parse_timestamp(&row.uploaded_at, "photo", row.id);
    api::Photo {
        id: row.id,
        owner: api::User {
            identifier: row.owner,
            username: row.owner_username,
        },
        uploaded_at,
        likes: row.likes,
        comments: row.comments,
    }
}

pub fn comment(row: CommentRow) -> api::Comment {
    let created_at = parse_timestamp(&row.created_at, "comment", row.id);
    api::Comment {
        id: row.id,
        owner: api::User {
            identifier: row.owner,
            username: row.owner_username,
        },
        content: row.content,
        created_at,
    }
}

fn counters(c: ProfileCounters) -> api::ProfileCounters {
    api::ProfileCounters {
        photos: c.photos,
        followers: c.followers,
        following: c.following,
    }
}

pub fn profile(p: UserProfile) -> api::UserProfile {
    api::UserProfile {
        user: user(p.user),
        photos: p.photos.into_iter().map(photo).collect(),
        counters: counters(p.counters),
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS.SSS" without timezone;
/// they are always UTC.
fn parse_timestamp(raw: &str, kind: &str, id: i64) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {} {}: {}", raw, kind, id, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_timestamps() {
        let ts = parse_timestamp("2024-03-05 14:07:09.250", "photo", 1);
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 7, 9));
        assert_eq!(ts.timestamp_subsec_millis(), 250);

        let whole = parse_timestamp("2024-03-05 14:07:09", "photo", 1);
        assert_eq!(whole.second(), 9);
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        assert_eq!(parse_timestamp("yesterday", "comment", 3), DateTime::<Utc>::default());
    }

    #[test]
    fn photo_row_conversion() {
        let p = photo(PhotoRow {
            id: 4,
            owner: 2,
            owner_username: "bob".into(),
            uploaded_at: "2024-01-01 00:00:00.000".into(),
            likes: 3,
            comments: 1,
        });
        assert_eq!(p.owner.username, "bob");
        assert_eq!(p.owner.identifier, 2);
        assert_eq!((p.likes, p.comments), (3, 1));
    }
}
