//! Database row types, mapped directly from SQLite rows.
//! Distinct from shutter-types API models to keep the DB layer independent.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
}

/// Photo metadata joined with its owner's name and interaction counts.
/// The image blob is fetched separately.
#[derive(Debug, Clone)]
pub struct PhotoRow {
    pub id: i64,
    pub owner: i64,
    pub owner_username: String,
    pub uploaded_at: String,
    pub likes: i64,
    pub comments: i64,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub owner: i64,
    pub owner_username: String,
    pub photo: i64,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileCounters {
    pub photos: i64,
    pub followers: i64,
    pub following: i64,
}

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: UserRow,
    pub photos: Vec<PhotoRow>,
    pub counters: ProfileCounters,
}
