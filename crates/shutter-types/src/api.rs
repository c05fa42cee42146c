use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Session --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub identifier: i64,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetUsernameRequest {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub identifier: i64,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProfileCounters {
    pub photos: i64,
    pub followers: i64,
    pub following: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub photos: Vec<Photo>,
    pub counters: ProfileCounters,
}

// -- Photos --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub owner: User,
    pub uploaded_at: DateTime<Utc>,
    pub likes: i64,
    pub comments: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: i64,
    pub size: usize,
}

/// One page of a user's photos, newest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoList {
    pub photos: Vec<Photo>,
}

/// Photos from followed users, newest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct Stream {
    pub photos: Vec<Photo>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentCreated {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub owner: User,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}

// -- Errors --

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
