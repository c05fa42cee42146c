use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use shutter_db::Table;

use crate::middleware::{Binding, Guard, bind, guarded};
use crate::state::AppState;
use crate::{interactions, photos, profile, relations, search, session, stream};

const USER: &[Binding] = &[bind("user_id", Table::User)];

const TARGET: &[Binding] = &[
    bind("user_id", Table::User),
    bind("targeted_user_id", Table::User),
];

const PHOTO: &[Binding] = &[bind("user_id", Table::User), bind("photo_id", Table::Photo)];

const LIKER: &[Binding] = &[
    bind("user_id", Table::User),
    bind("photo_id", Table::Photo),
    bind("liker_id", Table::User),
];

const COMMENT: &[Binding] = &[
    bind("user_id", Table::User),
    bind("photo_id", Table::Photo),
    bind("comment_id", Table::Comment),
];

/// The whole HTTP surface. `max_upload_bytes` caps every request body.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let s = &state;
    let own = |bindings: &'static [Binding]| Guard::new(bindings).identity("user_id");

    Router::new()
        // Session
        .route("/session", post(session::login))
        .route("/liveness", get(session::liveness))
        .route("/search", guarded(get(search::do_search), s, Guard::authenticated()))
        // Manage profile
        .route("/profiles/{user_id}", guarded(get(profile::get_user_profile), s, Guard::new(USER)))
        .route("/profiles/{user_id}/name", guarded(put(profile::set_my_username), s, own(USER)))
        .route("/profiles/{user_id}/photos", guarded(post(photos::upload_photo), s, own(USER)))
        .route("/profiles/{user_id}/photos", guarded(get(photos::list_photos), s, Guard::new(USER)))
        .route("/profiles/{user_id}/photos/{photo_id}", guarded(get(photos::get_image), s, Guard::new(PHOTO)))
        .route("/profiles/{user_id}/photos/{photo_id}", guarded(delete(photos::delete_photo), s, own(PHOTO)))
        // Users relations
        .route("/profiles/{user_id}/following/{targeted_user_id}", guarded(put(relations::follow_user), s, own(TARGET)))
        .route("/profiles/{user_id}/following/{targeted_user_id}", guarded(delete(relations::unfollow_user), s, own(TARGET)))
        .route("/profiles/{user_id}/ban/{targeted_user_id}", guarded(put(relations::ban_user), s, own(TARGET)))
        .route("/profiles/{user_id}/ban/{targeted_user_id}", guarded(delete(relations::unban_user), s, own(TARGET)))
        .route("/profiles/{user_id}/following", guarded(get(relations::get_followed_users), s, own(USER)))
        .route("/profiles/{user_id}/following/", guarded(get(relations::get_followed_users), s, own(USER)))
        .route("/profiles/{user_id}/ban", guarded(get(relations::get_banned_users), s, own(USER)))
        .route("/profiles/{user_id}/ban/", guarded(get(relations::get_banned_users), s, own(USER)))
        .route("/profiles/{user_id}/followers", guarded(get(relations::get_followers), s, Guard::new(USER)))
        // Photo interactions
        .route("/profiles/{user_id}/photos/{photo_id}/likes", guarded(put(interactions::like_photo), s, Guard::new(PHOTO)))
        .route("/profiles/{user_id}/photos/{photo_id}/likes", guarded(delete(interactions::unlike_photo), s, Guard::new(PHOTO)))
        .route(
            "/profiles/{user_id}/photos/{photo_id}/likes/{liker_id}",
            guarded(put(interactions::like_photo), s, Guard::new(LIKER).identity("liker_id")),
        )
        .route(
            "/profiles/{user_id}/photos/{photo_id}/likes/{liker_id}",
            guarded(delete(interactions::unlike_photo), s, Guard::new(LIKER).identity("liker_id")),
        )
        .route("/profiles/{user_id}/photos/{photo_id}/comments", guarded(post(interactions::comment_photo), s, Guard::new(PHOTO)))
        .route("/profiles/{user_id}/photos/{photo_id}/comments", guarded(get(interactions::get_photo_comments), s, Guard::new(PHOTO)))
        .route(
            "/profiles/{user_id}/photos/{photo_id}/comments/{comment_id}",
            guarded(delete(interactions::delete_comment), s, Guard::new(COMMENT)),
        )
        // Stream
        .route("/stream/{user_id}", guarded(get(stream::get_my_stream), s, own(USER)))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
