use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::images::MAX_IMAGE_BYTES;
use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/edit-profile", put(handlers::update_profile))
        .route(
            "/cover-image",
            put(handlers::update_cover_image).delete(handlers::delete_cover_image),
        )
        .route("/change-password", put(handlers::change_password))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
}
