use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::images::MAX_IMAGE_BYTES;
use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
pub mod slug;

pub fn router() -> Router<AppState> {
    // Specific paths are registered alongside the dynamic /:id routes; axum
    // prefers static segments, so /user and /slug/... never hit /:id.
    Router::new()
        .route("/", get(handlers::list_blogs))
        .route("/user", get(handlers::my_blogs))
        .route("/slug/:slug", get(handlers::get_blog_by_slug))
        .route("/categories", get(handlers::list_categories))
        .route("/categories/:category", get(handlers::blogs_by_category))
        .route(
            "/categories/:category/:slug",
            get(handlers::get_blog_by_category_and_slug),
        )
        .route("/create", post(handlers::create_blog))
        .route(
            "/:id",
            get(handlers::get_blog_by_id)
                .put(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024 * 1024))
}
