use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Discovery
        .route("/gifs", get(handlers::list_gifs).post(handlers::create_gif))
        .route("/gifs/{id}", get(handlers::get_gif))
        .route("/gifs/{id}/views", post(handlers::record_view))
        .route("/gifs/{id}/downloads", post(handlers::record_download))
        .route("/gifs/{id}/favorite", post(handlers::toggle_favorite))
        .route("/trending", get(handlers::trending_gifs))
        .route("/featured", get(handlers::featured_gifs))
        // Categories
        .route("/categories", get(handlers::list_categories))
        .route("/categories/{slug}", get(handlers::get_category))
        // Dashboard
        .route("/me", get(handlers::me))
        .route("/me/dashboard", get(handlers::dashboard))
        .route("/me/favorites", get(handlers::my_favorites))
        .route("/me/uploads", get(handlers::my_uploads))
        .route("/me/collections", get(handlers::my_collections))
        // Collections
        .route("/collections", post(handlers::create_collection))
        .route("/collections/{id}/gifs", post(handlers::add_collection_gif))
        .route(
            "/collections/{id}/gifs/{gif_id}",
            delete(handlers::remove_collection_gif),
        )
        // Newsletter
        .route("/newsletter/subscribe", post(handlers::subscribe_newsletter))
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
