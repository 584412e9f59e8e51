//! Route handlers for the HTTP API.

pub mod health;
pub mod learning;
pub mod podcast;
pub mod screenshots;
pub mod trends;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Learning
        .route(
            "/api/learning/modules",
            get(learning::list_modules).post(learning::start_module),
        )
        .route(
            "/api/learning/modules/manual",
            post(learning::create_manual_module),
        )
        .route(
            "/api/learning/modules/:id",
            get(learning::get_module).delete(learning::delete_module),
        )
        .route("/api/learning/modules/:id/units", post(learning::add_units))
        .route(
            "/api/learning/units/:id",
            patch(learning::set_unit_completion),
        )
        // Podcast
        .route(
            "/api/podcast/episodes",
            get(podcast::list_episodes).post(podcast::create_episode),
        )
        .route(
            "/api/podcast/episodes/:id",
            get(podcast::get_episode)
                .patch(podcast::update_episode)
                .delete(podcast::delete_episode),
        )
        .route(
            "/api/podcast/episodes/:id/generate",
            post(podcast::generate_episode),
        )
        .route(
            "/api/podcast/episodes/:id/publish",
            post(podcast::publish_episode),
        )
        .route(
            "/api/podcast/episodes/:id/download",
            get(podcast::download_episode),
        )
        .route(
            "/api/podcast/config",
            get(podcast::get_config).put(podcast::put_config),
        )
        .route("/api/podcast/voices", get(podcast::list_voices))
        .route("/api/podcast/voices/preview", post(podcast::preview_voice))
        .route("/api/podcast/credits", get(podcast::get_credits))
        .route("/api/podcast/estimate", post(podcast::estimate_cost))
        // Trends
        .route("/api/trends", get(trends::list_trends))
        .route("/api/trends/ingest", post(trends::ingest_trends))
        // Screenshot inbox
        .route("/api/screenshots", post(screenshots::enqueue))
        .route("/api/screenshots/next", get(screenshots::take_next))
}

/// The full application: API routes plus public static audio files.
///
/// Audio is served without a token so feed readers and players can fetch it.
pub fn app(state: AppState) -> Router {
    let audio = state.ctx.audio();
    let audio_routes = Router::new()
        .nest_service(audio.public_prefix(), ServeDir::new(audio.root()))
        .route_layer(middleware::from_fn(hide_dotfiles));

    router().merge(audio_routes).with_state(state)
}

/// 404 for dot-prefixed path segments, which covers in-progress audio writes.
async fn hide_dotfiles(request: Request, next: Next) -> Response {
    let hidden = request.uri().path().split('/').any(|segment| {
        segment.starts_with('.') || segment.to_ascii_lowercase().starts_with("%2e")
    });
    if hidden {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}
