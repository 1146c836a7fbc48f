use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, jobs, study};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Jobs
        .route("/jobs", post(jobs::submit_job))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        .route("/jobs/{id}/transcripts", get(jobs::list_transcripts))
        .route(
            "/jobs/{id}/transcripts/content",
            get(jobs::get_transcript_content),
        )
        // Derived artifacts
        .route("/jobs/{id}/translate", post(study::translate_transcript))
        .route("/jobs/{id}/flashcards", post(study::generate_flashcards))
        .route("/jobs/{id}/quiz", post(study::generate_quiz))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .layer(TraceLayer::new_for_http())
}
