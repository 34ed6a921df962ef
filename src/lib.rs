pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    import_service::ImportService, question_service::QuestionService, quiz_service::QuizService,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub import_service: ImportService,
    pub import_allowed_roles: Vec<String>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let question_service = QuestionService::new(pool.clone());
        let quiz_service = QuizService::new(pool.clone());
        let import_service =
            ImportService::new(Arc::new(question_service), Arc::new(quiz_service))
                .with_concurrency(config.import_concurrency);

        Self {
            pool,
            import_service,
            import_allowed_roles: config.import_allowed_roles.clone(),
        }
    }
}

/// The full HTTP surface: `/health` plus the bearer-protected import routes,
/// with request bodies capped at `MAX_IMPORT_BYTES`.
pub fn app(state: AppState) -> Router {
    let config = crate::config::get_config();

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let import_api = Router::new()
        .route(
            "/api/questions/import",
            post(routes::questions::import_questions),
        )
        .route(
            "/api/questions/import/validate",
            post(routes::questions::validate_import),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    base_routes
        .merge(import_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_import_bytes))
}
