use crate::{
    dto::import_dto::ImportQuestionsPayload,
    error::Result,
    middleware::auth::{require_role, Claims},
    services::import_service::ImportService,
    AppState,
};
use axum::{extract::State, response::IntoResponse, Extension, Json};
use validator::Validate;

#[axum::debug_handler]
pub async fn import_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ImportQuestionsPayload>,
) -> Result<impl IntoResponse> {
    require_role(&claims, state.import_allowed_roles.as_slice())?;
    payload.validate()?;

    let format = payload.resolved_format();
    tracing::info!(user = %claims.sub, %format, bytes = payload.content.len(), "Question import requested");

    let report = state
        .import_service
        .import(format, &payload.content, &payload.options())
        .await;
    Ok(Json(report))
}

#[axum::debug_handler]
pub async fn validate_import(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ImportQuestionsPayload>,
) -> Result<impl IntoResponse> {
    require_role(&claims, state.import_allowed_roles.as_slice())?;
    payload.validate()?;

    let summary = ImportService::validate_only(payload.resolved_format(), &payload.content);
    Ok(Json(summary))
}
