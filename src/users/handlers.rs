use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users::dto::{PublicUser, UserPayload};
use crate::users::service;

/// The public signup form posts here.
pub fn registration_routes() -> Router<AppState> {
    Router::new().route("/cadastro", post(register))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/usuarios", post(register))
        .route("/api/usuarios/:id", put(update))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<ApiResponse<PublicUser>>, ServiceError> {
    let user = service::register(&state.db, payload).await?;
    Ok(Json(ApiResponse::ok(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<ApiResponse<PublicUser>>, ServiceError> {
    let user = service::update_by_id(&state.db, id, payload).await?;
    Ok(Json(ApiResponse::ok(PublicUser::from(user))))
}
