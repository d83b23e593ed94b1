use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, state::AppState};

use super::dto::GameInput;
use super::error::GameError;
use super::store::GameRecord;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/:id", put(update_game).delete(delete_game))
}

#[instrument(skip(state))]
pub async fn list_games(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<GameRecord>>, GameError> {
    let games = state.games.list(user_id).await?;
    Ok(Json(games))
}

#[instrument(skip(state, body))]
pub async fn create_game(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GameInput>,
) -> Result<(StatusCode, HeaderMap, Json<GameRecord>), GameError> {
    let record = state.games.create(user_id, body).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/games/{}", record.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((StatusCode::CREATED, headers, Json(record)))
}

#[instrument(skip(state, body))]
pub async fn update_game(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<GameInput>,
) -> Result<Json<GameRecord>, GameError> {
    let record = state.games.update(user_id, id, body).await?;
    Ok(Json(record))
}

#[instrument(skip(state))]
pub async fn delete_game(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, GameError> {
    state.games.delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
