mod dto;
pub mod error;
pub mod handlers;
pub mod score;
pub mod service;
pub mod store;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
