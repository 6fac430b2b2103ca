pub mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn write_router(upload_max_bytes: usize) -> Router<AppState> {
    handlers::write_routes(upload_max_bytes)
}
