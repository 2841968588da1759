pub mod dto;
pub mod handlers;
pub mod services;
pub mod upload;

use crate::state::AppState;
use axum::Router;

pub use dto::ImportSummary;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
