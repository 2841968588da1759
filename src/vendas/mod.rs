pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod stats;

use crate::state::AppState;
use axum::Router;

pub use repo_types::Venda;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
