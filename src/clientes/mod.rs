pub mod cpf;
pub mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

use crate::state::AppState;
use axum::Router;

pub use repo::{ClienteStore, PgClientes};
pub use repo_types::Cliente;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
