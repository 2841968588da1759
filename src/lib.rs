pub mod app;
pub mod auth;
pub mod clientes;
pub mod config;
pub mod docs;
pub mod error;
pub mod extract;
pub mod import;
pub mod state;
pub mod vendas;
