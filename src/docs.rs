//! OpenAPI document generated from handler and DTO annotations.

use axum::{routing::get, Json, Router};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{auth, clientes, error::ErrorBody, import, state::AppState, vendas};

#[derive(OpenApi)]
#[openapi(
    info(title = "Toy store API", description = "Customers, sales and statistics for the store back office"),
    paths(
        auth::handlers::login,
        auth::handlers::refresh,
        auth::handlers::get_me,
        clientes::handlers::list_clientes,
        clientes::handlers::get_cliente,
        clientes::handlers::create_cliente,
        clientes::handlers::update_cliente,
        clientes::handlers::delete_cliente,
        import::handlers::import_clientes,
        vendas::handlers::list_vendas,
        vendas::handlers::get_venda,
        vendas::handlers::create_venda,
        vendas::handlers::estatisticas,
        vendas::handlers::por_dia,
    ),
    components(schemas(
        ErrorBody,
        auth::dto::LoginRequest,
        auth::dto::RefreshRequest,
        auth::dto::AuthResponse,
        auth::dto::PublicUser,
        clientes::Cliente,
        clientes::dto::ClienteInput,
        import::dto::ImportSummary,
        import::dto::RowError,
        vendas::Venda,
        vendas::dto::CreateVendaRequest,
        vendas::dto::Estatisticas,
        vendas::dto::DailyTotal,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Operator login and tokens"),
        (name = "clientes", description = "Customer registry and CSV import"),
        (name = "vendas", description = "Sales and statistics")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected operations.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let scheme = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .build();
        components.add_security_scheme("bearer", SecurityScheme::Http(scheme));
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/auth/login",
            "/auth/refresh",
            "/me",
            "/clientes",
            "/clientes/{id}",
            "/clientes/import",
            "/vendas",
            "/vendas/{id}",
            "/vendas/estatisticas",
            "/vendas/por-dia",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert_eq!(
            doc["components"]["securitySchemes"]["bearer"]["scheme"],
            "bearer"
        );
        assert!(doc["components"]["schemas"]["Cliente"].is_object());
    }
}
