use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{ClienteInput, ListQuery},
    repo::PgClientes,
    repo_types::Cliente,
    services,
};
use crate::{
    auth::AuthUser,
    error::{AppError, ErrorBody},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clientes", get(list_clientes).post(create_cliente))
        .route(
            "/clientes/:id",
            get(get_cliente).put(update_cliente).delete(delete_cliente),
        )
}

fn store(state: &AppState) -> PgClientes {
    PgClientes::new(state.db.clone())
}

/// Active customers, ordered by name.
#[utoipa::path(
    get,
    path = "/clientes",
    tag = "clientes",
    params(ListQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Active customers", body = [Cliente]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn list_clientes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Cliente>>, AppError> {
    let rows = services::list_clientes(&store(&state), q.limit, q.offset, q.busca).await?;
    Ok(Json(rows))
}

/// Any customer by id, including soft-deleted ones.
#[utoipa::path(
    get,
    path = "/clientes/{id}",
    tag = "clientes",
    params(("id" = Uuid, Path, description = "Customer id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Customer", body = Cliente),
        (status = 404, description = "Unknown id", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn get_cliente(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Cliente>, AppError> {
    Ok(Json(services::get_cliente(&store(&state), id).await?))
}

#[utoipa::path(
    post,
    path = "/clientes",
    tag = "clientes",
    request_body = ClienteInput,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Customer created", body = Cliente),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 409, description = "Email or CPF already registered", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload))]
pub async fn create_cliente(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<ClienteInput>,
) -> Result<(StatusCode, HeaderMap, Json<Cliente>), AppError> {
    let today = state.store_now().date();
    let cliente = services::create_cliente(&store(&state), payload, today).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/clientes/{}", cliente.id)) {
        headers.insert(header::LOCATION, location);
    }
    tracing::info!(%user_id, cliente_id = %cliente.id, "cliente registered");
    Ok((StatusCode::CREATED, headers, Json(cliente)))
}

#[utoipa::path(
    put,
    path = "/clientes/{id}",
    tag = "clientes",
    params(("id" = Uuid, Path, description = "Customer id")),
    request_body = ClienteInput,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Customer updated", body = Cliente),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 404, description = "Unknown or deleted customer", body = ErrorBody),
        (status = 409, description = "Email or CPF already registered", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload))]
pub async fn update_cliente(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ClienteInput>,
) -> Result<Json<Cliente>, AppError> {
    let today = state.store_now().date();
    Ok(Json(
        services::update_cliente(&store(&state), id, payload, today).await?,
    ))
}

/// Soft delete: the record stays readable by id with `deletedAt` set.
#[utoipa::path(
    delete,
    path = "/clientes/{id}",
    tag = "clientes",
    params(("id" = Uuid, Path, description = "Customer id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Customer soft-deleted", body = Cliente),
        (status = 404, description = "Unknown or already deleted", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn delete_cliente(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Cliente>, AppError> {
    let now = state.store_now();
    Ok(Json(services::delete_cliente(&store(&state), id, now).await?))
}
