use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateVendaRequest, DailyTotal, Estatisticas, ListVendasQuery, PeriodoQuery, PorDiaQuery},
    repo_types::Venda,
    services,
};
use crate::{
    auth::AuthUser,
    clientes::PgClientes,
    error::{AppError, ErrorBody},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vendas", get(list_vendas).post(create_venda))
        .route("/vendas/estatisticas", get(estatisticas))
        .route("/vendas/por-dia", get(por_dia))
        .route("/vendas/:id", get(get_venda))
}

#[utoipa::path(
    get,
    path = "/vendas",
    tag = "vendas",
    params(ListVendasQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Sales, newest first", body = [Venda]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn list_vendas(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiQuery(q): ApiQuery<ListVendasQuery>,
) -> Result<Json<Vec<Venda>>, AppError> {
    Ok(Json(
        services::list_vendas(&state.db, q.cliente_id, q.limit, q.offset).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/vendas/{id}",
    tag = "vendas",
    params(("id" = Uuid, Path, description = "Sale id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Sale", body = Venda),
        (status = 404, description = "Unknown id", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn get_venda(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Venda>, AppError> {
    Ok(Json(services::get_venda(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/vendas",
    tag = "vendas",
    request_body = CreateVendaRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Sale recorded", body = Venda),
        (status = 400, description = "Invalid valor", body = ErrorBody),
        (status = 404, description = "Unknown or deleted customer", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload))]
pub async fn create_venda(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateVendaRequest>,
) -> Result<(StatusCode, Json<Venda>), AppError> {
    let clientes = PgClientes::new(state.db.clone());
    let venda = services::create_venda(&state.db, &clientes, payload, state.store_now()).await?;
    Ok((StatusCode::CREATED, Json(venda)))
}

/// Revenue, sale count and average ticket for a period (default: today).
#[utoipa::path(
    get,
    path = "/vendas/estatisticas",
    tag = "vendas",
    params(PeriodoQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Aggregates", body = Estatisticas),
        (status = 400, description = "Invalid period", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn estatisticas(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiQuery(q): ApiQuery<PeriodoQuery>,
) -> Result<Json<Estatisticas>, AppError> {
    let today = state.store_now().date();
    Ok(Json(
        services::estatisticas(&state.db, &q, today, state.config.store_offset).await?,
    ))
}

/// One zero-filled entry per day of the window (default: last 30 days).
#[utoipa::path(
    get,
    path = "/vendas/por-dia",
    tag = "vendas",
    params(PorDiaQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Per-day totals", body = [DailyTotal]),
        (status = 400, description = "Invalid window", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn por_dia(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiQuery(q): ApiQuery<PorDiaQuery>,
) -> Result<Json<Vec<DailyTotal>>, AppError> {
    let today = state.store_now().date();
    Ok(Json(
        services::por_dia(&state.db, &q, today, state.config.store_offset).await?,
    ))
}
