use rust_decimal::Decimal;
use sqlx::PgPool;
use time::{Date, OffsetDateTime, UtcOffset};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateVendaRequest, DailyTotal, Estatisticas, PeriodoQuery, PorDiaQuery},
    repo,
    repo_types::{NewVenda, Venda},
    stats::{self, round_money, Period},
};
use crate::{
    clientes::{repo_types::Lifecycle, ClienteStore},
    error::AppError,
};

/// NUMERIC(12, 2) upper bound.
fn max_valor() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

pub fn validate_valor(valor: Decimal) -> Result<Decimal, AppError> {
    let valor = round_money(valor);
    if valor <= Decimal::ZERO {
        return Err(AppError::validation("valor must be greater than zero"));
    }
    if valor > max_valor() {
        return Err(AppError::validation(format!("valor must be at most {}", max_valor())));
    }
    Ok(valor)
}

/// Validates a sale and resolves it against an active customer.
pub async fn prepare_venda<S>(
    clientes: &S,
    req: CreateVendaRequest,
    now: OffsetDateTime,
) -> Result<NewVenda, AppError>
where
    S: ClienteStore + ?Sized,
{
    let valor = validate_valor(req.valor)?;
    match clientes.find_by_id(req.cliente_id).await?.map(|c| c.lifecycle()) {
        Some(Lifecycle::Active) => {}
        Some(Lifecycle::Deleted { at }) => {
            warn!(cliente_id = %req.cliente_id, deleted_at = %at, "venda for deleted cliente");
            return Err(AppError::not_found("cliente not found"));
        }
        None => return Err(AppError::not_found("cliente not found")),
    }
    Ok(NewVenda {
        cliente_id: req.cliente_id,
        valor,
        data: req.data.unwrap_or(now),
    })
}

pub async fn create_venda<S>(
    db: &PgPool,
    clientes: &S,
    req: CreateVendaRequest,
    now: OffsetDateTime,
) -> Result<Venda, AppError>
where
    S: ClienteStore + ?Sized,
{
    let new = prepare_venda(clientes, req, now).await?;
    let venda = repo::insert(db, &new).await?;
    info!(venda_id = %venda.id, cliente_id = %venda.cliente_id, valor = %venda.valor, "venda recorded");
    Ok(venda)
}

pub async fn get_venda(db: &PgPool, id: Uuid) -> Result<Venda, AppError> {
    repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("venda not found"))
}

pub async fn list_vendas(
    db: &PgPool,
    cliente_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Venda>, AppError> {
    Ok(repo::list(db, cliente_id, limit.clamp(1, 100), offset.max(0)).await?)
}

pub async fn estatisticas(
    db: &PgPool,
    q: &PeriodoQuery,
    today: Date,
    offset: UtcOffset,
) -> Result<Estatisticas, AppError> {
    let period = Period::resolve(q.inicio.as_deref(), q.fim.as_deref(), today)?;
    let (start, end) = period.bounds(offset)?;
    let (total, count) = repo::totals_between(db, start, end).await?;
    debug!(%start, %end, count, "estatisticas computed");
    Ok(stats::summarize(period, total, count))
}

/// Resolves the window of the per-day report: an explicit range wins over `dias`.
pub fn por_dia_period(q: &PorDiaQuery, today: Date) -> Result<Period, AppError> {
    let has_range = [&q.inicio, &q.fim]
        .iter()
        .any(|b| b.as_deref().is_some_and(|s| !s.trim().is_empty()));
    if has_range {
        Period::resolve(q.inicio.as_deref(), q.fim.as_deref(), today)
    } else {
        Period::trailing(q.dias.unwrap_or(stats::DEFAULT_DAYS), today)
    }
}

pub async fn por_dia(
    db: &PgPool,
    q: &PorDiaQuery,
    today: Date,
    offset: UtcOffset,
) -> Result<Vec<DailyTotal>, AppError> {
    let period = por_dia_period(q, today)?;
    let (start, end) = period.bounds(offset)?;
    let rows = repo::daily_totals(db, start, end, offset).await?;
    Ok(stats::fill_days(period, &rows))
}
