use rust_decimal::Decimal;
use sqlx::PgPool;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use super::repo_types::{DailyRow, NewVenda, Venda};

pub async fn insert(db: &PgPool, v: &NewVenda) -> sqlx::Result<Venda> {
    sqlx::query_as::<_, Venda>(
        r#"
        INSERT INTO vendas (valor, data, cliente_id)
        VALUES ($1, $2, $3)
        RETURNING id, valor, data, cliente_id, created_at
        "#,
    )
    .bind(v.valor)
    .bind(v.data)
    .bind(v.cliente_id)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Venda>> {
    sqlx::query_as::<_, Venda>(
        r#"SELECT id, valor, data, cliente_id, created_at FROM vendas WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list(
    db: &PgPool,
    cliente_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Venda>> {
    sqlx::query_as::<_, Venda>(
        r#"
        SELECT id, valor, data, cliente_id, created_at
          FROM vendas
         WHERE ($1::uuid IS NULL OR cliente_id = $1)
         ORDER BY data DESC, id
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(cliente_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

/// Total and count of sales with `start <= data < end`.
pub async fn totals_between(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> sqlx::Result<(Decimal, i64)> {
    sqlx::query_as::<_, (Decimal, i64)>(
        r#"
        SELECT COALESCE(SUM(valor), 0), COUNT(*)
          FROM vendas
         WHERE data >= $1 AND data < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await
}

/// Per-day totals in `[start, end)`, days taken in the given offset. Days
/// without sales are absent from the result.
pub async fn daily_totals(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
    offset: UtcOffset,
) -> sqlx::Result<Vec<DailyRow>> {
    sqlx::query_as::<_, DailyRow>(
        r#"
        SELECT ((data AT TIME ZONE 'UTC') + make_interval(secs => $3))::date AS dia,
               COALESCE(SUM(valor), 0) AS total,
               COUNT(*) AS count
          FROM vendas
         WHERE data >= $1 AND data < $2
         GROUP BY dia
         ORDER BY dia
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(f64::from(offset.whole_seconds()))
    .fetch_all(db)
    .await
}
