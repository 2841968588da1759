use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use utoipa::ToSchema;
use uuid::Uuid;

/// A recorded sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Venda {
    pub id: Uuid,
    #[schema(value_type = String, example = "149.90")]
    pub valor: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub data: OffsetDateTime,
    pub cliente_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewVenda {
    pub cliente_id: Uuid,
    pub valor: Decimal,
    pub data: OffsetDateTime,
}

/// Sum and count of sales for one store calendar day.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DailyRow {
    pub dia: Date,
    pub total: Decimal,
    pub count: i64,
}
