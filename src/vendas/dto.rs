use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendaRequest {
    pub cliente_id: Uuid,
    /// Must be greater than zero; stored with two decimal places.
    #[schema(value_type = String, example = "149.90")]
    pub valor: Decimal,
    /// Defaults to the current instant.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub data: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListVendasQuery {
    pub cliente_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Optional `YYYY-MM-DD` bounds; both default to today.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodoQuery {
    pub inicio: Option<String>,
    pub fim: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PorDiaQuery {
    /// Trailing window ending today, used when no explicit range is given.
    pub dias: Option<i64>,
    pub inicio: Option<String>,
    pub fim: Option<String>,
}

/// Aggregates over a period of store calendar days.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Estatisticas {
    pub inicio: Date,
    pub fim: Date,
    #[schema(value_type = String, example = "1234.50")]
    pub total_dia: Decimal,
    pub count: i64,
    #[schema(value_type = String, example = "61.73")]
    pub ticket_medio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyTotal {
    pub data: Date,
    #[schema(value_type = String, example = "250.00")]
    pub total: Decimal,
    pub count: i64,
}
