use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use utoipa::ToSchema;
use uuid::Uuid;

/// Customer record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub nascimento: Date,
    pub telefone: Option<String>,
    pub cpf: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Set when the customer was soft-deleted.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

/// Lifecycle state derived from `deleted_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Deleted { at: OffsetDateTime },
}

impl Cliente {
    pub fn lifecycle(&self) -> Lifecycle {
        match self.deleted_at {
            None => Lifecycle::Active,
            Some(at) => Lifecycle::Deleted { at },
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }
}

/// Validated customer fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCliente {
    pub nome: String,
    pub email: String,
    pub nascimento: Date,
    pub telefone: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub limit: i64,
    pub offset: i64,
    /// Case-insensitive match on name or email.
    pub busca: Option<String>,
}
