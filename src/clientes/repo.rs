use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Cliente, ListFilter, NewCliente};
use crate::error::AppError;

const COLUMNS: &str =
    "id, nome, email, nascimento, telefone, cpf, created_at, updated_at, deleted_at";

/// Persistence seam for customers; the importer and services only talk to this.
#[async_trait]
pub trait ClienteStore: Send + Sync {
    /// Any customer by id, soft-deleted ones included.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cliente>, AppError>;
    async fn list_active(&self, filter: &ListFilter) -> Result<Vec<Cliente>, AppError>;
    /// Uniqueness is global: soft-deleted rows still hold their email.
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError>;
    async fn cpf_taken(&self, cpf: &str, except: Option<Uuid>) -> Result<bool, AppError>;
    async fn insert(&self, data: &NewCliente) -> Result<Cliente, AppError>;
    /// Updates an active customer; `None` when missing or deleted.
    async fn update(&self, id: Uuid, data: &NewCliente) -> Result<Option<Cliente>, AppError>;
    /// Marks an active customer deleted; `None` when missing or already deleted.
    async fn soft_delete(&self, id: Uuid, at: OffsetDateTime) -> Result<Option<Cliente>, AppError>;
}

#[derive(Clone)]
pub struct PgClientes {
    db: PgPool,
}

impl PgClientes {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClienteStore for PgClientes {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cliente>, AppError> {
        let row = sqlx::query_as::<_, Cliente>(&format!(
            "SELECT {COLUMNS} FROM clientes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_active(&self, filter: &ListFilter) -> Result<Vec<Cliente>, AppError> {
        let pattern = filter
            .busca
            .as_deref()
            .map(|b| format!("%{}%", b.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")));
        let rows = sqlx::query_as::<_, Cliente>(&format!(
            r#"
            SELECT {COLUMNS}
              FROM clientes
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR nome ILIKE $1 OR email ILIKE $1)
             ORDER BY nome ASC, id ASC
             LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM clientes
                 WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn cpf_taken(&self, cpf: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM clientes
                 WHERE cpf = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(cpf)
        .bind(except)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn insert(&self, data: &NewCliente) -> Result<Cliente, AppError> {
        let row = sqlx::query_as::<_, Cliente>(&format!(
            r#"
            INSERT INTO clientes (nome, email, nascimento, telefone, cpf)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&data.nome)
        .bind(&data.email)
        .bind(data.nascimento)
        .bind(&data.telefone)
        .bind(&data.cpf)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, data: &NewCliente) -> Result<Option<Cliente>, AppError> {
        let row = sqlx::query_as::<_, Cliente>(&format!(
            r#"
            UPDATE clientes
               SET nome = $2, email = $3, nascimento = $4, telefone = $5, cpf = $6,
                   updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&data.nome)
        .bind(&data.email)
        .bind(data.nascimento)
        .bind(&data.telefone)
        .bind(&data.cpf)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn soft_delete(&self, id: Uuid, at: OffsetDateTime) -> Result<Option<Cliente>, AppError> {
        let row = sqlx::query_as::<_, Cliente>(&format!(
            r#"
            UPDATE clientes
               SET deleted_at = $2, updated_at = $2
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
