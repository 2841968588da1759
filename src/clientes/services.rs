use time::{Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::ClienteInput,
    repo::ClienteStore,
    repo_types::{Cliente, Lifecycle, ListFilter, NewCliente},
    validation::validate_cliente,
};
use crate::error::AppError;

const MAX_LIMIT: i64 = 100;

/// Rejects email/CPF values already held by another customer.
pub async fn ensure_unique<S>(
    store: &S,
    data: &NewCliente,
    except: Option<Uuid>,
) -> Result<(), AppError>
where
    S: ClienteStore + ?Sized,
{
    if store.email_taken(&data.email, except).await? {
        warn!(email = %data.email, "duplicate email");
        return Err(AppError::conflict("email already registered"));
    }
    if let Some(cpf) = &data.cpf {
        if store.cpf_taken(cpf, except).await? {
            warn!("duplicate cpf");
            return Err(AppError::conflict("cpf already registered"));
        }
    }
    Ok(())
}

pub async fn create_cliente<S>(store: &S, input: ClienteInput, today: Date) -> Result<Cliente, AppError>
where
    S: ClienteStore + ?Sized,
{
    let data = validate_cliente(input, today)?;
    ensure_unique(store, &data, None).await?;
    let cliente = store.insert(&data).await?;
    info!(cliente_id = %cliente.id, "cliente created");
    Ok(cliente)
}

pub async fn update_cliente<S>(
    store: &S,
    id: Uuid,
    input: ClienteInput,
    today: Date,
) -> Result<Cliente, AppError>
where
    S: ClienteStore + ?Sized,
{
    match store.find_by_id(id).await?.map(|c| c.lifecycle()) {
        Some(Lifecycle::Active) => {}
        Some(Lifecycle::Deleted { at }) => {
            warn!(cliente_id = %id, deleted_at = %at, "update of deleted cliente");
            return Err(AppError::not_found("cliente not found"));
        }
        None => return Err(AppError::not_found("cliente not found")),
    }
    let data = validate_cliente(input, today)?;
    ensure_unique(store, &data, Some(id)).await?;
    let cliente = store
        .update(id, &data)
        .await?
        .ok_or_else(|| AppError::not_found("cliente not found"))?;
    info!(cliente_id = %id, "cliente updated");
    Ok(cliente)
}

pub async fn delete_cliente<S>(store: &S, id: Uuid, now: OffsetDateTime) -> Result<Cliente, AppError>
where
    S: ClienteStore + ?Sized,
{
    let cliente = store
        .soft_delete(id, now)
        .await?
        .ok_or_else(|| AppError::not_found("cliente not found"))?;
    info!(cliente_id = %id, "cliente soft-deleted");
    Ok(cliente)
}

pub async fn get_cliente<S>(store: &S, id: Uuid) -> Result<Cliente, AppError>
where
    S: ClienteStore + ?Sized,
{
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("cliente not found"))
}

pub async fn list_clientes<S>(
    store: &S,
    limit: i64,
    offset: i64,
    busca: Option<String>,
) -> Result<Vec<Cliente>, AppError>
where
    S: ClienteStore + ?Sized,
{
    let filter = ListFilter {
        limit: limit.clamp(1, MAX_LIMIT),
        offset: offset.max(0),
        busca: busca.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
    };
    store.list_active(&filter).await
}
