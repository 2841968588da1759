use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo::ClienteStore,
    repo_types::{Cliente, ListFilter, NewCliente},
};
use crate::error::AppError;

/// In-memory customer table that enforces the same unique keys as Postgres.
#[derive(Default)]
pub struct MemoryClientes {
    rows: Mutex<Vec<Cliente>>,
}

impl MemoryClientes {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Cliente> {
        self.rows.lock().unwrap().clone()
    }

    fn check_keys(rows: &[Cliente], data: &NewCliente, except: Option<Uuid>) -> Result<(), AppError> {
        for r in rows.iter().filter(|r| Some(r.id) != except) {
            if r.email == data.email {
                return Err(AppError::conflict("email already registered"));
            }
            if data.cpf.is_some() && r.cpf == data.cpf {
                return Err(AppError::conflict("cpf already registered"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ClienteStore for MemoryClientes {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cliente>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn list_active(&self, filter: &ListFilter) -> Result<Vec<Cliente>, AppError> {
        let needle = filter.busca.as_ref().map(|b| b.to_lowercase());
        let mut rows: Vec<Cliente> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active())
            .filter(|c| match &needle {
                Some(n) => c.nome.to_lowercase().contains(n) || c.email.contains(n),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(rows
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.email == email && Some(c.id) != except))
    }

    async fn cpf_taken(&self, cpf: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.cpf.as_deref() == Some(cpf) && Some(c.id) != except))
    }

    async fn insert(&self, data: &NewCliente) -> Result<Cliente, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Self::check_keys(&rows, data, None)?;
        let now = OffsetDateTime::now_utc();
        let cliente = Cliente {
            id: Uuid::new_v4(),
            nome: data.nome.clone(),
            email: data.email.clone(),
            nascimento: data.nascimento,
            telefone: data.telefone.clone(),
            cpf: data.cpf.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.push(cliente.clone());
        Ok(cliente)
    }

    async fn update(&self, id: Uuid, data: &NewCliente) -> Result<Option<Cliente>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Self::check_keys(&rows, data, Some(id))?;
        let Some(row) = rows.iter_mut().find(|c| c.id == id && c.is_active()) else {
            return Ok(None);
        };
        row.nome = data.nome.clone();
        row.email = data.email.clone();
        row.nascimento = data.nascimento;
        row.telefone = data.telefone.clone();
        row.cpf = data.cpf.clone();
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, id: Uuid, at: OffsetDateTime) -> Result<Option<Cliente>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|c| c.id == id && c.is_active()) else {
            return Ok(None);
        };
        row.deleted_at = Some(at);
        row.updated_at = at;
        Ok(Some(row.clone()))
    }
}
