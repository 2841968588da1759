use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

use super::{cpf::Cpf, dto::ClienteInput, repo_types::NewCliente};
use crate::{auth::services::is_valid_email, error::AppError};

const MAX_NOME: usize = 120;
const MAX_EMAIL: usize = 254;
const MAX_TELEFONE: usize = 30;

/// Trims a field and treats blank strings as absent.
fn present(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses a birth date in one of the two unambiguous layouts.
pub fn parse_nascimento(raw: &str) -> Result<Date, AppError> {
    lazy_static! {
        static ref ISO_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("iso regex");
        static ref BR_RE: Regex = Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("br regex");
    }
    let raw = raw.trim();
    let parsed = if ISO_RE.is_match(raw) {
        Date::parse(raw, format_description!("[year]-[month]-[day]"))
    } else if BR_RE.is_match(raw) {
        Date::parse(raw, format_description!("[day]/[month]/[year]"))
    } else {
        return Err(AppError::validation(
            "nascimento must be YYYY-MM-DD or DD/MM/YYYY",
        ));
    };
    parsed.map_err(|_| AppError::validation(format!("nascimento {raw:?} is not a valid date")))
}

/// Applies every field rule for customer creation and update.
pub fn validate_cliente(input: ClienteInput, today: Date) -> Result<NewCliente, AppError> {
    let nome = present(input.nome).ok_or_else(|| AppError::validation("nome is required"))?;
    if nome.chars().count() > MAX_NOME {
        return Err(AppError::validation(format!(
            "nome must be at most {MAX_NOME} characters"
        )));
    }

    let email = present(input.email)
        .map(|e| e.to_lowercase())
        .ok_or_else(|| AppError::validation("email is required"))?;
    if email.len() > MAX_EMAIL || !is_valid_email(&email) {
        return Err(AppError::validation(format!("invalid email {email:?}")));
    }

    let nascimento = present(input.nascimento)
        .ok_or_else(|| AppError::validation("nascimento is required"))
        .and_then(|raw| parse_nascimento(&raw))?;
    if nascimento > today {
        return Err(AppError::validation("nascimento cannot be in the future"));
    }

    let telefone = present(input.telefone);
    if telefone.as_ref().is_some_and(|t| t.chars().count() > MAX_TELEFONE) {
        return Err(AppError::validation(format!(
            "telefone must be at most {MAX_TELEFONE} characters"
        )));
    }

    let cpf = present(input.cpf)
        .map(|raw| Cpf::parse(&raw).map_err(|e| AppError::validation(format!("invalid cpf: {e}"))))
        .transpose()?
        .map(Cpf::into_inner);

    Ok(NewCliente {
        nome,
        email,
        nascimento,
        telefone,
        cpf,
    })
}
