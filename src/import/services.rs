use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use time::Date;
use tracing::{debug, info, warn};

use super::dto::{ImportSummary, RowError};
use crate::{
    clientes::{
        dto::ClienteInput, repo::ClienteStore, repo_types::NewCliente, services::ensure_unique,
        validation::validate_cliente,
    },
    error::AppError,
};

/// One data row of the upload. `row` is the record's line in the file minus
/// the header line, so blank lines still advance it.
#[derive(Debug)]
pub struct ParsedRow {
    pub row: usize,
    pub input: Result<ClienteInput, String>,
}

fn normalize_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Splits a CSV document into rows keyed by header name.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<ParsedRow>, AppError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: StringRecord = rdr
        .headers()
        .map_err(|e| AppError::validation(format!("could not read CSV header: {e}")))?
        .iter()
        .map(normalize_header)
        .collect();
    debug!(?headers, "csv header");

    let mut rows = Vec::new();
    let mut previous = 0;
    for record in rdr.records() {
        let position = match &record {
            Ok(r) => r.position(),
            Err(e) => e.position(),
        };
        // Line 1 is the header, so a record starting on line N is row N - 1.
        let row = position
            .map(|p| usize::try_from(p.line()).unwrap_or(usize::MAX).saturating_sub(1))
            .filter(|row| *row > previous)
            .unwrap_or(previous + 1);
        previous = row;

        let input = record
            .map_err(|e| format!("malformed CSV record: {e}"))
            .and_then(|r| {
                r.deserialize::<ClienteInput>(Some(&headers))
                    .map_err(|e| format!("malformed CSV record: {e}"))
            });
        rows.push(ParsedRow { row, input });
    }
    Ok(rows)
}

/// Email/CPF values accepted earlier in the same batch, with their row.
#[derive(Default)]
struct BatchKeys {
    emails: HashMap<String, usize>,
    cpfs: HashMap<String, usize>,
}

impl BatchKeys {
    fn check(&self, data: &NewCliente) -> Result<(), AppError> {
        if let Some(row) = self.emails.get(&data.email) {
            return Err(AppError::conflict(format!("email duplicated in file (row {row})")));
        }
        if let Some(row) = data.cpf.as_ref().and_then(|c| self.cpfs.get(c)) {
            return Err(AppError::conflict(format!("cpf duplicated in file (row {row})")));
        }
        Ok(())
    }

    fn remember(&mut self, data: &NewCliente, row: usize) {
        self.emails.insert(data.email.clone(), row);
        if let Some(cpf) = &data.cpf {
            self.cpfs.insert(cpf.clone(), row);
        }
    }
}

async fn import_one<S>(
    store: &S,
    keys: &mut BatchKeys,
    row: usize,
    input: ClienteInput,
    today: Date,
) -> Result<(), AppError>
where
    S: ClienteStore + ?Sized,
{
    let data = validate_cliente(input, today)?;
    keys.check(&data)?;
    ensure_unique(store, &data, None).await?;
    store.insert(&data).await?;
    keys.remember(&data, row);
    Ok(())
}

/// Validates and stores each row in order. Validation and uniqueness failures
/// are collected per row; any other error aborts the import.
pub async fn import_rows<S>(
    store: &S,
    rows: Vec<ParsedRow>,
    today: Date,
) -> Result<ImportSummary, AppError>
where
    S: ClienteStore + ?Sized,
{
    let mut keys = BatchKeys::default();
    let mut summary = ImportSummary::default();

    for ParsedRow { row, input } in rows {
        let outcome = match input {
            Ok(input) => import_one(store, &mut keys, row, input, today).await,
            Err(reason) => Err(AppError::validation(reason)),
        };
        match outcome {
            Ok(()) => summary.imported += 1,
            Err(e) if e.is_row_recoverable() => {
                warn!(row, reason = %e, "csv row rejected");
                summary.failed += 1;
                summary.errors.push(RowError {
                    row,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        imported = summary.imported,
        failed = summary.failed,
        "csv import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clientes::memory::MemoryClientes;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 15);

    async fn run(csv: &str, store: &MemoryClientes) -> ImportSummary {
        let rows = parse_rows(csv.as_bytes()).unwrap();
        import_rows(store, rows, TODAY).await.unwrap()
    }

    #[tokio::test]
    async fn three_valid_rows_and_one_missing_email() {
        let csv = "\
nome,email,nascimento,telefone,cpf
Ana,ana@loja.com,2015-04-21,,
Bia,,2016-01-02,(11) 1234-5678,
Caio,caio@loja.com,03/02/2014,,529.982.247-25
Duda,duda@loja.com,2012-12-12,,
";
        let store = MemoryClientes::default();
        let summary = run(csv, &store).await;
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].row, 2);
        assert!(summary.errors[0].reason.contains("email"));
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn headers_are_matched_by_name() {
        let csv = "\u{feff}Email , NOME,Nascimento\nzeca@loja.com,Zeca,2010-10-10\n";
        let store = MemoryClientes::default();
        let summary = run(csv, &store).await;
        assert_eq!(summary.imported, 1, "{:?}", summary.errors);
        let stored = store.all();
        assert_eq!(stored[0].nome, "Zeca");
        assert_eq!(stored[0].email, "zeca@loja.com");
        assert_eq!(stored[0].cpf, None);
    }

    #[tokio::test]
    async fn duplicates_within_batch_are_row_failures() {
        let csv = "\
nome,email,nascimento,telefone,cpf
Ana,ana@loja.com,2015-04-21,,52998224725
Ana 2,ANA@loja.com,2015-04-21,,
Outra,outra@loja.com,2015-04-21,,529.982.247-25
";
        let store = MemoryClientes::default();
        let summary = run(csv, &store).await;
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.errors[0].row, 2);
        assert!(summary.errors[0].reason.contains("row 1"));
        assert_eq!(summary.errors[1].row, 3);
        assert!(summary.errors[1].reason.contains("cpf"));
    }

    #[tokio::test]
    async fn duplicates_of_stored_customers_are_row_failures() {
        let store = MemoryClientes::default();
        run("nome,email,nascimento\nAna,ana@loja.com,2015-04-21\n", &store).await;
        let summary = run(
            "nome,email,nascimento\nAna,ana@loja.com,2015-04-21\nBeto,beto@loja.com,2011-11-11\n",
            &store,
        )
        .await;
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].row, 1);
    }

    #[tokio::test]
    async fn invalid_fields_do_not_stop_the_import() {
        let csv = "\
nome,email,nascimento,telefone,cpf
Ana,ana@loja.com,01-02-2015,,
Bia,bia@loja.com,2015-04-21,,11111111111
Caio,caio@loja,2015-04-21,,
Duda,duda@loja.com,2099-01-01,,
Eva,eva@loja.com,2015-04-21
";
        let store = MemoryClientes::default();
        let summary = run(csv, &store).await;
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 4);
        let rows: Vec<usize> = summary.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn blank_lines_keep_row_numbers_aligned_with_the_file() {
        let csv = "\
nome,email,nascimento
Ana,ana@loja.com,2015-04-21

Bia,,2016-01-02
";
        let store = MemoryClientes::default();
        let summary = run(csv, &store).await;
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].row, 3);
    }

    #[tokio::test]
    async fn header_only_file_imports_nothing() {
        let store = MemoryClientes::default();
        let summary = run("nome,email,nascimento,telefone,cpf\n", &store).await;
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn summary_serializes_with_expected_fields() {
        let summary = ImportSummary {
            imported: 3,
            failed: 1,
            errors: vec![RowError { row: 2, reason: "email is required".into() }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["imported"], 3);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["errors"][0]["row"], 2);
    }
}
