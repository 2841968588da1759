use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use anyhow::Context;
use tracing::{info, instrument};

use super::{
    dto::ImportSummary,
    services::{import_rows, parse_rows},
    upload::{is_csv, SpooledUpload},
};
use crate::{
    auth::AuthUser,
    clientes::PgClientes,
    config::IMPORT_MAX_BYTES,
    error::{AppError, ErrorBody},
    state::AppState,
};

/// Room left for multipart boundaries and part headers above the file cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clientes/import", post(import_clientes))
        .layer(DefaultBodyLimit::max(IMPORT_MAX_BYTES + MULTIPART_OVERHEAD))
}

fn too_large() -> AppError {
    AppError::validation(format!(
        "file exceeds the {} MiB limit",
        IMPORT_MAX_BYTES / (1024 * 1024)
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        AppError::validation(format!("invalid multipart body: {}", e.body_text()))
    }
}

/// Reads the `file` part into memory, enforcing the type and size rules.
async fn read_file_part(mp: &mut Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(mut field) = mp.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        if !is_csv(field.content_type(), field.file_name()) {
            return Err(AppError::UnsupportedMedia(format!(
                "expected a CSV file, got {}",
                field.content_type().unwrap_or("unknown content type")
            )));
        }
        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > IMPORT_MAX_BYTES {
                return Err(too_large());
            }
            data.extend_from_slice(&chunk);
        }
        return Ok(data);
    }
    Err(AppError::validation("multipart field `file` is required"))
}

/// Bulk customer registration from a CSV file.
///
/// Rows are validated one by one; rejected rows are reported with their
/// number and do not stop the import.
#[utoipa::path(
    post,
    path = "/clientes/import",
    tag = "clientes",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV in the `file` part"),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Import finished", body = ImportSummary),
        (status = 400, description = "Missing file or file too large", body = ErrorBody),
        (status = 415, description = "File is not CSV", body = ErrorBody)
    )
)]
#[instrument(skip(state, mp))]
pub async fn import_clientes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    let bytes = read_file_part(&mut mp).await?;
    let upload = SpooledUpload::write(&state.config.upload_dir, &bytes)?;
    drop(bytes);

    let reader = upload.reopen()?;
    let rows = tokio::task::spawn_blocking(move || parse_rows(reader))
        .await
        .context("csv parser task")??;

    let today = state.store_now().date();
    let summary = import_rows(&PgClientes::new(state.db.clone()), rows, today).await?;
    info!(%user_id, imported = summary.imported, failed = summary.failed, "clientes imported");
    Ok(Json(summary))
}
