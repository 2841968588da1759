use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of one CSV import.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

/// A rejected row. `row` counts data rows from 1, not including the header.
#[derive(Debug, Serialize, ToSchema)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}
