use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a workbook on disk into a [`RawTable`](crate::services::excel::RawTable).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("workbook not found: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable workbook {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("sheet '{sheet}' not found in {} (available: {})", .path.display(), .available.join(", "))]
    SheetMissing {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Schema error: {table} sheet has {found} columns but its layout reads column {}", .required - 1)]
    Schema {
        table: &'static str,
        found: usize,
        required: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Load(LoadError::FileMissing(_)) => StatusCode::NOT_FOUND,
            AppError::Load(LoadError::SheetMissing { .. }) => StatusCode::NOT_FOUND,
            AppError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Schema { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_the_last_column_read() {
        let err = AppError::Schema {
            table: "watchlist",
            found: 12,
            required: 36,
        };
        assert_eq!(
            err.to_string(),
            "Schema error: watchlist sheet has 12 columns but its layout reads column 35"
        );
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_sheet_lists_alternatives() {
        let err: AppError = LoadError::SheetMissing {
            path: PathBuf::from("book.xlsx"),
            sheet: "Schedule".to_string(),
            available: vec!["Sheet1".to_string(), "Sheet2".to_string()],
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("available: Sheet1, Sheet2"));
    }
}
