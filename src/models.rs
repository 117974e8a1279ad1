use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use crate::services::excel::utils::format_display_date;
use crate::services::timing::TimingLedger;

/// One member on the watchlist, serialized with its display labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistRow {
    #[serde(rename = "#")]
    pub index: usize,
    #[serde(rename = "Member Name")]
    pub member_name: String,
    #[serde(rename = "Final Rating")]
    pub final_rating: f64,
    #[serde(rename = "Last CCR", serialize_with = "display_date")]
    pub last_ccr: Option<NaiveDate>,
    #[serde(rename = "Last QRR", serialize_with = "display_date")]
    pub last_qrr: Option<NaiveDate>,
    #[serde(rename = "Comments")]
    pub comments: String,
}

/// One borrowing member. Missing capacities serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowerRow {
    #[serde(rename = "#")]
    pub index: usize,
    #[serde(rename = "Member Name")]
    pub member_name: String,
    #[serde(rename = "Exposure")]
    pub exposure: f64,
    #[serde(rename = "Borrowing Capacity")]
    pub borrowing_capacity: Option<f64>,
    #[serde(rename = "Remaining Capacity (Repo)")]
    pub remaining_capacity_repo: Option<f64>,
    #[serde(rename = "Remaining Capacity (Non-Repo)")]
    pub remaining_capacity_non_repo: Option<f64>,
}

fn display_date<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_display_date(*date))
}

/// Result of refreshing a single table. A failed table carries the error
/// text so the other table can still be shown.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome<R> {
    Ready { count: usize, rows: Vec<R> },
    Failed { error: String },
}

impl<R> TableOutcome<R> {
    pub fn ready(rows: Vec<R>) -> Self {
        TableOutcome::Ready {
            count: rows.len(),
            rows,
        }
    }

    pub fn rows(&self) -> Option<&[R]> {
        match self {
            TableOutcome::Ready { rows, .. } => Some(rows),
            TableOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TableOutcome::Ready { .. } => None,
            TableOutcome::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub generated_at: DateTime<Utc>,
    pub watchlist: TableOutcome<WatchlistRow>,
    pub top_borrowers: TableOutcome<BorrowerRow>,
    pub timings: TimingLedger,
    pub refresh_seconds: f64,
}
