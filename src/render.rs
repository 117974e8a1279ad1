//! Console rendering of a [`RiskReport`] through polars data frames.

use anyhow::Result;
use polars::prelude::*;
use std::fmt::Write;

use crate::models::{BorrowerRow, RiskReport, TableOutcome, WatchlistRow};
use crate::services::excel::utils::format_display_date;

/// Lifts polars' default row, column and string truncation so whole tables print.
pub fn configure_console() {
    std::env::set_var("POLARS_FMT_MAX_ROWS", "-1");
    std::env::set_var("POLARS_FMT_MAX_COLS", "-1");
    std::env::set_var("POLARS_FMT_STR_LEN", "120");
    std::env::set_var("POLARS_FMT_TABLE_HIDE_COLUMN_DATA_TYPES", "1");
}

pub fn watchlist_frame(rows: &[WatchlistRow]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("#", rows.iter().map(|r| r.index as u32).collect::<Vec<_>>()),
        Series::new(
            "Member Name",
            rows.iter().map(|r| r.member_name.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            "Final Rating",
            rows.iter().map(|r| r.final_rating).collect::<Vec<_>>(),
        ),
        Series::new(
            "Last CCR",
            rows.iter()
                .map(|r| format_display_date(r.last_ccr))
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "Last QRR",
            rows.iter()
                .map(|r| format_display_date(r.last_qrr))
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "Comments",
            rows.iter().map(|r| r.comments.as_str()).collect::<Vec<_>>(),
        ),
    ])
}

pub fn borrowers_frame(rows: &[BorrowerRow]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("#", rows.iter().map(|r| r.index as u32).collect::<Vec<_>>()),
        Series::new(
            "Member Name",
            rows.iter().map(|r| r.member_name.as_str()).collect::<Vec<_>>(),
        ),
        Series::new("Exposure", rows.iter().map(|r| r.exposure).collect::<Vec<_>>()),
        Series::new(
            "Borrowing Capacity",
            rows.iter().map(|r| r.borrowing_capacity).collect::<Vec<_>>(),
        ),
        Series::new(
            "Remaining Capacity (Repo)",
            rows.iter()
                .map(|r| r.remaining_capacity_repo)
                .collect::<Vec<_>>(),
        ),
        Series::new(
            "Remaining Capacity (Non-Repo)",
            rows.iter()
                .map(|r| r.remaining_capacity_non_repo)
                .collect::<Vec<_>>(),
        ),
    ])
}

/// Both tables, their member counts, any slow steps and the refresh time.
pub fn render_report(report: &RiskReport) -> Result<String> {
    let mut out = String::new();

    render_table(
        &mut out,
        "Watchlist",
        &report.watchlist,
        watchlist_frame,
        "Watchlist members",
    )?;
    render_table(
        &mut out,
        "Top Borrowers",
        &report.top_borrowers,
        borrowers_frame,
        "Total members who borrow",
    )?;

    for step in report.timings.warnings() {
        writeln!(out, "warning: {} took {:.4} seconds", step.step, step.seconds)?;
    }
    writeln!(
        out,
        "Total execution time: {:.4} seconds",
        report.refresh_seconds
    )?;
    Ok(out)
}

fn render_table<R, F>(
    out: &mut String,
    title: &str,
    outcome: &TableOutcome<R>,
    frame: F,
    count_label: &str,
) -> Result<()>
where
    F: Fn(&[R]) -> PolarsResult<DataFrame>,
{
    writeln!(out, "== {} ==", title)?;
    match outcome {
        TableOutcome::Ready { count, rows } => {
            let df = frame(rows)?;
            writeln!(out, "{}", df)?;
            writeln!(out, "{}: {}", count_label, count)?;
        }
        TableOutcome::Failed { error } => {
            writeln!(out, "{} unavailable: {}", title, error)?;
        }
    }
    writeln!(out)?;
    Ok(())
}
