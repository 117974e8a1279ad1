use chrono::Utc;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{BorrowerRow, RiskReport, TableOutcome, WatchlistRow};
use crate::services::excel::load_table;
use crate::services::indebtedness::{self, IndebtednessRanker};
use crate::services::timing::{timed, TimingLedger};
use crate::services::watchlist::{self, WatchlistBuilder};

/// Runs load → transform for both tables. A failure in one table is
/// reported in its outcome and does not stop the other.
pub fn build_report(config: &Config) -> RiskReport {
    tracing::info!("Building risk report");
    let mut timings = TimingLedger::default();

    let watchlist = outcome(watchlist::TABLE_NAME, run_watchlist(config, &mut timings));
    let top_borrowers = outcome(
        indebtedness::TABLE_NAME,
        run_indebtedness(config, &mut timings),
    );

    let refresh_seconds = timings.total().as_secs_f64();
    tracing::info!("Risk report built in {:.4} seconds", refresh_seconds);

    RiskReport {
        generated_at: Utc::now(),
        watchlist,
        top_borrowers,
        timings,
        refresh_seconds,
    }
}

fn run_watchlist(
    config: &Config,
    timings: &mut TimingLedger,
) -> Result<Vec<WatchlistRow>, AppError> {
    let source = &config.watchlist;
    let builder = WatchlistBuilder::new(config.watchlist_layout, &config.watchlist_rules)?;

    let table = timings.record(timed("read_watchlist", config.thresholds.load, || {
        load_table(&source.path, &source.sheet, source.skip_rows)
    }))?;
    timings.record(timed("watch_list", config.thresholds.transform, || {
        builder.build(&table)
    }))
}

fn run_indebtedness(
    config: &Config,
    timings: &mut TimingLedger,
) -> Result<Vec<BorrowerRow>, AppError> {
    let source = &config.indebtedness;
    let ranker = IndebtednessRanker::new(config.indebtedness_layout);

    let table = timings.record(timed("read_indebtedness", config.thresholds.load, || {
        load_table(&source.path, &source.sheet, source.skip_rows)
    }))?;
    timings.record(timed(
        "outstanding_indebtedness",
        config.thresholds.transform,
        || ranker.rank(&table),
    ))
}

fn outcome<R>(table: &'static str, result: Result<Vec<R>, AppError>) -> TableOutcome<R> {
    match result {
        Ok(rows) => {
            tracing::info!(table, rows = rows.len(), "table ready");
            TableOutcome::ready(rows)
        }
        Err(e) => {
            tracing::error!(table, "table failed: {}", e);
            TableOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
