use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_WARN_SECS: f64 = 1.0;

/// Where one input table lives: workbook, worksheet and the number of
/// leading rows above the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub sheet: String,
    pub skip_rows: usize,
}

/// 0-based worksheet positions read by the watchlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchlistLayout {
    pub member_name: usize,
    pub final_rating: usize,
    pub last_ccr: usize,
    pub last_qrr: usize,
    pub comments: usize,
    /// Column whose text is matched against the exclusion term.
    pub exclusion_column: usize,
}

impl WatchlistLayout {
    pub fn from_positions(positions: &[usize], exclusion_column: Option<usize>) -> Result<Self> {
        match *positions {
            [member_name, final_rating, last_ccr, last_qrr, comments] => Ok(Self {
                member_name,
                final_rating,
                last_ccr,
                last_qrr,
                comments,
                exclusion_column: exclusion_column.unwrap_or(member_name),
            }),
            _ => Err(anyhow!(
                "watchlist layout needs 5 positions, got {}",
                positions.len()
            )),
        }
    }

    /// Minimum sheet width needed to read every mapped column.
    pub fn required_width(&self) -> usize {
        [
            self.member_name,
            self.final_rating,
            self.last_ccr,
            self.last_qrr,
            self.comments,
            self.exclusion_column,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

impl Default for WatchlistLayout {
    fn default() -> Self {
        Self {
            member_name: 3,
            final_rating: 26,
            last_ccr: 32,
            last_qrr: 34,
            comments: 35,
            exclusion_column: 3,
        }
    }
}

/// 0-based worksheet positions read by the top borrowers ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndebtednessLayout {
    pub member_name: usize,
    pub total_assets: usize,
    pub exposure: usize,
    pub borrowing_capacity: usize,
    pub remaining_capacity_repo: usize,
    pub remaining_capacity_non_repo: usize,
}

impl IndebtednessLayout {
    pub fn from_positions(positions: &[usize]) -> Result<Self> {
        match *positions {
            [member_name, total_assets, exposure, borrowing_capacity, remaining_capacity_repo, remaining_capacity_non_repo] => {
                Ok(Self {
                    member_name,
                    total_assets,
                    exposure,
                    borrowing_capacity,
                    remaining_capacity_repo,
                    remaining_capacity_non_repo,
                })
            }
            _ => Err(anyhow!(
                "indebtedness layout needs 6 positions, got {}",
                positions.len()
            )),
        }
    }

    pub fn required_width(&self) -> usize {
        [
            self.member_name,
            self.total_assets,
            self.exposure,
            self.borrowing_capacity,
            self.remaining_capacity_repo,
            self.remaining_capacity_non_repo,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

impl Default for IndebtednessLayout {
    fn default() -> Self {
        Self {
            member_name: 1,
            total_assets: 5,
            exposure: 10,
            borrowing_capacity: 14,
            remaining_capacity_repo: 25,
            remaining_capacity_non_repo: 26,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistRules {
    /// Ratings strictly above this value make the watchlist.
    pub rating_threshold: f64,
    /// Case-insensitive substring that removes a member from the watchlist.
    pub exclude_term: String,
}

impl Default for WatchlistRules {
    fn default() -> Self {
        Self {
            rating_threshold: 5.0,
            exclude_term: "conting".to_string(),
        }
    }
}

/// Durations above which a timed step logs a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub load: Duration,
    pub transform: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        let secs = Duration::from_secs_f64(DEFAULT_WARN_SECS);
        Self {
            load: secs,
            transform: secs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub watchlist: SourceConfig,
    pub indebtedness: SourceConfig,
    pub watchlist_layout: WatchlistLayout,
    pub indebtedness_layout: IndebtednessLayout,
    pub watchlist_rules: WatchlistRules,
    pub thresholds: Thresholds,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr: SocketAddr =
            parse_or(&get, "RISK_BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;

        let watchlist = SourceConfig {
            path: required_path(&get, "WATCHLIST_PATH")?,
            sheet: get("WATCHLIST_SHEET").unwrap_or_else(|| "Schedule".to_string()),
            skip_rows: parse_or(&get, "WATCHLIST_SKIP_ROWS", 4)?,
        };
        let indebtedness = SourceConfig {
            path: required_path(&get, "INDEBTEDNESS_PATH")?,
            sheet: get("INDEBTEDNESS_SHEET")
                .unwrap_or_else(|| "Member Outstanding Indebtedness".to_string()),
            skip_rows: parse_or(&get, "INDEBTEDNESS_SKIP_ROWS", 2)?,
        };

        let exclusion_column = get("WATCHLIST_EXCLUSION_COLUMN")
            .map(|raw| parse_value::<usize>("WATCHLIST_EXCLUSION_COLUMN", &raw))
            .transpose()?;
        let watchlist_layout = match get("WATCHLIST_COLUMNS") {
            Some(raw) => WatchlistLayout::from_positions(
                &parse_positions("WATCHLIST_COLUMNS", &raw)?,
                exclusion_column,
            )?,
            None => {
                let default = WatchlistLayout::default();
                WatchlistLayout {
                    exclusion_column: exclusion_column.unwrap_or(default.member_name),
                    ..default
                }
            }
        };
        let indebtedness_layout = match get("INDEBTEDNESS_COLUMNS") {
            Some(raw) => {
                IndebtednessLayout::from_positions(&parse_positions("INDEBTEDNESS_COLUMNS", &raw)?)?
            }
            None => IndebtednessLayout::default(),
        };

        let defaults = WatchlistRules::default();
        let watchlist_rules = WatchlistRules {
            rating_threshold: parse_or(
                &get,
                "WATCHLIST_RATING_THRESHOLD",
                defaults.rating_threshold,
            )?,
            exclude_term: get("WATCHLIST_EXCLUDE_TERM").unwrap_or(defaults.exclude_term),
        };

        let thresholds = Thresholds {
            load: seconds(parse_or(&get, "LOAD_WARN_SECS", DEFAULT_WARN_SECS)?, "LOAD_WARN_SECS")?,
            transform: seconds(
                parse_or(&get, "TRANSFORM_WARN_SECS", DEFAULT_WARN_SECS)?,
                "TRANSFORM_WARN_SECS",
            )?,
        };

        Ok(Config {
            bind_addr,
            watchlist,
            indebtedness,
            watchlist_layout,
            indebtedness_layout,
            watchlist_rules,
            thresholds,
        })
    }
}

fn required_path<G>(get: &G, key: &str) -> Result<PathBuf>
where
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Failed to load {}: variable is not set", key))
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|e| anyhow!("Invalid value for {}: '{}' ({})", key, raw, e))
}

fn parse_positions(key: &str, raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|part| parse_value::<usize>(key, part.trim()))
        .collect()
}

fn seconds(value: f64, key: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("Invalid duration for {}", key))
}
