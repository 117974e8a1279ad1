use calamine::Data;
use regex::{Regex, RegexBuilder};

use crate::config::{WatchlistLayout, WatchlistRules};
use crate::error::AppError;
use crate::models::WatchlistRow;
use crate::services::excel::utils::{to_date, to_numeric, to_text};
use crate::services::excel::RawTable;

pub const TABLE_NAME: &str = "watchlist";

/// Selects members whose final rating is above the threshold and ranks
/// them by rating, highest first.
#[derive(Debug, Clone)]
pub struct WatchlistBuilder {
    layout: WatchlistLayout,
    rating_threshold: f64,
    exclusion: Regex,
}

impl WatchlistBuilder {
    pub fn new(layout: WatchlistLayout, rules: &WatchlistRules) -> Result<Self, AppError> {
        let exclusion = RegexBuilder::new(&regex::escape(&rules.exclude_term))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                AppError::InvalidInput(format!(
                    "Invalid exclusion term '{}': {}",
                    rules.exclude_term, e
                ))
            })?;

        Ok(Self {
            layout,
            rating_threshold: rules.rating_threshold,
            exclusion,
        })
    }

    pub fn build(&self, table: &RawTable) -> Result<Vec<WatchlistRow>, AppError> {
        table.ensure_width(TABLE_NAME, self.layout.required_width())?;

        let mut rows: Vec<WatchlistRow> = table
            .rows
            .iter()
            .filter_map(|row| self.clean_row(row))
            .collect();

        // `sort_by` is stable: equal ratings keep sheet order.
        rows.sort_by(|a, b| b.final_rating.total_cmp(&a.final_rating));
        for (i, row) in rows.iter_mut().enumerate() {
            row.index = i + 1;
        }

        tracing::debug!(
            "Watchlist kept {} of {} rows (rating > {})",
            rows.len(),
            table.height(),
            self.rating_threshold
        );
        Ok(rows)
    }

    fn clean_row(&self, row: &[Data]) -> Option<WatchlistRow> {
        let layout = &self.layout;

        let final_rating = to_numeric(RawTable::cell(row, layout.final_rating))
            .filter(|rating| *rating > self.rating_threshold)?;
        let member_name = to_text(RawTable::cell(row, layout.member_name))
            .filter(|name| !name.is_empty())?;
        if self.is_excluded(row) {
            return None;
        }

        Some(WatchlistRow {
            index: 0,
            member_name,
            final_rating,
            last_ccr: to_date(RawTable::cell(row, layout.last_ccr)),
            last_qrr: to_date(RawTable::cell(row, layout.last_qrr)),
            comments: to_text(RawTable::cell(row, layout.comments)).unwrap_or_default(),
        })
    }

    fn is_excluded(&self, row: &[Data]) -> bool {
        to_text(RawTable::cell(row, self.layout.exclusion_column))
            .map_or(false, |text| self.exclusion.is_match(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const WIDTH: usize = 36;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn member(name: Data, rating: Data) -> Vec<Data> {
        let mut row = vec![Data::Empty; WIDTH];
        row[3] = name;
        row[26] = rating;
        row
    }

    fn builder() -> WatchlistBuilder {
        WatchlistBuilder::new(WatchlistLayout::default(), &WatchlistRules::default()).unwrap()
    }

    fn table(rows: Vec<Vec<Data>>) -> RawTable {
        RawTable::new(vec![String::new(); WIDTH], rows)
    }

    fn names(rows: &[WatchlistRow]) -> Vec<&str> {
        rows.iter().map(|r| r.member_name.as_str()).collect()
    }

    #[test]
    fn rated_member_with_text_date_is_listed() {
        let mut row = member(text("Acme Corp"), Data::Int(6));
        row[32] = text("3/4/24");
        row[35] = text("Monitor liquidity");

        let rows = builder().build(&table(vec![row])).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].member_name, "Acme Corp");
        assert_eq!(rows[0].final_rating, 6.0);
        assert_eq!(rows[0].last_ccr, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(rows[0].last_qrr, None);
        assert_eq!(rows[0].comments, "Monitor liquidity");
    }

    #[test]
    fn contingent_names_are_excluded() {
        let rows = builder()
            .build(&table(vec![
                member(text("Acme Contingent Fund"), Data::Int(6)),
                member(text("CONTINGENCY TRUST"), Data::Int(8)),
                member(text("Beta Bank"), Data::Int(7)),
            ]))
            .unwrap();
        assert_eq!(names(&rows), vec!["Beta Bank"]);
    }

    #[test]
    fn rating_must_be_strictly_above_threshold() {
        let rows = builder()
            .build(&table(vec![
                member(text("At Five"), Data::Int(5)),
                member(text("Unrated"), text("n/a")),
                member(text("Blank"), Data::Empty),
                member(text("Text Six"), text("6")),
                member(text("Five And A Bit"), Data::Float(5.01)),
            ]))
            .unwrap();
        assert_eq!(names(&rows), vec!["Text Six", "Five And A Bit"]);
    }

    #[test]
    fn member_name_must_be_present_and_non_empty() {
        let rows = builder()
            .build(&table(vec![
                member(Data::Empty, Data::Int(9)),
                member(text(""), Data::Int(9)),
                member(text("   "), Data::Int(7)),
                member(text("Gamma Credit Union"), Data::Int(9)),
            ]))
            .unwrap();
        // Whitespace is text, so a blank-looking name still counts.
        assert_eq!(names(&rows), vec!["Gamma Credit Union", "   "]);
    }

    #[test]
    fn sorted_by_rating_descending_keeping_sheet_order_for_ties() {
        let rows = builder()
            .build(&table(vec![
                member(text("A"), Data::Int(6)),
                member(text("B"), Data::Int(9)),
                member(text("C"), Data::Int(6)),
                member(text("D"), Data::Int(7)),
                member(text("E"), Data::Int(9)),
            ]))
            .unwrap();
        assert_eq!(names(&rows), vec!["B", "E", "D", "A", "C"]);
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn indices_are_contiguous_after_filtering() {
        let rows = builder()
            .build(&table(vec![
                member(text("Low"), Data::Int(1)),
                member(text("High"), Data::Int(8)),
                member(text("Low Too"), Data::Int(2)),
                member(text("Higher"), Data::Int(10)),
            ]))
            .unwrap();
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn unparseable_dates_and_missing_comments_are_blank() {
        let mut row = member(text("Delta"), Data::Int(7));
        row[32] = text("TBD");
        row[34] = text("2024/03/04");

        let rows = builder().build(&table(vec![row])).unwrap();
        assert_eq!(rows[0].last_ccr, None);
        assert_eq!(rows[0].last_qrr, None);
        assert_eq!(rows[0].comments, "");
    }

    #[test]
    fn exclusion_can_target_another_column() {
        let layout = WatchlistLayout {
            exclusion_column: 0,
            ..WatchlistLayout::default()
        };
        let builder = WatchlistBuilder::new(layout, &WatchlistRules::default()).unwrap();

        let mut flagged = member(text("Acme Contingent Fund"), Data::Int(6));
        flagged[0] = text("regular");
        let mut tagged = member(text("Beta Bank"), Data::Int(6));
        tagged[0] = text("Contingency");

        let rows = builder.build(&table(vec![flagged, tagged])).unwrap();
        assert_eq!(names(&rows), vec!["Acme Contingent Fund"]);
    }

    #[test]
    fn narrow_sheet_is_a_schema_error() {
        let narrow = RawTable::new(vec![String::new(); 30], vec![vec![Data::Empty; 30]]);
        let err = builder().build(&narrow).unwrap_err();
        assert!(matches!(
            err,
            AppError::Schema { table: TABLE_NAME, found: 30, required: 36 }
        ));
    }
}
