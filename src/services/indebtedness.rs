use calamine::Data;

use crate::config::IndebtednessLayout;
use crate::error::AppError;
use crate::models::BorrowerRow;
use crate::services::excel::utils::{round_whole, to_numeric, to_text};
use crate::services::excel::RawTable;

pub const TABLE_NAME: &str = "top_borrowers";

/// Ranks borrowing members by outstanding exposure.
#[derive(Debug, Clone, Copy)]
pub struct IndebtednessRanker {
    layout: IndebtednessLayout,
}

impl IndebtednessRanker {
    pub fn new(layout: IndebtednessLayout) -> Self {
        Self { layout }
    }

    pub fn rank(&self, table: &RawTable) -> Result<Vec<BorrowerRow>, AppError> {
        table.ensure_width(TABLE_NAME, self.layout.required_width())?;

        let mut rows: Vec<BorrowerRow> = table
            .rows
            .iter()
            .filter_map(|row| self.clean_row(row))
            .collect();

        rows.sort_by(|a, b| b.exposure.total_cmp(&a.exposure));
        for (i, row) in rows.iter_mut().enumerate() {
            row.index = i + 1;
        }

        tracing::debug!(
            "Top borrowers kept {} of {} rows with exposure",
            rows.len(),
            table.height()
        );
        Ok(rows)
    }

    fn clean_row(&self, row: &[Data]) -> Option<BorrowerRow> {
        let layout = &self.layout;
        let numeric = |col: usize| to_numeric(RawTable::cell(row, col));

        let exposure = numeric(layout.exposure)
            .map(round_whole)
            .filter(|exposure| *exposure != 0.0)?;

        Some(BorrowerRow {
            index: 0,
            member_name: to_text(RawTable::cell(row, layout.member_name)).unwrap_or_default(),
            exposure,
            borrowing_capacity: numeric(layout.borrowing_capacity),
            remaining_capacity_repo: numeric(layout.remaining_capacity_repo),
            remaining_capacity_non_repo: numeric(layout.remaining_capacity_non_repo),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: usize = 27;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn borrower(name: &str, exposure: Data) -> Vec<Data> {
        let mut row = vec![Data::Empty; WIDTH];
        row[1] = text(name);
        row[10] = exposure;
        row
    }

    fn rank(rows: Vec<Vec<Data>>) -> Vec<BorrowerRow> {
        let table = RawTable::new(vec![String::new(); WIDTH], rows);
        IndebtednessRanker::new(IndebtednessLayout::default())
            .rank(&table)
            .unwrap()
    }

    fn names(rows: &[BorrowerRow]) -> Vec<&str> {
        rows.iter().map(|r| r.member_name.as_str()).collect()
    }

    #[test]
    fn zero_and_missing_exposure_are_dropped() {
        let rows = rank(vec![
            borrower("Zero", text("0")),
            borrower("Blank", Data::Empty),
            borrower("Text", text("none")),
            borrower("Rounds To Zero", Data::Float(0.4)),
            borrower("Acme Corp", text("1500.4")),
        ]);
        assert_eq!(names(&rows), vec!["Acme Corp"]);
        assert_eq!(rows[0].exposure, 1500.0);
        assert_eq!(rows[0].index, 1);
    }

    #[test]
    fn capacities_degrade_to_missing() {
        let mut row = borrower("Beta Bank", Data::Int(2_000_000));
        row[14] = Data::Float(5_000_000.0);
        row[25] = text("n/a");
        row[26] = text("1250000.75");

        let rows = rank(vec![row]);
        assert_eq!(rows[0].borrowing_capacity, Some(5_000_000.0));
        assert_eq!(rows[0].remaining_capacity_repo, None);
        assert_eq!(rows[0].remaining_capacity_non_repo, Some(1_250_000.75));
    }

    #[test]
    fn sorted_by_exposure_descending_keeping_ties_in_order() {
        let rows = rank(vec![
            borrower("A", Data::Int(100)),
            borrower("B", Data::Float(300.2)),
            borrower("C", Data::Float(99.5)),
            borrower("D", Data::Int(300)),
            borrower("E", Data::Int(-50)),
        ]);
        // 300.2 rounds to 300 and ties with D; 99.5 rounds to 100 and ties with A.
        assert_eq!(names(&rows), vec!["B", "D", "A", "C", "E"]);
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn exposure_rounds_half_to_even() {
        let rows = rank(vec![
            borrower("Half Up", Data::Float(3.5)),
            borrower("Half Down", Data::Float(2.5)),
        ]);
        assert_eq!(rows[0].exposure, 4.0);
        assert_eq!(rows[1].exposure, 2.0);
    }

    #[test]
    fn narrow_sheet_is_a_schema_error() {
        let table = RawTable::new(vec![String::new(); 26], vec![vec![Data::Empty; 26]]);
        let err = IndebtednessRanker::new(IndebtednessLayout::default())
            .rank(&table)
            .unwrap_err();
        assert!(matches!(err, AppError::Schema { found: 26, required: 27, .. }));
    }
}
