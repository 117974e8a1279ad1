use calamine::Data;

use crate::error::AppError;

static EMPTY: Data = Data::Empty;

/// A worksheet with its header row split off. Cells are addressed by
/// absolute 0-based column position (0 is column A).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        Self { headers, rows }
    }

    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Cell at `col`, or `Data::Empty` past the end of a short row.
    pub fn cell(row: &[Data], col: usize) -> &Data {
        row.get(col).unwrap_or(&EMPTY)
    }

    pub fn ensure_width(&self, table: &'static str, required: usize) -> Result<(), AppError> {
        let found = self.width();
        if found < required {
            return Err(AppError::Schema {
                table,
                found,
                required,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_covers_headers_and_rows() {
        let table = RawTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Data::Int(1), Data::Empty, Data::Float(2.0)]],
        );
        assert_eq!(table.width(), 3);
        assert_eq!(table.height(), 1);
        assert!(table.ensure_width("watchlist", 3).is_ok());
        assert!(matches!(
            table.ensure_width("watchlist", 36),
            Err(AppError::Schema { found: 3, required: 36, .. })
        ));
    }

    #[test]
    fn short_rows_read_as_empty() {
        let row = vec![Data::String("x".to_string())];
        assert_eq!(RawTable::cell(&row, 0), &Data::String("x".to_string()));
        assert_eq!(RawTable::cell(&row, 5), &Data::Empty);
    }
}
