use crate::models::ResultSet;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A result row: column name to text value, in result-set column order.
///
/// The engine returns every value as text; empty cells become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, Option<String>)>,
}

impl Row {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(column, _)| column.as_str())
    }

    /// Returns `None` when the column is absent, `Some(None)` for a null cell
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.cells
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, Option<String>)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Accumulates paginated result sets into rows.
///
/// Column names come from the first page's metadata, and the first row of the
/// first page (the header row) is skipped. Later pages carry data rows only.
#[derive(Debug, Default)]
pub(crate) struct RowAssembler {
    columns: Option<Vec<String>>,
    rows: Vec<Row>,
}

impl RowAssembler {
    pub fn push_page(&mut self, result_set: ResultSet) {
        let skip = match self.columns {
            Some(_) => 0,
            None => {
                self.columns = Some(result_set.columns);
                1
            }
        };

        let columns = self.columns.as_deref().unwrap_or_default();
        self.rows.extend(
            result_set
                .rows
                .into_iter()
                .skip(skip)
                .map(|cells| map_row(columns, cells)),
        );
    }

    pub fn finish(self) -> (Vec<String>, Vec<Row>) {
        (self.columns.unwrap_or_default(), self.rows)
    }
}

fn map_row(columns: &[String], cells: Vec<Option<String>>) -> Row {
    let mut cells = cells.into_iter();
    columns
        .iter()
        .map(|column| {
            let value = cells.next().flatten().filter(|v| !v.is_empty());
            (column.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn first_page() -> ResultSet {
        ResultSet {
            columns: vec!["tenant_id".to_string(), "session_count".to_string()],
            rows: vec![
                cells(&[Some("tenant_id"), Some("session_count")]),
                cells(&[Some("t1"), Some("12")]),
                cells(&[Some("t2"), Some("")]),
            ],
        }
    }

    #[test]
    fn test_first_page_skips_header_and_maps_empty_to_null() {
        let mut assembler = RowAssembler::default();
        assembler.push_page(first_page());
        let (columns, rows) = assembler.finish();

        assert_eq!(columns, vec!["tenant_id", "session_count"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("tenant_id"), Some(Some("t1")));
        assert_eq!(rows[0].get("session_count"), Some(Some("12")));
        assert_eq!(rows[1].get("session_count"), Some(None));
        assert_eq!(rows[1].get("missing"), None);
    }

    #[test]
    fn test_later_pages_keep_every_row() {
        let mut assembler = RowAssembler::default();
        assembler.push_page(first_page());
        assembler.push_page(ResultSet {
            columns: Vec::new(),
            rows: vec![cells(&[Some("t3"), Some("1")])],
        });
        let (_, rows) = assembler.finish();

        let tenants: Vec<_> = rows.iter().map(|r| r.get("tenant_id")).collect();
        assert_eq!(tenants, vec![Some(Some("t1")), Some(Some("t2")), Some(Some("t3"))]);
    }

    #[test]
    fn test_short_rows_are_padded_with_nulls() {
        let mut assembler = RowAssembler::default();
        assembler.push_page(ResultSet {
            columns: vec!["a".to_string(), "b".to_string()],
            rows: vec![
                cells(&[Some("a"), Some("b")]),
                cells(&[Some("1")]),
                cells(&[None, Some("2"), Some("extra")]),
            ],
        });
        let (_, rows) = assembler.finish();

        for row in &rows {
            assert_eq!(row.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        }
        assert_eq!(rows[0].get("b"), Some(None));
        assert_eq!(rows[1].get("a"), Some(None));
        assert_eq!(rows[1].get("b"), Some(Some("2")));
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row: Row = vec![
            ("zeta".to_string(), Some("1".to_string())),
            ("alpha".to_string(), None),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"zeta":"1","alpha":null}"#
        );
    }

    #[test]
    fn test_empty_result() {
        let (columns, rows) = RowAssembler::default().finish();
        assert!(columns.is_empty());
        assert!(rows.is_empty());
    }
}
