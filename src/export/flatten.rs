use crate::api::request::ApiResult;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Columns placed first, in this order, when present.
pub const LEADING_COLUMNS: [&str; 2] = ["id", "database_name"];

/// Bulk free-text column, always placed last when present.
pub const TRAILING_COLUMN: &str = "raw_record";

/// Separator used when a list-valued field is collapsed into one cell.
pub const LIST_SEPARATOR: &str = "; ";

/// Entries flattened into a header plus rows of equal width.
///
/// Every row has exactly one cell per column; fields an entry lacks are empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FlatTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index` keyed by column name.
    pub fn row_map(&self, index: usize) -> Option<BTreeMap<&str, &str>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect(),
        )
    }
}

/// Flatten the `entries` of a search-style result.
///
/// Returns `None` when there is no `entries` list or it is empty; that is
/// not an error, there is just nothing to export.
pub fn flatten_result(result: &ApiResult) -> Option<FlatTable> {
    let entries = result.entries()?;
    if entries.is_empty() {
        return None;
    }
    Some(flatten_entries(entries))
}

/// Flatten a list of entry objects into a table whose columns are the union
/// of all their keys. Row order follows input order. A non-object entry has
/// no fields and yields a row of empty cells.
pub fn flatten_entries(entries: &[Value]) -> FlatTable {
    let keys: BTreeSet<&str> = entries
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|obj| obj.keys().map(String::as_str))
        .collect();

    let columns = order_columns(&keys);

    let rows = entries
        .iter()
        .map(|entry| {
            columns
                .iter()
                .map(|column| entry.get(column).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    FlatTable { columns, rows }
}

/// `id`, `database_name`, the rest sorted, `raw_record` last.
fn order_columns(keys: &BTreeSet<&str>) -> Vec<String> {
    let leading = LEADING_COLUMNS.iter().copied().filter(|c| keys.contains(c));

    // BTreeSet iterates in sorted order already.
    let middle = keys
        .iter()
        .copied()
        .filter(|k| !LEADING_COLUMNS.contains(k) && *k != TRAILING_COLUMN);

    let trailing = keys.get(TRAILING_COLUMN).copied();

    leading
        .chain(middle)
        .chain(trailing)
        .map(str::to_string)
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Compact JSON; keys come out sorted.
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_order() {
        let entries = vec![json!({
            "raw_record": "blob",
            "username": "bob",
            "database_name": "Leak",
            "email": ["b@x.com"],
            "id": "7",
            "address": "1 Main St",
        })];

        let table = flatten_entries(&entries);
        assert_eq!(
            table.columns(),
            ["id", "database_name", "address", "email", "username", "raw_record"]
        );
    }

    #[test]
    fn test_priority_columns_only_when_present() {
        let entries = vec![json!({"name": "x", "email": "y"})];
        let table = flatten_entries(&entries);
        assert_eq!(table.columns(), ["email", "name"]);
    }

    #[test]
    fn test_cell_rendering() {
        let entries = vec![json!({
            "id": 12,
            "list": ["a", "b", "c"],
            "nested": {"b": 2, "a": 1},
            "flag": true,
            "nothing": null,
            "mixed": [1, null, {"k": "v"}],
        })];

        let table = flatten_entries(&entries);
        let row = table.row_map(0).unwrap();
        assert_eq!(row["id"], "12");
        assert_eq!(row["list"], "a; b; c");
        assert_eq!(row["nested"], r#"{"a":1,"b":2}"#);
        assert_eq!(row["flag"], "true");
        assert_eq!(row["nothing"], "");
        assert_eq!(row["mixed"], r#"1; ; {"k":"v"}"#);
    }

    #[test]
    fn test_non_object_entry_yields_empty_row() {
        let entries = vec![json!({"id": "1"}), json!("stray")];
        let table = flatten_entries(&entries);
        assert_eq!(table.rows(), [vec!["1".to_string()], vec![String::new()]]);
    }

    #[test]
    fn test_flatten_result_without_entries() {
        assert!(flatten_result(&ApiResult::new(json!({"balance": 3}))).is_none());
        assert!(flatten_result(&ApiResult::new(json!({"entries": []}))).is_none());
        assert!(flatten_result(&ApiResult::new(json!({"entries": "nope"}))).is_none());
    }
}
