use crate::domain::model::{Column, Table};
use crate::utils::error::{FormatterError, Result};
use std::collections::HashSet;

/// Restricts `table` to `selection`, in selection order.
///
/// Repeated names keep their first position. An empty selection yields a table
/// with no columns that still reports the original row count.
pub fn project_columns<S: AsRef<str>>(table: &Table, selection: &[S]) -> Result<Table> {
    let mut seen = HashSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(selection.len());

    for name in selection {
        let name = name.as_ref();
        if !seen.insert(name) {
            continue;
        }
        let column = table
            .column(name)
            .ok_or_else(|| FormatterError::ValidationError {
                message: format!(
                    "Unknown column '{}'. Available columns: {}",
                    name,
                    table.column_names().join(", ")
                ),
            })?;
        columns.push(column.clone());
    }

    if columns.is_empty() && table.column_count() > 0 {
        tracing::debug!("Empty column selection; keeping {} rows", table.row_count());
    }
    Ok(Table::from_aligned(columns, table.row_count()))
}

/// 前兩個數值欄（維持原本順序），供圖表使用
pub fn numeric_chart_columns(table: &Table) -> Table {
    let columns: Vec<Column> = table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .take(2)
        .cloned()
        .collect();
    Table::from_aligned(columns, table.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tabular::load_csv;
    use crate::domain::model::CellValue;

    fn sample() -> Table {
        load_csv(
            "sample.csv",
            b"id,name,score,weight,height\n1,a,10,5.5,170\n2,b,20,6.5,180\n3,c,30,7.5,190\n",
        )
        .unwrap()
    }

    #[test]
    fn test_projection_reorders_and_keeps_rows() {
        let table = sample();
        let projected = project_columns(&table, &["score", "name"]).unwrap();

        assert_eq!(projected.column_names(), vec!["score", "name"]);
        assert_eq!(projected.row_count(), 3);
        assert_eq!(
            projected.row(2),
            vec![&CellValue::Number(30.0), &CellValue::Text("c".to_string())]
        );
    }

    #[test]
    fn test_projection_collapses_repeats() {
        let projected = project_columns(&sample(), &["id", "id", "name"]).unwrap();
        assert_eq!(projected.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_projection_all_columns_is_identity() {
        let table = sample();
        let names = table.column_names();
        assert_eq!(project_columns(&table, &names).unwrap(), table);
    }

    #[test]
    fn test_empty_selection_keeps_row_count() {
        let projected = project_columns::<&str>(&sample(), &[]).unwrap();
        assert_eq!(projected.column_count(), 0);
        assert_eq!(projected.row_count(), 3);
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let err = project_columns(&sample(), &["missing"]).unwrap_err();
        assert!(matches!(err, FormatterError::ValidationError { .. }));
    }

    #[test]
    fn test_chart_columns_take_first_two_numeric() {
        let chart = numeric_chart_columns(&sample());
        assert_eq!(chart.column_names(), vec!["id", "score"]);
        assert_eq!(chart.row_count(), 3);
    }

    #[test]
    fn test_chart_columns_with_few_numeric() {
        let one = load_csv("one.csv", b"label,value\na,1\nb,2\n").unwrap();
        assert_eq!(numeric_chart_columns(&one).column_names(), vec!["value"]);

        let none = load_csv("none.csv", b"label\na\n").unwrap();
        assert_eq!(numeric_chart_columns(&none).column_count(), 0);
    }
}
