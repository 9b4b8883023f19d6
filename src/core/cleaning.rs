use crate::domain::model::{CellValue, Column, Table};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DedupReport {
    pub rows_before: usize,
    pub rows_after: usize,
}

impl DedupReport {
    pub fn removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FillReport {
    /// (column, cells filled) for every numeric column that had gaps and a mean.
    pub filled: Vec<(String, usize)>,
}

impl FillReport {
    pub fn total_cells(&self) -> usize {
        self.filled.iter().map(|(_, n)| *n).sum()
    }
}

/// Keeps the first occurrence of every distinct row, in original order.
///
/// A table without columns has no row content to compare and is returned unchanged.
pub fn remove_duplicates(table: &Table) -> (Table, DedupReport) {
    if table.column_count() == 0 {
        let report = DedupReport {
            rows_before: table.row_count(),
            rows_after: table.row_count(),
        };
        return (table.clone(), report);
    }

    let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(table.row_count());
    let keep: Vec<usize> = (0..table.row_count())
        .filter(|&i| seen.insert(table.row(i)))
        .collect();

    let columns = table
        .columns()
        .iter()
        .map(|c| Column {
            name: c.name.clone(),
            column_type: c.column_type,
            values: keep.iter().map(|&i| c.values[i].clone()).collect(),
        })
        .collect();

    let report = DedupReport {
        rows_before: table.row_count(),
        rows_after: keep.len(),
    };
    tracing::debug!(
        "Removed {} duplicate rows ({} -> {})",
        report.removed(),
        report.rows_before,
        report.rows_after
    );

    (Table::from_aligned(columns, keep.len()), report)
}

fn is_missing(value: &CellValue) -> bool {
    match value {
        CellValue::Absent => true,
        CellValue::Number(n) => n.is_nan(),
        _ => false,
    }
}

/// 數值欄的缺值（含 NaN）以該欄平均數補上；沒有任何值的欄位不動
pub fn fill_missing(table: &Table) -> (Table, FillReport) {
    let mut filled = Vec::new();

    let columns = table
        .columns()
        .iter()
        .map(|column| {
            if !column.is_numeric() {
                return column.clone();
            }

            let present: Vec<f64> = column
                .values
                .iter()
                .filter_map(CellValue::as_number)
                .filter(|n| !n.is_nan())
                .collect();
            let gaps = column.values.iter().filter(|v| is_missing(v)).count();
            if present.is_empty() || gaps == 0 {
                return column.clone();
            }

            let mean = present.iter().sum::<f64>() / present.len() as f64;
            tracing::debug!(
                "Filling {} missing values in '{}' with mean {}",
                gaps,
                column.name,
                mean
            );
            filled.push((column.name.clone(), gaps));

            Column {
                name: column.name.clone(),
                column_type: column.column_type,
                values: column
                    .values
                    .iter()
                    .map(|v| {
                        if is_missing(v) {
                            CellValue::Number(mean)
                        } else {
                            v.clone()
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    (
        Table::from_aligned(columns, table.row_count()),
        FillReport { filled },
    )
}
