//! Duplicate removal and missing-value handling for imported tables.
//!
//! `clean` applies, in order: exact duplicate removal, removal of rows
//! without a label, then the chosen missing-value strategy on the features.
use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::io::RawTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValueStrategy {
    /// Drop every row with a missing feature.
    #[default]
    Remove,
    Mean,
    Median,
    /// Most frequent value; ties resolve to the smallest.
    Mode,
}

impl FromStr for MissingValueStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remove" | "drop" => Ok(MissingValueStrategy::Remove),
            "mean" => Ok(MissingValueStrategy::Mean),
            "median" => Ok(MissingValueStrategy::Median),
            "mode" => Ok(MissingValueStrategy::Mode),
            _ => Err(format!(
                "Unknown missing-value strategy: {}. Use one of: remove, mean, median, mode",
                s
            )),
        }
    }
}

/// Clean `table` and return the result.
pub fn clean(mut table: RawTable, strategy: MissingValueStrategy) -> RawTable {
    let duplicates = drop_duplicates(&mut table);
    let unlabelled = drop_unlabelled(&mut table);
    if duplicates + unlabelled > 0 {
        log::warn!(
            "Dropped {} duplicate rows and {} rows without a label",
            duplicates,
            unlabelled
        );
    }

    match strategy {
        MissingValueStrategy::Remove => {
            let before = table.nrows();
            retain_rows(&mut table, |row, _, _| row.iter().all(Option::is_some));
            let dropped = before - table.nrows();
            if dropped > 0 {
                log::warn!("Dropped {} rows with missing feature values", dropped);
            }
        }
        MissingValueStrategy::Mean => fill_columns(&mut table, mean),
        MissingValueStrategy::Median => fill_columns(&mut table, median),
        MissingValueStrategy::Mode => fill_columns(&mut table, mode),
    }
    log::info!("{} rows left after cleaning ({:?})", table.nrows(), strategy);
    table
}

/// Remove rows identical to an earlier row: excluded cells, features and
/// label all equal. Returns the number of rows removed.
pub fn drop_duplicates(table: &mut RawTable) -> usize {
    let before = table.nrows();
    let mut seen = HashSet::new();
    retain_rows(table, |row, label, excluded| {
        let key: (Vec<String>, Vec<Option<u64>>, Option<String>) = (
            excluded.to_vec(),
            row.iter().map(|v| v.map(f64::to_bits)).collect(),
            label.clone(),
        );
        seen.insert(key)
    });
    before - table.nrows()
}

pub fn drop_unlabelled(table: &mut RawTable) -> usize {
    let before = table.nrows();
    retain_rows(table, |_, label, _| label.is_some());
    before - table.nrows()
}

fn retain_rows<F>(table: &mut RawTable, mut keep: F)
where
    F: FnMut(&[Option<f64>], &Option<String>, &[String]) -> bool,
{
    let rows = std::mem::take(&mut table.rows);
    let labels = std::mem::take(&mut table.labels);
    let mut excluded = std::mem::take(&mut table.excluded_cells);
    excluded.resize(rows.len(), Vec::new());
    for ((row, label), cells) in rows.into_iter().zip(labels).zip(excluded) {
        if keep(&row, &label, &cells) {
            table.rows.push(row);
            table.labels.push(label);
            table.excluded_cells.push(cells);
        }
    }
}

/// Replace missing cells column by column with `fill(present values)`.
/// Columns without any present value stay missing.
fn fill_columns(table: &mut RawTable, fill: fn(&mut Vec<f64>) -> Option<f64>) {
    for col in 0..table.feature_names.len() {
        let mut present: Vec<f64> = table.rows.iter().filter_map(|row| row[col]).collect();
        if present.len() == table.nrows() {
            continue;
        }
        match fill(&mut present) {
            Some(value) => {
                for row in table.rows.iter_mut() {
                    row[col].get_or_insert(value);
                }
            }
            None => log::warn!(
                "Column '{}' has no values to impute from",
                table.feature_names[col]
            ),
        }
    }
}

fn mean(values: &mut Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &mut Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn mode(values: &mut Vec<f64>) -> Option<f64> {
    values.sort_by(f64::total_cmp);
    let mut best: Option<(f64, usize)> = None;
    let mut start = 0;
    while start < values.len() {
        let value = values[start];
        let run = values[start..].iter().take_while(|v| v.total_cmp(&value).is_eq()).count();
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        start += run;
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable {
            feature_names: vec!["a".into(), "b".into()],
            label_name: "class".into(),
            rows: vec![
                vec![Some(1.0), Some(10.0)],
                vec![Some(1.0), Some(10.0)],
                vec![None, Some(20.0)],
                vec![Some(3.0), None],
                vec![Some(3.0), Some(40.0)],
                vec![Some(8.0), Some(50.0)],
            ],
            labels: vec![
                Some("2".into()),
                Some("2".into()),
                Some("4".into()),
                Some("4".into()),
                None,
                Some("2".into()),
            ],
            excluded_cells: vec![Vec::new(); 6],
        }
    }

    #[test]
    fn duplicates_and_unlabelled_rows_go_first() {
        let mut t = table();
        assert_eq!(drop_duplicates(&mut t), 1);
        assert_eq!(drop_unlabelled(&mut t), 1);
        assert_eq!(t.nrows(), 4);
        assert_eq!(t.rows.len(), t.labels.len());
    }

    #[test]
    fn rows_differing_only_in_excluded_cells_are_kept() {
        let mut t = table();
        t.excluded_cells = (1..=6).map(|id| vec![format!("100{}", id)]).collect();
        assert_eq!(drop_duplicates(&mut t), 0);
        assert_eq!(t.nrows(), 6);

        t.excluded_cells[1] = t.excluded_cells[0].clone();
        assert_eq!(drop_duplicates(&mut t), 1);
        assert_eq!(t.excluded_cells.len(), t.nrows());
    }

    #[test]
    fn remove_strategy_drops_incomplete_rows() {
        let t = clean(table(), MissingValueStrategy::Remove);
        assert_eq!(t.rows, vec![vec![Some(1.0), Some(10.0)], vec![Some(8.0), Some(50.0)]]);
    }

    #[test]
    fn mean_strategy_fills_with_column_mean() {
        // After dedup/unlabelled removal: a = [1, _, 3, 8], b = [10, 20, _, 50]
        let t = clean(table(), MissingValueStrategy::Mean);
        assert_eq!(t.rows[1][0], Some(4.0));
        assert_eq!(t.rows[2][1], Some(80.0 / 3.0));
        assert_eq!(t.missing_cells(), 0);
    }

    #[test]
    fn median_strategy_fills_with_column_median() {
        let t = clean(table(), MissingValueStrategy::Median);
        assert_eq!(t.rows[1][0], Some(3.0));
        assert_eq!(t.rows[2][1], Some(20.0));
    }

    #[test]
    fn mode_prefers_smallest_on_ties() {
        assert_eq!(mode(&mut vec![3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(mode(&mut vec![5.0, 2.0, 5.0]), Some(5.0));
        assert_eq!(mode(&mut vec![]), None);
    }

    #[test]
    fn median_of_even_count_averages_the_middle() {
        assert_eq!(median(&mut vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn strategy_parses_from_str() {
        assert_eq!("Mean".parse::<MissingValueStrategy>(), Ok(MissingValueStrategy::Mean));
        assert_eq!("drop".parse::<MissingValueStrategy>(), Ok(MissingValueStrategy::Remove));
        assert!("std".parse::<MissingValueStrategy>().is_err());
    }
}
