//! Relational operations on [`Table`]s, executed by polars.
//!
//! Only join keys, sort keys and summed columns cross into a `DataFrame`,
//! next to a row index. Results come back as row indices, so geometry and
//! list cells stay in the table they came from.

use crate::error::Result;
use crate::table::{Table, Value};
use polars::prelude::*;

const ROW: &str = "__row";
const MATCH: &str = "__match";
const KEY: &str = "__key";

fn row_index(name: &str, n: usize) -> Column {
    Series::new(name.into(), (0..n as u32).collect::<Vec<u32>>()).into()
}

fn key_column(name: &str, table: &Table, idx: usize) -> Column {
    let keys: Vec<Option<String>> = table.rows().iter().map(|r| r[idx].key()).collect();
    Series::new(name.into(), keys).into()
}

/// Numeric when every present cell is a number, text otherwise.
fn sort_column(name: &str, table: &Table, idx: usize) -> Column {
    let numeric = table
        .rows()
        .iter()
        .all(|r| matches!(r[idx], Value::Number(_) | Value::Null));
    if numeric {
        let values: Vec<Option<f64>> = table.rows().iter().map(|r| r[idx].as_f64()).collect();
        Series::new(name.into(), values).into()
    } else {
        let values: Vec<Option<String>> = table
            .rows()
            .iter()
            .map(|r| (!r[idx].is_null()).then(|| r[idx].to_string()))
            .collect();
        Series::new(name.into(), values).into()
    }
}

fn indices(df: &DataFrame, name: &str) -> Result<Vec<Option<usize>>> {
    Ok(df
        .column(name)?
        .u32()?
        .into_iter()
        .map(|i| i.map(|i| i as usize))
        .collect())
}

/// Left join `columns` of `right` onto `left`, matching `left_key` against
/// `right_key`.
///
/// The first matching right row wins and unmatched rows get nulls. Joined
/// columns replace same-named columns of `left`.
///
/// # Errors
///
/// Returns [`GeoError::InvalidArgument`](crate::GeoError::InvalidArgument)
/// when a key or joined column is missing.
pub fn left_join(left: &Table, left_key: &str, right: &Table, right_key: &str, columns: &[&str]) -> Result<Table> {
    let lk = left.require_column(left_key)?;
    let rk = right.require_column(right_key)?;
    let picked: Vec<usize> = columns
        .iter()
        .map(|c| right.require_column(c))
        .collect::<Result<_>>()?;

    let l = DataFrame::new(vec![key_column(KEY, left, lk), row_index(ROW, left.len())])?;
    let r = DataFrame::new(vec![key_column(KEY, right, rk), row_index(MATCH, right.len())])?;
    let joined = l
        .join(&r, [KEY], [KEY], JoinArgs::new(JoinType::Left), None)?
        .lazy()
        .group_by([col(ROW)])
        .agg([col(MATCH).min()])
        .collect()?;

    let mut matches: Vec<Option<usize>> = vec![None; left.len()];
    for (row, m) in indices(&joined, ROW)?.into_iter().zip(indices(&joined, MATCH)?) {
        if let Some(slot) = row.and_then(|row| matches.get_mut(row)) {
            *slot = m;
        }
    }

    let mut out = left.clone();
    for (name, &ci) in columns.iter().zip(&picked) {
        let values = matches
            .iter()
            .map(|m| m.map(|m| right.rows()[m][ci].clone()).unwrap_or_default())
            .collect();
        out.set_column(name, values)?;
    }
    Ok(out)
}

/// Stable sort on one column; numbers compare numerically, nulls last.
pub fn sort_by(table: &mut Table, column: &str) -> Result<()> {
    let idx = table.require_column(column)?;
    let df = DataFrame::new(vec![sort_column(KEY, table, idx), row_index(ROW, table.len())])?;
    let sorted = df
        .lazy()
        .sort(
            [KEY],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    let order: Vec<usize> = indices(&sorted, ROW)?.into_iter().flatten().collect();
    table.reorder(&order);
    Ok(())
}

/// Rows sharing the same key cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Member row indices, in table order.
    pub rows: Vec<usize>,
    /// One total per summed column; text that does not parse counts as zero.
    pub sums: Vec<f64>,
}

/// Group rows on the keys of `keys` and total each of `sums` per group.
/// Groups come out in order of first appearance.
pub fn group_sum(table: &Table, keys: &[&str], sums: &[&str]) -> Result<Vec<Group>> {
    let key_names: Vec<String> = (0..keys.len()).map(|i| format!("__k{i}")).collect();
    let sum_names: Vec<String> = (0..sums.len()).map(|i| format!("__s{i}")).collect();

    let mut columns = Vec::with_capacity(keys.len() + sums.len() + 1);
    for (name, k) in key_names.iter().zip(keys) {
        columns.push(key_column(name, table, table.require_column(k)?));
    }
    for (name, s) in sum_names.iter().zip(sums) {
        let idx = table.require_column(s)?;
        let values: Vec<Option<f64>> = table.rows().iter().map(|r| r[idx].as_f64()).collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    columns.push(row_index(ROW, table.len()));

    let by: Vec<Expr> = key_names.iter().map(|n| col(n.as_str())).collect();
    let aggs: Vec<Expr> = sum_names
        .iter()
        .map(|n| col(n.as_str()).sum())
        .chain([col(ROW)])
        .collect();
    let grouped = DataFrame::new(columns)?
        .lazy()
        .group_by_stable(by)
        .agg(aggs)
        .collect()?;

    let members = grouped.column(ROW)?.list()?;
    let totals = sum_names
        .iter()
        .map(|n| Ok(grouped.column(n)?.f64()?.clone()))
        .collect::<Result<Vec<Float64Chunked>>>()?;

    let mut out = Vec::with_capacity(grouped.height());
    for g in 0..grouped.height() {
        let rows = match members.get_as_series(g) {
            Some(s) => s.u32()?.into_iter().flatten().map(|i| i as usize).collect(),
            None => Vec::new(),
        };
        let sums = totals.iter().map(|t| t.get(g).unwrap_or(0.0)).collect();
        out.push(Group { rows, sums });
    }
    Ok(out)
}
