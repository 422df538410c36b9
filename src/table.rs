//! Minimal in-memory table with a geometry-capable cell type.
//!
//! Rows are stored positionally against `columns`; every row has exactly one
//! cell per column. Joins, sorts and grouping live in [`crate::frame`].

use crate::error::{GeoError, Result};
use crate::geometry;
use geo::MultiPolygon;
use std::fmt;

/// One cell of a [`Table`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Number(f64),
    List(Vec<Value>),
    Geometry(MultiPolygon<f64>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; text cells are parsed when they hold a plain number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&MultiPolygon<f64>> {
        match self {
            Value::Geometry(g) => Some(g),
            _ => None,
        }
    }

    /// String form used for joins and lookups. Integral numbers drop the
    /// fractional part so `75.0` and `"75"` meet.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::List(v) => serde_json::Value::Array(v.iter().map(Value::to_json).collect()),
            Value::Geometry(g) => geometry::to_geojson(g),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::List(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Geometry(g) => f.write_str(&geometry::to_wkt(g)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<MultiPolygon<f64>> for Value {
    fn from(g: MultiPolygon<f64>) -> Self {
        Value::Geometry(g)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v.into_iter().map(Value::Text).collect())
    }
}

/// Column-named rows of [`Value`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<Value>] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(GeoError::InvalidArgument(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Vec<Value>>) -> Result<()> {
        for row in rows {
            self.push_row(row)?;
        }
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Like [`Table::column_index`] but reports a missing column as an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| GeoError::InvalidArgument(format!("no column named '{name}'")))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Join keys of a column, `None` for cells without a key.
    pub fn column_keys(&self, name: &str) -> Result<Vec<Option<String>>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|r| r[idx].key()).collect())
    }

    /// Replace an existing column's cells, or append a new column.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(GeoError::InvalidArgument(format!(
                "column '{name}' has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) {
        if let Some(idx) = self.column_index(name) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
    }

    /// Projection onto the given columns, in that order.
    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        let idx: Vec<usize> = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<_>>()?;
        Ok(Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| idx.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&[Value]) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    /// Put rows in the given order; indices not listed are dropped.
    pub fn reorder(&mut self, order: &[usize]) {
        let mut slots: Vec<Option<Vec<Value>>> = std::mem::take(&mut self.rows).into_iter().map(Some).collect();
        self.rows = order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(["where", "cases"]);
        t.push_row(vec!["France".into(), 3.0.into()]).unwrap();
        t.push_row(vec!["Italy".into(), Value::Null]).unwrap();
        t.push_row(vec!["Chile".into(), 1.0.into()]).unwrap();
        t
    }

    #[test]
    fn push_row_checks_arity() {
        let mut t = sample();
        assert!(t.push_row(vec!["Spain".into()]).is_err());
    }

    #[test]
    fn reorder_permutes_and_drops() {
        let mut t = sample();
        t.reorder(&[2, 0]);
        let order: Vec<String> = t.rows().iter().map(|r| r[0].to_string()).collect();
        assert_eq!(order, ["Chile", "France"]);
    }

    #[test]
    fn number_keys_match_text_keys() {
        assert_eq!(Value::Number(75.0).key().as_deref(), Some("75"));
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
    }
}
