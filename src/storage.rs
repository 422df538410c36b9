use crate::error::Result;
use crate::table::{Table, Value};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

// Spreadsheet applications evaluate cells starting with one of these.
const FORMULA_STARTERS: [char; 4] = ['=', '+', '-', '@'];

// Prefix of guarded cells; text already starting with it is guarded too.
const GUARD: char = '\'';

fn csv_cell(v: &Value) -> String {
    match v {
        Value::Text(s) if s.starts_with(FORMULA_STARTERS) || s.starts_with(GUARD) => format!("{GUARD}{s}"),
        other => other.to_string(),
    }
}

/// Save a table as CSV with header. Geometry cells are written as WKT, lists
/// as `[a, b]`, missing values as empty cells.
pub fn save_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(csv_cell))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a table as a pretty JSON array of objects, one per row. Geometry
/// cells become GeoJSON geometry objects.
pub fn save_json<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let records: Vec<serde_json::Value> = table
        .rows()
        .iter()
        .map(|row| {
            let obj: serde_json::Map<String, serde_json::Value> = table
                .columns()
                .iter()
                .zip(row)
                .map(|(c, v)| (c.clone(), v.to_json()))
                .collect();
            serde_json::Value::Object(obj)
        })
        .collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Read a CSV written by [`save_csv`] (or any headed CSV) as text cells.
/// The guard quote added on save is removed: one leading `'` is dropped
/// from every cell that has one.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut table = Table::new(rdr.headers()?.iter());
    for rec in rdr.records() {
        let row = rec?
            .iter()
            .map(|s| match s.strip_prefix(GUARD) {
                Some(rest) => Value::from(rest),
                None if s.is_empty() => Value::Null,
                _ => Value::from(s),
            })
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}
