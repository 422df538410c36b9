use epigeo::storage;
use epigeo::{Table, Value};
use std::fs;
use tempfile::tempdir;

fn sample(n: usize) -> Table {
    let mut t = Table::new(["where", "cases", "codes"]);
    for i in 0..n {
        t.push_row(vec![
            "Germany".into(),
            Value::Number(100.0 + i as f64),
            Value::from(vec!["DE".to_string(), "DEU".to_string()]),
        ])
        .unwrap();
    }
    t
}

#[test]
fn save_csv_and_json() {
    let rows = sample(3);
    let dir = tempdir().unwrap();

    let csv_path = dir.path().join("epigeo_test.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("where,cases,codes"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());
    assert!(csv_txt.contains("Germany,100,\"[DE, DEU]\""));

    let json_path = dir.path().join("epigeo_test.json");
    storage::save_json(&rows, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json_txt).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), rows.len());
    assert_eq!(arr[1]["cases"], serde_json::json!(101.0));
    assert_eq!(arr[0]["codes"], serde_json::json!(["DE", "DEU"]));
}

#[test]
fn geometry_is_written_as_wkt_and_geojson() {
    let mut t = Table::new(["code_subregion", "geometry"]);
    t.push_row(vec![
        "75".into(),
        Value::Geometry(epigeo::geometry::rect((2.0, 48.0), (3.0, 49.0))),
    ])
    .unwrap();
    let dir = tempdir().unwrap();

    let csv_path = dir.path().join("g.csv");
    storage::save_csv(&t, &csv_path).unwrap();
    let back = storage::load_csv(&csv_path).unwrap();
    let wkt = back.get(0, "geometry").unwrap().as_str().unwrap();
    assert!(wkt.starts_with("MULTIPOLYGON"), "{wkt}");

    let json_path = dir.path().join("g.json");
    storage::save_json(&t, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v[0]["geometry"]["type"], "MultiPolygon");
}

//test if the CSV file is save and won't include executable formulas
//this is a security issue, as the CSV file can be opened in Excel and the formulas
//can be executed, which can lead to data loss or other issues
//we prefix the cells with a single quote to avoid this issue
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    // Arrange: craft a row with classic CSV/Excel injection starters
    let mut t = Table::new(["where", "name_region", "name_subregion", "cases"]);
    t.push_row(vec![
        "=HYPERLINK(\"http://evil\")".into(), // leading '='
        "+SUM(A1:A9)".into(),                 // leading '+'
        "@foo".into(),                        // leading '@'
        Value::Number(-3.0),
    ])
    .unwrap();

    let dir = tempdir().unwrap();
    let tmp = dir.path().join("csv_injection.csv");
    storage::save_csv(&t, &tmp).unwrap();

    // Parse the CSV back and inspect the fields semantically
    let mut rdr = csv::Reader::from_path(&tmp).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let mut rows = rdr.records();
    let row = rows.next().expect("one data row expected").unwrap();

    let cell = |name: &str| {
        let idx = headers.iter().position(|h| h == name).expect("header present");
        row.get(idx).unwrap().to_string()
    };

    let w = cell("where");
    assert!(w.starts_with('\''), "where not prefixed: {w}");
    assert!(w.contains("=HYPERLINK"), "where content changed: {w}");

    let r = cell("name_region");
    assert!(r.starts_with('\''), "name_region not prefixed: {r}");
    assert!(r.contains("+SUM"), "name_region content changed: {r}");

    let s = cell("name_subregion");
    assert!(s.starts_with('\''), "name_subregion not prefixed: {s}");

    // numbers are data, not text
    assert_eq!(cell("cases"), "-3");
}
