use epigeo::geometry::rect;
use epigeo::{viz, GeoError, Table, Value};
use std::fs;
use tempfile::tempdir;

fn sample_map() -> Table {
    let mut t = Table::new(["code_subregion", "cases", "geometry"]);
    for (i, (code, cases)) in [("29", Some(12.0)), ("56", Some(40.0)), ("22", None)].into_iter().enumerate() {
        let x = -5.0 + i as f64;
        t.push_row(vec![code.into(), cases.into(), Value::Geometry(rect((x, 47.0), (x + 1.0, 48.5)))])
            .unwrap();
    }
    t
}

#[test]
fn svg_map_is_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bretagne.svg");
    viz::plot_map(&sample_map(), &path, 400, 300, None).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("polygon"), "no shape drawn");
}

#[test]
fn choropleth_shades_by_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cases.svg");
    viz::plot_map(&sample_map(), &path, 400, 300, Some("cases")).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    // lowest value gets the light end of the ramp, missing values gray
    assert!(svg.contains("#DEEBF7"), "light ramp end missing");
    assert!(svg.contains("#D9D9D9"), "missing-value gray absent");
}

#[test]
fn png_map_is_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("map.png");
    viz::plot_map(&sample_map(), &path, 200, 150, None).unwrap();
    assert!(fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn table_without_shapes_is_rejected() {
    let dir = tempdir().unwrap();
    let mut t = Table::new(["code_subregion", "geometry"]);
    t.push_row(vec!["29".into(), Value::Null]).unwrap();
    let err = viz::plot_map(&t, dir.path().join("empty.svg"), 100, 100, None).unwrap_err();
    assert!(matches!(err, GeoError::InvalidArgument(_)));

    let err = viz::plot_map(&sample_map(), dir.path().join("x.svg"), 100, 100, Some("deaths")).unwrap_err();
    assert!(!matches!(err, GeoError::Render(_)));
}
