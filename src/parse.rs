//! Decoding of reference payloads into [`Table`]s: HTML tables, boundary
//! files (GeoJSON, TopoJSON, zipped shapefiles) and delimited text.

use crate::error::{GeoError, Result};
use crate::geometry::{self, Projection};
use crate::table::{Table, Value};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use regex::Regex;
use serde_json::{Map, Value as Json};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use std::io::{Cursor, Read, Seek};
use std::sync::OnceLock;
use zip::ZipArchive;
use zip::result::ZipError;

struct HtmlPatterns {
    table: Regex,
    row: Regex,
    cell: Regex,
    img: Regex,
    sup: Regex,
    tag: Regex,
    entity: Regex,
}

fn patterns() -> &'static HtmlPatterns {
    static P: OnceLock<HtmlPatterns> = OnceLock::new();
    P.get_or_init(|| HtmlPatterns {
        table: Regex::new(r"(?is)<table\b[^>]*>(.*?)</table>").unwrap(),
        row: Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").unwrap(),
        cell: Regex::new(r"(?is)<(th|td)\b[^>]*>(.*?)</(?:th|td)>").unwrap(),
        img: Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']*)["'][^>]*>"#).unwrap(),
        sup: Regex::new(r"(?is)<sup\b[^>]*>.*?</sup>").unwrap(),
        tag: Regex::new(r"(?s)<[^>]+>").unwrap(),
        entity: Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap(),
    })
}

fn decode_entities(s: &str) -> String {
    patterns()
        .entity
        .replace_all(s, |c: &regex::Captures| {
            let e = &c[1];
            let decoded = if let Some(hex) = e.strip_prefix("#x").or_else(|| e.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = e.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match e {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map(String::from).unwrap_or_else(|| c[0].to_string())
        })
        .into_owned()
}

/// Absolute form of an image link; protocol-relative links get `http:`.
pub fn absolute_src(src: &str) -> String {
    if src.starts_with("//") {
        format!("http:{src}")
    } else {
        src.to_string()
    }
}

/// Visible text of a cell. Images are replaced by their link, so a cell
/// holding a flag and a name reads `"<link> <name>"`.
fn cell_text(inner: &str) -> String {
    let p = patterns();
    let no_notes = p.sup.replace_all(inner, "");
    let linked = p
        .img
        .replace_all(&no_notes, |c: &regex::Captures| format!(" {} ", absolute_src(&c[1])));
    let text = p.tag.replace_all(&linked, " ");
    let text = decode_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Every `<table>` of an HTML document. A first row made only of `<th>`
/// cells becomes the header; otherwise columns are numbered from `0`.
/// Repeated header names get a `.1`, `.2`, … suffix.
pub fn html_tables(html: &str) -> Result<Vec<Table>> {
    let p = patterns();
    let mut out = Vec::new();
    for t in p.table.captures_iter(html) {
        let mut rows: Vec<(bool, Vec<String>)> = Vec::new();
        for r in p.row.captures_iter(&t[1]) {
            let cells: Vec<(bool, String)> = p
                .cell
                .captures_iter(&r[1])
                .map(|c| (c[1].eq_ignore_ascii_case("th"), cell_text(&c[2])))
                .collect();
            if cells.is_empty() {
                continue;
            }
            let all_th = cells.iter().all(|(th, _)| *th);
            rows.push((all_th, cells.into_iter().map(|(_, s)| s).collect()));
        }
        if rows.is_empty() {
            continue;
        }

        let width = rows.iter().map(|(_, r)| r.len()).max().unwrap_or(0);
        let header: Vec<String> = if rows[0].0 {
            let (_, h) = rows.remove(0);
            let mut seen: Vec<String> = Vec::with_capacity(width);
            for i in 0..width {
                let base = h.get(i).cloned().unwrap_or_else(|| i.to_string());
                let mut name = base.clone();
                let mut n = 1;
                while seen.contains(&name) {
                    name = format!("{base}.{n}");
                    n += 1;
                }
                seen.push(name);
            }
            seen
        } else {
            (0..width).map(|i| i.to_string()).collect()
        };

        let mut table = Table::new(header);
        for (_, cells) in rows {
            let mut row: Vec<Value> = cells
                .into_iter()
                .take(width)
                .map(|s| if s.is_empty() { Value::Null } else { Value::Text(s) })
                .collect();
            row.resize(width, Value::Null);
            table.push_row(row)?;
        }
        out.push(table);
    }
    Ok(out)
}

/// First HTML table whose header contains every one of `columns`.
pub fn html_table_with(html: &str, columns: &[&str]) -> Result<Table> {
    html_tables(html)?
        .into_iter()
        .find(|t| columns.iter().all(|c| t.has_column(c)))
        .ok_or_else(|| GeoError::SourceSchema(format!("no HTML table with columns {columns:?}")))
}

/// Number parsing for scraped cells: thousands separators, percent signs and
/// spaces are dropped; `N.A.` and blanks are missing.
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ',' | '%' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("n.a.") {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// One GeoJSON feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: Map<String, Json>,
    pub geometry: Option<MultiPolygon<f64>>,
}

impl Feature {
    /// Property as text; numbers are formatted, arrays give their first item.
    pub fn text(&self, key: &str) -> Option<String> {
        json_text(self.properties.get(key)?)
    }
}

fn json_text(v: &Json) -> Option<String> {
    match v {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Array(a) => a.first().and_then(json_text),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_feature(f: &Json) -> Result<Feature> {
    let mut properties = f
        .get("properties")
        .and_then(Json::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(id) = f.get("id") {
        properties.entry("id").or_insert_with(|| id.clone());
    }
    let geometry = match f.get("geometry") {
        Some(g) if !g.is_null() => geometry::from_geojson(g)?,
        _ => None,
    };
    Ok(Feature { properties, geometry })
}

/// Features of a GeoJSON `FeatureCollection` (or single `Feature`).
pub fn geojson_features(bytes: &[u8]) -> Result<Vec<Feature>> {
    let root: Json = serde_json::from_slice(bytes)?;
    geojson_root(&root)
}

fn geojson_root(root: &Json) -> Result<Vec<Feature>> {
    match root.get("type").and_then(Json::as_str) {
        Some("FeatureCollection") => root
            .get("features")
            .and_then(Json::as_array)
            .map(|fs| fs.iter().map(parse_feature).collect())
            .unwrap_or_else(|| Ok(Vec::new())),
        Some("Feature") => Ok(vec![parse_feature(root)?]),
        other => Err(GeoError::Parse(format!("unexpected GeoJSON type {other:?}"))),
    }
}

/// Features of a boundary file in any of the served containers: a zipped
/// shapefile, a TopoJSON topology or GeoJSON.
pub fn features(bytes: &[u8]) -> Result<Vec<Feature>> {
    layer_features(bytes, None)
}

/// Like [`features`], restricted to one layer: the shapefile stem inside a
/// zip archive, or the object name of a topology. Plain GeoJSON has a
/// single layer and ignores `layer`.
pub fn layer_features(bytes: &[u8], layer: Option<&str>) -> Result<Vec<Feature>> {
    if bytes.starts_with(b"PK\x03\x04") {
        return shapefile_features(bytes, layer);
    }
    if !bytes.trim_ascii_start().starts_with(b"{") {
        return Err(GeoError::Parse(
            "boundary payload is neither a zip archive nor a JSON document".into(),
        ));
    }
    let root: Json = serde_json::from_slice(bytes)?;
    match root.get("type").and_then(Json::as_str) {
        Some("Topology") => topojson_features(&root, layer),
        _ => geojson_root(&root),
    }
}

fn read_member<R: Read + Seek>(archive: &mut ZipArchive<R>, stem: &str, ext: &str) -> Result<Option<Vec<u8>>> {
    for name in [format!("{stem}.{ext}"), format!("{stem}.{}", ext.to_ascii_uppercase())] {
        match archive.by_name(&name) {
            Ok(mut file) => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf)?;
                return Ok(Some(buf));
            }
            Err(ZipError::FileNotFound) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(None)
}

/// Records of the `.shp`/`.dbf` pair of a zipped shapefile. Coordinates of
/// a transverse Mercator layer (per its `.prj`) are converted to degrees.
fn shapefile_features(bytes: &[u8], layer: Option<&str>) -> Result<Vec<Feature>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let stems: Vec<String> = archive
        .file_names()
        .filter_map(|n| n.strip_suffix(".shp").or_else(|| n.strip_suffix(".SHP")))
        .map(str::to_string)
        .collect();
    let stem = match layer {
        Some(l) => stems.iter().find(|s| s.rsplit('/').next() == Some(l)),
        None => stems.iter().min(),
    }
    .cloned()
    .ok_or_else(|| GeoError::Parse(format!("zip archive has no shapefile layer {}", layer.unwrap_or_default())))?;

    let missing = |ext: &str| GeoError::Parse(format!("shapefile layer '{stem}' has no .{ext} member"));
    let shp = read_member(&mut archive, &stem, "shp")?.ok_or_else(|| missing("shp"))?;
    let dbf = read_member(&mut archive, &stem, "dbf")?.ok_or_else(|| missing("dbf"))?;
    let projection = match read_member(&mut archive, &stem, "prj")? {
        Some(prj) => Projection::from_wkt(&String::from_utf8_lossy(&prj))?,
        None => Projection::Geographic,
    };

    let shapes = shapefile::ShapeReader::new(Cursor::new(shp))
        .and_then(|mut r| r.read())
        .map_err(|e| GeoError::Parse(format!("{stem}.shp: {e}")))?;
    let records = shapefile::dbase::Reader::new(Cursor::new(dbf))
        .and_then(|mut r| r.read())
        .map_err(|e| GeoError::Parse(format!("{stem}.dbf: {e}")))?;
    if shapes.len() != records.len() {
        return Err(GeoError::Parse(format!(
            "{stem}: {} shapes for {} records",
            shapes.len(),
            records.len()
        )));
    }
    Ok(shapes
        .iter()
        .zip(records)
        .map(|(shape, record)| Feature {
            properties: record_properties(record),
            geometry: shape_geometry(shape, &projection),
        })
        .collect())
}

fn number_json(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 9e15 {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
    }
}

fn record_properties(record: Record) -> Map<String, Json> {
    record
        .into_iter()
        .map(|(name, value)| {
            let v = match value {
                FieldValue::Character(Some(s)) => Json::String(s.trim().to_string()),
                FieldValue::Numeric(Some(n)) | FieldValue::Double(n) => number_json(n),
                FieldValue::Float(Some(n)) => number_json(n as f64),
                FieldValue::Integer(n) => Json::from(n),
                FieldValue::Logical(Some(b)) => Json::Bool(b),
                _ => Json::Null,
            };
            (name, v)
        })
        .collect()
}

/// Polygons of a shapefile shape; each outer ring opens a polygon and inner
/// rings are holes of the preceding one.
fn polygons<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> Vec<Polygon<f64>> {
    let mut parts: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(pts) => parts.push((pts.iter().map(&xy).collect(), Vec::new())),
            PolygonRing::Inner(pts) => {
                let hole: LineString<f64> = pts.iter().map(&xy).collect();
                match parts.last_mut() {
                    Some((_, holes)) => holes.push(hole),
                    None => parts.push((hole, Vec::new())),
                }
            }
        }
    }
    parts.into_iter().map(|(outer, holes)| Polygon::new(outer, holes)).collect()
}

fn shape_geometry(shape: &Shape, projection: &Projection) -> Option<MultiPolygon<f64>> {
    let to_coord = |x: f64, y: f64| {
        let (x, y) = projection.to_lonlat(x, y);
        Coord { x, y }
    };
    let parts = match shape {
        Shape::Polygon(p) => polygons(p.rings(), |pt| to_coord(pt.x, pt.y)),
        Shape::PolygonM(p) => polygons(p.rings(), |pt| to_coord(pt.x, pt.y)),
        Shape::PolygonZ(p) => polygons(p.rings(), |pt| to_coord(pt.x, pt.y)),
        _ => return None,
    };
    (!parts.is_empty()).then(|| MultiPolygon::new(parts))
}

fn topology_error(msg: impl Into<String>) -> GeoError {
    GeoError::Parse(format!("TopoJSON: {}", msg.into()))
}

fn position(p: &Json) -> Result<(f64, f64)> {
    match (p.get(0).and_then(Json::as_f64), p.get(1).and_then(Json::as_f64)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(topology_error(format!("bad position {p}"))),
    }
}

/// Absolute coordinates of every arc. Quantized topologies store the first
/// position of an arc and then deltas, scaled and translated by `transform`.
fn decode_arcs(root: &Json) -> Result<Vec<Vec<Coord<f64>>>> {
    let transform = match root.get("transform") {
        Some(t) => {
            let scale = position(t.get("scale").unwrap_or(&Json::Null))?;
            let translate = position(t.get("translate").unwrap_or(&Json::Null))?;
            Some((scale, translate))
        }
        None => None,
    };
    let arcs = root
        .get("arcs")
        .and_then(Json::as_array)
        .ok_or_else(|| topology_error("no arcs"))?;
    arcs.iter()
        .map(|arc| -> Result<Vec<Coord<f64>>> {
            let points = arc.as_array().ok_or_else(|| topology_error("arc is not an array"))?;
            let (mut qx, mut qy) = (0.0, 0.0);
            points
                .iter()
                .map(|p| -> Result<Coord<f64>> {
                    let (x, y) = position(p)?;
                    Ok(match transform {
                        Some(((sx, sy), (tx, ty))) => {
                            qx += x;
                            qy += y;
                            Coord { x: qx * sx + tx, y: qy * sy + ty }
                        }
                        None => Coord { x, y },
                    })
                })
                .collect()
        })
        .collect()
}

/// Ring stitched from arc references; `!i` walks arc `i` backwards. The
/// first point of every arc after the first repeats the previous end.
fn topo_ring(refs: &Json, arcs: &[Vec<Coord<f64>>]) -> Result<LineString<f64>> {
    let refs = refs.as_array().ok_or_else(|| topology_error("ring is not an array"))?;
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for r in refs {
        let i = r.as_i64().ok_or_else(|| topology_error(format!("bad arc index {r}")))?;
        let (idx, backwards) = if i < 0 { ((!i) as usize, true) } else { (i as usize, false) };
        let arc = arcs
            .get(idx)
            .ok_or_else(|| topology_error(format!("arc {i} out of range")))?;
        let skip = usize::from(!coords.is_empty());
        if backwards {
            coords.extend(arc.iter().rev().skip(skip).copied());
        } else {
            coords.extend(arc.iter().skip(skip).copied());
        }
    }
    Ok(LineString::new(coords))
}

fn topo_polygon(rings: &Json, arcs: &[Vec<Coord<f64>>]) -> Result<Option<Polygon<f64>>> {
    let rings = rings
        .as_array()
        .ok_or_else(|| topology_error("polygon is not an array"))?
        .iter()
        .map(|r| topo_ring(r, arcs))
        .collect::<Result<Vec<_>>>()?;
    let mut rings = rings.into_iter();
    Ok(rings.next().map(|outer| Polygon::new(outer, rings.collect())))
}

fn topo_feature(g: &Json, arcs: &[Vec<Coord<f64>>]) -> Result<Feature> {
    let mut properties = g
        .get("properties")
        .and_then(Json::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(id) = g.get("id") {
        properties.entry("id").or_insert_with(|| id.clone());
    }
    let refs = g.get("arcs").unwrap_or(&Json::Null);
    let parts: Vec<Polygon<f64>> = match g.get("type").and_then(Json::as_str) {
        Some("Polygon") => topo_polygon(refs, arcs)?.into_iter().collect(),
        Some("MultiPolygon") => refs
            .as_array()
            .ok_or_else(|| topology_error("multipolygon is not an array"))?
            .iter()
            .filter_map(|p| topo_polygon(p, arcs).transpose())
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };
    let geometry = (!parts.is_empty()).then(|| MultiPolygon::new(parts));
    Ok(Feature { properties, geometry })
}

/// Features of every object of a topology (or of the `layer` object only).
/// Geometry collections contribute one feature per member.
fn topojson_features(root: &Json, layer: Option<&str>) -> Result<Vec<Feature>> {
    let arcs = decode_arcs(root)?;
    let objects = root
        .get("objects")
        .and_then(Json::as_object)
        .ok_or_else(|| topology_error("no objects"))?;
    let mut out = Vec::new();
    for (name, object) in objects {
        if layer.is_some_and(|l| l != name) {
            continue;
        }
        let members: Vec<&Json> = match object.get("type").and_then(Json::as_str) {
            Some("GeometryCollection") => object
                .get("geometries")
                .and_then(Json::as_array)
                .map(|a| a.iter().collect())
                .unwrap_or_default(),
            _ => vec![object],
        };
        for g in members {
            out.push(topo_feature(g, &arcs)?);
        }
    }
    Ok(out)
}

fn json_cell(v: &Json) -> Value {
    match v {
        Json::Null => Value::Null,
        Json::String(s) => Value::Text(s.clone()),
        Json::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        Json::Bool(b) => Value::Text(b.to_string()),
        Json::Array(a) => Value::List(a.iter().map(json_cell).collect()),
        Json::Object(_) => Value::Text(v.to_string()),
    }
}

/// Features as a table: one column per property (first-seen order) plus
/// a trailing `geometry` column.
pub fn features_table(features: &[Feature]) -> Result<Table> {
    let mut columns: Vec<String> = Vec::new();
    for f in features {
        for k in f.properties.keys() {
            if !columns.contains(k) {
                columns.push(k.clone());
            }
        }
    }
    let mut table = Table::new(columns.iter().cloned().chain(["geometry".to_string()]));
    for f in features {
        let mut row: Vec<Value> = columns
            .iter()
            .map(|c| f.properties.get(c).map(json_cell).unwrap_or(Value::Null))
            .collect();
        row.push(f.geometry.clone().map(Value::Geometry).unwrap_or(Value::Null));
        table.push_row(row)?;
    }
    Ok(table)
}

/// Delimited text with a header row; blank cells are missing.
pub fn csv_table(bytes: &[u8], delimiter: u8) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();
    let mut table = Table::new(headers);
    for rec in rdr.records() {
        let rec = rec?;
        let mut row: Vec<Value> = rec
            .iter()
            .take(width)
            .map(|s| {
                let s = s.trim();
                if s.is_empty() { Value::Null } else { Value::Text(s.to_string()) }
            })
            .collect();
        row.resize(width, Value::Null);
        table.push_row(row)?;
    }
    Ok(table)
}
