//! Geometry helpers over `geo` multipolygons: relocation, union, antimeridian
//! shifting and the text encodings used when tables are written out.

use crate::error::{GeoError, Result};
use geo::{BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect, Scale, Translate};
use regex::Regex;
use serde_json::{Value as Json, json};
use std::sync::OnceLock;

/// Move a geometry by `(dx, dy)` degrees.
pub fn translate(g: &MultiPolygon<f64>, dx: f64, dy: f64) -> MultiPolygon<f64> {
    g.translate(dx, dy)
}

/// Uniformly scale a geometry around `origin`.
pub fn scale_around(g: &MultiPolygon<f64>, factor: f64, origin: (f64, f64)) -> MultiPolygon<f64> {
    g.scale_around_point(factor, factor, Coord { x: origin.0, y: origin.1 })
}

/// Union of all geometries; empty input gives an empty multipolygon.
pub fn union_all<'a>(geoms: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let mut iter = geoms.into_iter();
    let Some(first) = iter.next() else {
        return MultiPolygon::new(vec![]);
    };
    iter.fold(first.clone(), |acc, g| acc.union(g))
}

/// Direction of an antimeridian shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatelineShift {
    /// Negative longitudes move to `x + 360`.
    East,
    /// Non-negative longitudes move to `x - 360`.
    West,
}

/// Rebuild every part from its exterior ring with longitudes on one side of
/// the date line moved across it, then merge the parts again.
pub fn shift_dateline(g: &MultiPolygon<f64>, shift: DatelineShift) -> MultiPolygon<f64> {
    let parts: Vec<MultiPolygon<f64>> = g
        .iter()
        .map(|poly| {
            let ring: Vec<Coord<f64>> = poly
                .exterior()
                .coords()
                .map(|c| {
                    let x = match shift {
                        DatelineShift::East if c.x < 0.0 => c.x + 360.0,
                        DatelineShift::West if c.x >= 0.0 => c.x - 360.0,
                        _ => c.x,
                    };
                    Coord { x, y: c.y }
                })
                .collect();
            MultiPolygon::new(vec![Polygon::new(LineString::from(ring), vec![])])
        })
        .collect();
    union_all(parts.iter())
}

/// Axis-aligned rectangle as a single-part multipolygon.
pub fn rect(min: (f64, f64), max: (f64, f64)) -> MultiPolygon<f64> {
    let r = Rect::new(Coord { x: min.0, y: min.1 }, Coord { x: max.0, y: max.1 });
    MultiPolygon::new(vec![r.to_polygon()])
}

pub fn bounds(g: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    g.bounding_rect()
}

/// Coordinate system of a shapefile layer, from the WKT of its `.prj`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Longitude and latitude in degrees.
    Geographic,
    /// Metric grid of a transverse Mercator projection (UTM, Greek Grid,
    /// British National Grid, ...). Datum shifts are not applied.
    TransverseMercator {
        semi_major: f64,
        flattening: f64,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    },
}

struct WktPatterns {
    projection: Regex,
    spheroid: Regex,
    parameter: Regex,
}

fn wkt_patterns() -> &'static WktPatterns {
    static P: OnceLock<WktPatterns> = OnceLock::new();
    P.get_or_init(|| WktPatterns {
        projection: Regex::new(r#"(?i)PROJECTION\["([^"]+)""#).unwrap(),
        spheroid: Regex::new(r#"(?i)SPHEROID\["[^"]*",\s*([0-9.eE+-]+),\s*([0-9.eE+-]+)"#).unwrap(),
        parameter: Regex::new(r#"(?i)PARAMETER\["([^"]+)",\s*([0-9.eE+-]+)\]"#).unwrap(),
    })
}

impl Projection {
    /// Read an ESRI WKT definition. Geographic systems need no conversion;
    /// projected ones other than transverse Mercator are rejected.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        if !wkt.trim_start().to_ascii_uppercase().starts_with("PROJCS") {
            return Ok(Projection::Geographic);
        }
        let p = wkt_patterns();
        let name = p
            .projection
            .captures(wkt)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        if !name.eq_ignore_ascii_case("Transverse_Mercator") {
            return Err(GeoError::Parse(format!("unsupported projection '{name}'")));
        }
        let (semi_major, inverse_flattening) = p
            .spheroid
            .captures(wkt)
            .and_then(|c| Some((c[1].parse::<f64>().ok()?, c[2].parse::<f64>().ok()?)))
            .ok_or_else(|| GeoError::Parse("projection without spheroid".into()))?;
        let param = |key: &str, default: f64| {
            p.parameter
                .captures_iter(wkt)
                .find(|c| c[1].eq_ignore_ascii_case(key))
                .and_then(|c| c[2].parse::<f64>().ok())
                .unwrap_or(default)
        };
        Ok(Projection::TransverseMercator {
            semi_major,
            flattening: if inverse_flattening == 0.0 { 0.0 } else { 1.0 / inverse_flattening },
            lon0: param("central_meridian", 0.0),
            lat0: param("latitude_of_origin", 0.0),
            k0: param("scale_factor", 1.0),
            false_easting: param("false_easting", 0.0),
            false_northing: param("false_northing", 0.0),
        })
    }

    /// Longitude and latitude of a point given in this system.
    pub fn to_lonlat(&self, x: f64, y: f64) -> (f64, f64) {
        match *self {
            Projection::Geographic => (x, y),
            Projection::TransverseMercator {
                semi_major: a,
                flattening: f,
                lon0,
                lat0,
                k0,
                false_easting,
                false_northing,
            } => {
                let e2 = f * (2.0 - f);
                let ep2 = e2 / (1.0 - e2);
                let m = meridian_arc(a, e2, lat0.to_radians()) + (y - false_northing) / k0;
                let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
                let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
                let phi1 = mu
                    + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
                    + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
                    + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
                    + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();
                let (sin1, cos1) = phi1.sin_cos();
                let tan1 = phi1.tan();
                let c1 = ep2 * cos1 * cos1;
                let t1 = tan1 * tan1;
                let w = 1.0 - e2 * sin1 * sin1;
                let n1 = a / w.sqrt();
                let r1 = a * (1.0 - e2) / w.powf(1.5);
                let d = (x - false_easting) / (n1 * k0);
                let lat = phi1
                    - (n1 * tan1 / r1)
                        * (d * d / 2.0
                            - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                            + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                                * d.powi(6)
                                / 720.0);
                let lon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                    + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5) / 120.0)
                    / cos1;
                (lon0 + lon.to_degrees(), lat.to_degrees())
            }
        }
    }
}

/// Distance along the meridian from the equator to latitude `phi` (radians).
fn meridian_arc(a: f64, e2: f64, phi: f64) -> f64 {
    a * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2.powi(3) / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e2 * e2 / 256.0 + 45.0 * e2.powi(3) / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e2.powi(3) / 3072.0) * (6.0 * phi).sin())
}

fn ring_coords(ring: &LineString<f64>) -> Vec<Json> {
    ring.coords().map(|c| json!([c.x, c.y])).collect()
}

/// GeoJSON geometry object for a multipolygon.
pub fn to_geojson(g: &MultiPolygon<f64>) -> Json {
    let coords: Vec<Json> = g
        .iter()
        .map(|p| {
            let mut rings = vec![Json::Array(ring_coords(p.exterior()))];
            rings.extend(p.interiors().iter().map(|r| Json::Array(ring_coords(r))));
            Json::Array(rings)
        })
        .collect();
    json!({ "type": "MultiPolygon", "coordinates": coords })
}

fn wkt_ring(ring: &LineString<f64>) -> String {
    let pts: Vec<String> = ring.coords().map(|c| format!("{} {}", c.x, c.y)).collect();
    format!("({})", pts.join(", "))
}

/// Well-known-text encoding, used for geometry cells in CSV output.
pub fn to_wkt(g: &MultiPolygon<f64>) -> String {
    if g.0.is_empty() {
        return "MULTIPOLYGON EMPTY".to_string();
    }
    let polys: Vec<String> = g
        .iter()
        .map(|p| {
            let mut rings = vec![wkt_ring(p.exterior())];
            rings.extend(p.interiors().iter().map(wkt_ring));
            format!("({})", rings.join(", "))
        })
        .collect();
    format!("MULTIPOLYGON ({})", polys.join(", "))
}

fn parse_ring(v: &Json) -> Result<LineString<f64>> {
    let pts = v
        .as_array()
        .ok_or_else(|| GeoError::Parse("ring is not an array".into()))?;
    let coords = pts
        .iter()
        .map(|p| {
            let x = p.get(0).and_then(Json::as_f64);
            let y = p.get(1).and_then(Json::as_f64);
            match (x, y) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(GeoError::Parse(format!("bad position {p}"))),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::from(coords))
}

fn parse_polygon(v: &Json) -> Result<Polygon<f64>> {
    let rings = v
        .as_array()
        .ok_or_else(|| GeoError::Parse("polygon is not an array".into()))?;
    let mut parsed = rings.iter().map(parse_ring).collect::<Result<Vec<_>>>()?;
    if parsed.is_empty() {
        return Err(GeoError::Parse("polygon without rings".into()));
    }
    let exterior = parsed.remove(0);
    Ok(Polygon::new(exterior, parsed))
}

/// Read a GeoJSON `Polygon` or `MultiPolygon` geometry object. Other
/// geometry types and `null` give `None`.
pub fn from_geojson(v: &Json) -> Result<Option<MultiPolygon<f64>>> {
    let kind = v.get("type").and_then(Json::as_str);
    let coords = v.get("coordinates");
    match (kind, coords) {
        (Some("Polygon"), Some(c)) => Ok(Some(MultiPolygon::new(vec![parse_polygon(c)?]))),
        (Some("MultiPolygon"), Some(c)) => {
            let polys = c
                .as_array()
                .ok_or_else(|| GeoError::Parse("multipolygon is not an array".into()))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(MultiPolygon::new(polys)))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn union_merges_adjacent_squares() {
        let a = rect((0.0, 0.0), (1.0, 1.0));
        let b = rect((1.0, 0.0), (2.0, 1.0));
        let u = union_all([&a, &b]);
        assert!((u.unsigned_area() - 2.0).abs() < 1e-9);
        assert_eq!(u.0.len(), 1);
    }

    #[test]
    fn dateline_shift_moves_negative_longitudes_east() {
        let g = rect((-179.0, 60.0), (-170.0, 65.0));
        let shifted = shift_dateline(&g, DatelineShift::East);
        let b = bounds(&shifted).unwrap();
        assert!((b.min().x - 181.0).abs() < 1e-9);
        assert!((b.max().x - 190.0).abs() < 1e-9);
    }

    #[test]
    fn scale_around_origin_shrinks_toward_it() {
        let g = rect((0.0, 0.0), (10.0, 10.0));
        let s = scale_around(&g, 0.5, (0.0, 0.0));
        let b = bounds(&s).unwrap();
        assert!((b.max().x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn geojson_polygon_is_read_as_multipolygon() {
        let v = json!({"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]});
        let g = from_geojson(&v).unwrap().unwrap();
        assert_eq!(g.0.len(), 1);
        assert!(to_wkt(&g).starts_with("MULTIPOLYGON (((0 0, 1 0"));
        assert_eq!(to_geojson(&g)["type"], "MultiPolygon");
    }

    const GREEK_GRID: &str = r#"PROJCS["GGRS87_Greek_Grid",GEOGCS["GCS_GGRS_1987",DATUM["D_GGRS_1987",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",24.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

    #[test]
    fn greek_grid_is_projected_back_to_degrees() {
        let p = Projection::from_wkt(GREEK_GRID).unwrap();
        let (lon, lat) = p.to_lonlat(500_000.0, 0.0);
        assert!((lon - 24.0).abs() < 1e-9 && lat.abs() < 1e-9);

        // on the central meridian the northing is the scaled meridian arc
        let e2 = (1.0 / 298.257222101) * (2.0 - 1.0 / 298.257222101);
        let y = 0.9996 * meridian_arc(6_378_137.0, e2, 38f64.to_radians());
        let (lon, lat) = p.to_lonlat(500_000.0, y);
        assert!((lon - 24.0).abs() < 1e-9);
        assert!((lat - 38.0).abs() < 1e-6);

        // east of the meridian stays east, roughly 1.14 degrees per 100 km at 38N
        let (lon, _) = p.to_lonlat(600_000.0, y);
        assert!(lon > 25.0 && lon < 25.3, "{lon}");
    }

    #[test]
    fn geographic_and_unknown_projections() {
        let wgs84 = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137,298.257223563]]]"#;
        assert_eq!(Projection::from_wkt(wgs84).unwrap(), Projection::Geographic);
        let lambert = GREEK_GRID.replace("Transverse_Mercator", "Lambert_Conformal_Conic");
        assert!(matches!(Projection::from_wkt(&lambert), Err(GeoError::Parse(_))));
    }
}
