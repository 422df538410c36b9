//! Map rendering of a table's `geometry` column to **SVG** or **PNG**.
//!
//! - Without a value column, shapes are colored from the Microsoft Office palette
//! - With one, shapes are shaded on a light-to-dark blue ramp (missing values in gray)
//! - The aspect ratio of the geometry is preserved

use crate::error::{GeoError, Result};
use crate::geometry;
use crate::table::Table;
use geo::{LineString, MultiPolygon};
use log::info;
use num_format::{Locale, ToFormattedString};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;

/// Microsoft Office (2013+) chart series palette.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

const RAMP_LOW: RGBColor = RGBColor(222, 235, 247);
const RAMP_HIGH: RGBColor = RGBColor(38, 68, 120);
const MISSING: RGBColor = RGBColor(217, 217, 217);

#[inline]
fn office_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

/// Linear blend between the ramp ends, `t` in `[0, 1]`.
fn ramp_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        mix(RAMP_LOW.0, RAMP_HIGH.0),
        mix(RAMP_LOW.1, RAMP_HIGH.1),
        mix(RAMP_LOW.2, RAMP_HIGH.2),
    )
}

fn render_err<E: std::fmt::Debug>(e: E) -> GeoError {
    GeoError::Render(format!("{e:?}"))
}

/// Render the `geometry` column of `table` to `out_path`; the extension
/// picks the format (`.svg`, anything else is a bitmap). With
/// `value_column`, shapes are shaded by that numeric column.
pub fn plot_map<P: AsRef<Path>>(
    table: &Table,
    out_path: P,
    width: u32,
    height: u32,
    value_column: Option<&str>,
) -> Result<()> {
    let geom = table.require_column("geometry")?;
    let values = value_column
        .map(|c| table.require_column(c))
        .transpose()?;

    let shapes: Vec<(&MultiPolygon<f64>, Option<f64>)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let g = row[geom].as_geometry()?;
            Some((g, values.and_then(|v| row[v].as_f64())))
        })
        .collect();
    if shapes.is_empty() {
        return Err(GeoError::InvalidArgument("no geometry to plot".into()));
    }

    let bbox = shapes
        .iter()
        .filter_map(|(g, _)| geometry::bounds(g))
        .reduce(|a, b| {
            geo::Rect::new(
                geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
        .ok_or_else(|| GeoError::InvalidArgument("geometries have no extent".into()))?;

    let range = shapes
        .iter()
        .filter_map(|(_, v)| *v)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });
    if let Some((lo, hi)) = range {
        info!(
            "shading {} shapes from {} to {}",
            shapes.len(),
            (lo.round() as i64).to_formatted_string(&Locale::en),
            (hi.round() as i64).to_formatted_string(&Locale::en)
        );
    }

    let colored: Vec<(&MultiPolygon<f64>, RGBColor)> = shapes
        .iter()
        .enumerate()
        .map(|(i, (g, v))| {
            let color = match (value_column, range, v) {
                (None, _, _) => office_color(i),
                (Some(_), Some((lo, hi)), Some(v)) if hi > lo => ramp_color((v - lo) / (hi - lo)),
                (Some(_), Some(_), Some(_)) => RAMP_HIGH,
                _ => MISSING,
            };
            (*g, color)
        })
        .collect();

    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let extent = fit_aspect(bbox, width, height);

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_map(root, &colored, extent)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_map(root, &colored, extent)?;
    }
    Ok(())
}

type Extent = ((f64, f64), (f64, f64));

/// Widen the bounding box so one degree has the same size on both axes.
fn fit_aspect(bbox: geo::Rect<f64>, width: u32, height: u32) -> Extent {
    let (mut x0, mut y0) = (bbox.min().x, bbox.min().y);
    let (mut x1, mut y1) = (bbox.max().x, bbox.max().y);
    let pad = 0.02 * (x1 - x0).max(y1 - y0).max(1e-6);
    x0 -= pad;
    x1 += pad;
    y0 -= pad;
    y1 += pad;

    let target = width.max(1) as f64 / height.max(1) as f64;
    let (dx, dy) = (x1 - x0, y1 - y0);
    if dx / dy > target {
        let grow = (dx / target - dy) / 2.0;
        y0 -= grow;
        y1 += grow;
    } else {
        let grow = (dy * target - dx) / 2.0;
        x0 -= grow;
        x1 += grow;
    }
    ((x0, x1), (y0, y1))
}

fn ring_points(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    ring.coords().map(|c| (c.x, c.y)).collect()
}

/// Helper that draws to any Plotters backend.
fn draw_map<DB>(
    root: DrawingArea<DB, Shift>,
    shapes: &[(&MultiPolygon<f64>, RGBColor)],
    extent: Extent,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(render_err)?;
    let ((x0, x1), (y0, y1)) = extent;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    for (g, color) in shapes {
        for poly in g.iter() {
            chart
                .draw_series(std::iter::once(Polygon::new(ring_points(poly.exterior()), color.filled())))
                .map_err(render_err)?;
            chart
                .draw_series(
                    poly.interiors()
                        .iter()
                        .map(|hole| Polygon::new(ring_points(hole), WHITE.filled())),
                )
                .map_err(render_err)?;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    ring_points(poly.exterior()),
                    BLACK.stroke_width(1),
                )))
                .map_err(render_err)?;
        }
    }
    root.present().map_err(render_err)?;
    Ok(())
}
