//! Byte-level builders for zipped shapefile fixtures.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Clockwise square ring with its south-west corner at `(x, y)`.
pub fn square(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![(x, y), (x, y + size), (x + size, y + size), (x + size, y), (x, y)]
}

fn bbox(points: impl Iterator<Item = (f64, f64)>) -> [f64; 4] {
    points.fold(
        [f64::MAX, f64::MAX, f64::MIN, f64::MIN],
        |[x0, y0, x1, y1], (x, y)| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
    )
}

/// `.shp` body of polygon shapes, each a list of rings.
pub fn shp(shapes: &[Vec<Vec<(f64, f64)>>]) -> Vec<u8> {
    let mut records = Vec::new();
    for (i, rings) in shapes.iter().enumerate() {
        let points: Vec<(f64, f64)> = rings.iter().flatten().copied().collect();
        let mut content = Vec::new();
        content.extend(5i32.to_le_bytes());
        for v in bbox(points.iter().copied()) {
            content.extend(v.to_le_bytes());
        }
        content.extend((rings.len() as i32).to_le_bytes());
        content.extend((points.len() as i32).to_le_bytes());
        let mut start = 0i32;
        for ring in rings {
            content.extend(start.to_le_bytes());
            start += ring.len() as i32;
        }
        for (x, y) in &points {
            content.extend(x.to_le_bytes());
            content.extend(y.to_le_bytes());
        }
        records.extend((i as i32 + 1).to_be_bytes());
        records.extend((content.len() as i32 / 2).to_be_bytes());
        records.extend(content);
    }

    let all = shapes.iter().flatten().flatten().copied();
    let mut out = Vec::with_capacity(100 + records.len());
    out.extend(9994i32.to_be_bytes());
    out.extend([0u8; 20]);
    out.extend(((100 + records.len()) as i32 / 2).to_be_bytes());
    out.extend(1000i32.to_le_bytes());
    out.extend(5i32.to_le_bytes());
    for v in bbox(all) {
        out.extend(v.to_le_bytes());
    }
    out.extend([0u8; 32]);
    out.extend(records);
    out
}

/// `.dbf` body. Fields are `(name, b'C' | b'N', width)`; values are written
/// as given, left-aligned for text and right-aligned for numbers.
pub fn dbf(fields: &[(&str, u8, u8)], records: &[Vec<&str>]) -> Vec<u8> {
    let record_len: u16 = 1 + fields.iter().map(|f| f.2 as u16).sum::<u16>();
    let header_len = 32 + 32 * fields.len() as u16 + 1;
    let mut out = vec![0x03, 124, 1, 1];
    out.extend((records.len() as u32).to_le_bytes());
    out.extend(header_len.to_le_bytes());
    out.extend(record_len.to_le_bytes());
    out.extend([0u8; 20]);
    for &(name, kind, width) in fields {
        let mut desc = [0u8; 32];
        desc[..name.len()].copy_from_slice(name.as_bytes());
        desc[11] = kind;
        desc[16] = width;
        out.extend(desc);
    }
    out.push(0x0d);
    for record in records {
        out.push(b' ');
        for (&(_, kind, width), value) in fields.iter().zip(record) {
            let width = width as usize;
            let bytes = value.as_bytes();
            let pad = vec![b' '; width.saturating_sub(bytes.len())];
            if kind == b'N' {
                out.extend(&pad);
                out.extend(bytes);
            } else {
                out.extend(bytes);
                out.extend(&pad);
            }
        }
    }
    out.push(0x1a);
    out
}

/// Members of one shapefile layer named `stem`.
pub fn layer(
    stem: &str,
    fields: &[(&str, u8, u8)],
    rows: &[(Vec<Vec<(f64, f64)>>, Vec<&str>)],
    prj: Option<&str>,
) -> Vec<(String, Vec<u8>)> {
    let shapes: Vec<Vec<Vec<(f64, f64)>>> = rows.iter().map(|(s, _)| s.clone()).collect();
    let records: Vec<Vec<&str>> = rows.iter().map(|(_, r)| r.clone()).collect();
    let mut members = vec![
        (format!("{stem}.shp"), shp(&shapes)),
        (format!("{stem}.dbf"), dbf(fields, &records)),
    ];
    if let Some(prj) = prj {
        members.push((format!("{stem}.prj"), prj.as_bytes().to_vec()));
    }
    members
}

pub fn zip(members: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut w = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in members {
        w.start_file(name.as_str(), SimpleFileOptions::default()).unwrap();
        w.write_all(body).unwrap();
    }
    w.finish().unwrap().into_inner()
}

/// A zip archive holding a single layer.
pub fn shapefile_zip(
    stem: &str,
    fields: &[(&str, u8, u8)],
    rows: &[(Vec<Vec<(f64, f64)>>, Vec<&str>)],
    prj: Option<&str>,
) -> Vec<u8> {
    zip(&layer(stem, fields, rows, prj))
}
