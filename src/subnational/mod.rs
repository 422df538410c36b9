//! Sub-national boundaries of a handful of countries, with region/subregion
//! lookups and alternative map layouts.
//!
//! A store is bound to one country at construction and reads its boundary
//! file (plus any side tables) once. Rows are subregions; each belongs to one
//! region. The region-level view is derived on demand by merging subregions.

mod japan;
mod layout;
mod loaders;

use crate::error::{GeoError, Result};
use crate::fetch::Fetch;
use crate::frame;
use crate::geometry;
use crate::models::OutputField;
use crate::table::{Table, Value};
use crate::util::{squash_key, title_case};
use geo::MultiPolygon;
use log::debug;
use loaders::{BASE_COLUMNS, COUNTRIES, CountrySpec, country_spec};
use std::cell::OnceCell;

/// Map layout of the subregion geometries. Once chosen it cannot change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryLayout {
    /// Only subregions at their true position; relocated ones are dropped.
    Main,
    /// Remote subregions moved next to the mainland.
    Dense,
    /// Dense, plus a zoomed inset of the capital area.
    Exploded,
}

/// Region selector: exactly one of `name` or `code`.
#[derive(Debug, Clone, Default)]
pub struct RegionQuery {
    pub name: Option<String>,
    pub code: Option<String>,
    pub output: OutputField,
}

impl RegionQuery {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn output(mut self, output: OutputField) -> Self {
        self.output = output;
        self
    }
}

/// Options of [`SubnationalGeometryStore::add_field`].
#[derive(Debug, Clone)]
pub struct FieldJoin {
    pub fields: Vec<String>,
    /// Column of the input table holding the location keys.
    pub input_key: String,
    /// Store column matched against `input_key`.
    pub geofield: String,
    /// Join on the region-level table. Defaults to whether `geofield` is a
    /// region column.
    pub region_merging: Option<bool>,
    pub overload: bool,
}

impl FieldJoin {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            input_key: "where".to_string(),
            geofield: "code_subregion".to_string(),
            region_merging: None,
            overload: false,
        }
    }
}

fn output_column(output: OutputField, level: &str) -> String {
    match output {
        OutputField::Code => format!("code_{level}"),
        OutputField::Name => format!("name_{level}"),
    }
}

/// Sub-national geometry and attributes of one country.
#[derive(Debug, Default)]
pub struct SubnationalGeometryStore {
    country: Option<&'static str>,
    data: Table,
    layout: Option<GeometryLayout>,
    subregions: OnceCell<Table>,
    regions: OnceCell<Table>,
}

impl SubnationalGeometryStore {
    /// Store for `country` (ISO3, or `EUR` for Europe), or an empty store
    /// when `None`. Reference files are read through `fetcher`.
    ///
    /// # Arguments
    ///
    /// * `country` - case-insensitive ISO3 code of a supported country.
    /// * `fetcher` - source of the boundary files and attribute pages.
    ///
    /// # Errors
    ///
    /// * [`GeoError::UnsupportedCountry`] when no loader exists for `country`.
    /// * [`GeoError::SourceSchema`] when a reference file lacks the
    ///   properties or columns its loader reads.
    /// * Download and decoding errors ([`GeoError::Http`], [`GeoError::Zip`],
    ///   [`GeoError::Parse`], ...) of the reference files.
    pub fn new(country: Option<&str>, fetcher: &dyn Fetch) -> Result<Self> {
        let Some(country) = country else {
            return Ok(Self::default());
        };
        let spec = Self::spec_for(country)?;
        let data = (spec.load)(fetcher)?;
        Self::from_table(spec.iso3, data)
    }

    /// Store over an already loaded subregion table.
    pub fn from_table(country: &str, data: Table) -> Result<Self> {
        let spec = Self::spec_for(country)?;
        if let Some(missing) = BASE_COLUMNS.iter().find(|c| !data.has_column(c)) {
            return Err(GeoError::SourceSchema(format!("{country} table has no '{missing}' column")));
        }
        debug!("{} subregions loaded for {}", data.len(), spec.iso3);
        Ok(Self {
            country: Some(spec.iso3),
            data,
            ..Default::default()
        })
    }

    fn spec_for(country: &str) -> Result<&'static CountrySpec> {
        country_spec(&country.trim().to_uppercase()).ok_or_else(|| GeoError::UnsupportedCountry(country.to_string()))
    }

    fn spec(&self) -> Result<&'static CountrySpec> {
        let iso3 = self.country.ok_or(GeoError::NotInitialized)?;
        country_spec(iso3).ok_or_else(|| GeoError::UnsupportedCountry(iso3.to_string()))
    }

    /// Supported countries, sorted.
    pub fn list_countries() -> Vec<&'static str> {
        let mut v: Vec<&str> = COUNTRIES.iter().map(|c| c.iso3).collect();
        v.sort_unstable();
        v
    }

    pub fn country(&self) -> Option<&'static str> {
        self.country
    }

    pub fn is_init(&self) -> bool {
        self.country.is_some()
    }

    /// Attribution of the upstream files: those of the current country, or
    /// of every country (labels prefixed by the country code) when empty.
    pub fn source(&self) -> Vec<(String, &'static str)> {
        match self.country.and_then(country_spec) {
            Some(spec) => spec.sources.iter().map(|(l, u)| (l.to_string(), *u)).collect(),
            None => COUNTRIES
                .iter()
                .flat_map(|c| c.sources.iter().map(move |(l, u)| (format!("{} {l}", c.iso3), *u)))
                .collect(),
        }
    }

    /// Column names of the subregion table, sorted.
    pub fn list_properties(&self) -> Result<Vec<String>> {
        self.spec()?;
        let mut cols = self.data.columns().to_vec();
        cols.sort();
        Ok(cols)
    }

    pub fn layout(&self) -> Option<GeometryLayout> {
        self.layout
    }

    pub fn is_main_geometry(&self) -> bool {
        self.layout == Some(GeometryLayout::Main)
    }

    pub fn is_dense_geometry(&self) -> bool {
        self.layout == Some(GeometryLayout::Dense)
    }

    pub fn is_exploded_geometry(&self) -> bool {
        self.layout == Some(GeometryLayout::Exploded)
    }

    fn reset_views(&mut self) {
        self.subregions = OnceCell::new();
        self.regions = OnceCell::new();
    }

    fn drop_codes(&mut self, codes: &[&str]) -> Result<()> {
        let idx = self.data.require_column("code_subregion")?;
        self.data
            .retain(|row| !row[idx].key().is_some_and(|k| codes.contains(&k.as_str())));
        Ok(())
    }

    fn map_geometry(&mut self, mut f: impl FnMut(&str, &MultiPolygon<f64>) -> Option<MultiPolygon<f64>>) -> Result<()> {
        let code = self.data.require_column("code_subregion")?;
        let geom = self.data.require_column("geometry")?;
        for row in self.data.rows_mut() {
            let Some(key) = row[code].key() else { continue };
            if let Value::Geometry(g) = &row[geom] {
                if let Some(moved) = f(&key, g) {
                    row[geom] = Value::Geometry(moved);
                }
            }
        }
        Ok(())
    }

    /// Move remote subregions next to the mainland.
    pub fn set_dense_geometry(&mut self) -> Result<()> {
        let spec = self.spec()?;
        match self.layout {
            Some(GeometryLayout::Dense) => return Ok(()),
            Some(GeometryLayout::Main) => {
                return Err(GeoError::GeometryState(
                    "main geometry already set, cannot switch to dense".into(),
                ));
            }
            Some(GeometryLayout::Exploded) => {
                return Err(GeoError::GeometryState(
                    "exploded geometry already set, cannot switch to dense".into(),
                ));
            }
            None => {}
        }
        if spec.relocation.is_empty() {
            return Err(GeoError::UnsupportedCountry(format!("{} has no dense geometry", spec.iso3)));
        }
        self.map_geometry(|code, g| {
            let r = spec.relocation.iter().find(|r| r.code == code)?;
            let moved = geometry::translate(g, r.offset.0, r.offset.1);
            Some(match r.scale {
                Some((factor, origin)) => geometry::scale_around(&moved, factor, origin),
                None => moved,
            })
        })?;
        self.drop_codes(spec.fragmented)?;
        self.layout = Some(GeometryLayout::Dense);
        self.reset_views();
        Ok(())
    }

    /// Dense layout plus a zoomed inset of the capital area, where the
    /// country defines one.
    pub fn set_exploded_geometry(&mut self) -> Result<()> {
        let spec = self.spec()?;
        match self.layout {
            Some(GeometryLayout::Exploded) => return Ok(()),
            Some(GeometryLayout::Main) => {
                return Err(GeoError::GeometryState(
                    "main geometry already set, cannot switch to exploded".into(),
                ));
            }
            Some(GeometryLayout::Dense) => {
                return Err(GeoError::GeometryState(
                    "dense geometry already set, cannot switch to exploded".into(),
                ));
            }
            None => {}
        }
        self.set_dense_geometry()?;
        if let Some(inset) = spec.inset {
            self.map_geometry(|code, g| {
                inset.codes.contains(&code).then(|| {
                    let moved = geometry::translate(g, inset.offset.0, inset.offset.1);
                    geometry::scale_around(&moved, inset.factor, inset.origin)
                })
            })?;
        }
        self.layout = Some(GeometryLayout::Exploded);
        self.reset_views();
        Ok(())
    }

    /// Keep only subregions at their true position.
    pub fn set_main_geometry(&mut self) -> Result<()> {
        let spec = self.spec()?;
        match self.layout {
            Some(GeometryLayout::Main) => return Ok(()),
            Some(_) => {
                return Err(GeoError::GeometryState(
                    "dense or exploded geometry already set, cannot switch to main".into(),
                ));
            }
            None => {}
        }
        if !spec.relocation.is_empty() {
            let relocated: Vec<&str> = spec.relocation.iter().map(|r| r.code).collect();
            self.drop_codes(&relocated)?;
            self.drop_codes(spec.fragmented)?;
        }
        self.layout = Some(GeometryLayout::Main);
        self.reset_views();
        Ok(())
    }

    /// Subregion table sorted by subregion code, or with `region_version`
    /// the region table sorted by region code.
    pub fn get_data(&self, region_version: bool) -> Result<&Table> {
        let spec = self.spec()?;
        let cell = if region_version { &self.regions } else { &self.subregions };
        if let Some(t) = cell.get() {
            return Ok(t);
        }
        let built = if region_version {
            self.build_regions(spec)?
        } else {
            let mut t = self.data.clone();
            frame::sort_by(&mut t, "code_subregion")?;
            t
        };
        Ok(cell.get_or_init(|| built))
    }

    /// Merge subregions by region: geometries are unioned, numeric
    /// subregion attributes summed, subregion codes and names listed.
    fn build_regions(&self, spec: &CountrySpec) -> Result<Table> {
        let mut data = self.data.clone();
        let region_cols: Vec<String> = data
            .columns()
            .iter()
            .filter(|c| c.contains("_region"))
            .cloned()
            .collect();
        let numeric: Vec<String> = data
            .columns()
            .iter()
            .filter(|c| c.contains("_subregion"))
            .filter(|c| {
                let mut values = data.column(c).unwrap_or_default().into_iter().filter(|v| !v.is_null()).peekable();
                values.peek().is_some() && values.all(|v| matches!(v, Value::Number(_)))
            })
            .cloned()
            .collect();

        if let Some(pseudo) = spec.pseudo_regions {
            let code_reg = data.require_column("code_region")?;
            let name_reg = data.require_column("name_region")?;
            let flag_reg = data.column_index("flag_region");
            let mut mainland = Vec::new();
            let mut outlying = Vec::new();
            for row in data.rows() {
                let code = row[code_reg].key().unwrap_or_default();
                let ((c, n), bucket) = if (pseudo.is_outlying)(&code) {
                    (pseudo.outlying, &mut outlying)
                } else {
                    (pseudo.mainland, &mut mainland)
                };
                let mut r = row.clone();
                r[code_reg] = c.into();
                r[name_reg] = n.into();
                if let Some(f) = flag_reg {
                    r[f] = "".into();
                }
                bucket.push(r);
            }
            data.extend_rows(mainland)?;
            data.extend_rows(outlying)?;
        }

        let keys: Vec<&str> = region_cols.iter().map(String::as_str).collect();
        let sums: Vec<&str> = numeric.iter().map(String::as_str).collect();
        let groups = frame::group_sum(&data, &keys, &sums)?;

        let geom = data.require_column("geometry")?;
        let code_sub = data.require_column("code_subregion")?;
        let name_sub = data.require_column("name_subregion")?;
        let heads: Vec<usize> = keys.iter().map(|k| data.require_column(k)).collect::<Result<_>>()?;
        let columns = region_cols
            .iter()
            .cloned()
            .chain(["geometry".to_string()])
            .chain(numeric.iter().map(|c| c.replace("_subregion", "_region")))
            .chain(["code_subregion".to_string(), "name_subregion".to_string()]);
        let mut out = Table::new(columns);
        for g in groups {
            let members: Vec<&[Value]> = g.rows.iter().map(|&i| data.rows()[i].as_slice()).collect();
            let Some(head) = members.first() else { continue };
            let mut row: Vec<Value> = heads.iter().map(|&i| head[i].clone()).collect();
            let shapes: Vec<&MultiPolygon<f64>> = members.iter().filter_map(|r| r[geom].as_geometry()).collect();
            row.push(if shapes.is_empty() {
                Value::Null
            } else {
                Value::Geometry(geometry::union_all(shapes))
            });
            row.extend(g.sums.into_iter().map(Value::from));
            row.push(Value::List(members.iter().map(|r| r[code_sub].clone()).collect()));
            row.push(Value::List(members.iter().map(|r| r[name_sub].clone()).collect()));
            out.push_row(row)?;
        }
        frame::sort_by(&mut out, "code_region")?;
        Ok(out)
    }

    fn level_list(&self, region_version: bool) -> Result<Table> {
        let level = if region_version { "_region" } else { "_subregion" };
        let data = self.get_data(region_version)?;
        let mut cols: Vec<&str> = data
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|c| c.contains(level))
            .collect();
        cols.sort_unstable();
        cols.push("geometry");
        data.select(&cols)
    }

    /// Region columns of the region table, plus geometry.
    pub fn get_region_list(&self) -> Result<Table> {
        self.level_list(true)
    }

    /// Subregion columns of the subregion table, plus geometry.
    pub fn get_subregion_list(&self) -> Result<Table> {
        self.level_list(false)
    }

    fn texts(t: &Table, column: &str) -> Result<Vec<String>> {
        Ok(t.column_keys(column)?.into_iter().map(Option::unwrap_or_default).collect())
    }

    /// Canonical spelling of a region name, if it is one.
    pub fn is_region(&self, name: &str) -> Result<Option<String>> {
        let key = squash_key(name);
        Ok(Self::texts(self.get_data(true)?, "name_region")?
            .into_iter()
            .find(|n| squash_key(n) == key))
    }

    /// Canonical spelling of a subregion given by name, or by code when no
    /// name matches.
    pub fn is_subregion(&self, name: &str) -> Result<Option<String>> {
        let data = self.get_data(false)?;
        let names = Self::texts(data, "name_subregion")?;
        let key = squash_key(name);
        if let Some(n) = names.iter().find(|n| squash_key(n) == key) {
            return Ok(Some(n.clone()));
        }
        let codes = Self::texts(data, "code_subregion")?;
        let mut hits = codes.iter().zip(&names).filter(|(c, _)| c.as_str() == name);
        match (hits.next(), hits.next()) {
            (Some((_, n)), None) => Ok(Some(n.clone())),
            _ => Ok(None),
        }
    }

    /// Row of the region table selected by `query`.
    fn region_row(&self, query: &RegionQuery) -> Result<usize> {
        let regions = self.get_data(true)?;
        match (&query.name, &query.code) {
            (Some(name), None) => {
                let wanted = title_case(name);
                Self::texts(regions, "name_region")?
                    .iter()
                    .position(|n| title_case(n) == wanted)
                    .ok_or_else(|| GeoError::UnknownRegion(name.clone()))
            }
            (None, Some(code)) => Self::texts(regions, "code_region")?
                .iter()
                .position(|c| c == code)
                .ok_or_else(|| GeoError::UnknownRegion(code.clone())),
            _ => Err(GeoError::InvalidArgument(
                "give either the code or the name of the region, not both".into(),
            )),
        }
    }

    /// Subregions of one region, as codes or names.
    pub fn get_subregions_from_region(&self, query: &RegionQuery) -> Result<Vec<String>> {
        let row = self.region_row(query)?;
        let column = output_column(query.output, "subregion");
        let cell = self
            .get_data(true)?
            .get(row, &column)
            .and_then(Value::as_list)
            .unwrap_or_default();
        Ok(cell.iter().filter_map(Value::key).collect())
    }

    /// Concatenated subregions of several regions given by name.
    pub fn get_subregions_from_region_names<S: AsRef<str>>(
        &self,
        names: &[S],
        output: OutputField,
    ) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for n in names {
            out.extend(self.get_subregions_from_region(&RegionQuery::name(n.as_ref()).output(output))?);
        }
        Ok(out)
    }

    /// Regions containing the subregion `code`, without duplicates, in
    /// region-table order.
    pub fn get_regions_from_subregion(&self, code: &str, output: OutputField) -> Result<Vec<String>> {
        let known = Self::texts(self.get_data(false)?, "code_subregion")?;
        if !known.iter().any(|c| c == code) {
            return Err(GeoError::UnknownSubregion(code.to_string()));
        }
        let regions = self.get_data(true)?;
        let column = output_column(output, "region");
        let mut out: Vec<String> = Vec::new();
        for r in 0..regions.len() {
            let contains = regions
                .get(r, "code_subregion")
                .and_then(Value::as_list)
                .is_some_and(|codes| codes.iter().any(|c| c.key().as_deref() == Some(code)));
            if !contains {
                continue;
            }
            if let Some(v) = regions.get(r, &column).and_then(Value::key) {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        Ok(out)
    }

    /// Regions of several subregions, without duplicates.
    pub fn get_regions_from_subregion_codes<S: AsRef<str>>(
        &self,
        codes: &[S],
        output: OutputField,
    ) -> Result<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        for c in codes {
            for r in self.get_regions_from_subregion(c.as_ref(), output)? {
                if !out.contains(&r) {
                    out.push(r);
                }
            }
        }
        Ok(out)
    }

    /// Every region sharing a subregion with the queried one. A plain
    /// region comes first, followed by the groupings containing it; a
    /// grouping comes last, after its member regions.
    pub fn get_regions_from_macroregion(&self, query: &RegionQuery) -> Result<Vec<String>> {
        let row = self.region_row(query)?;
        let subregions = self.get_subregions_from_region(&RegionQuery {
            output: OutputField::Code,
            ..query.clone()
        })?;
        let mut out = self.get_regions_from_subregion_codes(&subregions, query.output)?;
        let column = output_column(query.output, "region");
        let itself = self
            .get_data(true)?
            .get(row, &column)
            .and_then(Value::key)
            .unwrap_or_default();
        out.retain(|r| *r != itself);
        if out.len() == 1 {
            out.insert(0, itself);
        } else {
            out.push(itself);
        }
        Ok(out)
    }

    /// Left-join store attributes onto `input`, matching `join.input_key`
    /// against `join.geofield`.
    pub fn add_field(&self, input: &Table, join: &FieldJoin) -> Result<Table> {
        self.spec()?;
        if !input.has_column(&join.input_key) {
            return Err(GeoError::InvalidArgument(format!(
                "'{}' is not a column of the input table",
                join.input_key
            )));
        }
        if join.fields.is_empty() {
            return Err(GeoError::InvalidArgument("no field given".into()));
        }
        let region_merging = join.region_merging.unwrap_or_else(|| join.geofield.contains("_region"));
        let source = self.get_data(region_merging)?;
        if !source.has_column(&join.geofield) {
            return Err(GeoError::UnknownField(join.geofield.clone()));
        }
        if let Some(f) = join.fields.iter().find(|f| !source.has_column(f)) {
            return Err(GeoError::UnknownField(f.clone()));
        }
        if !join.overload {
            if let Some(f) = join.fields.iter().find(|f| input.has_column(f)) {
                return Err(GeoError::FieldConflict(f.clone()));
            }
        }
        let fields: Vec<&str> = join.fields.iter().map(String::as_str).collect();
        frame::left_join(input, &join.input_key, source, &join.geofield, &fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{BoundingRect, Coord};

    fn square(x: f64, y: f64) -> Value {
        Value::Geometry(geometry::rect((x, y), (x + 1.0, y + 1.0)))
    }

    /// Two mainland regions, one overseas department and the capital.
    fn france() -> SubnationalGeometryStore {
        let mut t = Table::new([
            "code_subregion",
            "name_subregion",
            "code_region",
            "name_region",
            "geometry",
            "population_subregion",
        ]);
        let rows = [
            ("75", "Paris", "11", "Île-de-France", (2.0, 48.0), 2_100_000.0),
            ("92", "Hauts-de-Seine", "11", "Île-de-France", (2.0, 47.0), 1_600_000.0),
            ("29", "Finistère", "53", "Bretagne", (-4.0, 48.0), 900_000.0),
            ("974", "La Réunion", "04", "La Réunion", (55.0, -21.0), 860_000.0),
            ("980", "Collectivités d'outre-mer", "09", "Collectivités d'outre-mer", (-150.0, -17.0), 340_000.0),
        ];
        for (code, name, reg, reg_name, (x, y), pop) in rows {
            t.push_row(vec![
                code.into(),
                name.into(),
                reg.into(),
                reg_name.into(),
                square(x, y),
                pop.into(),
            ])
            .unwrap();
        }
        SubnationalGeometryStore::from_table("FRA", t).unwrap()
    }

    fn min_corner(store: &SubnationalGeometryStore, code: &str) -> Coord<f64> {
        let t = store.get_data(false).unwrap();
        let row = (0..t.len())
            .find(|&r| t.get(r, "code_subregion").unwrap().as_str() == Some(code))
            .unwrap();
        t.get(row, "geometry").unwrap().as_geometry().unwrap().bounding_rect().unwrap().min()
    }

    #[test]
    fn region_table_sums_and_lists_subregions() {
        let store = france();
        let regions = store.get_data(true).unwrap();
        let codes: Vec<String> = regions.column_keys("code_region").unwrap().into_iter().flatten().collect();
        assert_eq!(codes, ["000", "04", "09", "11", "53", "999"]);
        let idf = codes.iter().position(|c| c == "11").unwrap();
        assert_eq!(regions.get(idf, "population_region"), Some(&Value::Number(3_700_000.0)));
        assert_eq!(
            regions.get(idf, "code_subregion").unwrap().as_list().unwrap(),
            [Value::from("75"), Value::from("92")]
        );
    }

    #[test]
    fn dense_moves_overseas_and_drops_collectivities() {
        let mut store = france();
        store.set_dense_geometry().unwrap();
        assert!(store.is_dense_geometry());
        let c = min_corner(&store, "974");
        assert!((c.x - 4.0).abs() < 1e-9 && (c.y - 39.0).abs() < 1e-9);
        assert!(store.is_subregion("980").unwrap().is_none());
        store.set_dense_geometry().unwrap();
        assert!(matches!(store.set_main_geometry(), Err(GeoError::GeometryState(_))));
        assert!(matches!(store.set_exploded_geometry(), Err(GeoError::GeometryState(_))));
    }

    #[test]
    fn exploded_zooms_the_capital_area() {
        let mut store = france();
        store.set_exploded_geometry().unwrap();
        assert!(store.is_exploded_geometry());
        // (2, 48) moved by (-6.5, -5) then scaled 3x around (-1.5, 43).
        let c = min_corner(&store, "75");
        assert!((c.x - (-10.5)).abs() < 1e-9 && (c.y - 43.0).abs() < 1e-9);
        let c = min_corner(&store, "29");
        assert!((c.x - (-4.0)).abs() < 1e-9);
        store.set_exploded_geometry().unwrap();
    }

    #[test]
    fn main_drops_relocated_subregions() {
        let mut store = france();
        store.set_main_geometry().unwrap();
        let codes = SubnationalGeometryStore::texts(store.get_data(false).unwrap(), "code_subregion").unwrap();
        assert_eq!(codes, ["29", "75", "92"]);
        assert!(matches!(store.set_dense_geometry(), Err(GeoError::GeometryState(_))));
    }

    #[test]
    fn subregion_list_follows_main_layout() {
        let mut store = france();
        let before = store.get_subregion_list().unwrap();
        assert_eq!(before.len(), 5);
        store.set_main_geometry().unwrap();
        let list = store.get_subregion_list().unwrap();
        assert_eq!(list.columns(), ["code_subregion", "name_subregion", "population_subregion", "geometry"]);
        let codes = SubnationalGeometryStore::texts(&list, "code_subregion").unwrap();
        assert!(!codes.iter().any(|c| c == "974" || c == "980"));
        assert_eq!(codes, ["29", "75", "92"]);
        let regions = SubnationalGeometryStore::texts(&store.get_region_list().unwrap(), "code_region").unwrap();
        assert!(!regions.contains(&"04".to_string()));
    }

    #[test]
    fn macroregion_lists_members_then_itself() {
        let store = france();
        let out = store
            .get_regions_from_macroregion(&RegionQuery::name("Métropole"))
            .unwrap();
        assert_eq!(out, ["11", "53", "999"]);
        let out = store
            .get_regions_from_macroregion(&RegionQuery::code("53").output(OutputField::Name))
            .unwrap();
        assert_eq!(out, ["Bretagne", "Métropole"]);
    }

    #[test]
    fn region_query_needs_exactly_one_key() {
        let store = france();
        let both = RegionQuery {
            name: Some("Bretagne".into()),
            code: Some("53".into()),
            ..Default::default()
        };
        assert!(matches!(store.get_subregions_from_region(&both), Err(GeoError::InvalidArgument(_))));
        assert!(matches!(
            store.get_subregions_from_region(&RegionQuery::name("Gondor")),
            Err(GeoError::UnknownRegion(_))
        ));
    }

    #[test]
    fn uninitialized_store_reports_it() {
        let store = SubnationalGeometryStore::default();
        assert!(!store.is_init());
        assert!(matches!(store.get_data(false), Err(GeoError::NotInitialized)));
        assert_eq!(store.source().len(), 19);
    }
}
