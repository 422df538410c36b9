//! Per-country descriptive fields joined onto arbitrary tables.
//!
//! Reference tables are fetched on first use and kept for the lifetime of the
//! [`CountryEnricher`]; nothing is shared between instances.

use crate::error::{GeoError, Result};
use crate::fetch::Fetch;
use crate::frame;
use crate::geometry::{self, DatelineShift};
use crate::models::{InfoField, SourceDb, Standard};
use crate::parse;
use crate::regions::GeoschemeRow;
use crate::standardize::{NameStandardizer, StandardizeOptions};
use crate::table::{Table, Value};
use ahash::AHashMap;
use log::{debug, warn};
use serde::Deserialize;
use std::time::Duration;

pub const POPULATION_URL: &str = "https://www.worldometers.info/world-population/population-by-country/";
pub const WORLD_GEOMETRY_URL: &str =
    "https://raw.githubusercontent.com/johan/world.geo.json/master/countries.geo.json";
pub const COUNTRY_GEOMETRY_URL: &str = "https://github.com/johan/world.geo.json/raw/master/countries/";
pub const FLAG_URL: &str = "https://github.com/linssen/country-flag-icons/raw/master/countries.json";
const GEOSCHEME_URL: &str =
    "https://en.wikipedia.org/w/index.php?title=List_of_countries_by_United_Nations_geoscheme&oldid=1008989486";
const REGISTRY_SOURCE: &str = "ISO 3166-1 (https://www.iso.org/iso-3166-country-codes.html)";

// The population table is refreshed about monthly.
const POPULATION_MAX_AGE: Duration = Duration::from_secs(3_000_000);

/// Expected worldometers layout: column position, header prefix, field.
const POPULATION_LAYOUT: &[(usize, &str, &str)] = &[
    (0, "", "idx"),
    (1, "Country", "country"),
    (2, "Population", "population"),
    (6, "Land Area", "area"),
    (8, "Fert", "fertility"),
    (9, "Med", "median_age"),
    (10, "Urban", "urban_rate"),
];

// Countries whose shape is taken from their own file rather than the world table.
const PATCHED_GEOMETRIES: &[&str] = &["SSD", "SDN"];
const EAST_OF_DATELINE: &[&str] = &["RUS", "FJI", "NZL", "WSM"];
const WEST_OF_DATELINE: &[&str] = &["USA"];

/// Attribution of each field.
pub fn field_sources() -> Vec<(&'static str, String)> {
    InfoField::ALL
        .iter()
        .map(|f| {
            let src = match f {
                InfoField::ContinentCode | InfoField::ContinentName | InfoField::CountryName => {
                    REGISTRY_SOURCE.to_string()
                }
                InfoField::Population
                | InfoField::Area
                | InfoField::Fertility
                | InfoField::MedianAge
                | InfoField::UrbanRate => POPULATION_URL.to_string(),
                InfoField::Geometry => format!("https://github.com/johan/world.geo.json/ ({WORLD_GEOMETRY_URL})"),
                InfoField::RegionCodeList | InfoField::RegionNameList | InfoField::Capital => {
                    GEOSCHEME_URL.to_string()
                }
                InfoField::Flag => "https://github.com/linssen/country-flag-icons/blob/master/countries.json".to_string(),
            };
            (f.as_str(), src)
        })
        .collect()
}

/// Options of [`CountryEnricher::add_fields`].
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Column holding the location names.
    pub geo_column: String,
    /// Replace fields that already exist in the input.
    pub overload: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            geo_column: "where".to_string(),
            overload: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FlagRecord {
    alpha3: String,
    file_url: String,
}

const JOIN_KEY: &str = "iso3_tmp";

pub struct CountryEnricher {
    standardizer: NameStandardizer,
    fetcher: Box<dyn Fetch>,
    // ISO3 -> geoscheme rows of that country, in catalog order.
    geoscheme: AHashMap<String, Vec<GeoschemeRow>>,
    population: Option<Table>,
    geometry: Option<Table>,
    flags: Option<Table>,
}

impl CountryEnricher {
    pub fn new(standardizer: NameStandardizer, fetcher: Box<dyn Fetch>) -> Self {
        let mut geoscheme: AHashMap<String, Vec<GeoschemeRow>> = AHashMap::new();
        for row in standardizer.region_catalog().geoscheme_rows() {
            geoscheme.entry(row.iso3.clone()).or_default().push(row.clone());
        }
        Self {
            standardizer,
            fetcher,
            geoscheme,
            population: None,
            geometry: None,
            flags: None,
        }
    }

    pub fn standardizer(&self) -> &NameStandardizer {
        &self.standardizer
    }

    /// Names of the derivable fields, sorted.
    pub fn list_fields() -> Vec<&'static str> {
        InfoField::ALL.iter().map(InfoField::as_str).collect()
    }

    /// `"<field> : <source>"` for one field.
    pub fn field_source(field: &str) -> Result<String> {
        let f: InfoField = field.parse()?;
        let src = field_sources()
            .into_iter()
            .find(|(name, _)| *name == f.as_str())
            .map(|(_, s)| s)
            .unwrap_or_default();
        Ok(format!("{} : {}", f.as_str(), src))
    }

    /// Return a copy of `table` with `fields` added, joined on the canonical
    /// code of each row's location. Rows without a reference match get nulls.
    ///
    /// # Arguments
    ///
    /// * `table` - input rows; left unchanged.
    /// * `fields` - fields to add, in output column order.
    /// * `opts` - the column holding location names, and whether fields
    ///   already in `table` are replaced.
    ///
    /// # Errors
    ///
    /// * [`GeoError::InvalidArgument`] for an empty `fields` or a missing
    ///   location column.
    /// * [`GeoError::FieldConflict`] when a field exists and `overload` is off.
    /// * [`GeoError::UnresolvedLocation`] for an unknown location name.
    /// * [`GeoError::SourceSchema`] when a downloaded page changed layout,
    ///   and any download or decoding error of the reference files.
    pub fn add_fields(&mut self, table: &Table, fields: &[InfoField], opts: &EnrichOptions) -> Result<Table> {
        if fields.is_empty() {
            return Err(GeoError::InvalidArgument("no field given".into()));
        }
        if !opts.overload {
            if let Some(f) = fields.iter().find(|f| table.has_column(f.as_str())) {
                return Err(GeoError::FieldConflict(f.as_str().to_string()));
            }
        }
        let names: Vec<String> = table
            .column_keys(&opts.geo_column)
            .map_err(|_| {
                GeoError::InvalidArgument(format!("'{}' is not a column of the input table", opts.geo_column))
            })?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();

        let iso2 = self.standardizer.standardize(
            &names,
            &StandardizeOptions {
                standard: Some(Standard::Iso2),
                ..Default::default()
            },
        )?;
        let iso3 = self.standardizer.standardize(
            &names,
            &StandardizeOptions {
                standard: Some(Standard::Iso3),
                ..Default::default()
            },
        )?;

        let mut out = table.clone();
        out.set_column(JOIN_KEY, iso3.iter().map(|c| Value::from(c.as_str())).collect())?;

        for &field in fields {
            match field {
                InfoField::ContinentCode | InfoField::ContinentName | InfoField::CountryName => {
                    let registry = self.standardizer.registry();
                    let values = iso2
                        .iter()
                        .map(|code| match registry.lookup(code) {
                            Some(c) if !code.is_empty() => Value::from(match field {
                                InfoField::ContinentCode => c.continent.code(),
                                InfoField::ContinentName => c.continent.name(),
                                _ => c.name.as_str(),
                            }),
                            _ => Value::Null,
                        })
                        .collect();
                    out.set_column(field.as_str(), values)?;
                }
                InfoField::Population
                | InfoField::Area
                | InfoField::Fertility
                | InfoField::MedianAge
                | InfoField::UrbanRate => {
                    let pop = self.population_table()?;
                    out = frame::left_join(&out, JOIN_KEY, pop, "iso3", &[field.as_str()])?;
                }
                InfoField::RegionCodeList | InfoField::RegionNameList | InfoField::Capital => {
                    let values = self.geoscheme_values(&iso3, field);
                    out.set_column(field.as_str(), values)?;
                }
                InfoField::Geometry => {
                    let geo = self.geometry_table()?;
                    out = frame::left_join(&out, JOIN_KEY, geo, "iso3", &["geometry"])?;
                }
                InfoField::Flag => {
                    let flags = self.flag_table()?;
                    out = frame::left_join(&out, JOIN_KEY, flags, "iso3", &["flag"])?;
                }
            }
        }
        out.drop_column(JOIN_KEY);
        Ok(out)
    }

    fn geoscheme_values(&self, iso3: &[String], field: InfoField) -> Vec<Value> {
        iso3.iter()
            .map(|code| match self.geoscheme.get(code.as_str()) {
                None => Value::Null,
                Some(rows) => match field {
                    InfoField::RegionCodeList => Value::List(
                        rows.iter()
                            .map(|r| Value::Text(format!("{:03}", r.region_code)))
                            .collect(),
                    ),
                    InfoField::RegionNameList => {
                        Value::List(rows.iter().map(|r| Value::from(r.region_name.as_str())).collect())
                    }
                    _ => Value::from(rows[0].capital.as_str()),
                },
            })
            .collect()
    }

    fn population_table(&mut self) -> Result<&Table> {
        if self.population.is_none() {
            let html = self.fetcher.fetch_text(POPULATION_URL, Some(POPULATION_MAX_AGE))?;
            let raw = parse::html_tables(&html)?
                .into_iter()
                .next()
                .ok_or_else(|| GeoError::SourceSchema("worldometers page has no table".into()))?;
            for &(pos, prefix, _) in POPULATION_LAYOUT {
                match raw.columns().get(pos) {
                    Some(col) if col.starts_with(prefix) => {}
                    other => {
                        return Err(GeoError::SourceSchema(format!(
                            "worldometers column {pos} is {other:?}, expected a name starting with '{prefix}'"
                        )));
                    }
                }
            }

            let mut t = Table::new(["iso3", "population", "area", "fertility", "median_age", "urban_rate"]);
            let opts = StandardizeOptions {
                standard: Some(Standard::Iso3),
                source_db: Some(SourceDb::Worldometers),
                interpret_region: false,
            };
            for row in raw.rows() {
                let name = row[1].to_string();
                let iso3 = match self.standardizer.standardize(&[name.as_str()], &opts) {
                    Ok(mut v) if !v.is_empty() && !v[0].is_empty() => v.remove(0),
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("worldometers row '{name}' skipped: {e}");
                        continue;
                    }
                };
                let mut cells = vec![Value::Text(iso3)];
                cells.extend(
                    POPULATION_LAYOUT[2..]
                        .iter()
                        .map(|&(pos, _, _)| Value::from(parse::parse_number(&row[pos].to_string()))),
                );
                t.push_row(cells)?;
            }
            debug!("population table loaded with {} countries", t.len());
            self.population = Some(t);
        }
        self.population
            .as_ref()
            .ok_or_else(|| GeoError::SourceSchema("population table unavailable".into()))
    }

    fn geometry_table(&mut self) -> Result<&Table> {
        if self.geometry.is_none() {
            let bytes = self.fetcher.fetch(WORLD_GEOMETRY_URL, None)?;
            let mut shapes: Vec<(String, geo::MultiPolygon<f64>)> = parse::geojson_features(&bytes)?
                .into_iter()
                .filter_map(|f| Some((f.text("id")?, f.geometry?)))
                .collect();

            for &code in PATCHED_GEOMETRIES {
                let url = format!("{COUNTRY_GEOMETRY_URL}{code}.geo.json");
                let feature = parse::geojson_features(&self.fetcher.fetch(&url, None)?)?
                    .into_iter()
                    .find(|f| f.text("id").as_deref() == Some(code));
                if let Some(g) = feature.and_then(|f| f.geometry) {
                    shapes.retain(|(id, _)| id != code);
                    shapes.push((code.to_string(), g));
                }
            }

            for (id, g) in shapes.iter_mut() {
                if EAST_OF_DATELINE.contains(&id.as_str()) {
                    *g = geometry::shift_dateline(g, DatelineShift::East);
                } else if WEST_OF_DATELINE.contains(&id.as_str()) {
                    *g = geometry::shift_dateline(g, DatelineShift::West);
                }
            }

            let mut t = Table::new(["iso3", "geometry"]);
            t.extend_rows(shapes.into_iter().map(|(id, g)| vec![Value::Text(id), Value::Geometry(g)]))?;
            self.geometry = Some(t);
        }
        self.geometry
            .as_ref()
            .ok_or_else(|| GeoError::SourceSchema("geometry table unavailable".into()))
    }

    fn flag_table(&mut self) -> Result<&Table> {
        if self.flags.is_none() {
            let bytes = self.fetcher.fetch(FLAG_URL, None)?;
            let records: Vec<FlagRecord> = serde_json::from_slice(&bytes)?;
            let mut t = Table::new(["iso3", "flag"]);
            t.extend_rows(
                records
                    .into_iter()
                    .map(|r| vec![Value::Text(r.alpha3), Value::Text(format!("http:{}", r.file_url))]),
            )?;
            self.flags = Some(t);
        }
        self.flags
            .as_ref()
            .ok_or_else(|| GeoError::SourceSchema("flag table unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;

    fn enricher(fetcher: StaticFetcher) -> CountryEnricher {
        CountryEnricher::new(NameStandardizer::new(Standard::Iso2).unwrap(), Box::new(fetcher))
    }

    fn input() -> Table {
        let mut t = Table::new(["where", "cases"]);
        t.push_row(vec!["France".into(), 10.0.into()]).unwrap();
        t.push_row(vec!["Japan".into(), 4.0.into()]).unwrap();
        t
    }

    #[test]
    fn continent_and_capital_need_no_download() {
        let mut e = enricher(StaticFetcher::new());
        let out = e
            .add_fields(
                &input(),
                &[InfoField::ContinentName, InfoField::Capital, InfoField::RegionNameList],
                &EnrichOptions::default(),
            )
            .unwrap();
        assert_eq!(out.get(0, "continent_name").unwrap().as_str(), Some("Europe"));
        assert_eq!(out.get(1, "capital").unwrap().as_str(), Some("Tokyo"));
        let regions = out.get(0, "region_name_list").unwrap().as_list().unwrap();
        assert_eq!(regions[0], Value::from("Western Europe"));
        assert!(!out.has_column(JOIN_KEY));
    }

    #[test]
    fn geoscheme_rows_are_indexed_by_country() {
        let e = enricher(StaticFetcher::new());
        let france = e.geoscheme.get("FRA").unwrap();
        assert!(france.iter().all(|r| r.iso3 == "FRA"));
        assert!(france.iter().any(|r| r.region_name == "Western Europe"));
        let values = e.geoscheme_values(&["FRA".into(), "".into()], InfoField::RegionCodeList);
        assert_eq!(values[0].as_list().unwrap().len(), france.len());
        assert!(values[1].is_null());
    }

    #[test]
    fn flags_are_prefixed_with_scheme() {
        let f = StaticFetcher::new().with(
            FLAG_URL,
            r#"[{"name":"France","alpha2":"FR","alpha3":"FRA","file_url":"//upload.example/fr.svg"}]"#,
        );
        let out = enricher(f)
            .add_fields(&input(), &[InfoField::Flag], &EnrichOptions::default())
            .unwrap();
        assert_eq!(out.get(0, "flag").unwrap().as_str(), Some("http://upload.example/fr.svg"));
        assert!(out.get(1, "flag").unwrap().is_null());
    }

    #[test]
    fn missing_geo_column_is_an_argument_error() {
        let opts = EnrichOptions {
            geo_column: "country".into(),
            ..Default::default()
        };
        let err = enricher(StaticFetcher::new())
            .add_fields(&input(), &[InfoField::Capital], &opts)
            .unwrap_err();
        assert!(matches!(err, GeoError::InvalidArgument(_)));
    }

    #[test]
    fn field_source_rejects_unknown_fields() {
        assert!(CountryEnricher::field_source("population").unwrap().contains("worldometers"));
        assert!(matches!(CountryEnricher::field_source("gdp"), Err(GeoError::UnknownField(_))));
    }
}
