//! epigeo
//!
//! Geographic reference tooling for epidemiological datasets. Pairs with the
//! `epigeo` CLI.
//!
//! ### Features
//! - Standardize heterogeneous country names and codes to ISO 3166 forms
//! - Expand world-region names (G7, Western Europe, …) into member countries
//! - Enrich tables with per-country population, area, capital, flag, geometry
//! - Subnational geometry for 14 countries, with dense and exploded layouts
//! - Save as CSV or JSON, render choropleth maps to SVG/PNG
//!
//! ### Example
//! ```no_run
//! use epigeo::{CachedFetcher, FetchConfig, NameStandardizer, Standard, StandardizeOptions};
//! use epigeo::{FieldJoin, SubnationalGeometryStore, Table};
//!
//! let gm = NameStandardizer::new(Standard::Iso3)?;
//! let codes = gm.standardize(&["France", "Deutschland"], &StandardizeOptions::default())?;
//! assert_eq!(codes, ["FRA", "DEU"]);
//!
//! let fetcher = CachedFetcher::new(FetchConfig::default())?;
//! let mut store = SubnationalGeometryStore::new(Some("FRA"), &fetcher)?;
//! store.set_dense_geometry()?;
//!
//! let mut cases = Table::new(["where", "cases"]);
//! cases.push_row(vec!["75".into(), 1200.0.into()])?;
//! let joined = store.add_field(&cases, &FieldJoin::new(["geometry"]))?;
//! epigeo::viz::plot_map(&joined, "paris.svg", 800, 600, Some("cases"))?;
//! # Ok::<(), epigeo::GeoError>(())
//! ```

pub mod enrich;
pub mod error;
pub mod fetch;
pub mod frame;
pub mod geometry;
pub mod models;
pub mod parse;
pub mod regions;
pub mod registry;
pub mod standardize;
pub mod storage;
pub mod subnational;
pub mod table;
pub mod util;
pub mod viz;

pub use enrich::{CountryEnricher, EnrichOptions};
pub use error::{GeoError, Result};
pub use fetch::{CachedFetcher, Fetch, FetchConfig, StaticFetcher};
pub use models::{InfoField, OutputField, SourceDb, Standard};
pub use regions::RegionCatalog;
pub use registry::CountryRegistry;
pub use standardize::{NameStandardizer, StandardizeOptions};
pub use subnational::{FieldJoin, GeometryLayout, RegionQuery, SubnationalGeometryStore};
pub use table::{Table, Value};
