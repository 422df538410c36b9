//! Conversion of free-form location names into canonical country codes.
//!
//! Resolution runs in two stages: an optional per-source fix-up table that
//! corrects the known naming quirks of one upstream dataset, then a generic
//! registry lookup with a fuzzy fallback.

use crate::error::{GeoError, Result};
use crate::models::{SourceDb, Standard};
use crate::regions::RegionCatalog;
use crate::registry::CountryRegistry;
use crate::table::{Table, Value};
use crate::util::title_case;
use std::collections::VecDeque;

// Keys are title-cased, as inputs are title-cased before translation.
const JHU: &[(&str, &str)] = &[
    ("Congo (Brazzaville)", "Republic of the Congo"),
    ("Congo (Kinshasa)", "COD"),
    ("Korea, South", "KOR"),
    ("Taiwan*", "Taiwan"),
    ("Laos", "LAO"),
    ("West Bank And Gaza", "PSE"),
    ("Burma", "Myanmar"),
    ("Iran", "IRN"),
    // cruise ships and events reported as locations
    ("Diamond Princess", ""),
    ("Ms Zaandam", ""),
    ("Summer Olympics 2020", ""),
    ("Winter Olympics 2022", ""),
    ("Micronesia", "FSM"),
    ("Antarctica", ""),
    ("Korea, North", "PRK"),
];

const WORLDOMETERS: &[(&str, &str)] = &[
    ("Dr Congo", "COD"),
    ("Congo", "COG"),
    ("Iran", "IRN"),
    ("South Korea", "KOR"),
    ("North Korea", "PRK"),
    ("Czech Republic (Czechia)", "CZE"),
    ("Laos", "LAO"),
    ("Sao Tome & Principe", "STP"),
    ("Channel Islands", "JEY"),
    ("St. Vincent & Grenadines", "VCT"),
    ("U.S. Virgin Islands", "VIR"),
    ("Saint Kitts & Nevis", "KNA"),
    ("Faeroe Islands", "FRO"),
    ("Caribbean Netherlands", "BES"),
    ("Wallis & Futuna", "WLF"),
    ("Saint Pierre & Miquelon", "SPM"),
    ("Sint Maarten", "SXM"),
    ("Turkey", "TUR"),
];

const OWID: &[(&str, &str)] = &[
    ("Bonaire Sint Eustatius And Saba", "BES"),
    ("Cape Verde", "CPV"),
    ("Democratic Republic Of Congo", "COD"),
    ("Faeroe Islands", "FRO"),
    ("Laos", "LAO"),
    ("South Korea", "KOR"),
    ("Swaziland", "SWZ"),
    ("United States Virgin Islands", "VIR"),
    ("Iran", "IRN"),
    ("Micronesia (Country)", "FSM"),
    ("Northern Cyprus", "CYP"),
    ("Curacao", "CUW"),
    ("Vatican", "VAT"),
];

// IOC codes of teams that no longer exist, mapped to a successor state.
const OLYMPICS: &[(&str, &str)] = &[
    ("Rho", "ZWE"),
    ("Anz", "AUS"),
    ("Boh", "CZE"),
    ("Tch", "CZE"),
    ("Yug", "SRB"),
    ("Urs", "RUS"),
    ("Lib", "LBN"),
    ("Uar", "EGY"),
    ("Eun", "RUS"),
];

fn translation_table(db: SourceDb) -> &'static [(&'static str, &'static str)] {
    match db {
        SourceDb::Jhu => JHU,
        SourceDb::Worldometers => WORLDOMETERS,
        SourceDb::Owid => OWID,
        SourceDb::Olympics => OLYMPICS,
        SourceDb::Opencovid19national | SourceDb::Spfnational | SourceDb::Mpoxgh => &[],
    }
}

/// Options of one standardization call.
#[derive(Debug, Clone, Default)]
pub struct StandardizeOptions {
    /// Output standard; the standardizer's target standard when `None`.
    pub standard: Option<Standard>,
    /// Upstream dataset whose fix-up table is applied first.
    pub source_db: Option<SourceDb>,
    /// Expand region names into their member countries.
    pub interpret_region: bool,
}

/// Converts location names into one canonical standard.
///
/// ```
/// use epigeo::{NameStandardizer, Standard, StandardizeOptions};
///
/// let gm = NameStandardizer::new(Standard::Iso3)?;
/// let codes = gm.standardize(&["France", "FRA", "United States"], &StandardizeOptions::default())?;
/// assert_eq!(codes, ["FRA", "FRA", "USA"]);
/// # Ok::<(), epigeo::GeoError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NameStandardizer {
    registry: CountryRegistry,
    regions: RegionCatalog,
    standard: Standard,
}

impl NameStandardizer {
    /// Standardizer over the embedded registry and region catalog.
    pub fn new(standard: Standard) -> Result<Self> {
        let registry = CountryRegistry::builtin()?;
        let regions = RegionCatalog::builtin(&registry)?;
        Ok(Self::with_parts(registry, regions, standard))
    }

    pub fn with_parts(registry: CountryRegistry, regions: RegionCatalog, standard: Standard) -> Self {
        Self {
            registry,
            regions,
            standard,
        }
    }

    pub fn standard(&self) -> Standard {
        self.standard
    }

    /// Set the default output standard from its name.
    pub fn set_target_standard(&mut self, standard: &str) -> Result<Standard> {
        self.standard = standard.parse()?;
        Ok(self.standard)
    }

    pub fn list_standards() -> Vec<&'static str> {
        Standard::ALL.iter().map(Standard::as_str).collect()
    }

    pub fn list_source_dbs() -> Vec<&'static str> {
        SourceDb::ALL.iter().map(SourceDb::as_str).collect()
    }

    pub fn registry(&self) -> &CountryRegistry {
        &self.registry
    }

    pub fn region_catalog(&self) -> &RegionCatalog {
        &self.regions
    }

    /// Apply the fix-up table of `db`; names without an entry pass through.
    pub fn first_db_translation<S: AsRef<str>>(names: &[S], db: SourceDb) -> Vec<String> {
        let table = translation_table(db);
        names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                table
                    .iter()
                    .find(|(from, _)| *from == n)
                    .map(|(_, to)| to.to_string())
                    .unwrap_or_else(|| n.to_string())
            })
            .collect()
    }

    /// Resolve one already-translated name.
    fn convert(&self, name: &str, standard: Standard) -> Result<String> {
        if name.is_empty() {
            return Ok(String::new());
        }
        // OWID aggregate rows such as OWID_WRL have no country equivalent.
        if name.to_ascii_uppercase().starts_with("OWID_") {
            return Ok(name.to_ascii_uppercase());
        }
        let country = self.registry.resolve(name)?;
        Ok(country.code(standard).to_string())
    }

    /// Standardize `names`, keeping their order. With `interpret_region`,
    /// region names expand in place to their sorted members.
    ///
    /// # Arguments
    ///
    /// * `names` - free-form country names or codes; an empty string maps
    ///   to an empty string.
    /// * `opts` - output standard (defaults to the standardizer's own), the
    ///   upstream dataset whose naming quirks are fixed first, and whether
    ///   region names are expanded.
    ///
    /// # Errors
    ///
    /// [`GeoError::UnresolvedLocation`] when a name matches no country, or
    /// matches several equally well.
    pub fn standardize<S: AsRef<str>>(&self, names: &[S], opts: &StandardizeOptions) -> Result<Vec<String>> {
        let standard = opts.standard.unwrap_or(self.standard);
        let titled: Vec<String> = names.iter().map(|n| title_case(n.as_ref())).collect();
        let translated = match opts.source_db {
            Some(db) => Self::first_db_translation(&titled, db),
            None => titled,
        };

        let mut queue: VecDeque<String> = translated.into();
        let mut out = Vec::with_capacity(queue.len());
        while let Some(name) = queue.pop_front() {
            if opts.interpret_region {
                if let Some(region) = self.regions.is_region(&name) {
                    for member in self.regions.members(&region)?.into_iter().rev() {
                        queue.push_front(member);
                    }
                    continue;
                }
            }
            out.push(self.convert(&name, standard)?);
        }
        Ok(out)
    }

    /// Standardize a single name.
    pub fn standardize_one(&self, name: &str, opts: &StandardizeOptions) -> Result<Vec<String>> {
        self.standardize(&[name], opts)
    }

    /// Pairs of original input and resolved code, in input order.
    pub fn standardize_dict<S: AsRef<str>>(
        &self,
        names: &[S],
        opts: &StandardizeOptions,
    ) -> Result<Vec<(String, String)>> {
        if opts.interpret_region {
            return Err(GeoError::InvalidArgument(
                "interpret_region is only available with list output".into(),
            ));
        }
        let resolved = self.standardize(names, opts)?;
        Ok(names
            .iter()
            .map(|n| title_case(n.as_ref()))
            .zip(resolved)
            .collect())
    }

    /// One-row table holding the input list and the resolved list.
    pub fn standardize_table<S: AsRef<str>>(&self, names: &[S], opts: &StandardizeOptions) -> Result<Table> {
        if opts.interpret_region {
            return Err(GeoError::InvalidArgument(
                "interpret_region is only available with list output".into(),
            ));
        }
        let standard = opts.standard.unwrap_or(self.standard);
        let resolved = self.standardize(names, opts)?;
        let inputs: Vec<String> = names.iter().map(|n| title_case(n.as_ref())).collect();
        let mut t = Table::new(["inputname", standard.as_str()]);
        t.push_row(vec![Value::from(inputs), Value::from(resolved)])?;
        Ok(t)
    }
}
