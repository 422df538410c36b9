//! Canonical ISO 3166-1 country registry with exact and fuzzy lookup.

use crate::error::{GeoError, Result};
use crate::models::{CanonicalCountry, Continent};
use crate::util::fold_ascii;
use ahash::AHashMap;
use log::{debug, warn};
use serde::Deserialize;

const ISO3166_CSV: &str = include_str!("../data/iso3166.csv");

#[derive(Debug, Deserialize)]
struct RegistryRecord {
    alpha2: String,
    alpha3: String,
    numeric: String,
    name: String,
    continent: Continent,
    #[serde(default)]
    aliases: String,
}

/// Read-only set of canonical countries, loaded once.
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    countries: Vec<CanonicalCountry>,
    index: AHashMap<String, usize>,
}

impl CountryRegistry {
    /// Registry built from the embedded ISO 3166-1 table.
    pub fn builtin() -> Result<Self> {
        Self::from_csv(ISO3166_CSV)
    }

    /// Build from CSV text with columns
    /// `alpha2,alpha3,numeric,name,continent,aliases` (aliases `|`-separated).
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(text.as_bytes());
        let mut countries = Vec::new();
        for rec in rdr.deserialize::<RegistryRecord>() {
            let r = rec?;
            countries.push(CanonicalCountry {
                alpha2: r.alpha2,
                alpha3: r.alpha3,
                numeric: r.numeric,
                name: r.name,
                continent: r.continent,
                aliases: r
                    .aliases
                    .split('|')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect(),
            });
        }

        let mut index = AHashMap::with_capacity(countries.len() * 6);
        for (i, c) in countries.iter().enumerate() {
            let keys = [&c.alpha2, &c.alpha3, &c.numeric, &c.name]
                .into_iter()
                .chain(c.aliases.iter());
            for k in keys {
                index.entry(k.to_lowercase()).or_insert(i);
                index.entry(fold_ascii(k)).or_insert(i);
            }
        }
        debug!("country registry loaded with {} entries", countries.len());
        Ok(Self { countries, index })
    }

    pub fn countries(&self) -> &[CanonicalCountry] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Exact, case-insensitive lookup on any code, name or alias.
    /// Integer-like queries are matched against the zero-padded numeric code.
    pub fn lookup(&self, query: &str) -> Option<&CanonicalCountry> {
        let q = query.trim();
        if q.is_empty() {
            return None;
        }
        let key = match q.parse::<u32>() {
            Ok(n) => format!("{n:03}"),
            Err(_) => q.to_lowercase(),
        };
        self.index
            .get(&key)
            .or_else(|| self.index.get(&fold_ascii(q)))
            .map(|&i| &self.countries[i])
    }

    /// Lookup by alpha-3 code only.
    pub fn by_alpha3(&self, code: &str) -> Option<&CanonicalCountry> {
        self.countries
            .iter()
            .find(|c| c.alpha3.eq_ignore_ascii_case(code.trim()))
    }

    /// Ranked fuzzy search.
    ///
    /// An exact hit scores 50. Otherwise the first name or alias containing
    /// the accent-folded query scores `max(5, 30 - 2 * position)`. Each country
    /// is scored once. Candidates are ordered by score, then alpha-2 code.
    pub fn search_fuzzy(&self, query: &str) -> Vec<&CanonicalCountry> {
        let q = fold_ascii(query);
        if q.is_empty() {
            return Vec::new();
        }
        let exact = self.lookup(query).map(|c| c.alpha3.clone());

        let mut scored: Vec<(i64, &CanonicalCountry)> = Vec::new();
        for c in &self.countries {
            if exact.as_deref() == Some(c.alpha3.as_str()) {
                scored.push((50, c));
                continue;
            }
            let names = std::iter::once(&c.name).chain(c.aliases.iter());
            for n in names {
                let v = fold_ascii(n);
                if v == q {
                    scored.push((50, c));
                    break;
                }
                if let Some(pos) = v.find(&q) {
                    scored.push(((30 - 2 * pos as i64).max(5), c));
                    break;
                }
            }
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.alpha2.cmp(&b.1.alpha2)));
        scored.into_iter().map(|(_, c)| c).collect()
    }

    /// Exact lookup, then fuzzy search. Ambiguous fuzzy results resolve to
    /// the best-ranked candidate and are logged.
    pub fn resolve(&self, query: &str) -> Result<&CanonicalCountry> {
        if let Some(c) = self.lookup(query) {
            return Ok(c);
        }
        let candidates = self.search_fuzzy(query);
        match candidates.as_slice() {
            [] => Err(GeoError::UnresolvedLocation(query.to_string())),
            [only] => Ok(only),
            [first, rest @ ..] => {
                let others: Vec<&str> = rest.iter().map(|c| c.alpha3.as_str()).collect();
                warn!(
                    "ambiguous location '{query}': using {} ({}), other candidates {:?}",
                    first.name, first.alpha3, others
                );
                Ok(first)
            }
        }
    }
}
