//! Catalog of supranational regions: the UN M49 geoscheme hierarchy plus
//! named political and trade organisations.
//!
//! Geoscheme membership is answered from a flat `(country, ancestor)` table,
//! so "every country under Europe" is a filter on one column rather than a
//! walk over the hierarchy.

use crate::error::{GeoError, Result};
use crate::registry::CountryRegistry;
use crate::table::{Table, Value};
use crate::util::{normalize_key, title_case};
use ahash::AHashMap;
use log::{debug, warn};
use serde::Deserialize;

const M49_CSV: &str = include_str!("../data/m49.csv");
const GEOSCHEME_CSV: &str = include_str!("../data/geoscheme.csv");

/// Attribution of every table the catalog is built from.
pub const SOURCES: &[(&str, &str)] = &[
    ("UN_M49", "https://en.wikipedia.org/w/index.php?title=UN_M49&oldid=986603718"),
    (
        "GeoScheme",
        "https://en.wikipedia.org/w/index.php?title=List_of_countries_by_United_Nations_geoscheme&oldid=1008989486",
    ),
    ("European Union", "https://europa.eu/european-union/about-eu/countries/member-countries_en"),
    ("G7", "https://en.wikipedia.org/wiki/Group_of_Seven"),
    ("G8", "https://en.wikipedia.org/wiki/Group_of_Eight"),
    ("G20", "https://en.wikipedia.org/wiki/G20"),
    ("G77", "https://www.g77.org/doc/members.html"),
    ("OECD", "https://en.wikipedia.org/wiki/OECD"),
    ("BRICS", "https://en.wikipedia.org/wiki/BRICS"),
    ("CELAC", "https://en.wikipedia.org/wiki/Community_of_Latin_American_and_Caribbean_States"),
    (
        "CEDEAO",
        "https://fr.wikipedia.org/wiki/Communaut%C3%A9_%C3%A9conomique_des_%C3%89tats_de_l%27Afrique_de_l%27Ouest",
    ),
    ("SADC", "https://en.wikipedia.org/wiki/Southern_African_Development_Community"),
    ("AMU", "https://en.wikipedia.org/wiki/Arab_Maghreb_Union"),
    (
        "CEEAC",
        "https://fr.wikipedia.org/wiki/Communaut%C3%A9_%C3%A9conomique_des_%C3%89tats_de_l%27Afrique_centrale",
    ),
    ("EAC", "https://en.wikipedia.org/wiki/East_African_Community"),
    ("CENSAD", "https://en.wikipedia.org/wiki/Community_of_Sahel%E2%80%93Saharan_States"),
    ("COMESA", "https://www.worlddata.info/trade-agreements/comesa.php"),
    ("Commonwealth", "https://en.wikipedia.org/wiki/Member_states_of_the_Commonwealth_of_Nations"),
];

struct Organization {
    code: &'static str,
    name: &'static str,
    members: &'static [&'static str],
}

const ORGANIZATIONS: &[Organization] = &[
    Organization {
        code: "UE",
        name: "European Union",
        members: &[
            "AUT", "BEL", "BGR", "CYP", "CZE", "DEU", "DNK", "EST", "ESP", "FIN", "FRA", "GRC",
            "HRV", "HUN", "IRL", "ITA", "LTU", "LUX", "LVA", "MLT", "NLD", "POL", "PRT", "ROU",
            "SWE", "SVN", "SVK",
        ],
    },
    Organization {
        code: "G7",
        name: "G7",
        members: &["DEU", "CAN", "USA", "FRA", "ITA", "JPN", "GBR"],
    },
    Organization {
        code: "G8",
        name: "G8",
        members: &["DEU", "CAN", "USA", "FRA", "ITA", "JPN", "GBR", "RUS"],
    },
    Organization {
        code: "G20",
        name: "G20",
        members: &[
            "ZAF", "SAU", "ARG", "AUS", "BRA", "CAN", "CHN", "KOR", "USA", "IND", "IDN", "JPN",
            "MEX", "GBR", "DEU", "FRA", "ITA", "TUR", "MEX", "RUS",
        ],
    },
    Organization {
        code: "OECD",
        name: "Oecd",
        members: &[
            "DEU", "AUS", "AUT", "BEL", "CAN", "CHL", "COL", "KOR", "DNK", "ESP", "EST", "USA",
            "FIN", "FRA", "GRC", "HUN", "IRL", "ISL", "ISR", "ITA", "JPN", "LVA", "LTU", "LUX",
            "MEX", "NOR", "NZL", "NLD", "POL", "PRT", "SVK", "SVN", "SWE", "CHE", "GBR", "CZE",
            "TUR",
        ],
    },
    Organization {
        code: "BRICS",
        name: "Brics",
        members: &["BRA", "RUS", "IND", "CHN", "ZAF"],
    },
    Organization {
        code: "CELAC",
        name: "Celac",
        members: &[
            "ATG", "ARG", "BHS", "BRB", "BLZ", "BOL", "BRA", "CHL", "COL", "CRI", "CUB", "DMA",
            "DOM", "ECU", "SLV", "GRD", "GTM", "GUY", "HTI", "HND", "JAM", "MEX", "NIC", "PAN",
            "PRY", "PER", "KNA", "LCA", "VCT", "SUR", "TTO", "URY", "VEN",
        ],
    },
    Organization {
        code: "CEDEAO",
        name: "Cedeao",
        members: &[
            "BEN", "BFA", "CPV", "CIV", "GMB", "GHA", "GIN", "GNB", "LBR", "MLI", "NER", "NGA",
            "SEN", "SLE", "TGO",
        ],
    },
    Organization {
        code: "AMU",
        name: "Amu",
        members: &["DZA", "LBY", "MRT", "MAR", "TUN"],
    },
    Organization {
        code: "CEEAC",
        name: "Ceeac",
        members: &[
            "AGO", "BDI", "CMR", "CAF", "TCD", "COG", "COD", "GNQ", "GAB", "RWA", "STP",
        ],
    },
    Organization {
        code: "EAC",
        name: "Eac",
        members: &["BDI", "COD", "KEN", "RWA", "SOM", "SSD", "TZA", "UGA"],
    },
    Organization {
        code: "SADC",
        name: "Sadc",
        members: &[
            "AGO", "BWA", "COM", "COD", "SWZ", "LSO", "MDG", "MWI", "MUS", "MOZ", "NAM", "SYC",
            "ZAF", "TZA", "ZMB", "ZWE",
        ],
    },
    Organization {
        code: "CENSAD",
        name: "Censad",
        members: &[
            "BEN", "BFA", "CAF", "TCD", "COM", "CIV", "DJI", "EGY", "ERI", "GMB", "GHA", "GIN",
            "GNB", "KEN", "LBR", "LBY", "MLI", "MRT", "MAR", "NER", "NGA", "STP", "SEN", "SLE",
            "SOM", "SDN", "TGO", "TUN", "CPV",
        ],
    },
    Organization {
        code: "COMESA",
        name: "Comesa",
        members: &[
            "BDI", "COM", "COD", "DJI", "EGY", "ERI", "SWZ", "ETH", "KEN", "LBY", "MDG", "MWI",
            "MUS", "RWA", "SYC", "SOM", "SDN", "TUN", "UGA", "ZMB", "ZWE",
        ],
    },
    Organization {
        code: "G77",
        name: "G77",
        members: &[
            "AFG", "DZA", "AGO", "ATG", "ARG", "AZE", "BHS", "BHR", "BGD", "BRB", "BLZ", "BEN",
            "BTN", "BOL", "BWA", "BRA", "BRN", "BFA", "BDI", "CPV", "KHM", "CMR", "CAF", "TCD",
            "CHL", "CHN", "COL", "COM", "COG", "CRI", "CIV", "CUB", "PRK", "COD", "DJI", "DMA",
            "DOM", "ECU", "EGY", "SLV", "GNQ", "ERI", "SWZ", "ETH", "FJI", "GAB", "GMB", "GHA",
            "GRD", "GTM", "GIN", "GNB", "GUY", "HTI", "HND", "IND", "IDN", "IRN", "IRQ", "JAM",
            "JOR", "KEN", "KIR", "KWT", "LAO", "LBN", "LSO", "LBR", "LBY", "MDG", "MWI", "MYS",
            "MDV", "MLI", "MHL", "MRT", "MUS", "FSM", "MNG", "MAR", "MOZ", "MMR", "NAM", "NRU",
            "NPL", "NIC", "NER", "NGA", "OMN", "PAK", "PAN", "PNG", "PRY", "PER", "PHL", "QAT",
            "RWA", "KNA", "LCA", "VCT", "WSM", "STP", "SAU", "SEN", "SYC", "SLE", "SGP", "SLB",
            "SOM", "ZAF", "SSD", "LKA", "PSE", "SDN", "SUR", "SYR", "TJK", "THA", "TLS", "TGO",
            "TON", "TTO", "TUN", "TKM", "UGA", "ARE", "TZA", "URY", "VUT", "VEN", "VNM", "YEM",
            "ZMB", "ZWE",
        ],
    },
    Organization {
        code: "CW",
        name: "Commonwealth",
        members: &[
            "ATG", "AUS", "BHS", "BGD", "BRB", "BLZ", "BWA", "BRN", "CMR", "CAN", "CYP", "DMA",
            "SWZ", "FJI", "GAB", "GMB", "GHA", "GRD", "GUY", "IND", "JAM", "KEN", "KIR", "LSO",
            "MWI", "MYS", "MDV", "MLT", "MUS", "MOZ", "NAM", "NRU", "NZL", "NGA", "PAK", "PNG",
            "RWA", "KNA", "LCA", "VCT", "WSM", "SYC", "SLE", "SGP", "SLB", "ZAF", "LKA", "TGO",
            "TON", "TTO", "TUV", "UGA", "GBR", "TZA", "VUT", "ZMB",
        ],
    },
];

#[derive(Debug, Deserialize)]
struct M49Record {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GeoschemeRecord {
    iso3: String,
    #[serde(default)]
    capital: String,
    path: String,
}

/// One `(country, ancestor region)` pair of the flattened geoscheme.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoschemeRow {
    pub iso3: String,
    pub capital: String,
    pub region_code: u16,
    pub region_name: String,
}

#[derive(Debug, Clone)]
enum RegionKind {
    Geoscheme(u16),
    Organization(Vec<String>),
}

#[derive(Debug, Clone)]
struct RegionEntry {
    code: String,
    name: String,
    kind: RegionKind,
}

/// Immutable region catalog.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    entries: Vec<RegionEntry>,
    index: AHashMap<String, usize>,
    geoscheme: Vec<GeoschemeRow>,
}

/// Split an M49 path such as `"030 < 0142 < 001"` into numeric codes.
fn parse_path(path: &str) -> Result<Vec<u16>> {
    path.split('<')
        .map(|part| {
            let p = part.trim();
            p.parse::<u16>()
                .map_err(|_| GeoError::SourceSchema(format!("malformed M49 path '{path}'")))
        })
        .collect()
}

impl RegionCatalog {
    /// Catalog built from the embedded M49 and geoscheme tables.
    pub fn builtin(registry: &CountryRegistry) -> Result<Self> {
        Self::from_sources(M49_CSV, GEOSCHEME_CSV, registry)
    }

    /// Build from an M49 table (`code,name`) and a geoscheme table
    /// (`iso3,capital,path`).
    ///
    /// Malformed paths, paths through unknown M49 codes and duplicate region
    /// names are fatal. Geoscheme rows for countries missing from the registry
    /// are skipped.
    pub fn from_sources(m49_csv: &str, geoscheme_csv: &str, registry: &CountryRegistry) -> Result<Self> {
        let mut entries: Vec<RegionEntry> = Vec::new();
        let mut m49_names: AHashMap<u16, String> = AHashMap::new();

        let mut rdr = csv::Reader::from_reader(m49_csv.as_bytes());
        for rec in rdr.deserialize::<M49Record>() {
            let r = rec?;
            let code = r
                .code
                .trim()
                .parse::<u16>()
                .map_err(|_| GeoError::SourceSchema(format!("bad M49 code '{}'", r.code)))?;
            // Parenthesised remarks are not part of the region name.
            let bare = r.name.split('(').next().unwrap_or_default().trim_end();
            let name = title_case(bare);
            m49_names.insert(code, name.clone());
            entries.push(RegionEntry {
                code: format!("{code:03}"),
                name,
                kind: RegionKind::Geoscheme(code),
            });
        }

        for org in ORGANIZATIONS {
            let mut members: Vec<String> = Vec::with_capacity(org.members.len());
            for m in org.members {
                if registry.by_alpha3(m).is_none() {
                    return Err(GeoError::SourceSchema(format!(
                        "{} lists unknown country code {m}",
                        org.name
                    )));
                }
                members.push(m.to_string());
            }
            members.sort();
            members.dedup();
            entries.push(RegionEntry {
                code: org.code.to_string(),
                name: org.name.to_string(),
                kind: RegionKind::Organization(members),
            });
        }

        let mut index = AHashMap::with_capacity(entries.len());
        for (i, e) in entries.iter().enumerate() {
            if index.insert(normalize_key(&e.name), i).is_some() {
                return Err(GeoError::SourceSchema(format!("duplicate region name '{}'", e.name)));
            }
        }

        let mut geoscheme = Vec::new();
        let mut rdr = csv::Reader::from_reader(geoscheme_csv.as_bytes());
        for rec in rdr.deserialize::<GeoschemeRecord>() {
            let r = rec?;
            let iso3 = r.iso3.trim().to_string();
            if registry.by_alpha3(&iso3).is_none() {
                warn!("geoscheme row for unknown country '{iso3}' skipped");
                continue;
            }
            for code in parse_path(&r.path)? {
                let region_name = m49_names.get(&code).cloned().ok_or_else(|| {
                    GeoError::SourceSchema(format!("M49 path '{}' uses unknown code {code}", r.path))
                })?;
                geoscheme.push(GeoschemeRow {
                    iso3: iso3.clone(),
                    capital: r.capital.clone(),
                    region_code: code,
                    region_name,
                });
            }
        }

        debug!(
            "region catalog built: {} regions, {} geoscheme rows",
            entries.len(),
            geoscheme.len()
        );
        Ok(Self {
            entries,
            index,
            geoscheme,
        })
    }

    /// All region names: geoscheme regions first, then organisations.
    pub fn list_regions(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Canonical name of `name` if it is a region, matched ignoring case and
    /// whitespace.
    pub fn is_region(&self, name: &str) -> Option<String> {
        self.index
            .get(&normalize_key(name))
            .map(|&i| self.entries[i].name.clone())
    }

    /// Short code of a region: zero-padded M49 code or organisation acronym.
    pub fn region_code(&self, name: &str) -> Option<String> {
        self.index
            .get(&normalize_key(name))
            .map(|&i| self.entries[i].code.clone())
    }

    /// Sorted alpha-3 codes of every country in the region, at any depth.
    pub fn members(&self, region: &str) -> Result<Vec<String>> {
        let idx = *self
            .index
            .get(&normalize_key(region))
            .ok_or_else(|| GeoError::UnknownRegion(region.to_string()))?;
        let mut out = match &self.entries[idx].kind {
            RegionKind::Organization(members) => members.clone(),
            RegionKind::Geoscheme(code) => self
                .geoscheme
                .iter()
                .filter(|r| r.region_code == *code)
                .map(|r| r.iso3.clone())
                .collect(),
        };
        out.sort();
        out.dedup();
        Ok(out)
    }

    pub fn geoscheme_rows(&self) -> &[GeoschemeRow] {
        &self.geoscheme
    }

    /// The flattened geoscheme as a table with columns
    /// `iso3, capital, region_code, region_name`.
    pub fn geoscheme_table(&self) -> Result<Table> {
        let mut t = Table::new(["iso3", "capital", "region_code", "region_name"]);
        t.extend_rows(self.geoscheme.iter().map(|r| {
            vec![
                Value::from(r.iso3.as_str()),
                Value::from(r.capital.as_str()),
                Value::Text(format!("{:03}", r.region_code)),
                Value::from(r.region_name.as_str()),
            ]
        }))?;
        Ok(t)
    }

    /// Attribution URLs keyed by source name.
    pub fn source_urls(&self) -> &'static [(&'static str, &'static str)] {
        SOURCES
    }
}
