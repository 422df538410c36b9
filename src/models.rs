use crate::error::GeoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier form a location is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    /// ISO 3166-1 alpha-2 (`"FR"`)
    Iso2,
    /// ISO 3166-1 alpha-3 (`"FRA"`)
    Iso3,
    /// Registry display name (`"France"`)
    Name,
    /// ISO 3166-1 numeric code (`"250"`)
    Num,
}

impl Standard {
    pub const ALL: [Standard; 4] = [Standard::Iso2, Standard::Iso3, Standard::Name, Standard::Num];

    pub fn as_str(&self) -> &'static str {
        match self {
            Standard::Iso2 => "iso2",
            Standard::Iso3 => "iso3",
            Standard::Name => "name",
            Standard::Num => "num",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Standard {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Standard::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| GeoError::InvalidStandard(s.to_string()))
    }
}

/// Upstream datasets with a known set of naming quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDb {
    Jhu,
    Worldometers,
    Owid,
    Opencovid19national,
    Spfnational,
    Mpoxgh,
    Olympics,
}

impl SourceDb {
    pub const ALL: [SourceDb; 7] = [
        SourceDb::Jhu,
        SourceDb::Worldometers,
        SourceDb::Owid,
        SourceDb::Opencovid19national,
        SourceDb::Spfnational,
        SourceDb::Mpoxgh,
        SourceDb::Olympics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceDb::Jhu => "jhu",
            SourceDb::Worldometers => "worldometers",
            SourceDb::Owid => "owid",
            SourceDb::Opencovid19national => "opencovid19national",
            SourceDb::Spfnational => "spfnational",
            SourceDb::Mpoxgh => "mpoxgh",
            SourceDb::Olympics => "olympics",
        }
    }
}

impl fmt::Display for SourceDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceDb {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        SourceDb::ALL
            .into_iter()
            .find(|db| db.as_str() == key)
            .ok_or_else(|| GeoError::InvalidArgument(format!("unknown source database '{s}'")))
    }
}

/// Which side of a region/subregion record a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputField {
    #[default]
    Code,
    Name,
}

impl FromStr for OutputField {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(OutputField::Code),
            "name" => Ok(OutputField::Name),
            other => Err(GeoError::InvalidArgument(format!(
                "output must be 'code' or 'name', got '{other}'"
            ))),
        }
    }
}

/// Per-country fields the enricher can attach to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoField {
    Area,
    Capital,
    ContinentCode,
    ContinentName,
    CountryName,
    Fertility,
    Flag,
    Geometry,
    MedianAge,
    Population,
    RegionCodeList,
    RegionNameList,
    UrbanRate,
}

impl InfoField {
    /// Every field, in ascending name order.
    pub const ALL: [InfoField; 13] = [
        InfoField::Area,
        InfoField::Capital,
        InfoField::ContinentCode,
        InfoField::ContinentName,
        InfoField::CountryName,
        InfoField::Fertility,
        InfoField::Flag,
        InfoField::Geometry,
        InfoField::MedianAge,
        InfoField::Population,
        InfoField::RegionCodeList,
        InfoField::RegionNameList,
        InfoField::UrbanRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfoField::Area => "area",
            InfoField::Capital => "capital",
            InfoField::ContinentCode => "continent_code",
            InfoField::ContinentName => "continent_name",
            InfoField::CountryName => "country_name",
            InfoField::Fertility => "fertility",
            InfoField::Flag => "flag",
            InfoField::Geometry => "geometry",
            InfoField::MedianAge => "median_age",
            InfoField::Population => "population",
            InfoField::RegionCodeList => "region_code_list",
            InfoField::RegionNameList => "region_name_list",
            InfoField::UrbanRate => "urban_rate",
        }
    }
}

impl fmt::Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfoField {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InfoField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| GeoError::UnknownField(s.to_string()))
    }
}

/// Continent codes as used by the country registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    #[serde(rename = "AF")]
    Africa,
    #[serde(rename = "AN")]
    Antarctica,
    #[serde(rename = "AS")]
    Asia,
    #[serde(rename = "EU")]
    Europe,
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "OC")]
    Oceania,
    #[serde(rename = "SA")]
    SouthAmerica,
}

impl Continent {
    pub fn code(&self) -> &'static str {
        match self {
            Continent::Africa => "AF",
            Continent::Antarctica => "AN",
            Continent::Asia => "AS",
            Continent::Europe => "EU",
            Continent::NorthAmerica => "NA",
            Continent::Oceania => "OC",
            Continent::SouthAmerica => "SA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Antarctica => "Antarctica",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::Oceania => "Oceania",
            Continent::SouthAmerica => "South America",
        }
    }
}

/// One entry of the ISO 3166-1 registry. Identity is the alpha-3 code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCountry {
    pub alpha2: String,
    pub alpha3: String,
    pub numeric: String,
    pub name: String,
    pub continent: Continent,
    /// Official and common names also accepted by the exact lookup.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CanonicalCountry {
    /// Representation of this country in the given standard.
    pub fn code(&self, standard: Standard) -> &str {
        match standard {
            Standard::Iso2 => &self.alpha2,
            Standard::Iso3 => &self.alpha3,
            Standard::Name => &self.name,
            Standard::Num => &self.numeric,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_parses_known_names_only() {
        assert_eq!("iso3".parse::<Standard>().unwrap(), Standard::Iso3);
        assert!(matches!(
            "alpha3".parse::<Standard>(),
            Err(GeoError::InvalidStandard(s)) if s == "alpha3"
        ));
    }

    #[test]
    fn info_fields_are_listed_in_name_order() {
        let names: Vec<&str> = InfoField::ALL.iter().map(|f| f.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn source_db_is_case_insensitive() {
        assert_eq!("JHU".parse::<SourceDb>().unwrap(), SourceDb::Jhu);
        assert!("nope".parse::<SourceDb>().is_err());
    }
}
