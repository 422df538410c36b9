//! Per-country readers turning upstream boundary files into the common
//! subregion layout: `code_subregion`, `name_subregion`, `code_region`,
//! `name_region`, `geometry`, followed by country-specific attributes.

use super::japan::PREFECTURES;
use super::layout::{
    ESP_PSEUDO, FRA_FRAGMENTED, FRA_INSET, FRA_PSEUDO, FRA_RELOCATION, Inset, PRT_PSEUDO, PseudoRegions,
    Relocation, USA_RELOCATION,
};
use crate::error::{GeoError, Result};
use crate::fetch::Fetch;
use crate::geometry;
use crate::parse::{self, Feature};
use crate::table::{Table, Value};
use crate::util::title_case;
use ahash::AHashMap;
use geo::MultiPolygon;
use log::debug;

pub(crate) const BASE_COLUMNS: [&str; 5] = ["code_subregion", "name_subregion", "code_region", "name_region", "geometry"];

const FRA_GEOMETRY_URL: &str = "https://data.opendatasoft.com/explore/dataset/georef-france-departement@public/download/?format=geojson&timezone=Europe/Berlin&lang=fr";
const FRA_STICKER_URL: &str = "http://sticker-departement.com/";
const FRA_REGION_URL: &str = "https://fr.wikipedia.org/w/index.php?title=R%C3%A9gion_fran%C3%A7aise&oldid=177269957";
const FRA_POPULATION_URL: &str = "https://github.com/coa-project/coadata/raw/main/coastore/www.insee.fr_3658796960";
const USA_GEOMETRY_URL: &str =
    "https://github.com/coa-project/coadata/raw/main/coacache/alicia.data.socrata.com_3337537769.zip";
const USA_INFO_URL: &str = "https://en.wikipedia.org/wiki/List_of_states_and_territories_of_the_United_States";
const ITA_GEOMETRY_URL: &str =
    "https://raw.githubusercontent.com/openpolis/geojson-italy/master/geojson/limits_IT_provinces.geojson";
const IND_GEOMETRY_URL: &str =
    "https://raw.githubusercontent.com/deldersveld/topojson/master/countries/india/india-states.json";
const DEU_GEOMETRY_URL: &str =
    "https://github.com/jgehrcke/covid-19-germany-gae/raw/master/geodata/DE-counties.geojson";
const ESP_GEOMETRY_URL: &str =
    "https://github.com/coa-project/coadata/raw/main/coacache/public.opendatasoft.com_598837822.zip";
const GBR_GEOMETRY_URL: &str = "https://github.com/coa-project/coadata/raw/main/coastore/opendata.arcgis.com_3256063640";
const GBR_REGION_URL: &str =
    "http://geoportal1-ons.opendata.arcgis.com/datasets/0c3a9643cc7c4015bb80751aad1d2594_0.csv";
const BEL_GEOMETRY_URL: &str =
    "https://github.com/coa-project/coadata/raw/main/coacache/public.opendatasoft.com_537867990.zip";
const PRT_GEOMETRY_URL: &str = "https://github.com/coa-project/coadata/raw/main/coastore/concelhos.zip";
const MYS_GEOMETRY_URL: &str = "https://stacks.stanford.edu/file/druid:zd362bc5680/data.zip";
const CHL_GEOMETRY_URL: &str = "http://geonode.meteochile.gob.cl/geoserver/wfs?format_options=charset%3AUTF-8&typename=geonode%3Adivision_comunal_geo_ide_1&outputFormat=SHAPE-ZIP&version=1.0.0&service=WFS&request=GetFeature";
const EUR_GEOMETRY_URL: &str = "https://github.com/coa-project/coadata/raw/main/coastore/WHO_EUROsmall2.json";
const GRC_GEOMETRY_URL: &str = "https://geodata.gov.gr/dataset/6deb6a12-1a54-41b4-b53b-6b36068b8348/resource/3e571f7f-42a4-4b49-8db0-311695d72fa3/download/nomoiokxe.zip";
const JPN_GEOMETRY_URL: &str = "https://raw.githubusercontent.com/dataofjapan/land/master/japan.geojson";

pub(crate) type Loader = fn(&dyn Fetch) -> Result<Table>;

/// Everything the store needs to know about one supported country.
pub(crate) struct CountrySpec {
    pub iso3: &'static str,
    /// Attribution: label and URL of every upstream file.
    pub sources: &'static [(&'static str, &'static str)],
    pub load: Loader,
    /// Empty when the country has no dense layout.
    pub relocation: &'static [Relocation],
    /// Subregions dropped by both the dense and the main layout.
    pub fragmented: &'static [&'static str],
    pub inset: Option<Inset>,
    pub pseudo_regions: Option<PseudoRegions>,
}

impl CountrySpec {
    const fn basic(iso3: &'static str, sources: &'static [(&'static str, &'static str)], load: Loader) -> Self {
        Self {
            iso3,
            sources,
            load,
            relocation: &[],
            fragmented: &[],
            inset: None,
            pseudo_regions: None,
        }
    }
}

pub(crate) static COUNTRIES: &[CountrySpec] = &[
    CountrySpec {
        iso3: "FRA",
        sources: &[
            ("Basics", FRA_GEOMETRY_URL),
            ("Subregion Flags", FRA_STICKER_URL),
            ("Region Flags", FRA_REGION_URL),
            ("Population", FRA_POPULATION_URL),
        ],
        load: load_fra,
        relocation: FRA_RELOCATION,
        fragmented: FRA_FRAGMENTED,
        inset: Some(FRA_INSET),
        pseudo_regions: Some(FRA_PSEUDO),
    },
    CountrySpec {
        iso3: "USA",
        sources: &[("Basics", USA_GEOMETRY_URL), ("Subregion informations", USA_INFO_URL)],
        load: load_usa,
        relocation: USA_RELOCATION,
        fragmented: &[],
        inset: None,
        pseudo_regions: None,
    },
    CountrySpec::basic("ITA", &[("Basics", ITA_GEOMETRY_URL)], load_ita),
    CountrySpec::basic("IND", &[("Basics", IND_GEOMETRY_URL)], load_ind),
    CountrySpec::basic("DEU", &[("Basics", DEU_GEOMETRY_URL)], load_deu),
    CountrySpec {
        pseudo_regions: Some(ESP_PSEUDO),
        ..CountrySpec::basic("ESP", &[("Basics", ESP_GEOMETRY_URL)], load_esp)
    },
    CountrySpec::basic("GBR", &[("Basics", GBR_GEOMETRY_URL), ("Regions", GBR_REGION_URL)], load_gbr),
    CountrySpec::basic("BEL", &[("Basics", BEL_GEOMETRY_URL)], load_bel),
    CountrySpec {
        pseudo_regions: Some(PRT_PSEUDO),
        ..CountrySpec::basic("PRT", &[("Basics", PRT_GEOMETRY_URL)], load_prt)
    },
    CountrySpec::basic("MYS", &[("Basics", MYS_GEOMETRY_URL)], load_mys),
    CountrySpec::basic("CHL", &[("Basics", CHL_GEOMETRY_URL)], load_chl),
    CountrySpec::basic("EUR", &[("Basics", EUR_GEOMETRY_URL)], load_eur),
    CountrySpec::basic("GRC", &[("Basics", GRC_GEOMETRY_URL)], load_grc),
    CountrySpec::basic("JPN", &[("Basics", JPN_GEOMETRY_URL)], load_jpn),
];

pub(crate) fn country_spec(iso3: &str) -> Option<&'static CountrySpec> {
    COUNTRIES.iter().find(|c| c.iso3 == iso3)
}

fn features(fetcher: &dyn Fetch, url: &str, required: &[&str]) -> Result<Vec<Feature>> {
    layer_features(fetcher, url, None, required)
}

/// Features of one boundary file (GeoJSON, TopoJSON or zipped shapefile),
/// checked for the properties the loader reads.
fn layer_features(fetcher: &dyn Fetch, url: &str, layer: Option<&str>, required: &[&str]) -> Result<Vec<Feature>> {
    let features = parse::layer_features(&fetcher.fetch(url, None)?, layer)?;
    if let Some(first) = features.first() {
        if let Some(missing) = required.iter().find(|k| !first.properties.contains_key(**k)) {
            return Err(GeoError::SourceSchema(format!("{url}: features have no '{missing}' property")));
        }
    }
    debug!("{} features read from {url}", features.len());
    Ok(features)
}

fn table_with(extra: &[&str]) -> Table {
    Table::new(BASE_COLUMNS.iter().chain(extra).copied())
}

fn text(f: &Feature, key: &str) -> Value {
    match f.text(key) {
        Some(s) if !s.trim().is_empty() => Value::Text(s.trim().to_string()),
        _ => Value::Null,
    }
}

fn number(f: &Feature, key: &str) -> Value {
    let v = f.properties.get(key).and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse::parse_number(s),
        _ => None,
    });
    Value::from(v)
}

fn shape(g: Option<&MultiPolygon<f64>>) -> Value {
    match g {
        Some(g) if !g.0.is_empty() => Value::Geometry(g.clone()),
        _ => Value::Null,
    }
}

/// Left-pad a numeric code with zeros; other codes are only trimmed.
fn zero_fill(code: &str, width: usize) -> String {
    match code.trim().parse::<u64>() {
        Ok(n) => format!("{n:0width$}"),
        Err(_) => code.trim().to_string(),
    }
}

/// First number of a cell that may hold several (`"52,420 135,767"`).
fn first_number(cell: &str) -> Option<f64> {
    cell.split_whitespace().next().and_then(parse::parse_number)
}

fn load_fra(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, FRA_GEOMETRY_URL, &["dep_code", "dep_name", "reg_code"])?;
    let regions = fra_regions(&fetcher.fetch_text(FRA_REGION_URL, None)?)?;
    let population = fra_population(&fetcher.fetch_text(FRA_POPULATION_URL, None)?)?;

    let mut t = table_with(&["flag_subregion", "flag_region", "population_subregion"]);
    for f in &features {
        let (Some(code), Some(name)) = (f.text("dep_code"), f.text("dep_name")) else {
            continue;
        };
        let Some(&pop) = population.get(&code) else {
            debug!("department {code} has no population entry, skipped");
            continue;
        };
        let code_region = zero_fill(&f.text("reg_code").unwrap_or_default(), 2);
        let (name_region, flag_region) = match regions.get(&code_region) {
            Some((n, flag)) => (Value::from(n.as_str()), flag.clone()),
            None => (text(f, "reg_name"), Value::Null),
        };
        let flag = format!(
            "{FRA_STICKER_URL}img/dept/sticker_plaque_immat_{code}_{}_moto.png",
            name.to_lowercase()
        );
        t.push_row(vec![
            Value::Text(code),
            Value::Text(name),
            Value::Text(code_region),
            name_region,
            shape(f.geometry.as_ref()),
            Value::Text(flag),
            flag_region,
            Value::Number(pop),
        ])?;
    }

    // Collectivités d'outre-mer, grouped into one synthetic subregion.
    let com: Vec<&MultiPolygon<f64>> = features
        .iter()
        .filter(|f| {
            f.text("dep_code")
                .is_some_and(|c| matches!(c.as_str(), "975" | "977" | "978" | "986" | "987"))
        })
        .filter_map(|f| f.geometry.as_ref())
        .collect();
    let com_name = "Collectivités d'outre-mer";
    if let Some(&pop) = population.get("980") {
        t.push_row(vec![
            "980".into(),
            com_name.into(),
            "09".into(),
            com_name.into(),
            shape(Some(&geometry::union_all(com))),
            Value::Null,
            Value::Null,
            Value::Number(pop),
        ])?;
    }
    Ok(t)
}

/// Region code → (name, flag link) from the French regions article.
fn fra_regions(html: &str) -> Result<AHashMap<String, (String, Value)>> {
    let mut out = AHashMap::new();
    for t in parse::html_tables(html)? {
        let Some(code_col) = t.columns().iter().find(|c| c.starts_with("Code INSEE")).cloned() else {
            continue;
        };
        if !t.has_column("Logo") || !t.has_column("Dénomination") {
            continue;
        }
        for r in 0..t.len() {
            let Some(code) = t.get(r, &code_col).and_then(Value::as_f64) else {
                continue;
            };
            let name = t.get(r, "Dénomination").map(Value::to_string).unwrap_or_default();
            let name = name.split('[').next().unwrap_or_default().trim().to_string();
            let flag = t.get(r, "Logo").cloned().unwrap_or_default();
            out.insert(format!("{:02}", code as u32), (name, flag));
        }
    }
    if out.is_empty() {
        return Err(GeoError::SourceSchema(format!(
            "{FRA_REGION_URL}: no table with Logo, Dénomination and Code INSEE columns"
        )));
    }
    Ok(out)
}

/// Department code → municipal population.
fn fra_population(html: &str) -> Result<AHashMap<String, f64>> {
    let t = parse::html_table_with(html, &["Code département", "Population municipale"])?;
    let mut out = AHashMap::new();
    for r in 0..t.len() {
        let code = t.get(r, "Code département").and_then(Value::key);
        let pop = t
            .get(r, "Population municipale")
            .and_then(|v| parse::parse_number(&v.to_string()));
        if let (Some(code), Some(pop)) = (code, pop) {
            out.insert(code, pop);
        }
    }
    // Mayotte and the overseas collectivities are counted separately by INSEE.
    out.entry("976".to_string()).or_insert(256_518.0);
    out.entry("980".to_string())
        .or_insert((5_985 + 10_124 + 34_065 + 281_674 + 12_067) as f64);
    Ok(out)
}

fn load_usa(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, USA_GEOMETRY_URL, &["STATE_NAME", "STATE_ABBR", "SUB_REGION"])?;
    let info = usa_state_info(&fetcher.fetch_text(USA_INFO_URL, None)?)?;

    // A state split over several records keeps its first record's attributes.
    let mut order: Vec<String> = Vec::new();
    let mut states: AHashMap<String, (&Feature, Vec<&MultiPolygon<f64>>)> = AHashMap::new();
    for f in &features {
        let Some(name) = f.text("STATE_NAME") else { continue };
        states
            .entry(name.clone())
            .or_insert_with(|| {
                order.push(name);
                (f, Vec::new())
            })
            .1
            .extend(f.geometry.as_ref());
    }

    let mut t = table_with(&["flag_subregion", "town_subregion", "population_subregion", "area_subregion"]);
    for name in order {
        let Some((f, parts)) = states.remove(&name) else { continue };
        let code = text(f, "STATE_ABBR");
        let region = text(f, "SUB_REGION");
        let mut row = vec![
            code.clone(),
            Value::Text(name),
            region.clone(),
            region,
            shape(Some(&geometry::union_all(parts))),
        ];
        match code.as_str().and_then(|c| info.get(c)) {
            Some(cells) => row.extend(cells.iter().cloned()),
            None => row.extend(std::iter::repeat_n(Value::Null, 4)),
        }
        t.push_row(row)?;
    }
    Ok(t)
}

/// State code → flag, capital, population and area from the second table of
/// the Wikipedia list of states.
fn usa_state_info(html: &str) -> Result<AHashMap<String, [Value; 4]>> {
    let tables = parse::html_tables(html)?;
    let t = tables
        .get(1)
        .filter(|t| t.columns().len() >= 8)
        .ok_or_else(|| GeoError::SourceSchema(format!("{USA_INFO_URL}: state table not found")))?;
    let mut out = AHashMap::new();
    for row in t.rows() {
        let code = row[1].to_string();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            continue;
        }
        let flag = row[0].to_string();
        let flag = match flag.split(' ').next() {
            Some(link) if link.starts_with("http") => Value::from(link),
            _ => Value::Null,
        };
        let town = match &row[2] {
            Value::Text(s) => Value::from(s.as_str()),
            _ => Value::Null,
        };
        let cells = [
            flag,
            town,
            Value::from(first_number(&row[5].to_string())),
            Value::from(first_number(&row[7].to_string())),
        ];
        out.insert(code, cells);
    }
    Ok(out)
}

fn load_ita(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, ITA_GEOMETRY_URL, &["prov_name", "prov_acr", "reg_name", "reg_istat_code"])?;
    let mut t = table_with(&[]);
    for f in &features {
        let region = match f.text("reg_name").as_deref() {
            Some("Valle d'Aosta/Vallée d'Aoste") => Value::from("Valle d'Aosta"),
            Some("Trentino-Alto Adige/Südtirol") => Value::from("Trentino-Alto Adige"),
            Some("Friuli-Venezia Giulia") => Value::from("Friuli Venezia Giulia"),
            _ => text(f, "reg_name"),
        };
        t.push_row(vec![
            text(f, "prov_acr"),
            text(f, "prov_name"),
            text(f, "reg_istat_code"),
            region,
            shape(f.geometry.as_ref()),
        ])?;
    }
    Ok(t)
}

fn load_ind(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, IND_GEOMETRY_URL, &["NAME_1", "HASC_1"])?;
    let mut t = table_with(&["variation_name_subregion"]);
    for f in &features {
        let name = match f.text("NAME_1").unwrap_or_default() {
            n if n == "Orissa" => "Odisha".to_string(),
            n => n,
        };
        let variation = match f.text("VARNAME_1") {
            Some(v) if !v.is_empty() => format!("{name}|{v}"),
            _ => name.clone(),
        };
        let code = text(f, "HASC_1");
        t.push_row(vec![
            code.clone(),
            Value::from(name.as_str()),
            code,
            Value::from(name.as_str()),
            shape(f.geometry.as_ref()),
            Value::Text(variation),
        ])?;
    }
    Ok(t)
}

// Official municipality key (AGS) prefix of each Land.
const LAENDER: [&str; 16] = [
    "Schleswig-Holstein",
    "Hamburg",
    "Niedersachsen",
    "Bremen",
    "Nordrhein-Westfalen",
    "Hessen",
    "Rheinland-Pfalz",
    "Baden-Württemberg",
    "Bayern",
    "Saarland",
    "Berlin",
    "Brandenburg",
    "Mecklenburg-Vorpommern",
    "Sachsen",
    "Sachsen-Anhalt",
    "Thüringen",
];

fn load_deu(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, DEU_GEOMETRY_URL, &["GEN", "AGS"])?;
    // Counties sharing a name are merged; the first key is kept.
    let mut order: Vec<String> = Vec::new();
    let mut merged: AHashMap<String, (u64, Vec<&MultiPolygon<f64>>)> = AHashMap::new();
    for f in &features {
        let (Some(name), Some(ags)) = (f.text("GEN"), f.text("AGS").and_then(|a| a.trim().parse::<u64>().ok()))
        else {
            continue;
        };
        let entry = merged.entry(name.clone()).or_insert_with(|| {
            order.push(name.clone());
            (ags, Vec::new())
        });
        entry.1.extend(f.geometry.as_ref());
    }

    let mut t = table_with(&[]);
    for name in order {
        let Some((ags, parts)) = merged.remove(&name) else {
            continue;
        };
        let land = ags / 1000;
        let land_name = LAENDER
            .get((land as usize).wrapping_sub(1))
            .map(|n| Value::from(*n))
            .unwrap_or(Value::Null);
        t.push_row(vec![
            Value::Text(ags.to_string()),
            Value::Text(name),
            Value::Text(format!("{land:02}")),
            land_name,
            shape(Some(&geometry::union_all(parts))),
        ])?;
    }
    Ok(t)
}

fn load_esp(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, ESP_GEOMETRY_URL, &["ccaa", "cod_ccaa", "provincia", "codigo"])?;
    let mut t = table_with(&[]);
    for f in &features {
        t.push_row(vec![
            text(f, "codigo"),
            text(f, "provincia"),
            text(f, "cod_ccaa"),
            text(f, "ccaa"),
            shape(f.geometry.as_ref()),
        ])?;
    }
    Ok(t)
}

// Districts created after the region lookup table was published.
const GBR_EXTRA_DISTRICTS: &[(&str, &str, &str)] = &[
    ("E07000245", "E12000006", "East of England"),
    ("E07000244", "E12000006", "East of England"),
    ("E06000059", "E12000009", "South West"),
    ("E06000058", "E12000009", "South West"),
    ("E07000246", "E12000009", "South West"),
];

fn gbr_nation(code_subregion: &str) -> Option<(&'static str, &'static str)> {
    match code_subregion.chars().next()? {
        'E' => Some(("E", "England")),
        'W' => Some(("W", "Wales")),
        'S' => Some(("S", "Scotland")),
        'N' => Some(("N", "Northern Ireland")),
        _ => None,
    }
}

fn load_gbr(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, GBR_GEOMETRY_URL, &["lad19cd", "lad19nm"])?;
    let lookup = parse::csv_table(&fetcher.fetch(GBR_REGION_URL, None)?, b',')?;
    for col in ["LAD18CD", "RGN18CD", "RGN18NM"] {
        if !lookup.has_column(col) {
            return Err(GeoError::SourceSchema(format!("{GBR_REGION_URL}: no '{col}' column")));
        }
    }
    let mut regions: AHashMap<String, (String, String)> = AHashMap::new();
    for r in 0..lookup.len() {
        let cell = |c: &str| lookup.get(r, c).and_then(Value::key);
        if let (Some(lad), Some(code), Some(name)) = (cell("LAD18CD"), cell("RGN18CD"), cell("RGN18NM")) {
            regions.entry(lad).or_insert((code, name));
        }
    }
    for &(lad, code, name) in GBR_EXTRA_DISTRICTS {
        regions
            .entry(lad.to_string())
            .or_insert((code.to_string(), name.to_string()));
    }

    let mut t = table_with(&[]);
    for f in &features {
        let code = f.text("lad19cd").unwrap_or_default();
        let (code_region, name_region) = match regions.get(&code) {
            Some((c, n)) => (Value::from(c.as_str()), Value::from(n.as_str())),
            None => match gbr_nation(&code) {
                Some((c, n)) => (Value::from(c), Value::from(n)),
                None => (Value::Null, Value::Null),
            },
        };
        t.push_row(vec![
            Value::Text(code),
            text(f, "lad19nm"),
            code_region,
            name_region,
            shape(f.geometry.as_ref()),
        ])?;
    }
    Ok(t)
}

/// Province name with spaces, articles and hyphens removed.
fn bel_province(f: &Feature) -> String {
    let raw = ["prov_name_n", "prov_name_f", "region"]
        .iter()
        .find_map(|k| f.text(k).filter(|s| !s.is_empty()))
        .unwrap_or_default();
    let squeezed = title_case(&raw)
        .replace(' ', "")
        .replace("(Le)", "")
        .replace("(La)", "")
        .replace('-', "");
    match squeezed.as_str() {
        "RégionDeBruxellesCapitale" => "Brussels".to_string(),
        "Henegouwen" => "Hainaut".to_string(),
        _ => squeezed,
    }
}

fn load_bel(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, BEL_GEOMETRY_URL, &["nom_arrondi", "niscode"])?;
    let mut t = table_with(&[]);
    for f in &features {
        let code_region = match text(f, "prov_code") {
            Value::Null => Value::from("00000"),
            v => v,
        };
        t.push_row(vec![
            text(f, "niscode"),
            text(f, "nom_arrondi"),
            code_region,
            Value::Text(bel_province(f)),
            shape(f.geometry.as_ref()),
        ])?;
    }
    Ok(t)
}

fn load_prt(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, PRT_GEOMETRY_URL, &["NAME_1", "NAME_2", "HASC_2"])?;
    let mut t = table_with(&[]);
    for f in &features {
        let code = f.text("HASC_2").unwrap_or_default();
        let code_region: String = code.chars().take(5).collect();
        t.push_row(vec![
            Value::Text(code),
            text(f, "NAME_2"),
            Value::Text(code_region),
            text(f, "NAME_1"),
            shape(f.geometry.as_ref()),
        ])?;
    }
    Ok(t)
}

fn load_mys(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, MYS_GEOMETRY_URL, &["nam"])?;
    let mut order: Vec<String> = Vec::new();
    let mut parts: AHashMap<String, Vec<&MultiPolygon<f64>>> = AHashMap::new();
    for f in &features {
        let Some(nam) = f.text("nam") else { continue };
        parts
            .entry(nam.clone())
            .or_insert_with(|| {
                order.push(nam.clone());
                Vec::new()
            })
            .extend(f.geometry.as_ref());
    }
    order.sort();

    let mut t = table_with(&[]);
    for nam in order {
        let name = title_case(&nam);
        // Codes used by the national case counts.
        let code = match name.as_str() {
            "Wilayah Persekutuan Labuan" => "W.P. Labuan".to_string(),
            "Wilayah Persekutuan" => "W.P. Kuala Lumpur".to_string(),
            _ => name.clone(),
        };
        let g = geometry::union_all(parts.remove(&nam).unwrap_or_default());
        t.push_row(vec![
            Value::Text(code),
            Value::Text(name),
            "MYS".into(),
            "Malaysia".into(),
            shape(Some(&g)),
        ])?;
    }
    Ok(t)
}

fn load_chl(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, CHL_GEOMETRY_URL, &["NOM_REG", "NOM_COM", "COD_COMUNA"])?;
    let mut t = table_with(&[]);
    for f in &features {
        let code = zero_fill(&f.text("COD_COMUNA").unwrap_or_default(), 5);
        let code_region: String = code.chars().take(2).collect();
        t.push_row(vec![
            Value::Text(code),
            text(f, "NOM_COM"),
            Value::Text(code_region),
            text(f, "NOM_REG"),
            shape(f.geometry.as_ref()),
        ])?;
    }
    Ok(t)
}

fn load_eur(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, EUR_GEOMETRY_URL, &["UID", "RegionName", "ADM0_ISO3", "ADM0_NAME"])?;
    let mut t = table_with(&["population_subregion"]);
    for f in &features {
        t.push_row(vec![
            text(f, "UID"),
            text(f, "RegionName"),
            text(f, "ADM0_ISO3"),
            text(f, "ADM0_NAME"),
            shape(f.geometry.as_ref()),
            number(f, "Population"),
        ])?;
    }
    Ok(t)
}

const GRC_LAYER: &str = "nomoi_okxe";

// Attica prefectures reported as one area; the last one absorbs the others.
const GRC_ATTICA: [&str; 4] = ["ΔΥΤΙΚΗΣ ΑΤΤΙΚΗΣ", "ΑΝΑΤΟΛΙΚΗΣ ΑΤΤΙΚΗΣ", "ΠΕΙΡΑΙΩΣ ΚΑΙ ΝΗΣΩΝ", "ΑΘΗΝΩΝ"];

fn grc_rename(name: &str) -> &str {
    match name {
        "Ο ΟΡΟΣ" => "ΑΓΙΟ ΟΡΟΣ",
        "ΑΘΗΝΩΝ" => "ΑΤΤΙΚΗΣ",
        other => other,
    }
}

fn load_grc(fetcher: &dyn Fetch) -> Result<Table> {
    let features = layer_features(fetcher, GRC_GEOMETRY_URL, Some(GRC_LAYER), &["NAME_GR", "PARENT", "POP"])?;
    let mut rows: Vec<(String, String, Option<f64>, Option<MultiPolygon<f64>>)> = features
        .iter()
        .map(|f| {
            let name: String = f.text("NAME_GR").unwrap_or_default().chars().skip(3).collect();
            let code: String = f.text("PARENT").unwrap_or_default().chars().take(2).collect();
            (name, code, number(f, "POP").as_f64(), f.geometry.clone())
        })
        .collect();

    let attica: Vec<&(String, String, Option<f64>, Option<MultiPolygon<f64>>)> =
        rows.iter().filter(|r| GRC_ATTICA.contains(&r.0.as_str())).collect();
    let merged_pop = attica.iter().filter_map(|r| r.2).sum::<f64>();
    let merged_shape = geometry::union_all(attica.iter().filter_map(|r| r.3.as_ref()));
    let absorbed = &GRC_ATTICA[..3];
    rows.retain(|r| !absorbed.contains(&r.0.as_str()));
    if let Some(athens) = rows.iter_mut().find(|r| r.0 == GRC_ATTICA[3]) {
        athens.2 = Some(merged_pop);
        athens.3 = Some(merged_shape);
    }

    let mut t = table_with(&["population_subregion"]);
    for (name, code, pop, g) in rows {
        let name = grc_rename(&name).to_string();
        t.push_row(vec![
            Value::from(code.as_str()),
            Value::from(name.as_str()),
            Value::from(code.as_str()),
            Value::from(name.as_str()),
            shape(g.as_ref()),
            Value::from(pop),
        ])?;
    }
    Ok(t)
}

fn load_jpn(fetcher: &dyn Fetch) -> Result<Table> {
    let features = features(fetcher, JPN_GEOMETRY_URL, &["id"])?;
    let mut t = table_with(&["flag_subregion", "town_subregion", "population_subregion", "area_subregion"]);
    for f in &features {
        let Some(id) = f.text("id").and_then(|i| i.trim().parse::<usize>().ok()) else {
            continue;
        };
        let Some(p) = id.checked_sub(1).and_then(|i| PREFECTURES.get(i)) else {
            continue;
        };
        t.push_row(vec![
            Value::Text(id.to_string()),
            p.name.into(),
            p.region.into(),
            p.region.into(),
            shape(f.geometry.as_ref()),
            p.flag.into(),
            p.capital.into(),
            Value::Number(p.population as f64),
            Value::Number(p.area),
        ])?;
    }
    Ok(t)
}
