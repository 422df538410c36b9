mod common;

use common::{layer, shapefile_zip, square, zip};
use epigeo::geometry;
use epigeo::{OutputField, RegionQuery, StaticFetcher, SubnationalGeometryStore, Table, Value};

const FRA_GEOMETRY_URL: &str = "https://data.opendatasoft.com/explore/dataset/georef-france-departement@public/download/?format=geojson&timezone=Europe/Berlin&lang=fr";
const FRA_REGION_URL: &str = "https://fr.wikipedia.org/w/index.php?title=R%C3%A9gion_fran%C3%A7aise&oldid=177269957";
const FRA_POPULATION_URL: &str = "https://github.com/coa-project/coadata/raw/main/coastore/www.insee.fr_3658796960";
const USA_GEOMETRY_URL: &str =
    "https://github.com/coa-project/coadata/raw/main/coacache/alicia.data.socrata.com_3337537769.zip";
const USA_INFO_URL: &str = "https://en.wikipedia.org/wiki/List_of_states_and_territories_of_the_United_States";
const ESP_GEOMETRY_URL: &str =
    "https://github.com/coa-project/coadata/raw/main/coacache/public.opendatasoft.com_598837822.zip";
const CHL_GEOMETRY_URL: &str = "http://geonode.meteochile.gob.cl/geoserver/wfs?format_options=charset%3AUTF-8&typename=geonode%3Adivision_comunal_geo_ide_1&outputFormat=SHAPE-ZIP&version=1.0.0&service=WFS&request=GetFeature";
const GRC_GEOMETRY_URL: &str = "https://geodata.gov.gr/dataset/6deb6a12-1a54-41b4-b53b-6b36068b8348/resource/3e571f7f-42a4-4b49-8db0-311695d72fa3/download/nomoiokxe.zip";
const GBR_GEOMETRY_URL: &str = "https://github.com/coa-project/coadata/raw/main/coastore/opendata.arcgis.com_3256063640";
const GBR_REGION_URL: &str =
    "http://geoportal1-ons.opendata.arcgis.com/datasets/0c3a9643cc7c4015bb80751aad1d2594_0.csv";

const GREEK_GRID: &str = r#"PROJCS["GGRS87_Greek_Grid",GEOGCS["GCS_GGRS_1987",DATUM["D_GGRS_1987",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",24.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

fn geojson_square(properties: &str, x: f64, y: f64) -> String {
    format!(
        r#"{{"type":"Feature","properties":{{{properties}}},"geometry":{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y1}],[{x},{y}]]]}}}}"#,
        x1 = x + 1.0,
        y1 = y + 1.0
    )
}

fn collection(features: &[String]) -> String {
    format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
}

fn texts(t: &Table, column: &str) -> Vec<String> {
    t.column_keys(column).unwrap().into_iter().map(Option::unwrap_or_default).collect()
}

fn row_of(t: &Table, column: &str, key: &str) -> usize {
    texts(t, column).iter().position(|k| k == key).unwrap()
}

fn bounds(t: &Table, row: usize) -> (f64, f64, f64, f64) {
    let g = t.get(row, "geometry").and_then(Value::as_geometry).unwrap();
    let r = geometry::bounds(g).unwrap();
    (r.min().x, r.min().y, r.max().x, r.max().y)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn france() -> SubnationalGeometryStore {
    let dep = |code: &str, name: &str, reg: &str, reg_name: &str, x: f64, y: f64| {
        geojson_square(
            &format!(r#""dep_code":"{code}","dep_name":"{name}","reg_code":"{reg}","reg_name":"{reg_name}""#),
            x,
            y,
        )
    };
    let geometry = collection(&[
        dep("75", "Paris", "11", "Île-de-France", 2.0, 48.5),
        dep("92", "Hauts-de-Seine", "11", "Île-de-France", 1.0, 48.5),
        dep("29", "Finistère", "53", "Bretagne", -4.5, 48.0),
        dep("974", "La Réunion", "04", "La Réunion", 55.0, -21.0),
        dep("976", "Mayotte", "06", "Mayotte", 45.0, -13.0),
        dep("987", "Polynésie française", "", "", -150.0, -18.0),
    ]);
    let regions = r#"<html><body>
<table class="wikitable">
<tr><th>Logo</th><th>Dénomination</th><th>Chef-lieu</th><th>Code INSEE</th></tr>
<tr><td><img src="//upload.example/idf.svg"></td><td>Île-de-France<sup>[a]</sup></td><td>Paris</td><td>11</td></tr>
<tr><td><img src="//upload.example/bzh.svg"></td><td>Bretagne</td><td>Rennes</td><td>53</td></tr>
<tr><td><img src="//upload.example/run.svg"></td><td>La Réunion</td><td>Saint-Denis</td><td>04</td></tr>
</table>
</body></html>"#;
    let population = r#"<html><body>
<table>
<tr><th>Code département</th><th>Département</th><th>Population municipale</th></tr>
<tr><td>75</td><td>Paris</td><td>2 165 423</td></tr>
<tr><td>92</td><td>Hauts-de-Seine</td><td>1 624 357</td></tr>
<tr><td>29</td><td>Finistère</td><td>915 090</td></tr>
<tr><td>974</td><td>La Réunion</td><td>873 102</td></tr>
</table>
</body></html>"#;
    let fetcher = StaticFetcher::new()
        .with(FRA_GEOMETRY_URL, geometry)
        .with(FRA_REGION_URL, regions)
        .with(FRA_POPULATION_URL, population);
    SubnationalGeometryStore::new(Some("FRA"), &fetcher).unwrap()
}

#[test]
fn french_departments_join_population_and_regions() {
    let store = france();
    let t = store.get_data(false).unwrap();
    assert_eq!(texts(t, "code_subregion"), ["29", "75", "92", "974", "976", "980"]);

    let paris = row_of(t, "code_subregion", "75");
    assert_eq!(t.get(paris, "population_subregion"), Some(&Value::Number(2_165_423.0)));
    assert_eq!(t.get(paris, "name_region").unwrap().as_str(), Some("Île-de-France"));
    assert_eq!(t.get(paris, "flag_region").unwrap().as_str(), Some("http://upload.example/idf.svg"));
    assert_eq!(
        t.get(paris, "flag_subregion").unwrap().as_str(),
        Some("http://sticker-departement.com/img/dept/sticker_plaque_immat_75_paris_moto.png")
    );

    let mayotte = row_of(t, "code_subregion", "976");
    assert_eq!(t.get(mayotte, "population_subregion"), Some(&Value::Number(256_518.0)));
    assert_eq!(t.get(mayotte, "name_region").unwrap().as_str(), Some("Mayotte"));
    assert!(t.get(mayotte, "flag_region").unwrap().is_null());

    let com = row_of(t, "code_subregion", "980");
    assert_eq!(t.get(com, "code_region").unwrap().as_str(), Some("09"));
    assert_eq!(t.get(com, "population_subregion"), Some(&Value::Number(343_915.0)));
    assert!(close(bounds(t, com).0, -150.0));
}

#[test]
fn french_regions_include_mainland_and_overseas_groupings() {
    let store = france();
    let r = store.get_data(true).unwrap();
    assert_eq!(texts(r, "code_region"), ["000", "04", "06", "09", "11", "53", "999"]);

    let idf = row_of(r, "code_region", "11");
    assert_eq!(r.get(idf, "population_region"), Some(&Value::Number(2_165_423.0 + 1_624_357.0)));
    let mainland = row_of(r, "code_region", "999");
    assert_eq!(r.get(mainland, "name_region").unwrap().as_str(), Some("Métropole"));
    assert_eq!(
        r.get(mainland, "population_region"),
        Some(&Value::Number(2_165_423.0 + 1_624_357.0 + 915_090.0))
    );

    assert_eq!(
        store.get_subregions_from_region(&RegionQuery::name("Île-de-France")).unwrap(),
        ["75", "92"]
    );
    let mut overseas = store
        .get_subregions_from_region(&RegionQuery::code("000").output(OutputField::Name))
        .unwrap();
    overseas.sort();
    assert_eq!(overseas, ["Collectivités d'outre-mer", "La Réunion", "Mayotte"]);
}

#[test]
fn french_dense_layout_moves_overseas_and_drops_collectivities() {
    let mut store = france();
    store.set_dense_geometry().unwrap();
    let t = store.get_data(false).unwrap();
    assert!(!texts(t, "code_subregion").contains(&"980".to_string()));

    let (x0, y0, _, _) = bounds(t, row_of(t, "code_subregion", "974"));
    assert!(close(x0, 4.0) && close(y0, 39.0));
    let (x0, y0, _, _) = bounds(t, row_of(t, "code_subregion", "75"));
    assert!(close(x0, 2.0) && close(y0, 48.5));
}

fn usa() -> SubnationalGeometryStore {
    let fields = [("STATE_NAME", b'C', 30), ("STATE_ABBR", b'C', 2), ("SUB_REGION", b'C', 20)];
    let rows = vec![
        (vec![square(-120.0, 35.0, 1.0)], vec!["California", "CA", "Pacific"]),
        (vec![square(-150.0, 60.0, 1.0)], vec!["Alaska", "AK", "Pacific"]),
        (vec![square(-100.0, 31.0, 1.0)], vec!["Texas", "TX", "West South Central"]),
        (vec![square(-160.0, 55.0, 1.0)], vec!["Alaska", "AK", "Pacific"]),
        (vec![square(-157.0, 20.0, 1.0)], vec!["Hawaii", "HI", "Pacific"]),
    ];
    let boundaries = shapefile_zip("states", &fields, &rows, None);
    let info = r#"<html><body>
<table><tr><td>Contents</td></tr></table>
<table>
<tr><th>Flag, name</th><th>Abbr.</th><th>Capital</th><th>Largest city</th><th>Ratification</th><th>Population</th><th>Reps.</th><th>Total area</th></tr>
<tr><td><img src="//upload.example/ca.svg"> California</td><td>CA</td><td>Sacramento</td><td>Los Angeles</td><td>Sep 9, 1850</td><td>39,538,223</td><td>52</td><td>163,695 423,967</td></tr>
<tr><td><img src="//upload.example/ak.svg"> Alaska</td><td>AK</td><td>Juneau</td><td>Anchorage</td><td>Jan 3, 1959</td><td>733,391</td><td>1</td><td>665,384 1,723,337</td></tr>
</table>
</body></html>"#;
    let fetcher = StaticFetcher::new()
        .with(USA_GEOMETRY_URL, boundaries)
        .with(USA_INFO_URL, info);
    SubnationalGeometryStore::new(Some("USA"), &fetcher).unwrap()
}

#[test]
fn us_states_are_read_from_a_zipped_shapefile() {
    let store = usa();
    let t = store.get_data(false).unwrap();
    assert_eq!(texts(t, "code_subregion"), ["AK", "CA", "HI", "TX"]);

    let ak = row_of(t, "code_subregion", "AK");
    let parts = t.get(ak, "geometry").and_then(Value::as_geometry).unwrap();
    assert_eq!(parts.0.len(), 2);
    assert_eq!(bounds(t, ak), (-160.0, 55.0, -149.0, 61.0));

    let ca = row_of(t, "code_subregion", "CA");
    assert_eq!(t.get(ca, "town_subregion").unwrap().as_str(), Some("Sacramento"));
    assert_eq!(t.get(ca, "population_subregion"), Some(&Value::Number(39_538_223.0)));
    assert_eq!(t.get(ca, "area_subregion"), Some(&Value::Number(163_695.0)));
    assert_eq!(t.get(ca, "flag_subregion").unwrap().as_str(), Some("http://upload.example/ca.svg"));
    assert!(t.get(row_of(t, "code_subregion", "TX"), "population_subregion").unwrap().is_null());

    let r = store.get_data(true).unwrap();
    assert_eq!(texts(r, "code_region"), ["Pacific", "West South Central"]);
    assert_eq!(r.get(0, "population_region"), Some(&Value::Number(39_538_223.0 + 733_391.0)));
}

#[test]
fn us_dense_layout_scales_alaska_and_moves_hawaii() {
    let mut store = usa();
    store.set_dense_geometry().unwrap();
    assert!(store.is_dense_geometry());
    let t = store.get_data(false).unwrap();

    // shifted by (40, -40), then scaled by 0.4 around (-120, 25)
    let (x0, y0, x1, y1) = bounds(t, row_of(t, "code_subregion", "AK"));
    assert!(close(x0, -120.0) && close(y0, 21.0));
    assert!(close(x1, -115.6) && close(y1, 23.4));

    let (x0, y0, _, _) = bounds(t, row_of(t, "code_subregion", "HI"));
    assert!(close(x0, -97.0) && close(y0, 20.0));
    let (x0, y0, _, _) = bounds(t, row_of(t, "code_subregion", "CA"));
    assert!(close(x0, -120.0) && close(y0, 35.0));
}

#[test]
fn spanish_provinces_get_island_grouping() {
    let fields = [("ccaa", b'C', 40), ("cod_ccaa", b'C', 2), ("provincia", b'C', 40), ("codigo", b'C', 2)];
    let rows = vec![
        (vec![square(-4.0, 40.0, 1.0)], vec!["Comunidad de Madrid", "13", "Madrid", "28"]),
        (vec![square(-15.5, 28.0, 1.0)], vec!["Canarias", "05", "Las Palmas", "35"]),
        (vec![square(-17.0, 28.0, 1.0)], vec!["Canarias", "05", "Santa Cruz de Tenerife", "38"]),
    ];
    let fetcher = StaticFetcher::new().with(ESP_GEOMETRY_URL, shapefile_zip("provincias", &fields, &rows, None));
    let store = SubnationalGeometryStore::new(Some("ESP"), &fetcher).unwrap();

    let r = store.get_data(true).unwrap();
    assert_eq!(texts(r, "code_region"), ["00", "05", "13", "99"]);
    assert_eq!(
        store.get_subregions_from_region(&RegionQuery::name("Islas españolas")).unwrap(),
        ["35", "38"]
    );
    assert_eq!(store.get_subregions_from_region(&RegionQuery::code("99")).unwrap(), ["28"]);
}

#[test]
fn chilean_communes_are_zero_filled() {
    let fields = [("NOM_REG", b'C', 60), ("NOM_COM", b'C', 40), ("COD_COMUNA", b'N', 5)];
    let rows = vec![
        (vec![square(-70.2, -20.3, 0.2)], vec!["Región de Tarapacá", "Iquique", "1101"]),
        (vec![square(-70.7, -33.5, 0.1)], vec!["Región Metropolitana de Santiago", "Santiago", "13101"]),
        (vec![square(-70.6, -33.5, 0.1)], vec!["Región Metropolitana de Santiago", "Providencia", "13123"]),
    ];
    let fetcher = StaticFetcher::new().with(CHL_GEOMETRY_URL, shapefile_zip("comunas", &fields, &rows, None));
    let store = SubnationalGeometryStore::new(Some("CHL"), &fetcher).unwrap();

    let t = store.get_data(false).unwrap();
    assert_eq!(texts(t, "code_subregion"), ["01101", "13101", "13123"]);
    assert_eq!(t.get(0, "code_region").unwrap().as_str(), Some("01"));
    assert_eq!(t.get(0, "name_region").unwrap().as_str(), Some("Región de Tarapacá"));

    let mut santiago = store
        .get_subregions_from_region(&RegionQuery::code("13").output(OutputField::Name))
        .unwrap();
    santiago.sort();
    assert_eq!(santiago, ["Providencia", "Santiago"]);
}

#[test]
fn greek_prefectures_are_reprojected_and_attica_merged() {
    let fields = [("NAME_GR", b'C', 80), ("PARENT", b'C', 10), ("POP", b'N', 10)];
    let rows = vec![
        (vec![square(470_000.0, 4_190_000.0, 10_000.0)], vec!["Ν. ΑΘΗΝΩΝ", "45", "100"]),
        (vec![square(455_000.0, 4_190_000.0, 10_000.0)], vec!["Ν. ΠΕΙΡΑΙΩΣ ΚΑΙ ΝΗΣΩΝ", "46", "50"]),
        (vec![square(300_000.0, 4_230_000.0, 10_000.0)], vec!["Ν. ΑΧΑΪΑΣ", "13", "30"]),
    ];
    let mut members = layer("nomoi_okxe", &fields, &rows, Some(GREEK_GRID));
    // sorts first, so only the layer name selects the prefectures
    members.extend(layer(
        "a_points",
        &[("ID", b'N', 4)],
        &[(vec![square(0.0, 0.0, 1.0)], vec!["1"])],
        None,
    ));
    let fetcher = StaticFetcher::new().with(GRC_GEOMETRY_URL, zip(&members));
    let store = SubnationalGeometryStore::new(Some("GRC"), &fetcher).unwrap();

    let t = store.get_data(false).unwrap();
    assert_eq!(texts(t, "name_subregion"), ["ΑΧΑΪΑΣ", "ΑΤΤΙΚΗΣ"]);
    let attica = row_of(t, "name_subregion", "ΑΤΤΙΚΗΣ");
    assert_eq!(t.get(attica, "code_subregion").unwrap().as_str(), Some("45"));
    assert_eq!(t.get(attica, "population_subregion"), Some(&Value::Number(150.0)));

    let (x0, y0, x1, y1) = bounds(t, attica);
    assert!(x0 > 23.3 && x1 < 24.0, "longitudes {x0}..{x1}");
    assert!(y0 > 37.5 && y1 < 38.5, "latitudes {y0}..{y1}");
    // both prefectures are covered by the merged shape
    assert!(x1 - x0 > 0.2);
}

#[test]
fn british_districts_fall_back_to_their_nation() {
    let district = |code: &str, name: &str, x: f64| {
        geojson_square(&format!(r#""lad19cd":"{code}","lad19nm":"{name}""#), x, 51.0)
    };
    let geometry = collection(&[
        district("E09000001", "City of London", 0.0),
        district("W06000015", "Cardiff", -3.0),
        district("E07000245", "West Suffolk", 0.5),
    ]);
    let lookup = "FID,LAD18CD,LAD18NM,RGN18CD,RGN18NM\n1,E09000001,City of London,E12000007,London\n";
    let fetcher = StaticFetcher::new()
        .with(GBR_GEOMETRY_URL, geometry)
        .with(GBR_REGION_URL, lookup);
    let store = SubnationalGeometryStore::new(Some("GBR"), &fetcher).unwrap();

    let t = store.get_data(false).unwrap();
    let cardiff = row_of(t, "code_subregion", "W06000015");
    assert_eq!(t.get(cardiff, "name_region").unwrap().as_str(), Some("Wales"));
    let london = row_of(t, "code_subregion", "E09000001");
    assert_eq!(t.get(london, "code_region").unwrap().as_str(), Some("E12000007"));

    let r = store.get_data(true).unwrap();
    assert_eq!(texts(r, "code_region"), ["E12000006", "E12000007", "W"]);
    assert_eq!(
        store.get_regions_from_subregion("E07000245", OutputField::Name).unwrap(),
        ["East of England"]
    );
}
