use thiserror::Error;

/// Errors raised by the geographic resolution layer.
///
/// The first group describes caller mistakes or missing catalog entries and is
/// raised synchronously without retry. The second group wraps infrastructure
/// failures from fetching or decoding reference data.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid standard '{0}', expected one of: iso2, iso3, name, num")]
    InvalidStandard(String),
    #[error("cannot resolve location '{0}' to a known country")]
    UnresolvedLocation(String),
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
    #[error("unknown subregion '{0}'")]
    UnknownSubregion(String),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' already exists, use overload to replace it")]
    FieldConflict(String),
    #[error("reference source schema changed: {0}")]
    SourceSchema(String),
    #[error("invalid geometry layout transition: {0}")]
    GeometryState(String),
    #[error("country '{0}' is not supported for this operation")]
    UnsupportedCountry(String),
    #[error("store was constructed without a country")]
    NotInitialized,

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("dataframe: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
    #[error("cannot decode payload: {0}")]
    Parse(String),
    #[error("render: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, GeoError>;
