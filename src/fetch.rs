//! Reference-data retrieval.
//!
//! The catalogs only see the [`Fetch`] trait. [`CachedFetcher`] downloads
//! over HTTP and keeps a copy on disk; [`StaticFetcher`] serves fixed
//! payloads from memory for offline use and tests.

use crate::error::{GeoError, Result};
use ahash::AHashMap;
use log::{debug, info};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Fetch-or-cache-hit access to a remote resource.
pub trait Fetch {
    /// Content of `url`. A cached copy older than `max_age` is refreshed;
    /// `None` accepts any cached copy.
    fn fetch(&self, url: &str, max_age: Option<Duration>) -> Result<Vec<u8>>;

    /// [`Fetch::fetch`] decoded as UTF-8, replacing invalid sequences.
    fn fetch_text(&self, url: &str, max_age: Option<Duration>) -> Result<String> {
        let bytes = self.fetch(url, max_age)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Settings of the HTTP client and its on-disk cache.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub cache_dir: PathBuf,
    /// Total request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Default freshness bound when a call passes `None`.
    pub max_age: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("epigeo");
        Self {
            cache_dir,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("epigeo/", env!("CARGO_PKG_VERSION")).to_string(),
            max_age: None,
        }
    }
}

/// Blocking HTTP fetcher with a file cache keyed by URL.
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    config: FetchConfig,
    http: HttpClient,
}

impl CachedFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(5))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Cache file for `url`: escaped host name plus the first 16 hex digits
    /// of the SHA-256 of the full URL.
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "local".to_string());
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        let name = format!("{}_{}", utf8_percent_encode(&host, NON_ALPHANUMERIC), &digest[..16]);
        self.config.cache_dir.join(name)
    }

    fn is_fresh(path: &PathBuf, max_age: Option<Duration>) -> bool {
        let Ok(meta) = fs::metadata(path) else {
            return false;
        };
        match max_age {
            None => true,
            Some(limit) => meta
                .modified()
                .ok()
                .and_then(|m| m.elapsed().ok())
                .is_some_and(|age| age <= limit),
        }
    }

    /// GET with three attempts, backing off on 5xx and transport errors.
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_err: Option<reqwest::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => return Ok(r.bytes()?.to_vec()),
                Ok(r) if r.status().is_server_error() => last_err = r.error_for_status().err(),
                Ok(r) => {
                    let status = r.status();
                    return Err(match r.error_for_status() {
                        Err(e) => e.into(),
                        Ok(_) => GeoError::Io(std::io::Error::other(format!(
                            "GET {url}: unexpected HTTP status {status}"
                        ))),
                    });
                }
                Err(e) => last_err = Some(e),
            }
            debug!("GET {url} failed, retrying in {backoff_ms} ms");
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(match last_err {
            Some(e) => e.into(),
            None => GeoError::Io(std::io::Error::other(format!("GET {url}: retries exhausted"))),
        })
    }
}

impl Fetch for CachedFetcher {
    fn fetch(&self, url: &str, max_age: Option<Duration>) -> Result<Vec<u8>> {
        let path = self.cache_path(url);
        if Self::is_fresh(&path, max_age.or(self.config.max_age)) {
            info!("cache hit for {url}");
            return Ok(fs::read(&path)?);
        }
        info!("downloading {url}");
        let bytes = self.download(url)?;
        fs::create_dir_all(&self.config.cache_dir)?;
        fs::write(&path, &bytes)?;
        Ok(bytes)
    }
}

/// In-memory fetcher serving fixed payloads by URL.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    payloads: AHashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.payloads.insert(url.into(), body.into());
    }

    /// Builder form of [`StaticFetcher::insert`].
    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.insert(url, body);
        self
    }
}

impl Fetch for StaticFetcher {
    fn fetch(&self, url: &str, _max_age: Option<Duration>) -> Result<Vec<u8>> {
        self.payloads.get(url).cloned().ok_or_else(|| {
            GeoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no payload registered for {url}"),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cache_path_is_stable_and_host_prefixed() {
        let dir = tempdir().unwrap();
        let f = CachedFetcher::new(FetchConfig {
            cache_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        let a = f.cache_path("https://www.worldometers.info/world-population/population-by-country/");
        let b = f.cache_path("https://www.worldometers.info/world-population/population-by-country/");
        assert_eq!(a, b);
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("www%2Eworldometers%2Einfo_"), "{name}");
    }

    #[test]
    fn cache_name_is_a_fixed_digest_of_the_url() {
        let f = CachedFetcher::new(FetchConfig {
            cache_dir: PathBuf::from("/cache"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            f.cache_path("https://example.invalid/data.csv"),
            PathBuf::from("/cache/example%2Einvalid_f6a1db732d1c0e93")
        );
    }

    #[test]
    fn cached_copy_is_served_without_network() {
        let dir = tempdir().unwrap();
        let f = CachedFetcher::new(FetchConfig {
            cache_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        let url = "https://example.invalid/data.csv";
        fs::write(f.cache_path(url), b"a,b\n1,2\n").unwrap();
        assert_eq!(f.fetch_text(url, None).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn static_fetcher_reports_missing_urls() {
        let f = StaticFetcher::new().with("u", "body");
        assert_eq!(f.fetch("u", None).unwrap(), b"body");
        assert!(matches!(f.fetch("v", None), Err(GeoError::Io(_))));
    }
}
