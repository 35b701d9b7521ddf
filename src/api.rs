use crate::models::{ParkData, StatesLayer};
use crate::parks::{ParkRecord, parse_parks};
use crate::projection::AlbersUsa;
use crate::topology::Topology;
use anyhow::{Context, Result, bail};
use reqwest::Url;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::path::PathBuf;
use std::time::Duration;

/// Pre-projected U.S. states topology (Albers USA, scale 1300, 975×610).
pub const STATES_TOPOLOGY_URL: &str =
    "https://cdn.jsdelivr.net/npm/us-atlas@3/states-albers-10m.json";
/// Cleaned park locations, relative to the page / working directory.
pub const PARKS_CSV_PATH: &str = "data/clean-nps-locations.csv";
/// Object within the topology holding one geometry per state.
pub const STATES_OBJECT: &str = "states";

/// Where a pipeline input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http://` and `https://` strings are URLs; anything else is a path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(u) => f.write_str(u),
            Source::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Synchronous client for the **park map data pipeline**.
///
/// The pipeline has two stages, run one after the other:
/// 1. [`Client::fetch_states`]: download the U.S. states topology, decode the
///    `states` object into polygon features and derive the interior border mesh.
/// 2. [`Client::fetch_parks`]: download the park locations CSV and project every
///    row's `Longitude`/`Latitude` with the shared Albers USA projection.
///
/// [`Client::fetch_park_data`] runs both and returns a [`ParkData`] only when
/// both succeed. Nothing is retried and no partial result is returned.
///
/// ### Notes
/// - Sources may be URLs or local files; a relative parks path is resolved
///   against `base_url` when one is set, and read from disk otherwise.
/// - Network timeouts use a sane default (30s) and can be adjusted by editing the client builder.
///
/// Typical usage:
/// ```no_run
/// # use npsmap::Client;
/// let client = Client::default();
/// let data = client.fetch_park_data()?;
/// println!("{} states, {} parks", data.states.len(), data.parks_data.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    pub topology: Source,
    pub parks: Source,
    /// Base against which a relative `parks` path is resolved, like a page URL.
    pub base_url: Option<String>,
    pub projection: AlbersUsa,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new().expect("reqwest client build")
    }
}

impl Client {
    /// Client with the default sources and the shared projection.
    pub fn new() -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("npsmap/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .context("build http client")?;
        Ok(Self {
            topology: Source::Url(STATES_TOPOLOGY_URL.into()),
            parks: Source::Path(PARKS_CSV_PATH.into()),
            base_url: None,
            projection: AlbersUsa::shared(),
            http,
        })
    }

    pub fn with_topology(mut self, source: Source) -> Self {
        self.topology = source;
        self
    }

    pub fn with_parks(mut self, source: Source) -> Self {
        self.parks = source;
        self
    }

    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = Some(base.into());
        self
    }

    /// The parks source after resolving a relative path against `base_url`.
    pub fn resolved_parks(&self) -> Result<Source> {
        match (&self.parks, &self.base_url) {
            (Source::Path(p), Some(base)) if p.is_relative() => {
                let base = Url::parse(base).with_context(|| format!("parse base url {base}"))?;
                let rel = p.to_string_lossy().replace('\\', "/");
                let url = base
                    .join(&rel)
                    .with_context(|| format!("resolve {rel} against {base}"))?;
                Ok(Source::Url(url.into()))
            }
            (other, _) => Ok(other.clone()),
        }
    }

    fn read(&self, source: &Source) -> Result<Vec<u8>> {
        match source {
            Source::Url(u) => {
                log::debug!("GET {u}");
                let r = self.http.get(u).send().with_context(|| format!("GET {u}"))?;
                if !r.status().is_success() {
                    bail!("GET {} failed with HTTP {}", u, r.status());
                }
                Ok(r.bytes().with_context(|| format!("read body of {u}"))?.to_vec())
            }
            Source::Path(p) => {
                log::debug!("read {}", p.display());
                std::fs::read(p).with_context(|| format!("read {}", p.display()))
            }
        }
    }

    /// Stage 1: state features and the interior border mesh.
    pub fn fetch_states(&self) -> Result<StatesLayer> {
        let bytes = self.read(&self.topology)?;
        let topology = Topology::from_slice(&bytes)
            .with_context(|| format!("decode topology from {}", self.topology))?;
        let states = topology
            .features(STATES_OBJECT)
            .context("convert states to features")?;
        let mesh = topology
            .mesh_interior(STATES_OBJECT)
            .context("compute state border mesh")?;
        log::debug!(
            "loaded {} states, {} border lines",
            states.len(),
            mesh.0.len()
        );
        Ok(StatesLayer { states, mesh })
    }

    /// Stage 2: park rows with projected positions, in source order.
    pub fn fetch_parks(&self) -> Result<Vec<ParkRecord>> {
        let source = self.resolved_parks()?;
        let bytes = self.read(&source)?;
        let parks = parse_parks(bytes.as_slice(), &self.projection)
            .with_context(|| format!("parse parks from {source}"))?;
        let unprojected = parks.iter().filter(|p| p.position.is_none()).count();
        log::debug!("loaded {} parks ({} unprojected)", parks.len(), unprojected);
        Ok(parks)
    }

    /// Run both stages, states first. Either failure fails the whole run.
    pub fn fetch_park_data(&self) -> Result<ParkData> {
        let layer = self.fetch_states().context("fetch states")?;
        let parks = self.fetch_parks().context("fetch parks")?;
        Ok(ParkData::new(layer, parks))
    }
}
