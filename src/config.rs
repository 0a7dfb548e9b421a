use crate::data::Year;
use crate::map::SurfaceCapabilities;
use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_YEAR: &str = "2020";
pub const DEFAULT_LOG_FILE: &str = "province-map.log";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const YEARS_PATH: &str = "/api/years";
pub const PROVINCES_PATH: &str = "/api/provinces";
pub const BOUNDARIES_PATH: &str = "/static/data/indonesia.geojson";

/// Command line, with environment fallbacks
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server hosting the population API and the boundary file
    #[arg(long, env = "PROVINCE_MAP_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Year shown first
    #[arg(long, env = "PROVINCE_MAP_YEAR", default_value = DEFAULT_YEAR)]
    pub year: String,

    /// Log destination (the terminal belongs to the UI)
    #[arg(long, env = "PROVINCE_MAP_LOG", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "PROVINCE_MAP_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// Do not raise hovered provinces above their neighbours
    #[arg(long)]
    pub no_raise: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub initial_year: Year,
    pub log_file: PathBuf,
    pub request_timeout: Duration,
    pub capabilities: SurfaceCapabilities,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let base_url = args.base_url.trim().trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&base_url).with_context(|| format!("invalid base url {base_url:?}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("base url must start with http:// or https://, got {base_url:?}");
        }
        let year = args.year.trim();
        if year.is_empty() {
            bail!("initial year must not be empty");
        }
        if args.request_timeout == 0 {
            bail!("request timeout must be at least one second");
        }

        Ok(Self {
            base_url,
            initial_year: Year::new(year),
            log_file: args.log_file,
            request_timeout: Duration::from_secs(args.request_timeout),
            capabilities: SurfaceCapabilities {
                raise_on_hover: !args.no_raise,
            },
        })
    }

    pub fn years_url(&self) -> String {
        format!("{}{YEARS_PATH}", self.base_url)
    }

    /// The year is percent-encoded as a single path segment
    pub fn provinces_url(&self, year: &Year) -> String {
        let base = format!("{}{PROVINCES_PATH}", self.base_url);
        let Ok(mut url) = Url::parse(&base) else {
            return format!("{base}/{year}");
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(year.as_str());
        }
        url.to_string()
    }

    pub fn boundaries_url(&self) -> String {
        format!("{}{BOUNDARIES_PATH}", self.base_url)
    }
}
