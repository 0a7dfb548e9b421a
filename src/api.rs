//! Fetching years, boundaries and per-year province data.
//!
//! Requests run on a background runtime and come back to the UI thread as
//! [`Completion`]s. Completions arrive in whatever order the network
//! finishes them; nothing here sequences them.

use crate::config::Config;
use crate::data::{decode_provinces, decode_years, BoundaryStore, ProvinceRecord, Year};
use crate::error::{DataError, Result};
use anyhow::Context;
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Characters of a failing body kept in the error message
const BODY_PREVIEW: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Years,
    Boundaries,
    Provinces(Year),
}

#[derive(Debug)]
pub enum Completion {
    Years(Result<Vec<Year>>),
    Boundaries(Result<BoundaryStore>),
    Provinces {
        year: Year,
        result: Result<Vec<ProvinceRecord>>,
    },
}

/// Issues requests; results are delivered asynchronously
pub trait Transport {
    fn request(&self, request: Request);
}

/// HTTP transport against the population server
pub struct HttpTransport {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    config: Config,
    tx: Sender<Completion>,
}

impl HttpTransport {
    pub fn new(config: &Config, tx: Sender<Completion>) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("province-map-http")
            .build()
            .context("failed to start the HTTP runtime")?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("province-map/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .context("failed to build the HTTP client")?;

        Ok(Self {
            runtime,
            client,
            config: config.clone(),
            tx,
        })
    }
}

impl Transport for HttpTransport {
    fn request(&self, request: Request) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let url = match &request {
            Request::Years => self.config.years_url(),
            Request::Boundaries => self.config.boundaries_url(),
            Request::Provinces(year) => self.config.provinces_url(year),
        };

        self.runtime.spawn(async move {
            let started = Instant::now();
            let completion = match request {
                Request::Years => Completion::Years(
                    fetch(&client, &url)
                        .await
                        .and_then(|mut body| decode_years(&url, &mut body)),
                ),
                Request::Boundaries => Completion::Boundaries(
                    fetch(&client, &url)
                        .await
                        .and_then(|body| decode_boundaries(&url, body)),
                ),
                Request::Provinces(year) => Completion::Provinces {
                    year,
                    result: fetch(&client, &url)
                        .await
                        .and_then(|mut body| decode_provinces(&url, &mut body)),
                },
            };
            info!(%url, elapsed_ms = started.elapsed().as_millis() as u64, "request finished");
            if tx.send(completion).is_err() {
                debug!(%url, "ui gone, dropping completion");
            }
        });
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    debug!(%url, "GET");
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| DataError::network(url, e))?;
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| DataError::network(url, format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        let preview: String = String::from_utf8_lossy(&bytes)
            .chars()
            .take(BODY_PREVIEW)
            .collect();
        warn!(%url, %status, "upstream returned an error status");
        return Err(DataError::network(
            url,
            format!("status {status}; body preview: {preview}"),
        ));
    }
    Ok(bytes.to_vec())
}

fn decode_boundaries(url: &str, body: Vec<u8>) -> Result<BoundaryStore> {
    let text = String::from_utf8(body).map_err(|e| DataError::malformed(url, e))?;
    BoundaryStore::from_geojson(url, &text)
}
