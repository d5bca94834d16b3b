// src/fetch/mod.rs
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{
    header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA},
    Client,
};
use tracing::{debug, info, instrument, warn};

use crate::error::SheetError;
use crate::process::{parse_csv, RawRow};

pub mod urls;

pub use urls::{candidate_urls, Candidate, CandidateKind};

/// Downloads a sheet's CSV export, trying each candidate URL in turn.
#[derive(Clone)]
pub struct CsvFetcher {
    client: Client,
}

impl CsvFetcher {
    /// Client that follows redirects, keeps no cookies and asks every hop not to cache.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status.as_u16());
        }
        resp.text()
            .await
            .with_context(|| format!("reading body from {}", url))
    }

    /// Evaluate `candidates` left to right; the first success wins and the
    /// rest are never requested. On total failure only the last error survives.
    pub async fn fetch_candidates(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<RawRow>, SheetError> {
        let mut last_err: Option<anyhow::Error> = None;

        for candidate in candidates {
            debug!(kind = candidate.kind.as_str(), url = %candidate.url, "requesting CSV");
            match self.get_text(&candidate.url).await {
                Ok(body) => {
                    let parsed = parse_csv(&body);
                    info!(
                        kind = candidate.kind.as_str(),
                        rows = parsed.rows.len(),
                        "fetched CSV"
                    );
                    return Ok(parsed.rows);
                }
                Err(e) => {
                    warn!(kind = candidate.kind.as_str(), error = %e, "candidate failed");
                    last_err = Some(e);
                }
            }
        }

        Err(SheetError::FetchFailed {
            message: last_err
                .map(|e| format!("{:#}", e))
                .unwrap_or_else(|| "no candidate URLs".to_string()),
        })
    }

    /// Fetch and parse the sheet published at `base_url`, falling back to its gviz export.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, base_url: &str) -> Result<Vec<RawRow>, SheetError> {
        let candidates = candidate_urls(base_url, Utc::now().timestamp_millis());
        self.fetch_candidates(&candidates).await
    }
}
