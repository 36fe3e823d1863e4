//! NVD CVE API 2.0 keyword-search client
//!
//! One keyword query per fingerprint with a hard request timeout. The API
//! is rate-limited (5 requests/30s without a key, 50/30s with one), so the
//! caller is expected to treat it as occasionally unreliable.

use super::{truncate_summary, VulnDatabase, VulnerabilityRecord};
use crate::ScanError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NVD_API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the NVD vulnerability database
pub struct NvdClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl NvdClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_url(NVD_API_URL, api_key)
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_url(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            api_url: api_url.into(),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl VulnDatabase for NvdClient {
    async fn lookup(&self, query: &str, limit: usize) -> crate::Result<Vec<VulnerabilityRecord>> {
        let mut request = self
            .client
            .get(&self.api_url)
            .query(&[("keywordSearch", query), ("resultsPerPage", &limit.to_string())]);

        if let Some(ref key) = self.api_key {
            request = request.header("apiKey", key);
        }

        log::debug!("querying NVD for '{}'", query);

        let response = request
            .send()
            .await
            .map_err(|e| ScanError::Correlation(format!("NVD request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Correlation(format!(
                "NVD returned status {}",
                status
            )));
        }

        let body: NvdResponse = response
            .json()
            .await
            .map_err(|e| ScanError::Correlation(format!("invalid NVD response: {}", e)))?;

        Ok(records_from_response(body, limit))
    }
}

fn records_from_response(response: NvdResponse, limit: usize) -> Vec<VulnerabilityRecord> {
    response
        .vulnerabilities
        .into_iter()
        .take(limit)
        .map(|vuln| {
            let summary = vuln
                .cve
                .descriptions
                .iter()
                .find(|d| d.lang == "en")
                .or_else(|| vuln.cve.descriptions.first())
                .map(|d| truncate_summary(&d.value))
                .unwrap_or_default();

            VulnerabilityRecord {
                id: vuln.cve.id,
                summary,
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct NvdResponse {
    #[serde(default)]
    vulnerabilities: Vec<NvdVulnerability>,
}

#[derive(Debug, Deserialize)]
struct NvdVulnerability {
    cve: NvdCve,
}

#[derive(Debug, Deserialize)]
struct NvdCve {
    id: String,
    #[serde(default)]
    descriptions: Vec<NvdDescription>,
}

#[derive(Debug, Deserialize)]
struct NvdDescription {
    lang: String,
    value: String,
}
