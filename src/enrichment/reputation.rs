//! IP reputation lookups against AbuseIPDB
//!
//! A single GET per detected address; any failure collapses to the
//! zero-score default so reputation can never hold up the alert pipeline.

use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

use crate::models::ThreatInfo;

const ABUSEIPDB_URL: &str = "https://api.abuseipdb.com/api/v2/check";

/// Confidence score at or above which an address counts as blacklisted
const BLACKLIST_SCORE: u8 = 50;

/// Errors that can occur during reputation lookups
#[derive(Error, Debug)]
pub enum ReputationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Reputation lookup client for AbuseIPDB
pub struct ReputationService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ReputationService {
    /// Create a reputation client with the given API key
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        Ok(ReputationService {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
            api_key,
            base_url: ABUSEIPDB_URL.to_string(),
        })
    }

    /// Create a client against a different endpoint (used by tests)
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, reqwest::Error> {
        let mut service = Self::new(api_key)?;
        service.base_url = base_url;
        Ok(service)
    }

    /// Check an address against the reputation database
    ///
    /// An address with a confidence score of 50 or higher is reported as
    /// blacklisted.
    pub async fn check(&self, ip: IpAddr) -> Result<ThreatInfo, ReputationError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ipAddress", ip.to_string()),
                ("maxAgeInDays", "90".to_string()),
            ])
            .header("Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        let score = body
            .get("data")
            .and_then(|d| d.get("abuseConfidenceScore"))
            .and_then(|s| s.as_u64())
            .ok_or_else(|| {
                ReputationError::Malformed("missing data.abuseConfidenceScore".to_string())
            })?;

        let score = score.min(100) as u8;
        Ok(ThreatInfo {
            confidence_score: score,
            is_blacklisted: score >= BLACKLIST_SCORE,
        })
    }
}
