use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

/// A failed SSH login extracted from the authentication log
#[derive(Debug, Clone, Serialize)]
pub struct FailedLoginEvent {
    pub source_addr: IpAddr,
    /// Attempted account name; empty when the line carried none
    pub username: String,
    /// Assigned at extraction time, not parsed from the log line
    pub observed_at: DateTime<Utc>,
}

/// Best-effort location record for a source address
#[derive(Debug, Clone, Serialize)]
pub struct GeoInfo {
    pub country: String,
    pub region: String,
    pub city: String,
}

impl Default for GeoInfo {
    fn default() -> Self {
        GeoInfo {
            country: "Unknown".to_string(),
            region: "Unknown".to_string(),
            city: "Unknown".to_string(),
        }
    }
}

/// Best-effort reputation record for a source address
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThreatInfo {
    /// Abuse confidence score, 0-100
    pub confidence_score: u8,
    /// Score of 50 or higher
    pub is_blacklisted: bool,
}

/// A detected intrusion annotated with location and reputation data
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedAlert {
    pub event: FailedLoginEvent,
    pub geo: GeoInfo,
    pub threat: ThreatInfo,
}

impl EnrichedAlert {
    pub fn subject(&self) -> String {
        format!("SSH Intrusion Alert - {}", self.event.source_addr)
    }

    pub fn body(&self) -> String {
        format!(
            "SSH Intrusion Alert\n\
             Source IP: {}\n\
             Username: {}\n\
             Location: {} / {} / {}\n\
             Threat score: {}\n\
             Blacklisted: {}\n\
             Observed: {}",
            self.event.source_addr,
            self.event.username,
            self.geo.country,
            self.geo.region,
            self.geo.city,
            self.threat.confidence_score,
            self.threat.is_blacklisted,
            self.event.observed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}
