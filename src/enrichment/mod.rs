//! Alert enrichment
//!
//! Annotates a detected event with location and reputation context before
//! it reaches the dispatcher. Both lookups are best-effort: a missing
//! database or a failing API call substitutes the "unknown/zero" record,
//! and enrichment as a whole never fails.

pub mod geoip;
pub mod reputation;

pub use geoip::{GeoError, GeoIpService};
pub use reputation::{ReputationError, ReputationService};

use crate::models::{EnrichedAlert, FailedLoginEvent, GeoInfo, ThreatInfo};
use std::net::IpAddr;

/// Coordinates GeoIP and reputation lookups for a detected event
pub struct Enricher {
    geo: Option<GeoIpService>,
    reputation: Option<ReputationService>,
}

impl Enricher {
    /// Create an enricher from whichever collaborators are available
    ///
    /// Passing `None` for either disables that lookup; its record defaults.
    pub fn new(geo: Option<GeoIpService>, reputation: Option<ReputationService>) -> Self {
        Enricher { geo, reputation }
    }

    /// Build an enriched alert for a detected event
    ///
    /// The two lookups are independent and run concurrently; each failure
    /// is absorbed locally.
    pub async fn enrich(&self, event: FailedLoginEvent) -> EnrichedAlert {
        let addr = event.source_addr;
        let (geo, threat) = tokio::join!(self.lookup_geo(addr), self.lookup_threat(addr));

        EnrichedAlert { event, geo, threat }
    }

    async fn lookup_geo(&self, addr: IpAddr) -> GeoInfo {
        match &self.geo {
            Some(service) => service.lookup_or_unknown(&addr),
            None => GeoInfo::default(),
        }
    }

    async fn lookup_threat(&self, addr: IpAddr) -> ThreatInfo {
        match &self.reputation {
            Some(service) => match service.check(addr).await {
                Ok(info) => info,
                Err(e) => {
                    log::warn!("Reputation check failed for {}: {}", addr, e);
                    ThreatInfo::default()
                }
            },
            None => ThreatInfo::default(),
        }
    }
}
