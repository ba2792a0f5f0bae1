pub mod alerting;
pub mod blocker;
pub mod config;
pub mod detection;
pub mod enrichment;
pub mod input;
pub mod models;
pub mod output;

// Re-export commonly used types
pub use models::{EnrichedAlert, FailedLoginEvent, GeoInfo, ThreatInfo};
pub use detection::{AttemptTracker, CooldownGate, DetectionEngine};
pub use enrichment::{Enricher, GeoIpService, ReputationService};
pub use alerting::AlertDispatcher;
pub use blocker::IpBlocker;
pub use input::{FailedLoginExtractor, FileTailer};
pub use output::DiagnosticLog;
