pub mod event;

pub use event::{EnrichedAlert, FailedLoginEvent, GeoInfo, ThreatInfo};
