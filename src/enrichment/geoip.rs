//! IP geolocation using the MaxMind GeoLite2 database
//!
//! Resolves a source address to country/region/city names using the
//! GeoLite2-City database. The database file must be downloaded separately
//! from MaxMind (free with registration).

use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::GeoInfo;

/// Errors that can occur during geolocation lookups
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Failed to open database: {0}")]
    DatabaseOpen(#[from] maxminddb::MaxMindDBError),

    #[error("IP address not found in database")]
    NotFound,

    #[error("Database file not found: {0}")]
    FileNotFound(String),
}

/// GeoIP lookup service backed by a MaxMind GeoLite2-City database
pub struct GeoIpService {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoIpService {
    /// Create a new GeoIP service from a MaxMind database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database file does not exist or is invalid.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, GeoError> {
        let path = db_path.as_ref();
        if !path.exists() {
            return Err(GeoError::FileNotFound(path.display().to_string()));
        }

        let reader = Reader::open_readfile(path)?;
        Ok(GeoIpService {
            reader: Arc::new(reader),
        })
    }

    /// Look up the location record for an IP address
    ///
    /// Fields absent from the database record come back as "Unknown".
    pub fn lookup(&self, ip: &IpAddr) -> Result<GeoInfo, GeoError> {
        let city: geoip2::City = self.reader.lookup(*ip).map_err(|e| match e {
            maxminddb::MaxMindDBError::AddressNotFoundError(_) => GeoError::NotFound,
            other => GeoError::DatabaseOpen(other),
        })?;

        let mut info = GeoInfo::default();

        if let Some(name) = city
            .country
            .and_then(|c| c.names)
            .and_then(|n| n.get("en").copied())
        {
            info.country = name.to_string();
        }

        // Region comes from the most specific subdivision
        if let Some(name) = city
            .subdivisions
            .and_then(|subs| subs.into_iter().last())
            .and_then(|s| s.names)
            .and_then(|n| n.get("en").copied())
        {
            info.region = name.to_string();
        }

        if let Some(name) = city
            .city
            .and_then(|c| c.names)
            .and_then(|n| n.get("en").copied())
        {
            info.city = name.to_string();
        }

        Ok(info)
    }

    /// Look up an IP address, substituting the "Unknown" record on failure
    pub fn lookup_or_unknown(&self, ip: &IpAddr) -> GeoInfo {
        match self.lookup(ip) {
            Ok(info) => info,
            Err(e) => {
                log::debug!("GeoIP lookup failed for {}: {}", ip, e);
                GeoInfo::default()
            }
        }
    }
}

impl Clone for GeoIpService {
    fn clone(&self) -> Self {
        GeoIpService {
            reader: Arc::clone(&self.reader),
        }
    }
}
