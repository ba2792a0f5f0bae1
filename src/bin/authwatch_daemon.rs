use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use authwatch::alerting::AlertDispatcher;
use authwatch::blocker::IpBlocker;
use authwatch::config::Config;
use authwatch::detection::DetectionEngine;
use authwatch::enrichment::{Enricher, GeoIpService, ReputationService};
use authwatch::input::{FailedLoginExtractor, FileTailer, TAIL_WINDOW_LINES};
use authwatch::models::FailedLoginEvent;
use authwatch::output::DiagnosticLog;

/// Main daemon entry point for the SSH intrusion monitor
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting authwatch daemon...");

    // Load configuration
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        log::warn!("Config file not found, using defaults");
        Config::default()
    };

    // Setup graceful shutdown signal handling
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal, gracefully stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut diagnostics = DiagnosticLog::new(&config.monitor.diagnostic_log_path)?;

    // Detection state: one engine owns the attempt windows and the
    // process-wide cooldown
    let mut engine = DetectionEngine::new(
        config.monitor.failed_login_threshold,
        chrono::Duration::minutes(config.monitor.attempt_window_minutes),
        chrono::Duration::minutes(config.monitor.alert_cooldown_minutes),
    );

    // Enrichment collaborators are optional; a missing database or API key
    // just means defaulted records
    let geo = if config.monitor.geoip_enabled {
        match GeoIpService::new(&config.monitor.geoip_db_path) {
            Ok(service) => Some(service),
            Err(e) => {
                log::warn!("GeoIP enrichment unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let api_key = if config.reputation.api_key.is_empty() {
        env::var("ABUSEIPDB_API_KEY").unwrap_or_default()
    } else {
        config.reputation.api_key.clone()
    };
    let reputation = if config.reputation.enabled && !api_key.is_empty() {
        match ReputationService::new(api_key) {
            Ok(service) => Some(service),
            Err(e) => {
                log::warn!("Reputation lookups unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let enricher = Enricher::new(geo, reputation);
    let dispatcher = AlertDispatcher::new(&config)?;
    let mut blocker = IpBlocker::new(config.monitor.auto_block_enabled);
    let extractor = FailedLoginExtractor::new()?;

    // Opening the source log is the one fatal startup condition
    let mut tailer = FileTailer::new(config.monitor.log_file_path.clone());
    tailer.initialize()?;

    log::info!("Monitoring log file: {:?}", config.monitor.log_file_path);
    log::info!("Notification channels: {:?}", dispatcher.enabled_channels());
    diagnostics.record("SSH intrusion monitoring started");

    // Poll for appended lines; on new data re-derive events from the tail
    // window and run them through detection
    while running.load(Ordering::SeqCst) {
        if !tailer.is_valid() {
            log::warn!(
                "Log source {:?} is missing, waiting for it to reappear",
                tailer.path()
            );
            tokio::time::sleep(Duration::from_secs(1)).await;
            continue;
        }

        match tailer.poll_new_line() {
            Ok(true) => {
                let events = extractor.extract_from_file(tailer.path(), TAIL_WINDOW_LINES);
                for event in events {
                    if engine.observe(&event, Utc::now()) {
                        handle_alert(
                            &event,
                            &enricher,
                            &dispatcher,
                            &mut blocker,
                            &mut diagnostics,
                        )
                        .await;
                    }
                }
                engine.evict_idle(Utc::now());
            }
            Ok(false) => {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                log::warn!("Error reading log source: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    diagnostics.record("Monitoring stopped");
    log::info!("Authwatch daemon stopped");
    Ok(())
}

/// Run one detected event through enrichment, dispatch and blocking
async fn handle_alert(
    event: &FailedLoginEvent,
    enricher: &Enricher,
    dispatcher: &AlertDispatcher,
    blocker: &mut IpBlocker,
    diagnostics: &mut DiagnosticLog,
) {
    let alert = enricher.enrich(event.clone()).await;

    diagnostics.record(&format!(
        "Intrusion alert: {} user '{}' | {} / {} / {} | score {} blacklisted {}",
        alert.event.source_addr,
        alert.event.username,
        alert.geo.country,
        alert.geo.region,
        alert.geo.city,
        alert.threat.confidence_score,
        alert.threat.is_blacklisted,
    ));

    let failures = dispatcher.dispatch(&alert).await;
    if failures > 0 {
        diagnostics.record(&format!(
            "{} notification channel(s) failed for {}",
            failures, alert.event.source_addr
        ));
    }

    if blocker.is_enabled() && blocker.block(alert.event.source_addr) {
        diagnostics.record(&format!(
            "Address {} automatically blocked",
            alert.event.source_addr
        ));
    }
}
