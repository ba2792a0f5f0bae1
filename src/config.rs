use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the authwatch daemon
///
/// Every section and field is optional in the TOML file; missing values
/// fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitoring and detection settings
    pub monitor: MonitorConfig,
    /// Email notification channel
    pub email: EmailConfig,
    /// Slack webhook notification channel
    pub slack: SlackConfig,
    /// SMS notification channel (Twilio REST API)
    pub sms: SmsConfig,
    /// IP reputation lookups (AbuseIPDB)
    pub reputation: ReputationConfig,
}

/// Monitoring and detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Path to the authentication log to tail
    pub log_file_path: PathBuf,
    /// Failed attempts from one address before an alert is raised
    pub failed_login_threshold: usize,
    /// Sliding window for counting failed attempts, in minutes
    pub attempt_window_minutes: i64,
    /// Minimum time between two dispatched alerts, in minutes.
    /// The cooldown is global across all source addresses, not per-address.
    pub alert_cooldown_minutes: i64,
    /// Block alerting addresses with iptables
    pub auto_block_enabled: bool,
    /// Annotate alerts with GeoIP data
    pub geoip_enabled: bool,
    /// Path to the MaxMind GeoLite2-City database
    pub geoip_db_path: PathBuf,
    /// Path of the append-only diagnostic log
    pub diagnostic_log_path: PathBuf,
}

/// Email notification channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub use_tls: bool,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
}

/// Slack webhook notification channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub enabled: bool,
    pub webhook_url: String,
}

/// SMS notification channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub enabled: bool,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
}

/// IP reputation lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    pub enabled: bool,
    /// AbuseIPDB API key; falls back to the ABUSEIPDB_API_KEY
    /// environment variable when empty
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            monitor: MonitorConfig::default(),
            email: EmailConfig::default(),
            slack: SlackConfig::default(),
            sms: SmsConfig::default(),
            reputation: ReputationConfig::default(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            log_file_path: PathBuf::from("/var/log/auth.log"),
            failed_login_threshold: 5,
            attempt_window_minutes: 10,
            alert_cooldown_minutes: 10,
            auto_block_enabled: false,
            geoip_enabled: true,
            geoip_db_path: PathBuf::from("GeoLite2-City.mmdb"),
            diagnostic_log_path: PathBuf::from("logs/monitor.log"),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            enabled: false,
            smtp_server: String::new(),
            smtp_port: 587,
            use_tls: true,
            sender_email: String::new(),
            sender_password: String::new(),
            recipient_email: String::new(),
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        SlackConfig {
            enabled: false,
            webhook_url: String::new(),
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        SmsConfig {
            enabled: false,
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            to_number: String::new(),
        }
    }
}

impl Default for ReputationConfig {
    fn default() -> Self {
        ReputationConfig {
            enabled: true,
            api_key: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.monitor.failed_login_threshold, 5);
        assert_eq!(config.monitor.attempt_window_minutes, 10);
        assert_eq!(config.monitor.alert_cooldown_minutes, 10);
        assert!(!config.monitor.auto_block_enabled);
        assert!(config.monitor.geoip_enabled);
        assert!(!config.email.enabled);
        assert!(!config.slack.enabled);
        assert!(!config.sms.enabled);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
            [monitor]
            failed_login_threshold = 3

            [slack]
            enabled = true
            webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.monitor.failed_login_threshold, 3);
        assert_eq!(config.monitor.attempt_window_minutes, 10);
        assert!(config.slack.enabled);
        assert!(!config.email.enabled);
        assert_eq!(config.email.smtp_port, 587);
    }

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.monitor.failed_login_threshold = 8;
        config.sms.enabled = true;
        config.sms.to_number = "+15550001111".to_string();

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.monitor.failed_login_threshold, 8);
        assert!(parsed.sms.enabled);
        assert_eq!(parsed.sms.to_number, "+15550001111");
    }
}
