use std::path::PathBuf;
use structopt::StructOpt;

use authwatch::config::Config;
use authwatch::input::{FailedLoginExtractor, TAIL_WINDOW_LINES};

/// SSH intrusion monitor command line interface
#[derive(StructOpt, Debug)]
#[structopt(name = "authwatch", about = "SSH brute-force intrusion monitor CLI")]
pub enum Cli {
    /// Check a daemon configuration file
    Check {
        /// Path to configuration file
        #[structopt(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
    /// Extract failed-login events from one or more log files
    Parse {
        /// Paths to log files
        #[structopt(short, long, required = true)]
        files: Vec<PathBuf>,
        /// Number of events to display
        #[structopt(short, long, default_value = "10")]
        lines: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::from_args();

    match cli {
        Cli::Check { config } => {
            if config.exists() {
                let parsed = Config::from_file(&config)?;
                println!("Configuration loaded successfully");
                println!(
                    "Monitoring {:?} (threshold {}, window {}m, cooldown {}m)",
                    parsed.monitor.log_file_path,
                    parsed.monitor.failed_login_threshold,
                    parsed.monitor.attempt_window_minutes,
                    parsed.monitor.alert_cooldown_minutes,
                );
                println!("Use the 'authwatch_daemon' binary to run the monitor");
            } else {
                eprintln!("Configuration file not found: {:?}", config);
                eprintln!("Run 'authwatch_cli config' to generate a default configuration");
                std::process::exit(1);
            }
        }
        Cli::Config { output } => {
            let config = Config::default();
            config.to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
        Cli::Parse { files, lines } => {
            for file in &files {
                if !file.exists() {
                    eprintln!("File not found: {:?}", file);
                    std::process::exit(1);
                }
            }

            let extractor = FailedLoginExtractor::new()?;
            let events = extractor.extract_from_files(&files, TAIL_WINDOW_LINES);
            let display_count = std::cmp::min(lines, events.len());

            println!(
                "Extracted {} failed login(s) (showing {}):\n",
                events.len(),
                display_count
            );
            for event in events.iter().take(display_count) {
                println!(
                    "  Source: {}, User: {}, Observed: {}",
                    event.source_addr,
                    event.username,
                    event.observed_at.format("%Y-%m-%d %H:%M:%S UTC"),
                );
            }
        }
    }

    Ok(())
}
