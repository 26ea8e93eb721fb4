//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::state::SETTINGS_FILE_NAME;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "simple-timer")]
#[command(about = "A countdown timer plugin with recent timers and subtle notifications")]
#[command(version)]
pub struct Config {
    /// Port the host bridge listens on
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding settings.json
    #[arg(short, long, env = "DECKY_PLUGIN_SETTINGS_DIR")]
    pub settings_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Full path of the settings file
    pub fn settings_path(&self) -> PathBuf {
        self.settings_dir.join(SETTINGS_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let config = Config::try_parse_from([
            "simple-timer",
            "--settings-dir",
            "/tmp/timer",
            "--port",
            "9000",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/timer/settings.json"));
    }
}
