//! Settings for `walletd`.
//!
//! Values come from an optional TOML file (`config/walletd.toml` unless
//! `--config` says otherwise), overridden by `WALLETD__<SECTION>__<KEY>`
//! environment variables.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/walletd.toml";

#[derive(Debug, Parser)]
#[command(name = "walletd", about = "In-memory wallet ledger over HTTP")]
struct Args {
    /// Config file path (TOML).
    #[arg(long, env = "WALLETD_CONFIG")]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Nsq {
    pub url: String,
    pub topic: String,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    1024
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub nsq: Option<Nsq>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        Self::load(args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH))
    }

    fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("WALLETD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.listen_addr(), "127.0.0.1:3000");
        assert!(settings.nsq.is_none());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let settings = Settings::load("config/does-not-exist.toml").unwrap();
        assert!(settings.server.port > 0);
    }

    #[test]
    fn nsq_section_enables_relay() {
        let settings = parse(
            r#"
            [server]
            port = 8080

            [nsq]
            url = "http://127.0.0.1:4151"
            topic = "wallets"
            "#,
        );

        assert_eq!(settings.listen_addr(), "127.0.0.1:8080");
        let nsq = settings.nsq.unwrap();
        assert_eq!(nsq.topic, "wallets");
        assert_eq!(nsq.queue_capacity, 1024);
    }

    #[test]
    fn nsq_section_requires_topic() {
        let result = Config::builder()
            .add_source(File::from_str(
                "[nsq]\nurl = \"http://127.0.0.1:4151\"",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<Settings>();
        assert!(result.is_err());
    }
}
