use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::store::DEFAULT_PAGE_SIZE;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Messages per page
    #[arg(long, env = "PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Seed the store with demo conversations
    #[arg(long, env = "SEED_DEMO")]
    pub seed_demo: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub page_size: usize,
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("feed.page_size", DEFAULT_PAGE_SIZE as i64)?
            .set_default("feed.seed_demo", true)?;

        // 2. Config file: explicit path must exist, ./feed-scroll.* is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("feed-scroll").required(false)),
        };

        // 3. Environment variables, e.g. FEED_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("FEED")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and their plain env fallbacks) win
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(size) = cli.page_size {
            builder = builder.set_override("feed.page_size", size as i64)?;
        }
        if let Some(seed) = cli.seed_demo {
            builder = builder.set_override("feed.seed_demo", seed)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Address the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let config =
            AppConfig::load_from_args(["feed-scroll", "--port", "4100", "--page-size", "5"])
                .unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.feed.page_size, 5);
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        assert!(AppConfig::load_from_args(["feed-scroll", "--bogus"]).is_err());
    }
}
