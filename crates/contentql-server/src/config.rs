use contentql_graphql::GraphQLConfig;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub graphql: GraphQLConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Content package seeding the in-memory store and indexes
    #[serde(default)]
    pub content: ContentConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.content.default_culture.trim().is_empty() {
            return Err("content.default_culture must not be empty".into());
        }
        self.graphql.validate()
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Culture used when a request names none.
    #[serde(default = "default_culture")]
    pub default_culture: String,
    /// JSON content package to load at startup. The store starts empty without one.
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

fn default_culture() -> String {
    "en-US".into()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            default_culture: default_culture(),
            fixture: None,
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file, relative to the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "contentql.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., CONTENTQL__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("CONTENTQL")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::loader::load_config;
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.addr().port(), 8080);
        assert_eq!(cfg.content.default_culture, "en-US");
        assert!(cfg.content.fixture.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "loud".into();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.graphql.max_depth = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9191

[graphql]
max_depth = 8
introspection = false

[logging]
level = "debug"

[content]
default_culture = "da-DK"
fixture = "fixtures/demo.json"
"#
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.graphql.max_depth, 8);
        assert!(!cfg.graphql.introspection);
        assert_eq!(cfg.graphql.max_complexity, 500);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.content.default_culture, "da-DK");
        assert_eq!(
            cfg.content.fixture.as_deref(),
            Some(std::path::Path::new("fixtures/demo.json"))
        );
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"chatty\"").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.contains("logging.level"));
    }
}
