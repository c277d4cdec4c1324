use anyhow::{Context, anyhow};
use serde::Deserialize;
use std::path::PathBuf;

mod database_config;
mod logs_config;
mod server_config;

pub use database_config::DatabaseConfig;
pub use logs_config::{LogsConfig, parse_level};
pub use server_config::ServerConfig;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logs: LogsConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).with_context(|| {
            "Error: Failed to parse configuration file.\n\
            Please check the file syntax is valid TOML syntax"
        })
    }

    /// Environment variables take precedence over the configuration file.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Error: PORT must be a port number, got '{port}'"))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = max.trim().parse().with_context(|| {
                format!("Error: DATABASE_MAX_CONNECTIONS must be a positive integer, got '{max}'")
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logs.level = parse_level(&level)?;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.logs.storage_path = Some(dir);
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("Error: database max_connections must be greater than 0");
        }
        Ok(())
    }
}

pub(crate) fn read_path(str: &str) -> anyhow::Result<PathBuf> {
    let path = std::path::Path::new(str);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir =
            std::env::current_dir().with_context(|| "Failed to read current directory")?;
        Ok(current_dir.join(path))
    }
}

fn parse_config_path<I>(mut args: I) -> anyhow::Result<Option<PathBuf>>
where
    I: Iterator<Item = String>,
{
    while let Some(arg) = args.next() {
        if arg == "-c" || arg == "--config" {
            return match args.next() {
                Some(path) => Ok(Some(PathBuf::from(path))),
                None => Err(anyhow!(
                    "Error: Please specify path string for -c argument."
                )),
            };
        }
    }
    Ok(None)
}

/// A missing `.env` is fine, an unreadable or malformed one is not.
fn check_dotenv(result: Result<(), dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| "Error: Failed to load .env file"),
    }
}

/// Reads `-c <config_file>` when given, then applies `.env` and the process environment.
pub fn load() -> anyhow::Result<Config> {
    let mut config = match parse_config_path(std::env::args().skip(1))? {
        Some(path) => {
            if !path.is_file() {
                return Err(anyhow!(
                    "Error: Configuration file not found or invalid.\n\
                    Please make sure that the configuration file exists and is a valid TOML file.\n\
                    Expected file path: {:?}",
                    path
                ));
            }
            let content = std::fs::read_to_string(&path).with_context(|| {
                "Error: Failed to read configuration file.\n\
                Please check the file path and file permissions, and make sure the file is valid accessible"
            })?;
            Config::from_toml(&content)?
        }
        None => Config::default(),
    };
    check_dotenv(dotenvy::dotenv().map(|_| ()))?;
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing::Level;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:3000");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logs.level, Level::INFO);
        assert!(config.logs.storage_path.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "sqlite::memory:"

            [logs]
            level = "DEBUG"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.addr(), "127.0.0.1:8080");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logs.level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(Config::from_toml("[logs]\nlevel = \"loud\"").is_err());
        let mut config = Config::default();
        assert!(config.apply_env(env(&[("LOG_LEVEL", "loud")])).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("[server]\nport = 8080").unwrap();
        config
            .apply_env(env(&[
                ("PORT", "9090"),
                ("DATABASE_URL", "sqlite://other.db"),
                ("LOG_LEVEL", "warn"),
                ("LOG_DIR", "logs"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite://other.db");
        assert_eq!(config.logs.level, Level::WARN);
        assert_eq!(config.logs.storage_path.as_deref(), Some("logs"));
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = Config::default();
        assert!(config.apply_env(env(&[("PORT", "http")])).is_err());
        let mut config = Config::default();
        assert!(
            config
                .apply_env(env(&[("DATABASE_MAX_CONNECTIONS", "0")]))
                .is_err()
        );
    }

    #[test]
    fn test_dotenv_errors() {
        assert!(check_dotenv(Ok(())).is_ok());
        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(check_dotenv(Err(missing)).is_ok());
        let denied = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(check_dotenv(Err(denied)).is_err());
        let malformed = dotenvy::Error::LineParse("NOT A PAIR".to_string(), 0);
        assert!(check_dotenv(Err(malformed)).is_err());
    }

    #[test]
    fn test_parse_config_path() {
        let args = ["-c", "config.toml"].map(String::from).into_iter();
        assert_eq!(
            parse_config_path(args).unwrap(),
            Some(PathBuf::from("config.toml"))
        );
        assert_eq!(parse_config_path(std::iter::empty()).unwrap(), None);
        let args = ["--config"].map(String::from).into_iter();
        assert!(parse_config_path(args).is_err());
    }
}
