use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Image host that serves thumbnails by seed.
    #[serde(default = "default_thumbnail_base_url")]
    pub thumbnail_base_url: String,

    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u64,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    bind_addr: Option<String>,
    log_dir: Option<String>,
    thumbnail_base_url: Option<String>,
    max_list_limit: Option<u64>,
    max_connections: Option<u32>,
}

fn default_database_url() -> String {
    "sqlite://vidto.db?mode=rwc".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_thumbnail_base_url() -> String {
    "https://picsum.photos".to_string()
}

fn default_max_list_limit() -> u64 {
    500
}

fn default_max_connections() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        merge(PartialServerConfig::default(), PartialServerConfig::default())
    }
}

/// Environment values win over file values; anything unset falls back to the
/// defaults above.
fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> ServerConfig {
    ServerConfig {
        database_url: env_config
            .database_url
            .or(file_config.database_url)
            .unwrap_or_else(default_database_url),
        bind_addr: env_config
            .bind_addr
            .or(file_config.bind_addr)
            .unwrap_or_else(default_bind_addr),
        log_dir: env_config
            .log_dir
            .or(file_config.log_dir)
            .unwrap_or_else(default_log_dir),
        thumbnail_base_url: env_config
            .thumbnail_base_url
            .or(file_config.thumbnail_base_url)
            .unwrap_or_else(default_thumbnail_base_url),
        max_list_limit: env_config
            .max_list_limit
            .or(file_config.max_list_limit)
            .unwrap_or_else(default_max_list_limit),
        max_connections: env_config
            .max_connections
            .or(file_config.max_connections)
            .unwrap_or_else(default_max_connections),
    }
}

fn read_file_config(path: &Path) -> Result<PartialServerConfig, ConfigError> {
    if !path.exists() {
        return Ok(PartialServerConfig::default());
    }
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) => read_file_config(Path::new(path_str))?,
            None => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()?;

        // 3. Merge: environment overrides file
        let config = merge(env_config, file_config);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_list_limit == 0 {
            return Err(ConfigError::Invalid("max_list_limit must be positive".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid("max_connections must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.database_url, "sqlite://vidto.db?mode=rwc");
        assert_eq!(config.thumbnail_base_url, "https://picsum.photos");
        assert_eq!(config.max_list_limit, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = PartialServerConfig {
            bind_addr: Some("127.0.0.1:4000".to_string()),
            log_dir: Some("file-logs".to_string()),
            ..Default::default()
        };
        let env = PartialServerConfig {
            bind_addr: Some("127.0.0.1:5000".to_string()),
            ..Default::default()
        };
        let config = merge(env, file);
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.log_dir, "file-logs");
    }

    #[test]
    fn test_read_file_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "max_list_limit = 50\nthumbnail_base_url = \"https://img.example\""
        )
        .unwrap();

        let partial = read_file_config(file.path()).unwrap();
        assert_eq!(partial.max_list_limit, Some(50));
        assert_eq!(partial.thumbnail_base_url.as_deref(), Some("https://img.example"));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let partial = read_file_config(Path::new("/nonexistent/vidto.toml")).unwrap();
        assert!(partial.database_url.is_none());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_list_limit = \"lots\"").unwrap();
        assert!(matches!(read_file_config(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_zero_limit_is_invalid() {
        let config = ServerConfig {
            max_list_limit: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
