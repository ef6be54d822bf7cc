use crate::error::HotelError;
use clap::Parser;
use serde::Deserialize;
use std::{fs, io, path::Path};
use tracing::warn;

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    #[arg(short, long, env = "HOTELIER_CONFIG", default_value = "config.json")]
    pub config_path: String,

    #[arg(short, long, env = "HOTELIER_ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    #[arg(short, long, env = "HOTELIER_PORT", default_value = "3000")]
    pub port: u16,

    #[arg(short, long, env = "HOTELIER_LOG_LEVEL", default_value = "INFO")]
    pub log_level: tracing::Level,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one `<id>.json` document per hotel
    pub hotels_dir: String,

    /// Directory uploaded images are written to, served under `/uploads/images`
    pub uploads_dir: String,

    /// Upper bound for a single request body, multipart uploads included
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotels_dir: "./data/hotels".to_string(),
            uploads_dir: "./uploads/images".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, HotelError> {
        let config = match fs::read_to_string(&path) {
            Ok(config) => config,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "{} not found, using default configuration",
                    path.as_ref().display()
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read(dir.path().join("nope.json")).unwrap();
        assert_eq!(config.hotels_dir, "./data/hotels");
        assert_eq!(config.uploads_dir, "./uploads/images");
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "hotels_dir": "/srv/hotels" }"#).unwrap();

        let config = Config::read(&path).unwrap();
        assert_eq!(config.hotels_dir, "/srv/hotels");
        assert_eq!(config.uploads_dir, "./uploads/images");
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn body_limit_is_read_from_its_own_key_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{ "max_body_bytes": 10 }"#).unwrap();
        assert_eq!(Config::read(&path).unwrap().max_upload_bytes, 25 * 1024 * 1024);

        fs::write(&path, r#"{ "max_upload_bytes": 10 }"#).unwrap();
        assert_eq!(Config::read(&path).unwrap().max_upload_bytes, 10);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ hotels_dir").unwrap();

        assert!(matches!(Config::read(&path), Err(HotelError::Json(_))));
    }
}
