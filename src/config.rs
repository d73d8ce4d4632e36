//! Runtime configuration

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::import::GeminiParser;
use crate::import::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::storage::FileStorage;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the stored document and the log file
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Config {
    /// Fill unset values with defaults
    pub fn new(
        data_dir: Option<PathBuf>,
        api_key: Option<String>,
        model: Option<String>,
        api_base: Option<String>,
    ) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Ok(Self {
            data_dir,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    pub fn storage(&self) -> Result<FileStorage> {
        FileStorage::open(&self.data_dir)
    }

    pub fn parser(&self) -> Result<GeminiParser> {
        GeminiParser::new(&self.api_base, &self.model, self.api_key.clone())
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("gympro.log")
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("gympro"))
        .context("Could not determine data directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::new(Some(PathBuf::from("/tmp/gympro")), None, None, None).unwrap();
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.log_path(), PathBuf::from("/tmp/gympro/gympro.log"));
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::new(
            Some(PathBuf::from("data")),
            Some("secret".into()),
            Some("gemini-2.5-flash".into()),
            Some("http://localhost:9000".into()),
        )
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(cfg.api_base, "http://localhost:9000");
    }
}
