//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Extraction service location.
    pub api: ApiCfg,
    /// Bundled sample invoice.
    pub sample: SampleCfg,
    /// Where exported spreadsheets land.
    pub download: DownloadCfg,
}

/// Extraction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCfg {
    /// Base URL of the service, without a trailing slash.
    pub base_url: String,
}

/// Sample invoice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleCfg {
    /// Path of the sample image used by the "try sample" action.
    pub path: PathBuf,
}

/// Download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadCfg {
    /// Directory receiving `snap2sheet.xlsx`.
    pub dir: PathBuf,
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiCfg {
                base_url: "http://localhost:8000".into(),
            },
            sample: SampleCfg {
                path: PathBuf::from("sample-invoice.jpg"),
            },
            download: DownloadCfg {
                dir: PathBuf::from("."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_or_default(&path).unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert!(path.exists());
    }

    #[test]
    fn saved_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.api.base_url = "https://snap2sheet.example".into();
        cfg.download.dir = PathBuf::from("exports");
        cfg.save(&path).unwrap();

        let loaded = Config::load_or_default(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://snap2sheet.example");
        assert_eq!(loaded.download.dir, PathBuf::from("exports"));
    }
}
