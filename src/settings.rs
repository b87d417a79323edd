//! Run configuration, read once from the environment and passed by reference.
//!
//! Recognized variables:
//! - `ANIREC_ROOT`: project root (default: current directory)
//! - `ANIREC_DATA_DIR`: data directory (default: `<root>/data`)
//! - `ANIREC_INTERACTIONS_RAW`: raw interaction directory (default: `<data>/interactions_raw`)
//! - `ANIREC_INTERACTIONS_OUT`: interaction table (default: `<data>/interactions_score_favorite.parquet`)
//! - `ANIREC_USER_NAME_ID_OUT`: mapping table (default: `<data>/user_name_id.parquet`)
//! - `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB`, `POSTGRES_USER`, `POSTGRES_PASSWORD`

use std::path::{Path, PathBuf};

use anirec_ingest::PipelinePaths;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine current directory: {0}")]
    CurrentDir(#[from] std::io::Error),

    #[error("incomplete postgres settings, missing {0}")]
    IncompletePostgres(String),

    #[error("POSTGRES_PORT is not a valid port: {0}")]
    InvalidPort(String),
}

// ============================================================================
// Paths
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsSettings {
    pub root: PathBuf,
    pub data: PathBuf,
    pub interactions_raw: PathBuf,
    pub interactions_score_favorite: PathBuf,
    pub user_name_id: PathBuf,
}

impl PathsSettings {
    /// Default layout under `root`.
    pub fn under(root: PathBuf) -> Self {
        Self::with_data_dir(root.clone(), root.join("data"))
    }

    fn with_data_dir(root: PathBuf, data: PathBuf) -> Self {
        Self {
            interactions_raw: data.join("interactions_raw"),
            interactions_score_favorite: data.join("interactions_score_favorite.parquet"),
            user_name_id: data.join("user_name_id.parquet"),
            root,
            data,
        }
    }

    pub fn pipeline_paths(&self) -> PipelinePaths {
        PipelinePaths {
            interactions_raw: self.interactions_raw.clone(),
            interactions_out: self.interactions_score_favorite.clone(),
            user_name_id_out: self.user_name_id.clone(),
        }
    }
}

// ============================================================================
// Postgres
// ============================================================================

/// Database connection settings. Not used by preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub password: String,
}

impl PostgresSettings {
    pub fn dsn(&self) -> String {
        self.dsn_with_scheme("postgresql")
    }

    pub fn dsn_async(&self) -> String {
        self.dsn_with_scheme("postgresql+asyncpg")
    }

    fn dsn_with_scheme(&self, scheme: &str) -> String {
        format!(
            "{scheme}://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.db
        )
    }

    /// `None` when no `POSTGRES_*` variable is set; an error when only some are.
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Option<Self>, SettingsError> {
        const KEYS: [&str; 5] = [
            "POSTGRES_HOST",
            "POSTGRES_PORT",
            "POSTGRES_DB",
            "POSTGRES_USER",
            "POSTGRES_PASSWORD",
        ];
        let values: Vec<Option<String>> = KEYS.iter().map(|k| lookup(k)).collect();
        if values.iter().all(Option::is_none) {
            return Ok(None);
        }
        let missing: Vec<&str> = KEYS
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            return Err(SettingsError::IncompletePostgres(missing.join(", ")));
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();
        let host = next();
        let port_raw = next();
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| SettingsError::InvalidPort(port_raw.clone()))?;
        Ok(Some(Self {
            host,
            port,
            db: next(),
            user: next(),
            password: next(),
        }))
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub paths: PathsSettings,
    pub postgres: Option<PostgresSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let cwd = std::env::current_dir()?;
        Self::from_lookup(&|key| std::env::var(key).ok(), &cwd)
    }

    /// Build settings from an arbitrary variable source. `default_root` is the project
    /// root used when `ANIREC_ROOT` is not set.
    pub fn from_lookup(
        lookup: &dyn Fn(&str) -> Option<String>,
        default_root: &Path,
    ) -> Result<Self, SettingsError> {
        let root = lookup("ANIREC_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_root.to_path_buf());
        let data = lookup("ANIREC_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| root.join("data"));

        let mut paths = PathsSettings::with_data_dir(root, data);
        if let Some(p) = lookup("ANIREC_INTERACTIONS_RAW") {
            paths.interactions_raw = p.into();
        }
        if let Some(p) = lookup("ANIREC_INTERACTIONS_OUT") {
            paths.interactions_score_favorite = p.into();
        }
        if let Some(p) = lookup("ANIREC_USER_NAME_ID_OUT") {
            paths.user_name_id = p.into();
        }

        Ok(Self {
            paths,
            postgres: PostgresSettings::from_lookup(lookup)?,
        })
    }
}
