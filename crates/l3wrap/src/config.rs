use crate::classifier::RuleSetPolicy;
use crate::error::{L3Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

pub const ROOT_ENV: &str = "L3WRAP_ROOT";
const APP_NAME: &str = "l3wrap";
const CONFIG_FILE: &str = "l3wrap.toml";

/// Defaults read from `l3wrap.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub rule_set: Option<String>,
    pub top_count: Option<usize>,
    pub perc_count: Option<u32>,
    /// Filters file applied by `l3wrap filter` when none is given
    pub filters: Option<PathBuf>,
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            L3Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| L3Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// The configured rule set policy, `all` when unset.
    pub fn rule_set_policy(&self) -> Result<RuleSetPolicy> {
        match &self.rule_set {
            Some(name) => RuleSetPolicy::from_parts(name, self.top_count, self.perc_count),
            None => Ok(RuleSetPolicy::All),
        }
    }
}

pub struct Config {
    /// Directory holding `bin/` with the L3 binaries
    pub root: PathBuf,
    /// Directory receiving intermediate files and rule files
    pub work_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub settings: Settings,
}

impl Config {
    pub fn new(
        root_override: Option<PathBuf>,
        work_dir_override: Option<PathBuf>,
        config_override: Option<PathBuf>,
    ) -> Result<Self> {
        let root = if let Some(path) = root_override {
            path
        } else if let Ok(env_path) = std::env::var(ROOT_ENV) {
            PathBuf::from(env_path)
        } else {
            default_data_dir()?
        };

        let work_dir = match work_dir_override {
            Some(path) => path,
            None => std::env::current_dir()?,
        };

        let config_path = config_override.or_else(|| {
            BaseDirectories::with_prefix(APP_NAME)
                .ok()
                .and_then(|xdg| xdg.find_config_file(CONFIG_FILE))
        });

        let settings = match &config_path {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        Ok(Self {
            root,
            work_dir,
            config_path,
            settings,
        })
    }

    pub fn ensure_work_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        Ok(())
    }
}

/// `$XDG_DATA_HOME/l3wrap`, where setup installs the binaries by default.
pub fn default_data_dir() -> Result<PathBuf> {
    let xdg = BaseDirectories::with_prefix(APP_NAME)
        .map_err(|e| L3Error::Config(format!("Failed to initialize XDG directories: {}", e)))?;
    Ok(xdg.get_data_home())
}
