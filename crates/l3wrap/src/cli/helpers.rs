use l3wrap_lib::{L3Error, Result, RuleDictionary, TrainedModel};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct IntervalSpec {
    tr1: f64,
    tr2: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IntervalFile {
    #[serde(default)]
    intervals: BTreeMap<String, IntervalSpec>,
}

/// Builds a rule dictionary from a TOML file of the form
///
/// ```toml
/// [intervals.age]
/// tr1 = 30
/// tr2 = 50
/// ```
pub fn load_intervals(path: Option<&Path>) -> Result<Option<RuleDictionary>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(path).map_err(|e| {
        L3Error::Config(format!("Failed to read intervals file {}: {}", path.display(), e))
    })?;
    let file: IntervalFile = toml::from_str(&content)
        .map_err(|e| L3Error::Config(format!("Failed to parse intervals TOML: {}", e)))?;

    let mut dict = RuleDictionary::new();
    for (name, bounds) in &file.intervals {
        dict.add_attribute(name, bounds.tr1, bounds.tr2)?;
    }
    Ok(Some(dict))
}

/// Opens the model in `model_dir`, whose name is the stem unless given.
pub fn open_model(model_dir: &Path, stem: Option<String>, columns: Vec<String>) -> Result<TrainedModel> {
    let stem = match stem {
        Some(stem) => stem,
        None => dir_name(model_dir)?,
    };
    TrainedModel::open(model_dir.to_path_buf(), &stem, columns)
}

pub fn dir_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| L3Error::Config(format!("Cannot derive a stem from {}", path.display())))
}

pub fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| L3Error::Config(format!("Cannot derive a stem from {}", path.display())))
}

pub fn resolve_filters_path(explicit: Option<PathBuf>, configured: Option<&PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(|| configured.cloned())
        .ok_or_else(|| L3Error::Config("No filters file given and none configured".to_string()))
}
