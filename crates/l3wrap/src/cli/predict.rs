use super::helpers::dir_name;
use l3wrap_lib::{Config, L3Classifier, L3Error, Result, Table};
use std::path::PathBuf;

pub fn handle_predict_command(
    config: &Config,
    input: PathBuf,
    model_dir: PathBuf,
    columns: Option<Vec<String>>,
    json: bool,
) -> Result<()> {
    let stem = dir_name(&model_dir)?;
    let table = Table::from_csv_file(&input, stem)?;

    // Support and confidence only matter for training.
    let min_support = config.settings.min_support.unwrap_or(0.0);
    let min_confidence = config.settings.min_confidence.unwrap_or(0.0);
    let classifier = L3Classifier::new(min_support, min_confidence, &config.root)?;

    let labels = classifier.predict(&table, &model_dir, columns.as_deref())?;

    if json {
        let rendered = serde_json::to_string_pretty(&labels)
            .map_err(|e| L3Error::Config(format!("Failed to serialize labels: {}", e)))?;
        println!("{}", rendered);
    } else {
        for label in &labels {
            println!("{}", label);
        }
    }

    Ok(())
}
