use super::helpers::file_stem;
use console::style;
use l3wrap_lib::{Config, L3Classifier, L3Error, Result, RuleSetPolicy, Table, TrainOptions};
use std::path::PathBuf;

pub struct TrainArgs {
    pub input: PathBuf,
    pub stem: Option<String>,
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub rule_set: Option<String>,
    pub top_count: Option<usize>,
    pub perc_count: Option<u32>,
    pub names: Option<Vec<String>>,
    pub columns: Option<Vec<String>>,
    pub keep_data: bool,
}

pub fn handle_train_command(config: &Config, args: TrainArgs, quiet: bool) -> Result<()> {
    let settings = &config.settings;

    let min_support = args
        .min_support
        .or(settings.min_support)
        .ok_or_else(|| L3Error::Config("min_support is required".to_string()))?;
    let min_confidence = args
        .min_confidence
        .or(settings.min_confidence)
        .ok_or_else(|| L3Error::Config("min_confidence is required".to_string()))?;

    let rule_set = match args.rule_set {
        Some(name) => RuleSetPolicy::from_parts(
            &name,
            args.top_count.or(settings.top_count),
            args.perc_count.or(settings.perc_count),
        )?,
        None => settings.rule_set_policy()?,
    };

    let stem = match args.stem {
        Some(stem) => stem,
        None => file_stem(&args.input)?,
    };
    let mut table = Table::from_csv_file(&args.input, stem)?;
    if let Some(names) = args.names {
        table = table.with_column_names(names)?;
    }

    let classifier = L3Classifier::new(min_support, min_confidence, &config.root)?
        .with_work_dir(config.work_dir.clone());

    let options = TrainOptions {
        columns: args.columns,
        rule_set,
        save_train_data_file: args.keep_data,
    };

    if !quiet {
        println!(
            "{} Training '{}' on {} rows (rule set: {})",
            style(">>>").cyan(),
            table.name(),
            table.len(),
            rule_set
        );
    }

    let model = classifier.train(&table, &options)?;
    let level1 = model.rules(l3wrap_lib::RuleLevel::Level1)?;
    let level2 = model.rules(l3wrap_lib::RuleLevel::Level2)?;

    if !quiet {
        println!("{} Training complete", style("✓").green());
        println!("  Model directory: {}", model.dir().display());
        println!("  Level I rules: {}", style(level1.len()).bold());
        println!("  Level II rules: {}", style(level2.len()).bold());
    }

    Ok(())
}
