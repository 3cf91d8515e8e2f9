use super::helpers::{load_intervals, open_model, resolve_filters_path};
use console::style;
use l3wrap_lib::{Config, FilterSet, Result, RuleLevel};
use std::path::PathBuf;

pub struct FilterArgs {
    pub model_dir: PathBuf,
    pub stem: Option<String>,
    pub columns: Vec<String>,
    pub filters: Option<PathBuf>,
    pub intervals: Option<PathBuf>,
    pub level: String,
    pub readable: Option<PathBuf>,
}

pub fn handle_filter_command(config: &Config, args: FilterArgs, verbose: bool, quiet: bool) -> Result<()> {
    let level: RuleLevel = args.level.parse()?;
    let filters_path = resolve_filters_path(args.filters, config.settings.filters.as_ref())?;
    let filters = FilterSet::from_file(&filters_path)?;
    let intervals = load_intervals(args.intervals.as_deref())?;

    if verbose {
        println!(
            "{} Loaded {} filters from {}",
            style(">>>").cyan(),
            filters.len(),
            filters_path.display()
        );
    }

    let model = open_model(&args.model_dir, args.stem, args.columns)?;
    let report = model.filter(level, &filters, intervals.as_ref(), args.readable.as_deref())?;

    if !quiet {
        println!("{} Filtering complete ({})", style("✓").green(), level);
        println!("  Kept: {}", style(report.kept).green());
        println!("  Discarded: {}", style(report.discarded).yellow());
        if verbose {
            for (name, count) in &report.by_filter {
                println!("    {}: {}", name, count);
            }
        }
        if let Some(path) = &args.readable {
            println!("  Readable rules: {}", path.display());
        }
    }

    Ok(())
}
