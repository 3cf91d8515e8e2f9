pub mod filter;
pub mod predict;
pub mod rules;
pub mod setup;
pub mod train;
mod helpers;

use clap::{Parser, Subcommand};
use l3wrap_lib::{Config, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "l3wrap")]
#[command(about = "Train and apply L3 associative classifiers", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "L3 root directory containing bin/")]
    pub root: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for intermediate and rule files")]
    pub work_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to l3wrap.toml")]
    pub config: Option<PathBuf>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, short = 'q', global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Download the L3 binaries if they are missing")]
    Setup {
        #[arg(long, help = "Install into this directory instead of the L3 root")]
        data_dir: Option<PathBuf>,
    },

    #[command(about = "Train a model from a CSV file with a header row")]
    Train {
        #[arg(help = "Training data")]
        input: PathBuf,

        #[arg(long, help = "Name of the training run (defaults to the file stem)")]
        stem: Option<String>,

        #[arg(long, help = "Minimum support")]
        min_support: Option<f64>,

        #[arg(long, help = "Minimum confidence")]
        min_confidence: Option<f64>,

        #[arg(long, help = "Rule set to keep (all, level1, perc, top)")]
        rule_set: Option<String>,

        #[arg(long, help = "Number of rules kept with --rule-set top")]
        top_count: Option<usize>,

        #[arg(long, help = "Percentage of rules kept with --rule-set perc")]
        perc_count: Option<u32>,

        #[arg(long, value_delimiter = ',', help = "Rename the CSV columns, one name per column")]
        names: Option<Vec<String>>,

        #[arg(long, value_delimiter = ',', help = "Columns to train on, in order")]
        columns: Option<Vec<String>>,

        #[arg(long, help = "Keep the training data as <stem>-train.data")]
        keep_data: bool,
    },

    #[command(about = "Classify rows of a CSV file with a trained model")]
    Predict {
        #[arg(help = "Data to classify")]
        input: PathBuf,

        #[arg(long, help = "Model directory; its name is the model stem")]
        model_dir: PathBuf,

        #[arg(long, value_delimiter = ',', help = "Columns to classify with, in order")]
        columns: Option<Vec<String>>,

        #[arg(long, help = "Print labels as a JSON array")]
        json: bool,
    },

    #[command(about = "Discard rules matched by filter specifications")]
    Filter {
        #[arg(long, help = "Model directory")]
        model_dir: PathBuf,

        #[arg(long, help = "Stem of the training run (defaults to the directory name)")]
        stem: Option<String>,

        #[arg(long, value_delimiter = ',', required = true, help = "Training columns, in order")]
        columns: Vec<String>,

        #[arg(long, help = "Filters TOML file")]
        filters: Option<PathBuf>,

        #[arg(long, help = "Interval definitions TOML file")]
        intervals: Option<PathBuf>,

        #[arg(long, default_value = "1", help = "Rule level to filter (1 or 2)")]
        level: String,

        #[arg(long, help = "Write readable surviving rules to this file")]
        readable: Option<PathBuf>,
    },

    #[command(about = "Show the rules of a trained model")]
    Rules {
        #[arg(long, help = "Model directory")]
        model_dir: PathBuf,

        #[arg(long, help = "Stem of the training run (defaults to the directory name)")]
        stem: Option<String>,

        #[arg(long, value_delimiter = ',', required = true, help = "Training columns, in order")]
        columns: Vec<String>,

        #[arg(long, help = "Interval definitions TOML file")]
        intervals: Option<PathBuf>,

        #[arg(long, default_value = "1", help = "Rule level to show (1 or 2)")]
        level: String,

        #[arg(long, help = "Show at most this many rules")]
        limit: Option<usize>,

        #[arg(long, value_delimiter = ',', help = "Only show rules matching this row of training column values")]
        row: Option<Vec<String>>,
    },
}

pub fn init_config(cli: &Cli) -> Result<Config> {
    let config = Config::new(cli.root.clone(), cli.work_dir.clone(), cli.config.clone())?;
    config.ensure_work_dir()?;
    Ok(config)
}
