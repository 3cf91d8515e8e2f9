//! Orchestration of the L3 training and classification binaries.
//!
//! Training writes `<stem>.data` into the working directory and runs the
//! training binary there, which leaves `<stem>.cls`, `<stem>.diz`,
//! `livelloI.txt` and `livelloII.txt` behind. Classification writes the rows
//! to classify under the same stem and runs the classification binary, which
//! writes `classificati.txt`.
//!
//! Intermediate files are named after the stem only, so two runs sharing a
//! stem and a directory overwrite each other.

use crate::dictionary::{ClassDictionary, ColumnDictionary, ItemDictionary, RuleDictionary};
use crate::error::{read_artifact, L3Error, Result};
use crate::filter::{filter_rule_file, FilterReport, FilterSet};
use crate::rule::{write_readable, RuleContext, RuleLevel, RuleSet, LEVEL1_FILE, LEVEL2_FILE};
use crate::table::Table;
use crate::validation::{check_categorical, check_stem};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::str::FromStr;

pub const BIN_DIR: &str = "bin";
pub const TRAIN_BIN: &str = "L3CFiltriItemTrain";
pub const CLASSIFY_BIN: &str = "L3CFiltriItemClassifica";
pub const CLASSIFICATION_RESULTS: &str = "classificati.txt";

/// Filter mode argument of the training binary; item filtering is done here.
const FILTER_MODE: &str = "nofiltro";

/// Reduction applied to the rule files after training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleSetPolicy {
    /// Keep level I and level II rules
    #[default]
    All,
    /// Keep level I rules only
    Level1,
    /// Keep the first percentage of level I rules, at least one
    Perc(u32),
    /// Keep the first K level I rules
    Top(usize),
}

impl RuleSetPolicy {
    /// Builds a policy from its name and the count the name requires.
    pub fn from_parts(rule_set: &str, top_count: Option<usize>, perc_count: Option<u32>) -> Result<Self> {
        let policy = match rule_set {
            "all" => RuleSetPolicy::All,
            "level1" => RuleSetPolicy::Level1,
            "perc" => RuleSetPolicy::Perc(perc_count.unwrap_or(0)),
            "top" => RuleSetPolicy::Top(top_count.unwrap_or(0)),
            other => {
                return Err(L3Error::Config(format!(
                    "rule_set '{}' is not valid (valid: all, level1, perc, top)",
                    other
                )))
            }
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            RuleSetPolicy::Perc(0) => Err(L3Error::Config(
                "perc_count must be greater than zero".to_string(),
            )),
            RuleSetPolicy::Top(0) => Err(L3Error::Config(
                "top_count must be greater than zero".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Number of level I rules kept out of `total`, or `None` to keep all.
    pub fn level1_keep(&self, total: usize) -> Option<usize> {
        match self {
            RuleSetPolicy::All | RuleSetPolicy::Level1 => None,
            RuleSetPolicy::Perc(perc) => {
                let take = total * (*perc as usize) / 100;
                Some(take.max(1))
            }
            RuleSetPolicy::Top(count) => Some(*count),
        }
    }

    pub fn keeps_level2(&self) -> bool {
        matches!(self, RuleSetPolicy::All)
    }

    /// Rewrites the rule files in `dir`.
    pub fn apply<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if self.keeps_level2() {
            return Ok(());
        }

        let level1_path = dir.join(LEVEL1_FILE);
        let content = read_artifact(&level1_path)?;
        let lines: Vec<&str> = content.lines().collect();

        if let Some(keep) = self.level1_keep(lines.len()) {
            let mut out = String::new();
            for line in lines.iter().take(keep) {
                out.push_str(line);
                out.push('\n');
            }
            std::fs::write(&level1_path, out)?;
            log::info!(
                "Kept {} of {} level I rules ({})",
                keep.min(lines.len()),
                lines.len(),
                self
            );
        }

        std::fs::write(dir.join(LEVEL2_FILE), "")?;
        Ok(())
    }
}

impl fmt::Display for RuleSetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSetPolicy::All => f.write_str("all"),
            RuleSetPolicy::Level1 => f.write_str("level1"),
            RuleSetPolicy::Perc(perc) => write!(f, "perc:{}", perc),
            RuleSetPolicy::Top(count) => write!(f, "top:{}", count),
        }
    }
}

impl FromStr for RuleSetPolicy {
    type Err = L3Error;

    /// Accepts `all`, `level1`, `perc:<n>` and `top:<k>`.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            None => RuleSetPolicy::from_parts(s, None, None),
            Some((name, count)) => {
                let count = count.trim();
                match name {
                    "perc" => RuleSetPolicy::from_parts(name, None, Some(parse_count(count)?)),
                    "top" => RuleSetPolicy::from_parts(name, Some(parse_count(count)?), None),
                    _ => RuleSetPolicy::from_parts(name, None, None),
                }
            }
        }
    }
}

fn parse_count<T: FromStr>(count: &str) -> Result<T> {
    count
        .parse()
        .map_err(|_| L3Error::Config(format!("Invalid rule count '{}'", count)))
}

#[derive(Debug, Clone, Default)]
pub struct TrainOptions {
    /// Columns to train on, in order. `None` uses every column.
    pub columns: Option<Vec<String>>,
    pub rule_set: RuleSetPolicy,
    /// Keep the training data as `<stem>-train.data`
    pub save_train_data_file: bool,
}

#[derive(Debug)]
pub struct L3Classifier {
    min_support: f64,
    min_confidence: f64,
    root: PathBuf,
    work_dir: PathBuf,
    train_bin: PathBuf,
    classify_bin: PathBuf,
}

impl L3Classifier {
    /// Creates a classifier using the binaries in `<root>/bin`. Intermediate
    /// files go to the current directory unless `with_work_dir` is used.
    pub fn new<P: AsRef<Path>>(min_support: f64, min_confidence: f64, root: P) -> Result<Self> {
        for (name, value) in [("min_support", min_support), ("min_confidence", min_confidence)] {
            if !value.is_finite() || value < 0.0 {
                return Err(L3Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let root = root.as_ref();
        let bin_dir = root.join(BIN_DIR);
        if !bin_dir.is_dir() {
            return Err(L3Error::MissingDependency(format!(
                "bin directory named '{}' is not present in L3 root {}",
                BIN_DIR,
                root.display()
            )));
        }

        for bin in [TRAIN_BIN, CLASSIFY_BIN] {
            if !bin_dir.join(bin).is_file() {
                return Err(L3Error::MissingDependency(format!(
                    "{} is missing from {}",
                    bin,
                    bin_dir.display()
                )));
            }
        }

        // The binaries run from other directories and receive the root as an
        // argument.
        let root = std::fs::canonicalize(root)?;

        Ok(Self {
            min_support,
            min_confidence,
            train_bin: root.join(BIN_DIR).join(TRAIN_BIN),
            classify_bin: root.join(BIN_DIR).join(CLASSIFY_BIN),
            work_dir: std::env::current_dir()?,
            root,
        })
    }

    pub fn with_work_dir<P: Into<PathBuf>>(mut self, work_dir: P) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Trains on `train`, whose name is the stem of the run.
    pub fn train(&self, train: &Table, options: &TrainOptions) -> Result<TrainedModel> {
        options.rule_set.validate()?;
        let stem = train.name();
        check_stem(stem)?;
        check_categorical(train)?;
        let columns = selected_columns(train, options.columns.as_deref())?;

        let data_file = self.work_dir.join(format!("{}.data", stem));
        train.write_delimited(&data_file, options.columns.as_deref())?;

        let status = run_binary(
            Command::new(&self.train_bin)
                .arg(stem)
                .arg(self.min_support.to_string())
                .arg(self.min_confidence.to_string())
                .arg(FILTER_MODE)
                .args(["0", "0", "0"])
                .arg(&self.root)
                .current_dir(&self.work_dir),
            TRAIN_BIN,
        )?;
        log::debug!("{} finished with {}", TRAIN_BIN, status);

        options.rule_set.apply(&self.work_dir)?;

        if options.save_train_data_file {
            std::fs::rename(&data_file, self.work_dir.join(format!("{}-train.data", stem)))?;
        }

        Ok(TrainedModel {
            stem: stem.to_string(),
            dir: self.work_dir.clone(),
            columns,
            selection: options.columns.clone(),
            rule_set: options.rule_set,
        })
    }

    /// Classifies `data` with the model stored in `model_dir`, whose last
    /// path component is the model's stem.
    pub fn predict<P: AsRef<Path>>(
        &self,
        data: &Table,
        model_dir: P,
        columns: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let model_dir = model_dir.as_ref();
        let stem = model_dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                L3Error::Config(format!("Cannot derive a stem from {}", model_dir.display()))
            })?;
        self.classify(data, model_dir, stem, columns)
    }

    /// Trains on `train`, then classifies `test` with the fresh model.
    pub fn train_and_predict(
        &self,
        train: &Table,
        test: &Table,
        options: &TrainOptions,
    ) -> Result<Vec<String>> {
        check_categorical(test)?;
        test.column_indices(options.columns.as_deref())?;

        let model = self.train(train, options)?;
        model.predict(self, test)
    }

    fn classify(
        &self,
        data: &Table,
        model_dir: &Path,
        stem: &str,
        columns: Option<&[String]>,
    ) -> Result<Vec<String>> {
        check_stem(stem)?;
        check_categorical(data)?;
        if !model_dir.is_dir() {
            return Err(L3Error::FileNotFound(model_dir.to_path_buf()));
        }

        // The classification binary looks for rows under the model's stem.
        data.write_delimited(model_dir.join(format!("{}.data", stem)), columns)?;

        let status = run_binary(
            Command::new(&self.classify_bin)
                .arg(stem)
                .arg(&self.root)
                .current_dir(model_dir),
            CLASSIFY_BIN,
        )?;
        log::debug!("{} finished with {}", CLASSIFY_BIN, status);

        let labels = read_classification_results(model_dir)?;
        if labels.len() != data.len() {
            log::warn!(
                "{} holds {} predictions for {} rows",
                CLASSIFICATION_RESULTS,
                labels.len(),
                data.len()
            );
        }
        Ok(labels)
    }
}

fn selected_columns(table: &Table, selection: Option<&[String]>) -> Result<Vec<String>> {
    let indices = table.column_indices(selection)?;
    let columns: Vec<String> = indices.iter().map(|&i| table.columns()[i].clone()).collect();
    if let Some(name) = columns.iter().find(|c| c.contains(':')) {
        return Err(L3Error::Config(format!(
            "The character ':' is not allowed in column names: '{}'",
            name
        )));
    }
    Ok(columns)
}

/// Runs an L3 binary to completion. Its stdout is discarded and its exit
/// status is only logged: the binaries report failure by not writing their
/// output files.
fn run_binary(cmd: &mut Command, tool: &str) -> Result<ExitStatus> {
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::piped());

    log::info!("Executing {}: {:?}", tool, cmd);

    let output = cmd.output().map_err(|e| L3Error::ExternalTool {
        tool: tool.to_string(),
        message: format!("Failed to execute {}: {}", tool, e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::warn!(
            "{} exited with code {}: {}",
            tool,
            output.status.code().unwrap_or(-1),
            stderr.trim()
        );
    }

    Ok(output.status)
}

/// Parses the labels in `classificati.txt`: two header lines, then one line
/// per classified row whose third field is the predicted label.
pub fn parse_classification_results(content: &str) -> Result<Vec<String>> {
    content
        .lines()
        .enumerate()
        .skip(2)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            line.split_whitespace()
                .nth(2)
                .map(str::to_string)
                .ok_or_else(|| L3Error::RuleFormat {
                    line: idx + 1,
                    message: format!("classification line '{}' has no label field", line.trim()),
                })
        })
        .collect()
}

pub fn read_classification_results<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    let path = dir.as_ref().join(CLASSIFICATION_RESULTS);
    let content = read_artifact(&path)?;
    parse_classification_results(&content).map_err(|e| match e {
        L3Error::RuleFormat { line, message } => L3Error::ArtifactFormat {
            path: path.clone(),
            line,
            message,
        },
        other => other,
    })
}

/// The dictionaries of one training run.
#[derive(Debug, Clone)]
pub struct RunDictionaries {
    pub items: ItemDictionary,
    pub classes: ClassDictionary,
    pub columns: ColumnDictionary,
}

impl RunDictionaries {
    pub fn context<'a>(&'a self, intervals: Option<&'a RuleDictionary>) -> RuleContext<'a> {
        RuleContext {
            items: &self.items,
            columns: &self.columns,
            classes: &self.classes,
            intervals,
        }
    }
}

/// A completed training run and the artifacts it left in `dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    stem: String,
    dir: PathBuf,
    columns: Vec<String>,
    selection: Option<Vec<String>>,
    rule_set: RuleSetPolicy,
}

impl TrainedModel {
    /// Refers to the artifacts of an earlier run. `columns` are the training
    /// columns in order.
    pub fn open<P: Into<PathBuf>>(dir: P, stem: &str, columns: Vec<String>) -> Result<Self> {
        check_stem(stem)?;
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(L3Error::FileNotFound(dir));
        }
        Ok(Self {
            stem: stem.to_string(),
            dir,
            columns,
            selection: None,
            rule_set: RuleSetPolicy::All,
        })
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rule_set(&self) -> RuleSetPolicy {
        self.rule_set
    }

    pub fn rules(&self, level: RuleLevel) -> Result<RuleSet> {
        RuleSet::load(&self.dir, level)
    }

    pub fn dictionaries(&self) -> Result<RunDictionaries> {
        Ok(RunDictionaries {
            items: ItemDictionary::load(&self.dir, &self.stem)?,
            classes: ClassDictionary::load(&self.dir, &self.stem)?,
            columns: ColumnDictionary::new(self.columns.clone()),
        })
    }

    /// Drops rules of `level` matched by `filters`, rewriting the rule file.
    pub fn filter(
        &self,
        level: RuleLevel,
        filters: &FilterSet,
        intervals: Option<&RuleDictionary>,
        readable: Option<&Path>,
    ) -> Result<FilterReport> {
        filters.validate()?;
        let dictionaries = self.dictionaries()?;
        filter_rule_file(
            level.path(&self.dir),
            filters,
            &dictionaries.context(intervals),
            readable,
        )
    }

    pub fn write_readable<P: AsRef<Path>>(
        &self,
        level: RuleLevel,
        path: P,
        intervals: Option<&RuleDictionary>,
    ) -> Result<usize> {
        let dictionaries = self.dictionaries()?;
        let rules = self.rules(level)?;
        write_readable(path, &rules.rules, &dictionaries.context(intervals))?;
        Ok(rules.len())
    }

    /// Classifies `data` with this model, selecting the columns chosen for
    /// training.
    pub fn predict(&self, classifier: &L3Classifier, data: &Table) -> Result<Vec<String>> {
        classifier.classify(data, &self.dir, &self.stem, self.selection.as_deref())
    }
}
