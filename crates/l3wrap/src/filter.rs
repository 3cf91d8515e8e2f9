//! Post-training rule filtering.
//!
//! A filter lists interval names, a target label and a sensitivity. A rule
//! predicting the target label is discarded when at least `sensitivity` of
//! its items have interval names in the filter's list. Filters are checked
//! in declaration order and the first one that discards a rule wins.
//!
//! Filters are loaded from TOML:
//!
//! ```toml
//! [[filters]]
//! name = "cold_days"
//! items = ["temp<=10", "wind>=20"]
//! label = "no"
//! sensitivity = 1
//! ```

use crate::error::{L3Error, Result};
use crate::rule::{parse_raw_rules, write_readable, Rule, RuleContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Name used in reports
    pub name: String,
    /// Interval names counted against the sensitivity
    pub items: BTreeSet<String>,
    /// Only rules predicting this label are affected
    pub label: String,
    /// Minimum number of listed items a rule must contain to be discarded
    pub sensitivity: usize,
}

impl FilterRule {
    pub fn new<S: Into<String>>(name: S, items: &[&str], label: &str, sensitivity: usize) -> Self {
        Self {
            name: name.into(),
            items: items.iter().map(|s| s.to_string()).collect(),
            label: label.to_string(),
            sensitivity,
        }
    }

    /// Number of `interval_names` this filter counts for a rule predicting
    /// `label`.
    pub fn tally(&self, label: &str, interval_names: &[&str]) -> usize {
        if label != self.label {
            return 0;
        }
        interval_names
            .iter()
            .filter(|name| self.items.contains(**name))
            .count()
    }

    pub fn discards(&self, label: &str, interval_names: &[&str]) -> bool {
        self.tally(label, interval_names) >= self.sensitivity
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(L3Error::Config("Filter name cannot be empty".to_string()));
        }
        if self.sensitivity == 0 {
            return Err(L3Error::Config(format!(
                "Filter '{}' must have a sensitivity greater than zero",
                self.name
            )));
        }
        Ok(())
    }
}

/// Filters in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub filters: Vec<FilterRule>,
}

impl FilterSet {
    pub fn new(filters: Vec<FilterRule>) -> Result<Self> {
        let set = Self { filters };
        set.validate()?;
        Ok(set)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            L3Error::Config(format!(
                "Failed to read filters file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let set: FilterSet = toml::from_str(toml_str)
            .map_err(|e| L3Error::Config(format!("Failed to parse filters TOML: {}", e)))?;
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for filter in &self.filters {
            filter.validate()?;
            if !seen.insert(filter.name.as_str()) {
                return Err(L3Error::Config(format!("Duplicate filter name '{}'", filter.name)));
            }
        }
        Ok(())
    }

    /// Position and filter of the first one discarding a rule with `label`
    /// and `interval_names`.
    pub fn first_match(&self, label: &str, interval_names: &[&str]) -> Option<(usize, &FilterRule)> {
        self.filters
            .iter()
            .enumerate()
            .find(|(_, filter)| filter.discards(label, interval_names))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterReport {
    pub kept: usize,
    pub discarded: usize,
    /// Rules discarded by each filter, in filter order
    pub by_filter: Vec<(String, usize)>,
}

/// Splits `rules` into survivors, counting discards per filter.
pub fn apply_filters(
    rules: Vec<Rule>,
    filters: &FilterSet,
    ctx: &RuleContext<'_>,
) -> Result<(Vec<Rule>, FilterReport)> {
    let mut report = FilterReport {
        by_filter: filters.filters.iter().map(|f| (f.name.clone(), 0)).collect(),
        ..Default::default()
    };
    let mut survivors = Vec::with_capacity(rules.len());

    for rule in rules {
        let label = ctx.label(rule.class_id)?;
        let names = ctx.interval_names(&rule)?;

        match filters.first_match(label, &names) {
            Some((idx, filter)) => {
                log::debug!("Rule {} discarded by filter '{}'", rule.id, filter.name);
                report.by_filter[idx].1 += 1;
                report.discarded += 1;
            }
            None => {
                report.kept += 1;
                survivors.push(rule);
            }
        }
    }

    Ok((survivors, report))
}

/// Filters the rules file at `path` in place, optionally writing a readable
/// rendering of the survivors to `readable`.
pub fn filter_rule_file<P: AsRef<Path>>(
    path: P,
    filters: &FilterSet,
    ctx: &RuleContext<'_>,
    readable: Option<&Path>,
) -> Result<FilterReport> {
    let path = path.as_ref();
    filters.validate()?;

    let rules = parse_raw_rules(path)?;
    let (survivors, report) = apply_filters(rules, filters, ctx)?;

    let mut out = String::new();
    for rule in &survivors {
        out.push_str(&rule.raw);
        out.push('\n');
    }
    std::fs::write(path, out)?;

    if let Some(readable_path) = readable {
        write_readable(readable_path, &survivors, ctx)?;
    }

    log::info!(
        "Filtered {}: kept {}, discarded {}",
        path.display(),
        report.kept,
        report.discarded
    );

    Ok(report)
}
