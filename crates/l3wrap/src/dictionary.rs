//! Lookup tables translating the numeric encodings of the L3 binaries.
//!
//! The training binary writes two auxiliary files next to its input:
//! - `<stem>.cls`: the first line is a starting class id, every following
//!   line is a label assigned the next id.
//! - `<stem>.diz`: one `<item_id>-><column_position>,<value>` line per item.
//!   Column positions are 1-based and are stored here 0-based.

use crate::error::{read_artifact, L3Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub type ItemId = i64;
pub type ClassId = i64;

/// Item id assigned to (column, value) pairs missing from the encoding table.
pub const UNKNOWN_ITEM: ItemId = -1;

pub fn class_file<P: AsRef<Path>>(dir: P, stem: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.cls", stem))
}

pub fn item_file<P: AsRef<Path>>(dir: P, stem: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.diz", stem))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDictionary {
    labels: BTreeMap<ClassId, String>,
}

impl ClassDictionary {
    /// Loads `<stem>.cls` from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P, stem: &str) -> Result<Self> {
        let path = class_file(dir, stem);
        let content = read_artifact(&path)?;
        Self::parse(&content).map_err(|e| with_path(e, &path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content.lines();

        let first = lines.next().ok_or_else(|| L3Error::RuleFormat {
            line: 1,
            message: "class file is empty".to_string(),
        })?;
        let mut class_id: ClassId = first.trim().parse().map_err(|_| L3Error::RuleFormat {
            line: 1,
            message: format!("invalid starting class id '{}'", first.trim()),
        })?;

        // Every line takes the next id, empty ones included; only trailing
        // empty lines are dropped.
        let mut rest: Vec<&str> = lines.map(|line| line.trim_end_matches('\r')).collect();
        while rest.last().is_some_and(|label| label.is_empty()) {
            rest.pop();
        }

        let mut labels = BTreeMap::new();
        for label in rest {
            labels.insert(class_id, label.to_string());
            class_id += 1;
        }

        Ok(Self { labels })
    }

    pub fn label(&self, class_id: ClassId) -> Option<&str> {
        self.labels.get(&class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.labels.iter().map(|(id, label)| (*id, label.as_str()))
    }
}

/// An encoded (0-based column, value) pair.
pub type Item = (usize, String);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDictionary {
    by_id: HashMap<ItemId, Item>,
    by_item: HashMap<Item, ItemId>,
}

impl ItemDictionary {
    /// Loads `<stem>.diz` from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P, stem: &str) -> Result<Self> {
        let path = item_file(dir, stem);
        let content = read_artifact(&path)?;
        Self::parse(&content).map_err(|e| with_path(e, &path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut dict = Self::default();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (item_id, column_id, value) = parse_item_line(line).map_err(|message| {
                L3Error::RuleFormat {
                    line: idx + 1,
                    message,
                }
            })?;
            dict.by_item.insert((column_id, value.clone()), item_id);
            dict.by_id.insert(item_id, (column_id, value));
        }

        Ok(dict)
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.by_id.get(&item_id)
    }

    /// Looks up the id of a (0-based column, value) pair.
    pub fn item_id(&self, column_id: usize, value: &str) -> Option<ItemId> {
        // HashMap<(usize, String), _> cannot be queried with a borrowed &str
        self.by_item.get(&(column_id, value.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn parse_item_line(line: &str) -> std::result::Result<(ItemId, usize, String), String> {
    let (id_part, rest) = line
        .split_once("->")
        .ok_or_else(|| format!("missing '->' in '{}'", line))?;
    let (pos_part, value) = rest
        .split_once(',')
        .ok_or_else(|| format!("missing ',' in '{}'", line))?;

    let item_id: ItemId = id_part
        .trim()
        .parse()
        .map_err(|_| format!("invalid item id '{}'", id_part))?;
    let position: usize = pos_part
        .trim()
        .parse()
        .map_err(|_| format!("invalid column position '{}'", pos_part))?;
    if position == 0 {
        return Err("column positions are 1-based, got 0".to_string());
    }

    Ok((item_id, position - 1, value.to_string()))
}

fn with_path(err: L3Error, path: &Path) -> L3Error {
    match err {
        L3Error::RuleFormat { line, message } => L3Error::ArtifactFormat {
            path: path.to_path_buf(),
            line,
            message,
        },
        other => other,
    }
}

/// 0-based column id to column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnDictionary {
    names: Vec<String>,
}

impl ColumnDictionary {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn name(&self, column_id: usize) -> Option<&str> {
        self.names.get(column_id).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Textual names of the intervals a discretized attribute was binned into.
///
/// Values in the data are bin keys (`"1"`, `"2"`, `"3"`); each attribute
/// supports two or three bins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDictionary {
    attributes: HashMap<String, BTreeMap<String, String>>,
}

impl RuleDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as split at `tr1` (two bins) or at `tr1` and `tr2`
    /// (three bins).
    pub fn add_attribute(&mut self, name: &str, tr1: f64, tr2: Option<f64>) -> Result<()> {
        if !(tr1 > 0.0) {
            return Err(L3Error::Config(format!(
                "Threshold 1 of '{}' must be positive, got {}",
                name, tr1
            )));
        }

        let bins = match tr2 {
            Some(tr2) => {
                if tr2 <= tr1 {
                    return Err(L3Error::Config(format!(
                        "Threshold 2 of '{}' ({}) must be greater than threshold 1 ({})",
                        name, tr2, tr1
                    )));
                }
                BTreeMap::from([
                    ("1".to_string(), format!("{}<={}", name, tr1)),
                    ("2".to_string(), format!("{}<{}<{}", tr1, name, tr2)),
                    ("3".to_string(), format!("{}>={}", name, tr2)),
                ])
            }
            None => BTreeMap::from([
                ("1".to_string(), format!("{}<{}", name, tr1)),
                ("2".to_string(), format!("{}>={}", name, tr1)),
            ]),
        };

        self.attributes.insert(name.to_string(), bins);
        Ok(())
    }

    pub fn interval(&self, name: &str, key: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|bins| bins.get(key))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
