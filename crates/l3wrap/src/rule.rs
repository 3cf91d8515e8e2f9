//! Association rules as written by the L3 training binary.
//!
//! Each rule file holds one rule per line:
//!
//! ```text
//! {item_id,item_id,...} <ignored> <class_id> <support> <confidence>
//! ```
//!
//! Level I rules live in `livelloI.txt` and level II rules in
//! `livelloII.txt`. A rule's id is its 0-based line number in its file, which
//! is also its mining rank.

use crate::dictionary::{ClassDictionary, ClassId, ColumnDictionary, ItemDictionary, ItemId, RuleDictionary};
use crate::error::{read_artifact, L3Error, Result};
use crate::transaction::Transaction;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const LEVEL1_FILE: &str = "livelloI.txt";
pub const LEVEL2_FILE: &str = "livelloII.txt";

/// Separator between the items of a readable rule.
pub const ITEM_SEPARATOR: &str = ",";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleLevel {
    Level1,
    Level2,
}

impl RuleLevel {
    pub fn file_name(&self) -> &'static str {
        match self {
            RuleLevel::Level1 => LEVEL1_FILE,
            RuleLevel::Level2 => LEVEL2_FILE,
        }
    }

    pub fn path<P: AsRef<Path>>(&self, dir: P) -> PathBuf {
        dir.as_ref().join(self.file_name())
    }
}

impl FromStr for RuleLevel {
    type Err = L3Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" | "level1" | "I" => Ok(RuleLevel::Level1),
            "2" | "level2" | "II" => Ok(RuleLevel::Level2),
            other => Err(L3Error::Config(format!(
                "Invalid rule level '{}' (valid: 1, 2)",
                other
            ))),
        }
    }
}

impl fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleLevel::Level1 => f.write_str("level1"),
            RuleLevel::Level2 => f.write_str("level2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: usize,
    pub raw: String,
    pub item_ids: BTreeSet<ItemId>,
    pub class_id: ClassId,
    pub support: u64,
    pub confidence: f64,
}

impl Rule {
    /// Parses a raw rule line. `rule_id` is the line's position in its file.
    pub fn parse(raw: &str, rule_id: usize) -> Result<Self> {
        let raw = raw.trim_end_matches(['\n', '\r']);
        let format_err = |message: String| L3Error::RuleFormat {
            line: rule_id + 1,
            message,
        };

        let chunks: Vec<&str> = raw.split_whitespace().collect();
        if chunks.len() != 5 {
            return Err(format_err(format!(
                "expected 5 fields, found {} in '{}'",
                chunks.len(),
                raw
            )));
        }

        let items = chunks[0];
        if items.len() < 2 || !items.starts_with('{') || !items.ends_with('}') {
            return Err(format_err(format!("item list '{}' is not enclosed in braces", items)));
        }

        let inner = &items[1..items.len() - 1];
        let mut item_ids = BTreeSet::new();
        if !inner.is_empty() {
            for token in inner.split(',') {
                let item_id = token
                    .trim()
                    .parse::<ItemId>()
                    .map_err(|_| format_err(format!("invalid item id '{}'", token)))?;
                item_ids.insert(item_id);
            }
        }

        let class_id = chunks[2]
            .parse::<ClassId>()
            .map_err(|_| format_err(format!("invalid class id '{}'", chunks[2])))?;
        let support = chunks[3]
            .parse::<u64>()
            .map_err(|_| format_err(format!("invalid support '{}'", chunks[3])))?;
        let confidence = chunks[4]
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite())
            .ok_or_else(|| format_err(format!("invalid confidence '{}'", chunks[4])))?;
        if !(0.0..=1.0).contains(&confidence) {
            log::warn!(
                "Rule {} has confidence {} outside [0, 1]",
                rule_id,
                confidence
            );
        }

        Ok(Self {
            id: rule_id,
            raw: raw.to_string(),
            item_ids,
            class_id,
            support,
            confidence,
        })
    }

    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }

    /// A rule matches a transaction holding every one of its items.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.item_ids.is_subset(transaction.item_id_set())
    }

    /// Renders the rule as
    /// `id<TAB>col:interval,...<TAB>label<TAB>support<TAB>confidence<TAB>n_items`.
    ///
    /// Items are ordered by column.
    pub fn render(&self, ctx: &RuleContext<'_>) -> Result<String> {
        let mut items = Vec::with_capacity(self.item_ids.len());
        for &item_id in &self.item_ids {
            let (column_id, value) = ctx.items.item(item_id).ok_or(L3Error::UnknownItem(item_id))?;
            items.push((*column_id, item_id, value.as_str()));
        }
        items.sort_by_key(|(column_id, item_id, _)| (*column_id, *item_id));

        let mut readable = Vec::with_capacity(items.len());
        for (column_id, _, value) in items {
            let column_name = ctx.column_name(column_id)?;
            readable.push(format!("{}:{}", column_name, ctx.interval(column_name, value)));
        }

        let label = ctx.label(self.class_id)?;

        Ok(format!(
            "{}\t{}\t{}\t{}\t{:?}\t{}",
            self.id,
            readable.join(ITEM_SEPARATOR),
            label,
            self.support,
            self.confidence,
            self.item_ids.len()
        ))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.item_ids.iter().map(|i| i.to_string()).collect();
        write!(
            f,
            "Rule(id:{};item_ids:{};sup:{};conf:{:?})",
            self.id,
            items.join(","),
            self.support,
            self.confidence
        )
    }
}

/// Everything needed to turn encoded rules back into readable terms.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub items: &'a ItemDictionary,
    pub columns: &'a ColumnDictionary,
    pub classes: &'a ClassDictionary,
    pub intervals: Option<&'a RuleDictionary>,
}

impl<'a> RuleContext<'a> {
    pub fn column_name(&self, column_id: usize) -> Result<&'a str> {
        self.columns.name(column_id).ok_or_else(|| {
            L3Error::Config(format!(
                "No column name for column {} ({} names known)",
                column_id,
                self.columns.names().len()
            ))
        })
    }

    pub fn label(&self, class_id: ClassId) -> Result<&'a str> {
        self.classes
            .label(class_id)
            .ok_or(L3Error::UnknownClass(class_id))
    }

    /// The interval name of `value` in `column`, or the raw value when the
    /// column was not discretized.
    pub fn interval<'v>(&self, column: &str, value: &'v str) -> &'v str
    where
        'a: 'v,
    {
        self.intervals
            .and_then(|d| d.interval(column, value))
            .unwrap_or(value)
    }

    /// Interval names of every item in `rule`.
    pub fn interval_names(&self, rule: &Rule) -> Result<Vec<&'a str>> {
        rule.item_ids
            .iter()
            .map(|&item_id| {
                let (column_id, value) = self.items.item(item_id).ok_or(L3Error::UnknownItem(item_id))?;
                let column = self.column_name(*column_id)?;
                Ok(self.interval(column, value.as_str()))
            })
            .collect()
    }
}

/// Parses rules from text, one per non-blank line, in file order.
pub fn parse_rules(content: &str) -> Result<Vec<Rule>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(rule_id, line)| Rule::parse(line, rule_id))
        .collect()
}

/// Parses a raw rules file. A missing file is an error; an empty one yields
/// no rules.
pub fn parse_raw_rules<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>> {
    let content = read_artifact(path.as_ref())?;
    parse_rules(&content)
}

/// Writes one readable rendering per rule.
pub fn write_readable<P: AsRef<Path>>(path: P, rules: &[Rule], ctx: &RuleContext<'_>) -> Result<()> {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.render(ctx)?);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// The rules of one level, in mining rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub level: RuleLevel,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn load<P: AsRef<Path>>(dir: P, level: RuleLevel) -> Result<Self> {
        let rules = parse_raw_rules(level.path(dir))?;
        Ok(Self { level, rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules matching `transaction`, in rank order.
    pub fn matching<'r>(&'r self, transaction: &'r Transaction) -> impl Iterator<Item = &'r Rule> + 'r {
        self.rules.iter().filter(move |rule| rule.matches(transaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_parts() -> (ItemDictionary, ColumnDictionary, ClassDictionary, RuleDictionary) {
        let items = ItemDictionary::parse("1->1,sunny\n2->2,1\n3->3,false\n").unwrap();
        let columns = ColumnDictionary::new(vec![
            "outlook".to_string(),
            "humidity".to_string(),
            "windy".to_string(),
        ]);
        let classes = ClassDictionary::parse("5\nno\nyes\n").unwrap();
        let mut intervals = RuleDictionary::new();
        intervals.add_attribute("humidity", 70.0, None).unwrap();
        (items, columns, classes, intervals)
    }

    #[test]
    fn test_parse_rule() {
        let rule = Rule::parse("{1,2} 0 5 10 0.75", 0).unwrap();
        assert_eq!(rule.item_ids, BTreeSet::from([1, 2]));
        assert_eq!(rule.class_id, 5);
        assert_eq!(rule.support, 10);
        assert_eq!(rule.confidence, 0.75);
        assert_eq!(rule.id, 0);
    }

    #[test]
    fn test_parse_collapses_duplicates() {
        let rule = Rule::parse("{3,1,3} x 5 4 1", 7).unwrap();
        assert_eq!(rule.len(), 2);
        assert_eq!(rule.id, 7);
    }

    #[test]
    fn test_parse_empty_item_list() {
        let rule = Rule::parse("{} 0 5 10 0.5", 0).unwrap();
        assert!(rule.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Rule::parse("{1,2} 0 5 10", 0).is_err());
        assert!(Rule::parse("{1,2} 0 5 10 0.5 extra", 0).is_err());
        assert!(Rule::parse("1,2 0 5 10 0.5", 0).is_err());
        assert!(Rule::parse("{1,a} 0 5 10 0.5", 0).is_err());
        assert!(Rule::parse("{1} 0 x 10 0.5", 0).is_err());
        assert!(Rule::parse("{1} 0 5 -3 0.5", 0).is_err());
        assert!(Rule::parse("{1} 0 5 10 high", 0).is_err());
        assert!(Rule::parse("{1} 0 5 10 NaN", 0).is_err());
    }

    #[test]
    fn test_parse_accepts_confidence_in_percent() {
        let rule = Rule::parse("{1,2} 0 5 10 75.0", 0).unwrap();
        assert_eq!(rule.confidence, 75.0);
        assert_eq!(rule.support, 10);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_rules("{1} 0 5 10 0.5\nbroken\n").unwrap_err();
        match err {
            L3Error::RuleFormat { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse_rules("").unwrap().is_empty());
    }

    #[test]
    fn test_render_orders_items_by_column() {
        let (items, columns, classes, intervals) = context_parts();
        let ctx = RuleContext {
            items: &items,
            columns: &columns,
            classes: &classes,
            intervals: Some(&intervals),
        };
        let rule = Rule::parse("{3,2,1} 0 6 12 0.8", 4).unwrap();
        let rendered = rule.render(&ctx).unwrap().replace('\t', " | ");
        insta::assert_snapshot!(rendered, @"4 | outlook:sunny,humidity:humidity<70,windy:false | yes | 12 | 0.8 | 3");
    }

    #[test]
    fn test_render_keeps_float_confidence() {
        let (items, columns, classes, _) = context_parts();
        let ctx = RuleContext {
            items: &items,
            columns: &columns,
            classes: &classes,
            intervals: None,
        };
        let rule = Rule::parse("{1} 0 6 3 1", 0).unwrap();
        assert!(rule.render(&ctx).unwrap().ends_with("\t3\t1.0\t1"));
        assert_eq!(rule.to_string(), "Rule(id:0;item_ids:1;sup:3;conf:1.0)");
    }

    #[test]
    fn test_render_unknown_ids() {
        let (items, columns, classes, _) = context_parts();
        let ctx = RuleContext {
            items: &items,
            columns: &columns,
            classes: &classes,
            intervals: None,
        };
        let unknown_item = Rule::parse("{9} 0 5 1 0.5", 0).unwrap();
        assert!(matches!(unknown_item.render(&ctx), Err(L3Error::UnknownItem(9))));

        let unknown_class = Rule::parse("{1} 0 42 1 0.5", 0).unwrap();
        assert!(matches!(unknown_class.render(&ctx), Err(L3Error::UnknownClass(42))));
    }

    #[test]
    fn test_interval_names_fall_back_to_value() {
        let (items, columns, classes, intervals) = context_parts();
        let ctx = RuleContext {
            items: &items,
            columns: &columns,
            classes: &classes,
            intervals: Some(&intervals),
        };
        let rule = Rule::parse("{1,2} 0 5 1 0.5", 0).unwrap();
        assert_eq!(ctx.interval_names(&rule).unwrap(), vec!["sunny", "humidity<70"]);
    }

    #[test]
    fn test_rule_set_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(LEVEL1_FILE),
            "{1} 0 5 10 0.9\n{1,2} 0 6 8 0.7\n",
        )
        .unwrap();
        std::fs::write(temp_dir.path().join(LEVEL2_FILE), "").unwrap();

        let level1 = RuleSet::load(temp_dir.path(), RuleLevel::Level1).unwrap();
        assert_eq!(level1.len(), 2);
        assert_eq!(level1.rules[1].id, 1);

        let level2 = RuleSet::load(temp_dir.path(), RuleLevel::Level2).unwrap();
        assert!(level2.is_empty());
    }

    #[test]
    fn test_write_readable() {
        let (items, columns, classes, _) = context_parts();
        let ctx = RuleContext {
            items: &items,
            columns: &columns,
            classes: &classes,
            intervals: None,
        };
        let rules = parse_rules("{1} 0 5 10 0.9\n{2,3} 0 6 8 0.7\n").unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("readable.txt");
        write_readable(&path, &rules, &ctx).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0\toutlook:sunny\tno\t10\t0.9\t1");
        assert_eq!(lines[1], "1\thumidity:1,windy:false\tyes\t8\t0.7\t2");
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("1".parse::<RuleLevel>().unwrap(), RuleLevel::Level1);
        assert_eq!("level2".parse::<RuleLevel>().unwrap(), RuleLevel::Level2);
        assert!("3".parse::<RuleLevel>().is_err());
    }
}
