pub mod classifier;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod installer;
pub mod rule;
pub mod table;
pub mod transaction;
pub mod util;
pub mod validation;

pub use classifier::{
    parse_classification_results, read_classification_results, L3Classifier, RuleSetPolicy,
    RunDictionaries, TrainOptions, TrainedModel,
};
pub use config::{Config, Settings};
pub use dictionary::{
    ClassDictionary, ClassId, ColumnDictionary, ItemDictionary, ItemId, RuleDictionary, UNKNOWN_ITEM,
};
pub use error::{L3Error, Result};
pub use filter::{apply_filters, filter_rule_file, FilterReport, FilterRule, FilterSet};
pub use installer::{ensure_binaries, missing_binaries, SetupOutcome};
pub use rule::{parse_raw_rules, write_readable, Rule, RuleContext, RuleLevel, RuleSet};
pub use table::{Cell, Table};
pub use transaction::{encode_table, Transaction};
