use super::helpers::{load_intervals, open_model};
use comfy_table::{presets::UTF8_FULL, Table as DisplayTable};
use console::style;
use l3wrap_lib::{Result, Rule, RuleLevel, Transaction};
use std::path::PathBuf;

pub struct RulesArgs {
    pub model_dir: PathBuf,
    pub stem: Option<String>,
    pub columns: Vec<String>,
    pub intervals: Option<PathBuf>,
    pub level: String,
    pub limit: Option<usize>,
    pub row: Option<Vec<String>>,
}

pub fn handle_rules_command(args: RulesArgs) -> Result<()> {
    let level: RuleLevel = args.level.parse()?;
    let intervals = load_intervals(args.intervals.as_deref())?;

    let model = open_model(&args.model_dir, args.stem, args.columns)?;
    let dictionaries = model.dictionaries()?;
    let ctx = dictionaries.context(intervals.as_ref());
    let rule_set = model.rules(level)?;

    let transaction = args
        .row
        .as_ref()
        .map(|row| Transaction::new(row, &dictionaries.items));
    let rules: Vec<&Rule> = match &transaction {
        Some(transaction) => {
            if transaction.has_unknown_items() {
                println!(
                    "{} Some values of the row never occurred in training",
                    style("!").yellow()
                );
            }
            rule_set.matching(transaction).collect()
        }
        None => rule_set.rules.iter().collect(),
    };

    if rules.is_empty() {
        println!("{}", style(format!("No {} rules", level)).yellow());
        return Ok(());
    }

    let mut table = DisplayTable::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Items", "Label", "Support", "Confidence", "Length"]);

    let limit = args.limit.unwrap_or(rules.len());
    for rule in rules.iter().take(limit) {
        let rendered = rule.render(&ctx)?;
        table.add_row(rendered.split('\t').collect::<Vec<_>>());
    }

    println!("{}", table);
    if limit < rules.len() {
        println!("  ... {} more", rules.len() - limit);
    }

    Ok(())
}
