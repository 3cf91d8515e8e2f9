#![cfg(unix)]

mod common;

use common::*;
use l3wrap_lib::{FilterSet, L3Classifier, RuleDictionary, RuleLevel, RuleSetPolicy, TrainOptions, TrainedModel};

const FILTERS: &str = r#"
[[filters]]
name = "sunny-and-windy"
items = ["sunny", "true"]
label = "no"
sensitivity = 2

[[filters]]
name = "calm"
items = ["false"]
label = "yes"
sensitivity = 1
"#;

fn train(fixture: &TestFixture) -> TrainedModel {
    let classifier = L3Classifier::new(1.0, 50.0, fake_root())
        .unwrap()
        .with_work_dir(&fixture.work_dir);
    let options = TrainOptions {
        columns: None,
        rule_set: RuleSetPolicy::All,
        save_train_data_file: false,
    };
    classifier.train(&weather_table(), &options).unwrap()
}

#[test]
fn test_filter_level1_in_place() {
    let fixture = TestFixture::new("weather");
    let model = train(&fixture);
    let filters = FilterSet::from_toml(FILTERS).unwrap();

    let report = model.filter(RuleLevel::Level1, &filters, None, None).unwrap();

    assert_eq!(report.kept, 2);
    assert_eq!(report.discarded, 2);
    assert_eq!(
        report.by_filter,
        vec![("sunny-and-windy".to_string(), 1), ("calm".to_string(), 1)]
    );
    assert_eq!(fixture.lines("livelloI.txt"), vec!["{2} 0 1 8 0.8", "{1} 0 0 5 0.6"]);
    // The other level is untouched.
    assert_eq!(fixture.lines("livelloII.txt").len(), LEVEL2_RULES);
}

#[test]
fn test_filter_writes_readable_rules() {
    let fixture = TestFixture::new("weather");
    let model = train(&fixture);
    let filters = FilterSet::from_toml(FILTERS).unwrap();
    let readable = fixture.temp_dir.path().join("rules.tsv");

    model
        .filter(RuleLevel::Level1, &filters, None, Some(&readable))
        .unwrap();

    let content = std::fs::read_to_string(&readable).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec!["1\toutlook:rainy\tyes\t8\t0.8\t1", "3\toutlook:sunny\tno\t5\t0.6\t1"]
    );
}

#[test]
fn test_filter_level2() {
    let fixture = TestFixture::new("weather");
    let model = train(&fixture);
    let filters = FilterSet::from_toml(FILTERS).unwrap();

    let report = model.filter(RuleLevel::Level2, &filters, None, None).unwrap();

    // The empty rule never reaches a positive sensitivity.
    assert_eq!(report.kept, 2);
    assert_eq!(report.discarded, 0);
    assert_eq!(fixture.lines("livelloI.txt").len(), LEVEL1_RULES);
}

#[test]
fn test_write_readable_with_intervals() {
    let fixture = TestFixture::new("weather");
    let model = train(&fixture);
    let readable = fixture.temp_dir.path().join("level2.tsv");

    let intervals = RuleDictionary::new();
    let written = model
        .write_readable(RuleLevel::Level2, &readable, Some(&intervals))
        .unwrap();

    assert_eq!(written, LEVEL2_RULES);
    let content = std::fs::read_to_string(&readable).unwrap();
    assert_eq!(content, "0\twindy:true\tno\t3\t0.5\t1\n1\t\tyes\t2\t0.4\t0\n");
}

#[test]
fn test_reopened_model_reads_dictionaries() {
    let fixture = TestFixture::new("weather");
    train(&fixture);

    let columns = vec!["outlook".to_string(), "windy".to_string(), "play".to_string()];
    let model = TrainedModel::open(&fixture.work_dir, "weather", columns).unwrap();
    let dictionaries = model.dictionaries().unwrap();

    assert_eq!(dictionaries.classes.label(1), Some("yes"));
    assert_eq!(dictionaries.items.item_id(1, "true"), Some(3));
    assert_eq!(dictionaries.columns.name(0), Some("outlook"));
}
