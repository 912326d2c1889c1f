use std::fs;

use retail_model::{
    CleaningRules, ConfigError, DateOrder, Domain, LoadConfig, SourceDescriptor,
    UnknownUnitPolicy, load_pipeline_config,
};

#[test]
fn override_file_replaces_only_named_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    fs::write(
        &path,
        r#"
[dates]
order = "day-first"

[stores]
excluded_indices = [447]

[products]
unknown_unit = "keep"

[products.unit_factors]
oz = 0.0283495
"#,
    )
    .unwrap();

    let rules = CleaningRules::load(&path).unwrap();
    assert_eq!(rules.dates.order, DateOrder::DayFirst);
    assert_eq!(rules.stores.excluded_indices, vec![447]);
    assert_eq!(rules.products.unknown_unit, UnknownUnitPolicy::Keep);
    // Sibling entries survive the merge.
    assert_eq!(rules.products.unit_factors.get("g"), Some(&0.001));
    assert_eq!(rules.products.unit_factors.get("oz"), Some(&0.0283495));
    assert_eq!(rules.stores.allowed_store_types.len(), 5);
}

#[test]
fn unknown_rule_keys_are_rejected() {
    let err = CleaningRules::from_override_str("[users]\nallowed_country = [\"France\"]\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn pipeline_config_resolves_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    fs::write(
        &path,
        r#"
parallel = false
rules = "rules.toml"

[dates]
order = "day-first"

[load]
kind = "csv-directory"
path = "out"

[[jobs]]
domain = "users"
source = { kind = "local-file", path = "raw/users.csv" }

[[jobs]]
domain = "date-events"
target_table = "dim_date_times"
source = { kind = "remote-document", url = "https://example.com/date_details.json", format = "json" }
"#,
    )
    .unwrap();

    let config = load_pipeline_config(&path).unwrap();
    assert!(!config.parallel);
    assert_eq!(config.rules.as_deref(), Some(dir.path().join("rules.toml").as_path()));
    assert_eq!(
        config.load,
        LoadConfig::CsvDirectory {
            path: dir.path().join("out")
        }
    );
    match &config.jobs[0].source {
        SourceDescriptor::LocalFile { path, .. } => {
            assert_eq!(path, &dir.path().join("raw/users.csv"));
        }
        other => panic!("unexpected source {other}"),
    }
    assert_eq!(config.jobs[0].target_table(), "dim_users");
    assert_eq!(config.jobs[1].domain, Domain::DateEvents);
    assert_eq!(config.selected_jobs(&[Domain::Users]).len(), 1);
}

#[test]
fn dates_override_applies_to_builtin_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    fs::write(
        &path,
        r#"
[dates]
order = "day-first"

[load]
kind = "postgres"

[[jobs]]
domain = "cards"
source = { kind = "remote-document", url = "https://example.com/card_details.pdf.csv" }
"#,
    )
    .unwrap();

    let config = load_pipeline_config(&path).unwrap();
    assert!(config.parallel);
    let rules = config.resolve_rules().unwrap();
    assert_eq!(rules.dates.order, DateOrder::DayFirst);
}

#[test]
fn duplicate_target_tables_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    fs::write(
        &path,
        r#"
[load]
kind = "postgres"

[[jobs]]
domain = "users"
source = { kind = "database-table", table = "legacy_users" }

[[jobs]]
domain = "orders"
target_table = "dim_users"
source = { kind = "database-table", table = "orders_table" }
"#,
    )
    .unwrap();

    let err = load_pipeline_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPipeline { .. }));
}
