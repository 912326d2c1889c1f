//! Orchestrator behavior with in-memory collaborators.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{anyhow, bail};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use retail_core::{Extractor, Loader, Pipeline, PipelineError, default_registry};
use retail_model::{CleaningRules, Domain, JobConfig, SourceDescriptor};

fn test_df(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
    let cols: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.into(), values).into_column())
        .collect();
    DataFrame::new(cols).unwrap()
}

/// Serves frames keyed by database table name.
struct MapExtractor {
    tables: BTreeMap<String, DataFrame>,
}

impl Extractor for MapExtractor {
    fn fetch(&self, source: &SourceDescriptor) -> anyhow::Result<DataFrame> {
        match source {
            SourceDescriptor::DatabaseTable { table } => self
                .tables
                .get(table)
                .cloned()
                .ok_or_else(|| anyhow!("relation \"{table}\" does not exist")),
            other => bail!("unsupported source {other}"),
        }
    }
}

#[derive(Default)]
struct RecordingLoader {
    loaded: Mutex<BTreeMap<String, usize>>,
    fail_table: Option<String>,
}

impl Loader for RecordingLoader {
    fn load(&self, frame: &DataFrame, table: &str) -> anyhow::Result<()> {
        if self.fail_table.as_deref() == Some(table) {
            bail!("permission denied for table {table}");
        }
        self.loaded
            .lock()
            .unwrap()
            .insert(table.to_string(), frame.height());
        Ok(())
    }
}

fn extractor() -> MapExtractor {
    let mut tables = BTreeMap::new();
    tables.insert(
        "legacy_users".to_string(),
        test_df(vec![
            ("country", vec!["Germany", "NULL", "United States"]),
            ("country_code", vec!["DE", "NULL", "US"]),
            ("date_of_birth", vec!["1968 October 16", "NULL", "1980-03-04"]),
            ("join_date", vec!["2018-10-10", "NULL", "1999 March 01"]),
        ]),
    );
    tables.insert(
        "legacy_store_details".to_string(),
        test_df(vec![
            ("longitude", vec!["-0.12", "13.35"]),
            ("latitude", vec!["51.52", "52.46"]),
            ("store_type", vec!["Local", "Drive-Thru"]),
            ("staff_numbers", vec!["30e", "12"]),
            ("opening_date", vec!["2002-01-01", "October 2012 08"]),
            ("continent", vec!["eeEurope", "Europe"]),
        ]),
    );
    tables.insert(
        "broken_orders".to_string(),
        test_df(vec![("date_uuid", vec!["a"])]),
    );
    MapExtractor { tables }
}

fn job(domain: Domain, table: &str) -> JobConfig {
    JobConfig::new(
        domain,
        SourceDescriptor::DatabaseTable {
            table: table.to_string(),
        },
    )
}

#[test]
fn runs_each_job_and_loads_into_default_tables() {
    let rules = CleaningRules::builtin().unwrap();
    let extractor = extractor();
    let loader = RecordingLoader::default();
    let pipeline = Pipeline::new(&extractor, &loader, default_registry(), &rules);

    let jobs = vec![
        job(Domain::Users, "legacy_users"),
        job(Domain::Stores, "legacy_store_details"),
    ];
    let outcomes = pipeline.run_all(&jobs, true);

    assert!(outcomes.iter().all(|outcome| outcome.is_success()));
    let loaded = loader.loaded.lock().unwrap().clone();
    assert_eq!(loaded.get("dim_users"), Some(&2));
    assert_eq!(loaded.get("dim_store_details"), Some(&1));

    let users = outcomes[0].result.as_ref().unwrap();
    assert_eq!(users.report.rows_in, 3);
    assert_eq!(users.report.rows_out, 2);
    assert!(users.loaded);
}

#[test]
fn one_failing_domain_does_not_stop_the_others() {
    let rules = CleaningRules::builtin().unwrap();
    let extractor = extractor();
    let loader = RecordingLoader::default();
    let pipeline = Pipeline::new(&extractor, &loader, default_registry(), &rules);

    let jobs = vec![
        job(Domain::Cards, "missing_table"),
        job(Domain::Orders, "broken_orders"),
        job(Domain::Users, "legacy_users"),
    ];
    for parallel in [false, true] {
        let outcomes = pipeline.run_all(&jobs, parallel);
        assert!(matches!(
            outcomes[0].result,
            Err(PipelineError::Extract {
                domain: Domain::Cards,
                ..
            })
        ));
        assert!(matches!(
            outcomes[1].result,
            Err(PipelineError::Clean {
                domain: Domain::Orders,
                ..
            })
        ));
        assert!(outcomes[2].is_success());
    }
    // Failed cleaning never reaches the loader.
    let loaded = loader.loaded.lock().unwrap().clone();
    assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["dim_users"]);
}

#[test]
fn load_failure_is_reported_with_its_table() {
    let rules = CleaningRules::builtin().unwrap();
    let extractor = extractor();
    let loader = RecordingLoader {
        fail_table: Some("dim_users".to_string()),
        ..RecordingLoader::default()
    };
    let pipeline = Pipeline::new(&extractor, &loader, default_registry(), &rules);

    let err = pipeline
        .run_job(&job(Domain::Users, "legacy_users"))
        .unwrap_err();
    assert_eq!(err.stage(), "load");
    assert!(err.to_string().contains("dim_users"));
    assert!(err.to_string().contains("permission denied"));
}

#[test]
fn dry_run_never_loads() {
    let rules = CleaningRules::builtin().unwrap();
    let extractor = extractor();
    let loader = RecordingLoader::default();
    let pipeline =
        Pipeline::new(&extractor, &loader, default_registry(), &rules).dry_run(true);

    let report = pipeline
        .run_job(&job(Domain::Stores, "legacy_store_details"))
        .unwrap();
    assert!(!report.loaded);
    assert_eq!(report.report.rows_out, 1);
    assert!(loader.loaded.lock().unwrap().is_empty());
}
