//! Extraction from local files through the pipeline's extractor.

use std::fs;

use retail_common::{optional_string_column, string_column};
use retail_core::{Extractor, default_registry};
use retail_ingest::{Credentials, SourceExtractor};
use retail_model::{CleaningRules, Domain, DocumentFormat, SourceDescriptor};
use tempfile::TempDir;

fn extractor() -> SourceExtractor {
    SourceExtractor::new(&Credentials::default()).unwrap()
}

#[test]
fn local_csv_is_cleaned_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stores.csv");
    fs::write(
        &path,
        "index,longitude,latitude,store_type,staff_numbers,opening_date,continent\n\
         0,-0.12,51.52,Local,J78,2002-01-01,Europe\n\
         1,13.35,52.46,Drive-Thru,12,1996/10/25,Europe\n\
         2,N/A,N/A,Super Store,30,October 2012 08,eeAmerica\n",
    )
    .unwrap();

    let raw = extractor()
        .fetch(&SourceDescriptor::LocalFile {
            path,
            format: None,
        })
        .unwrap();
    assert_eq!(raw.height(), 3);

    let rules = CleaningRules::builtin().unwrap();
    let outcome = default_registry()
        .get(Domain::Stores)
        .unwrap()
        .clean(&raw, &rules)
        .unwrap();
    assert_eq!(outcome.frame.height(), 2);
    assert_eq!(
        string_column(&outcome.frame, "staff_numbers").unwrap(),
        vec!["78", "30"]
    );
    assert_eq!(
        string_column(&outcome.frame, "continent").unwrap(),
        vec!["Europe", "America"]
    );
}

#[test]
fn json_file_needs_explicit_format_without_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("date_details");
    fs::write(
        &path,
        r#"{"month": {"0": "9", "1": "NULL"}, "time_period": {"0": "Evening", "1": null}}"#,
    )
    .unwrap();

    let err = extractor()
        .fetch(&SourceDescriptor::LocalFile {
            path: path.clone(),
            format: None,
        })
        .unwrap_err();
    assert!(format!("{err:#}").contains("set `format`"));

    let raw = extractor()
        .fetch(&SourceDescriptor::LocalFile {
            path,
            format: Some(DocumentFormat::Json),
        })
        .unwrap();
    assert_eq!(
        optional_string_column(&raw, "time_period").unwrap(),
        vec![Some("Evening".to_string()), None]
    );
}

#[test]
fn database_source_without_session_fails() {
    let err = extractor()
        .fetch(&SourceDescriptor::DatabaseTable {
            table: "legacy_users".to_string(),
        })
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("table legacy_users"));
    assert!(message.contains("no source database configured"));
}
