//! Wiring between configuration files and the pipeline.
//!
//! The binary parses arguments and prints; everything that builds
//! collaborators or runs cleaners lives here so it can be tested without a
//! process boundary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use retail_core::{CleanOutcome, JobOutcome, Loader, Pipeline, PipelineError, default_registry};
use retail_ingest::{Credentials, PgSession, SourceExtractor, read_local_file};
use retail_model::{
    CleaningRules, DateOrder, DocumentFormat, Domain, JobConfig, LoadConfig, SourceDescriptor,
    load_pipeline_config,
};
use retail_output::{CsvDirectoryLoader, PgLoader, write_csv_file};

/// What `run` was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub config: PathBuf,
    /// Empty means every configured job.
    pub domains: Vec<Domain>,
    pub sequential: bool,
    pub dry_run: bool,
}

/// Outcomes of one `run`, in job order.
#[derive(Debug)]
pub struct RunResult {
    pub outcomes: Vec<JobOutcome>,
    pub dry_run: bool,
    /// Where clean data went, for the summary header.
    pub target: String,
}

impl RunResult {
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|outcome| !outcome.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PipelineError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err())
    }
}

/// Stands in for the database loader on a dry run so no connection is opened.
struct DryRunLoader;

impl Loader for DryRunLoader {
    fn load(&self, _frame: &DataFrame, table: &str) -> anyhow::Result<()> {
        bail!("dry run cannot load {table}")
    }

    fn describe(&self) -> String {
        "dry run".to_string()
    }
}

/// Runs the configured jobs and returns one outcome per job.
///
/// # Errors
///
/// Fails before any job runs when the configuration, rules or credentials
/// cannot be read or a database cannot be reached. Per-domain failures are
/// reported in the outcomes instead.
pub fn run_pipeline(request: &RunRequest) -> Result<RunResult> {
    let config = load_pipeline_config(&request.config)
        .with_context(|| format!("load pipeline config {}", request.config.display()))?;
    let rules = config.resolve_rules().context("load cleaning rules")?;
    let credentials = Credentials::load_or_default(config.credentials.as_deref())
        .context("load credentials")?;

    let jobs = config.selected_jobs(&request.domains);
    if jobs.is_empty() {
        bail!("no configured job matches the selected domains");
    }

    let extractor = build_extractor(&credentials, &jobs)?;
    let loader = build_loader(&config.load, &credentials, request.dry_run)?;
    let target = loader.describe();

    let parallel = config.parallel && !request.sequential;
    let pipeline = Pipeline::new(&extractor, loader.as_ref(), default_registry(), &rules)
        .dry_run(request.dry_run);
    let outcomes = pipeline.run_all(&jobs, parallel);

    Ok(RunResult {
        outcomes,
        dry_run: request.dry_run,
        target,
    })
}

fn build_extractor(credentials: &Credentials, jobs: &[JobConfig]) -> Result<SourceExtractor> {
    let extractor = SourceExtractor::new(credentials).context("build extractor")?;
    let reads_database = jobs
        .iter()
        .any(|job| matches!(job.source, SourceDescriptor::DatabaseTable { .. }));
    if !reads_database {
        return Ok(extractor);
    }
    let database = credentials.source_database()?;
    let session = PgSession::connect(database)
        .with_context(|| format!("connect to source database {database}"))?;
    Ok(extractor.with_database(session))
}

fn build_loader(
    load: &LoadConfig,
    credentials: &Credentials,
    dry_run: bool,
) -> Result<Box<dyn Loader>> {
    match load {
        LoadConfig::CsvDirectory { path } => Ok(Box::new(CsvDirectoryLoader::new(path.clone()))),
        LoadConfig::Postgres if dry_run => Ok(Box::new(DryRunLoader)),
        LoadConfig::Postgres => {
            let database = credentials.target_database()?;
            let loader = PgLoader::connect(database)
                .with_context(|| format!("connect to target database {database}"))?;
            Ok(Box::new(loader))
        }
    }
}

/// What `clean` was asked to do.
#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub domain: Domain,
    pub input: PathBuf,
    pub format: Option<DocumentFormat>,
    /// Defaults to `<input stem>_clean.csv` next to the input.
    pub output: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub date_order: Option<DateOrder>,
}

/// Default output path for an offline clean.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    input.with_file_name(format!("{stem}_clean.csv"))
}

/// Cleans one local file and writes the result as CSV.
///
/// Returns the outcome and the path written.
pub fn clean_file(request: &CleanRequest) -> Result<(CleanOutcome, PathBuf)> {
    let span = info_span!("clean_file", domain = %request.domain);
    let _guard = span.enter();

    let mut rules = CleaningRules::load_or_builtin(request.rules.as_deref())
        .context("load cleaning rules")?;
    if let Some(order) = request.date_order {
        rules.dates.order = order;
    }

    let raw = read_local_file(&request.input, request.format)
        .with_context(|| format!("read {}", request.input.display()))?;
    let outcome = default_registry()
        .get(request.domain)?
        .clean(&raw, &rules)
        .with_context(|| format!("clean {} as {}", request.input.display(), request.domain))?;

    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request.input));
    write_csv_file(&outcome.frame, &output)?;
    info!(
        rows_in = outcome.report.rows_in,
        rows_out = outcome.report.rows_out,
        output = %output.display(),
        "clean complete"
    );
    Ok((outcome, output))
}

/// Lists the tables of the source database named in a credentials file.
pub fn list_tables(credentials: &Path) -> Result<Vec<String>> {
    let credentials = Credentials::load(credentials)?;
    let database = credentials.source_database()?;
    let session = PgSession::connect(database)
        .with_context(|| format!("connect to source database {database}"))?;
    Ok(session.list_tables()?)
}
