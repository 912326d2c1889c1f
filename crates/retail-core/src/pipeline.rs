//! Extract, clean and load orchestration.
//!
//! A [`Pipeline`] borrows everything it needs for one run: the extractor, the
//! loader, the cleaner registry and the rules. Jobs share nothing mutable, so
//! each runs on its own scoped thread unless sequential execution is asked for.
//! A failing job never stops the others.

use std::thread;
use std::time::Instant;

use tracing::{debug, error, info, info_span};

use retail_model::{CleanReport, CleaningRules, Domain, JobConfig};

use crate::boundary::{Extractor, Loader};
use crate::cleaners::CleanerRegistry;
use crate::error::PipelineError;

/// Wall-clock time spent in each stage of one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub extract_ms: u128,
    pub clean_ms: u128,
    pub load_ms: u128,
}

/// Result of one successful job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub domain: Domain,
    pub target_table: String,
    pub report: CleanReport,
    /// `false` on a dry run.
    pub loaded: bool,
    pub timings: StageTimings,
}

/// Outcome of one configured job.
#[derive(Debug)]
pub struct JobOutcome {
    pub job: JobConfig,
    pub result: Result<JobReport, PipelineError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct Pipeline<'a> {
    extractor: &'a dyn Extractor,
    loader: &'a dyn Loader,
    registry: &'a CleanerRegistry,
    rules: &'a CleaningRules,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        extractor: &'a dyn Extractor,
        loader: &'a dyn Loader,
        registry: &'a CleanerRegistry,
        rules: &'a CleaningRules,
    ) -> Self {
        Self {
            extractor,
            loader,
            registry,
            rules,
            dry_run: false,
        }
    }

    /// Extract and clean only; the loader is never called.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs one job through extract, clean and load.
    ///
    /// # Errors
    ///
    /// Returns the failing stage. The loader is not called when extraction
    /// or cleaning failed.
    pub fn run_job(&self, job: &JobConfig) -> Result<JobReport, PipelineError> {
        let domain = job.domain;
        let target = job.target_table();
        let span = info_span!("domain", domain = %domain, target = %target);
        let _guard = span.enter();
        let mut timings = StageTimings::default();

        let cleaner = self
            .registry
            .get(domain)
            .map_err(|source| PipelineError::Clean { domain, source })?;

        let raw = info_span!("extract").in_scope(|| {
            let start = Instant::now();
            let raw = self
                .extractor
                .fetch(&job.source)
                .map_err(|cause| PipelineError::Extract { domain, cause })?;
            timings.extract_ms = start.elapsed().as_millis();
            debug!(
                source = %job.source,
                rows = raw.height(),
                columns = raw.width(),
                duration_ms = timings.extract_ms,
                "extract complete"
            );
            Ok::<_, PipelineError>(raw)
        })?;

        let outcome = info_span!("clean").in_scope(|| {
            let start = Instant::now();
            let outcome = cleaner
                .clean(&raw, self.rules)
                .map_err(|source| PipelineError::Clean { domain, source })?;
            timings.clean_ms = start.elapsed().as_millis();
            debug!(
                rows_in = outcome.report.rows_in,
                rows_out = outcome.report.rows_out,
                rejected = outcome.report.total_rejected(),
                nulled = outcome.report.total_nulled(),
                duration_ms = timings.clean_ms,
                "clean complete"
            );
            Ok::<_, PipelineError>(outcome)
        })?;

        let loaded = if self.dry_run {
            debug!("dry run, load skipped");
            false
        } else {
            info_span!("load").in_scope(|| {
                let start = Instant::now();
                self.loader
                    .load(&outcome.frame, target)
                    .map_err(|cause| PipelineError::Load {
                        domain,
                        table: target.to_string(),
                        cause,
                    })?;
                timings.load_ms = start.elapsed().as_millis();
                debug!(
                    loader = %self.loader.describe(),
                    rows = outcome.frame.height(),
                    duration_ms = timings.load_ms,
                    "load complete"
                );
                Ok::<_, PipelineError>(true)
            })?
        };

        info!(
            rows_in = outcome.report.rows_in,
            rows_out = outcome.report.rows_out,
            loaded,
            "domain complete"
        );
        Ok(JobReport {
            domain,
            target_table: target.to_string(),
            report: outcome.report,
            loaded,
            timings,
        })
    }

    /// Runs every job and returns one outcome per job, in job order.
    pub fn run_all(&self, jobs: &[JobConfig], parallel: bool) -> Vec<JobOutcome> {
        let span = info_span!("run", jobs = jobs.len(), parallel, dry_run = self.dry_run);
        let _guard = span.enter();

        let results: Vec<Result<JobReport, PipelineError>> = if parallel && jobs.len() > 1 {
            thread::scope(|scope| {
                let handles: Vec<_> = jobs
                    .iter()
                    .map(|job| {
                        let parent = span.clone();
                        scope.spawn(move || parent.in_scope(|| self.run_job(job)))
                    })
                    .collect();
                handles
                    .into_iter()
                    .zip(jobs)
                    .map(|(handle, job)| {
                        handle.join().unwrap_or(Err(PipelineError::Worker {
                            domain: job.domain,
                        }))
                    })
                    .collect()
            })
        } else {
            jobs.iter().map(|job| self.run_job(job)).collect()
        };

        jobs.iter()
            .cloned()
            .zip(results)
            .map(|(job, result)| {
                if let Err(err) = &result {
                    error!(domain = %job.domain, stage = err.stage(), "{err}");
                }
                JobOutcome { job, result }
            })
            .collect()
    }
}
