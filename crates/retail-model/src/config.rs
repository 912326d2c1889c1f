//! Pipeline configuration file.
//!
//! ```toml
//! parallel = true
//! rules = "rules.toml"
//! credentials = "db_creds.yaml"
//!
//! [load]
//! kind = "csv-directory"
//! path = "out"
//!
//! [[jobs]]
//! domain = "users"
//! source = { kind = "database-table", table = "legacy_users" }
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{ConfigError, Result};
use crate::rules::{CleaningRules, DateRules};
use crate::source::SourceDescriptor;

fn default_parallel() -> bool {
    true
}

/// Where cleaned datasets are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum LoadConfig {
    /// One `<table>.csv` per job inside `path`.
    CsvDirectory { path: PathBuf },
    /// The target database from the credentials file.
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub domain: Domain,
    pub source: SourceDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,
}

impl JobConfig {
    pub fn new(domain: Domain, source: SourceDescriptor) -> Self {
        Self {
            domain,
            source,
            target_table: None,
        }
    }

    /// Target table, falling back to the domain default.
    pub fn target_table(&self) -> &str {
        self.target_table
            .as_deref()
            .unwrap_or_else(|| self.domain.default_target_table())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Run jobs on one worker thread each.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Rules file merged over the built-in rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,
    /// Credentials bundle for database and API access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<PathBuf>,
    /// Overrides `[dates]` of the rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRules>,
    pub load: LoadConfig,
    pub jobs: Vec<JobConfig>,
}

impl PipelineConfig {
    /// Loads the configured rules with the `[dates]` override applied.
    pub fn resolve_rules(&self) -> Result<CleaningRules> {
        let mut rules = CleaningRules::load_or_builtin(self.rules.as_deref())?;
        if let Some(dates) = self.dates {
            rules.dates = dates;
        }
        Ok(rules)
    }

    /// Jobs restricted to `domains`; all jobs when `domains` is empty.
    pub fn selected_jobs(&self, domains: &[Domain]) -> Vec<JobConfig> {
        self.jobs
            .iter()
            .filter(|job| domains.is_empty() || domains.contains(&job.domain))
            .cloned()
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.jobs.is_empty() {
            return Err(ConfigError::InvalidPipeline {
                message: "no [[jobs]] configured".to_string(),
            });
        }
        let mut targets = BTreeSet::new();
        for job in &self.jobs {
            let target = job.target_table();
            if target.trim().is_empty() {
                return Err(ConfigError::InvalidPipeline {
                    message: format!("job for {} has an empty target_table", job.domain),
                });
            }
            if !targets.insert(target.to_string()) {
                return Err(ConfigError::InvalidPipeline {
                    message: format!("target table '{target}' is used by more than one job"),
                });
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(rules) = self.rules.as_mut() {
            resolve(rules);
        }
        if let Some(credentials) = self.credentials.as_mut() {
            resolve(credentials);
        }
        if let LoadConfig::CsvDirectory { path } = &mut self.load {
            resolve(path);
        }
        for job in &mut self.jobs {
            if let SourceDescriptor::LocalFile { path, .. } = &mut job.source {
                resolve(path);
            }
        }
    }
}

/// Reads, validates and path-resolves a pipeline configuration file.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let mut config: PipelineConfig =
        toml::from_str(&contents).map_err(|e| ConfigError::toml(path, e))?;
    config.validate()?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    Ok(config)
}
