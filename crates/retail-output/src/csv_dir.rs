//! Loader writing each table to `<dir>/<table>.csv`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::debug;

use retail_core::Loader;

use crate::error::{LoadError, Result, validate_table_name};

/// Writes `frame` to `path` with a header row, creating parent directories.
///
/// The frame goes to a hidden temporary file next to `path` first and is
/// renamed over it, so readers never see a partial file.
pub fn write_csv_file(frame: &DataFrame, path: &Path) -> Result<()> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| LoadError::Io { path, source }
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    let mut file = File::create(&temp).map_err(io_error(&temp))?;
    let mut frame = frame.clone();
    let written = CsvWriter::new(&mut file)
        .include_header(true)
        .with_null_value(String::new())
        .finish(&mut frame);
    drop(file);
    if let Err(source) = written {
        let _ = fs::remove_file(&temp);
        return Err(LoadError::Csv {
            table: file_name,
            source,
        });
    }
    fs::rename(&temp, path).map_err(io_error(path))?;
    debug!(path = %path.display(), rows = frame.height(), "csv written");
    Ok(())
}

/// Writes tables as CSV files in one directory, replacing earlier loads.
#[derive(Debug, Clone)]
pub struct CsvDirectoryLoader {
    dir: PathBuf,
}

impl CsvDirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    /// Writes `frame` as `<dir>/<table>.csv`, returning the final path.
    pub fn write_table(&self, frame: &DataFrame, table: &str) -> Result<PathBuf> {
        validate_table_name(table)?;
        let path = self.table_path(table);
        write_csv_file(frame, &path)?;
        Ok(path)
    }
}

impl Loader for CsvDirectoryLoader {
    fn load(&self, frame: &DataFrame, table: &str) -> anyhow::Result<()> {
        self.write_table(frame, table)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("csv directory {}", self.dir.display())
    }
}
