//! PostgreSQL session shared by the extractor and the loader.
//!
//! The pipeline is synchronous, so a session owns a small tokio runtime and
//! blocks on it. Each pipeline worker thread may call into the same session;
//! the pool hands out one connection per call.

use std::future::Future;
use std::time::Duration;

use futures::TryStreamExt;
use polars::prelude::DataFrame;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::credentials::DatabaseCredentials;
use crate::csv::read_csv_bytes;
use crate::error::{IngestError, Result};

const MAX_CONNECTIONS: u32 = 6;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Quotes an identifier for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub struct PgSession {
    runtime: Runtime,
    pool: PgPool,
    label: String,
}

impl PgSession {
    /// Opens a connection pool; fails fast when the server is unreachable.
    pub fn connect(credentials: &DatabaseCredentials) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(IngestError::Runtime)?;
        let pool = runtime.block_on(
            PgPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect_with(credentials.connect_options()),
        )?;
        debug!(database = %credentials, "connected");
        Ok(Self {
            runtime,
            pool,
            label: credentials.to_string(),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `user@host:port/database`, without the password.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs a future on the session runtime from a synchronous caller.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Names of the tables in the `public` schema, sorted.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let tables = self.block_on(
            sqlx::query_scalar::<_, String>(
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = 'public' ORDER BY table_name",
            )
            .fetch_all(&self.pool),
        )?;
        Ok(tables)
    }

    /// Reads a whole table as text through `COPY ... TO STDOUT`.
    pub fn fetch_table(&self, table: &str) -> Result<DataFrame> {
        let statement = format!(
            "COPY (SELECT * FROM {}) TO STDOUT WITH (FORMAT csv, HEADER true)",
            quote_ident(table)
        );
        let bytes = self.block_on(async {
            let mut conn = self.pool.acquire().await?;
            let stream = conn.copy_out_raw(&statement).await?;
            stream
                .try_fold(Vec::new(), |mut buf, chunk| async move {
                    buf.extend_from_slice(&chunk);
                    Ok(buf)
                })
                .await
        })?;
        debug!(table, bytes = bytes.len(), "copied out");
        read_csv_bytes(bytes, &format!("table {table}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("dim_users"), "\"dim_users\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
