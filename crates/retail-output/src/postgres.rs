//! Loader replacing PostgreSQL tables.

use polars::prelude::{CsvWriter, DataFrame, DataType, SerWriter};
use tracing::debug;

use retail_core::Loader;
use retail_ingest::{DatabaseCredentials, PgSession, quote_ident};

use crate::error::{LoadError, Result, validate_table_name};

/// Rows serialized per `COPY` chunk.
const COPY_CHUNK_ROWS: usize = 10_000;

/// Column type used when creating a table for a frame column.
pub fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => "BIGINT",
        // Card numbers run to 19 digits.
        DataType::UInt64 => "NUMERIC(20, 0)",
        DataType::Float32 | DataType::Float64 => "DOUBLE PRECISION",
        DataType::Boolean => "BOOLEAN",
        DataType::Date => "DATE",
        _ => "TEXT",
    }
}

/// `CREATE TABLE` statement matching the frame's schema.
pub fn create_table_statement(frame: &DataFrame, table: &str) -> String {
    let columns: Vec<String> = frame
        .get_columns()
        .iter()
        .map(|column| format!("{} {}", quote_ident(column.name()), sql_type(column.dtype())))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table), columns.join(", "))
}

/// Replaces target tables in one transaction per load.
///
/// `DROP TABLE IF EXISTS`, `CREATE TABLE` and `COPY FROM STDIN` commit
/// together, so readers see either the old table or the complete new one.
pub struct PgLoader {
    session: PgSession,
}

impl PgLoader {
    pub fn connect(credentials: &DatabaseCredentials) -> Result<Self> {
        Ok(Self {
            session: PgSession::connect(credentials)?,
        })
    }

    pub fn replace_table(&self, frame: &DataFrame, table: &str) -> Result<u64> {
        validate_table_name(table)?;
        let ident = quote_ident(table);
        let create = create_table_statement(frame, table);
        let chunks = csv_chunks(frame, table)?;

        let rows = self.session.block_on(async {
            let mut tx = self.session.pool().begin().await?;
            sqlx::query(&format!("DROP TABLE IF EXISTS {ident}"))
                .execute(&mut *tx)
                .await?;
            sqlx::query(&create).execute(&mut *tx).await?;

            let mut copy = tx
                .copy_in_raw(&format!(
                    "COPY {ident} FROM STDIN WITH (FORMAT csv, NULL '')"
                ))
                .await?;
            for chunk in chunks {
                copy.send(chunk).await?;
            }
            let rows = copy.finish().await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(rows)
        })?;
        debug!(table, rows, "table replaced");
        Ok(rows)
    }
}

fn csv_chunks(frame: &DataFrame, table: &str) -> Result<Vec<Vec<u8>>> {
    let height = frame.height();
    (0..height)
        .step_by(COPY_CHUNK_ROWS)
        .map(|offset| {
            let len = COPY_CHUNK_ROWS.min(height - offset);
            let mut chunk = frame.slice(offset as i64, len);
            let mut buf = Vec::new();
            CsvWriter::new(&mut buf)
                .include_header(false)
                .with_null_value(String::new())
                .finish(&mut chunk)
                .map_err(|source| LoadError::Csv {
                    table: table.to_string(),
                    source,
                })?;
            Ok(buf)
        })
        .collect()
}

impl Loader for PgLoader {
    fn load(&self, frame: &DataFrame, table: &str) -> anyhow::Result<()> {
        self.replace_table(frame, table)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("postgres {}", self.session.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    #[test]
    fn create_statement_maps_types() {
        let frame = DataFrame::new(vec![
            Series::new("card_number".into(), [4_971_858_637_664_481_u64]).into_column(),
            Series::new("product_quantity".into(), [3_i64]).into_column(),
            Series::new("weight_kg".into(), [0.077]).into_column(),
            Series::new("product_code".into(), ["R7-3126933H"]).into_column(),
        ])
        .unwrap();
        assert_eq!(
            create_table_statement(&frame, "orders_table"),
            "CREATE TABLE \"orders_table\" (\"card_number\" NUMERIC(20, 0), \
             \"product_quantity\" BIGINT, \"weight_kg\" DOUBLE PRECISION, \"product_code\" TEXT)"
        );
    }

    #[test]
    fn chunks_cover_every_row() {
        let values: Vec<i64> = (0..25_001).collect();
        let frame = DataFrame::new(vec![Series::new("n".into(), values).into_column()]).unwrap();
        let chunks = csv_chunks(&frame, "t").unwrap();
        assert_eq!(chunks.len(), 3);
        let lines: usize = chunks
            .iter()
            .map(|chunk| chunk.iter().filter(|&&b| b == b'\n').count())
            .sum();
        assert_eq!(lines, 25_001);
    }
}
