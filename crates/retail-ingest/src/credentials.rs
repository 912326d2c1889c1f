//! Database and API credentials read from a YAML bundle.
//!
//! Two layouts are accepted. The flat one names a single database used both
//! as source and target:
//!
//! ```yaml
//! HOST: db.example.com
//! PORT: 5432
//! USER: postgres
//! PASSWORD: secret
//! DATABASE: sales_data
//! ```
//!
//! The split one separates the two and adds API headers:
//!
//! ```yaml
//! source: { host: legacy.example.com, user: reader, password: x, database: legacy }
//! target: { host: localhost, user: postgres, password: y, database: sales_data }
//! api_headers:
//!   x-api-key: abc123
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::error::{IngestError, Result};

const DEFAULT_PORT: u16 = 5432;

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Connection details for one PostgreSQL database.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseCredentials {
    #[serde(alias = "HOST")]
    pub host: String,
    #[serde(alias = "PORT", default = "default_port")]
    pub port: u16,
    #[serde(alias = "USER")]
    pub user: String,
    #[serde(alias = "PASSWORD", default)]
    pub password: String,
    #[serde(alias = "DATABASE")]
    pub database: String,
}

impl DatabaseCredentials {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

/// Everything the extractor and loader may need to authenticate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    #[serde(default)]
    pub source: Option<DatabaseCredentials>,
    #[serde(default)]
    pub target: Option<DatabaseCredentials>,
    /// Sent with every HTTP request.
    #[serde(default)]
    pub api_headers: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Split(Credentials),
    Flat(DatabaseCredentials),
}

impl Credentials {
    /// Parses a YAML bundle in either layout.
    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(match serde_yaml::from_str(text)? {
            CredentialsFile::Split(credentials) => credentials,
            CredentialsFile::Flat(database) => Self {
                source: Some(database.clone()),
                target: Some(database),
                api_headers: BTreeMap::new(),
            },
        })
    }

    /// Reads a YAML bundle from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|e| IngestError::Credentials {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// No file means no databases and no headers.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn source_database(&self) -> Result<&DatabaseCredentials> {
        self.source
            .as_ref()
            .ok_or(IngestError::MissingDatabase { role: "source" })
    }

    pub fn target_database(&self) -> Result<&DatabaseCredentials> {
        self.target
            .as_ref()
            .ok_or(IngestError::MissingDatabase { role: "target" })
    }
}
