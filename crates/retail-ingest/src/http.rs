//! HTTP sources: remote documents, object storage and paged REST endpoints.

use std::collections::BTreeMap;
use std::time::Duration;

use polars::prelude::DataFrame;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, info};

use retail_model::DocumentFormat;

use crate::csv::read_csv_bytes;
use crate::document::{RecordTable, read_json_bytes};
use crate::error::{IngestError, Result};

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Placeholder in a REST item URL replaced by the item number.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Blocking HTTP client carrying the configured API headers.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a client that sends `api_headers` with every request.
    pub fn new(api_headers: &BTreeMap<String, String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("retail-etl/", env!("CARGO_PKG_VERSION"))),
        );
        for (name, value) in api_headers {
            let invalid = || IngestError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let mut header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            header_value.set_sensitive(true);
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(IngestError::HttpClient)?;
        Ok(Self { client })
    }

    /// GETs a URL and returns the body; non-success statuses are errors.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let http_error = |source| IngestError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(http_error)?;
        let body = response.bytes().map_err(http_error)?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }

    pub fn get_json(&self, url: &str) -> Result<Value> {
        let body = self.get_bytes(url)?;
        serde_json::from_slice(&body).map_err(|source| IngestError::JsonParse {
            origin: url.to_string(),
            source,
        })
    }

    /// Downloads a CSV or JSON document.
    pub fn fetch_document(&self, url: &str, format: Option<DocumentFormat>) -> Result<DataFrame> {
        let format = resolve_format(url, format)?;
        let body = self.get_bytes(url)?;
        parse_document(body, format, url)
    }

    /// Downloads an object-storage document through its public HTTPS endpoint.
    pub fn fetch_object(&self, uri: &str, format: Option<DocumentFormat>) -> Result<DataFrame> {
        let url = object_url(uri)?;
        let format = resolve_format(uri, format)?;
        let body = self.get_bytes(&url)?;
        parse_document(body, format, uri)
    }

    /// Reads the item count, then requests every item and stacks the records.
    pub fn fetch_api(
        &self,
        count_url: &str,
        item_url: &str,
        count_field: Option<&str>,
    ) -> Result<DataFrame> {
        let count_body = self.get_json(count_url)?;
        let count = item_count(&count_body, count_field).ok_or_else(|| {
            IngestError::MissingCount {
                url: count_url.to_string(),
            }
        })?;
        info!(count, url = item_url, "fetching items");

        let mut table = RecordTable::new();
        for index in 0..count {
            let url = item_url.replace(INDEX_PLACEHOLDER, &index.to_string());
            match self.get_json(&url)? {
                Value::Object(record) => table.push(&record),
                _ => {
                    return Err(IngestError::JsonLayout {
                        origin: url,
                        message: "item must be an object".to_string(),
                    });
                }
            }
        }
        table.into_frame()
    }
}

fn resolve_format(location: &str, format: Option<DocumentFormat>) -> Result<DocumentFormat> {
    format
        .or_else(|| DocumentFormat::from_extension(location))
        .ok_or_else(|| IngestError::UnknownFormat {
            location: location.to_string(),
        })
}

/// Parses a downloaded or local document body.
pub fn parse_document(body: Vec<u8>, format: DocumentFormat, origin: &str) -> Result<DataFrame> {
    match format {
        DocumentFormat::Csv => read_csv_bytes(body, origin),
        DocumentFormat::Json => read_json_bytes(&body, origin),
    }
}

/// Maps `s3://bucket/key` to its virtual-hosted HTTPS URL.
///
/// `http(s)://` URIs pass through unchanged.
pub fn object_url(uri: &str) -> Result<String> {
    if uri.starts_with("https://") || uri.starts_with("http://") {
        return Ok(uri.to_string());
    }
    let invalid = || IngestError::InvalidObjectUri {
        uri: uri.to_string(),
    };
    let rest = uri.strip_prefix("s3://").ok_or_else(invalid)?;
    let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;
    if bucket.is_empty() || key.is_empty() {
        return Err(invalid());
    }
    Ok(format!("https://{bucket}.s3.amazonaws.com/{key}"))
}

/// Reads an item count from a count endpoint response.
///
/// With `field`, that field is used; otherwise a bare number or the first
/// numeric field of the object.
pub fn item_count(body: &Value, field: Option<&str>) -> Option<u64> {
    let as_count = |value: &Value| match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    match (body, field) {
        (Value::Object(object), Some(field)) => object.get(field).and_then(as_count),
        (Value::Object(object), None) => object.values().find_map(|value| match value {
            Value::Number(number) => number.as_u64(),
            _ => None,
        }),
        (Value::Number(number), None) => number.as_u64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn s3_uri_maps_to_https() {
        assert_eq!(
            object_url("s3://data-handling-public/products.csv").unwrap(),
            "https://data-handling-public.s3.amazonaws.com/products.csv"
        );
        assert_eq!(
            object_url("https://host/date_details.json").unwrap(),
            "https://host/date_details.json"
        );
        assert!(object_url("s3://bucket-only").is_err());
        assert!(object_url("ftp://host/x.csv").is_err());
    }

    #[test]
    fn count_from_named_or_first_numeric_field() {
        let body = json!({"number_stores": 451, "statusCode": 200});
        assert_eq!(item_count(&body, Some("number_stores")), Some(451));
        assert_eq!(item_count(&body, None), Some(451));
        assert_eq!(item_count(&json!({"n": "12"}), Some("n")), Some(12));
        assert_eq!(item_count(&json!(7), None), Some(7));
        assert_eq!(item_count(&json!({"message": "denied"}), None), None);
    }

    #[test]
    fn invalid_header_is_rejected() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let err = HttpFetcher::new(&headers).err().unwrap();
        assert!(matches!(err, IngestError::InvalidHeader { .. }));
    }

    #[test]
    fn format_falls_back_to_extension() {
        assert_eq!(
            resolve_format("s3://b/k.json", None).unwrap(),
            DocumentFormat::Json
        );
        assert_eq!(
            resolve_format("s3://b/k", Some(DocumentFormat::Csv)).unwrap(),
            DocumentFormat::Csv
        );
        assert!(resolve_format("s3://b/k", None).is_err());
    }
}
