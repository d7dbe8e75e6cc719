//! Fact records and the providers that fetch them.
//!
//! The HTTP provider performs a GET against a chucknorris.io-compatible
//! endpoint and maps the JSON answer into a [`FactRecord`]. Caching lives in
//! [`crate::cache`]; this module only knows how to fetch once.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Default content endpoint
pub const DEFAULT_FACT_API: &str = "https://api.chucknorris.io/jokes/random";

/// Identifier of a fact; providers use either strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactId {
    Number(i64),
    Text(String),
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactId::Number(n) => write!(f, "{}", n),
            FactId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactStatus {
    Ok,
}

/// One fetched fact. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRecord {
    pub fact: String,
    pub fact_id: FactId,
    /// ISO-8601 fetch time
    pub timestamp: String,
    pub icon_url: Option<String>,
    pub status: FactStatus,
}

impl FactRecord {
    /// A record stamped with the current UTC time.
    pub fn new(fact: impl Into<String>, fact_id: FactId, icon_url: Option<String>) -> Self {
        Self {
            fact: fact.into(),
            fact_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            icon_url,
            status: FactStatus::Ok,
        }
    }
}

/// Body returned by the chucknorris.io API. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct JokeResponse {
    pub id: FactId,
    pub value: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl From<JokeResponse> for FactRecord {
    fn from(joke: JokeResponse) -> Self {
        FactRecord::new(joke.value, joke.id, joke.icon_url)
    }
}

/// Source of fact records. Implementations perform one fetch per call.
pub trait ContentProvider: Send + Sync {
    fn fetch(&self) -> Result<FactRecord>;
}

impl<F> ContentProvider for F
where
    F: Fn() -> Result<FactRecord> + Send + Sync,
{
    fn fetch(&self) -> Result<FactRecord> {
        self()
    }
}

#[cfg(feature = "net")]
pub use http::ChuckNorrisClient;

#[cfg(feature = "net")]
mod http {
    use std::time::Duration;

    use reqwest::blocking::Client;

    use super::{ContentProvider, FactRecord, JokeResponse};
    use crate::{Error, Result};

    /// Blocking HTTP provider for chucknorris.io-style endpoints.
    pub struct ChuckNorrisClient {
        client: Client,
        url: String,
    }

    impl ChuckNorrisClient {
        pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .user_agent(concat!("factpaper/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| {
                    Error::NetworkError(format!("Failed to build HTTP client: {}", e))
                })?;
            Ok(Self {
                client,
                url: url.into(),
            })
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    impl ContentProvider for ChuckNorrisClient {
        fn fetch(&self) -> Result<FactRecord> {
            let res = self
                .client
                .get(&self.url)
                .send()
                .map_err(|e| Error::NetworkError(format!("HTTP GET failed: {}", e)))?
                .error_for_status()?;

            let body = res
                .text()
                .map_err(|e| Error::NetworkError(format!("Failed to read response body: {}", e)))?;
            let joke: JokeResponse = serde_json::from_str(&body)?;
            log::debug!("Fetched fact {}", joke.id);
            Ok(joke.into())
        }
    }
}
