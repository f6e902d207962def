use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderValue};
use serde_json::Value;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
const APPLICATION_LD_JSON: HeaderValue = HeaderValue::from_static(
    "application/ld+json; profile=\"https://www.w3.org/ns/activitystreams\"",
);

/// Remote side of `dereference`: resolve an IRI to a JSON document.
///
/// `Ok(None)` means the server answered but produced no usable document.
/// Transport errors surface as `Err` and are swallowed to "absent" by the
/// store; callers of `dereference` never see them.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, iri: &str) -> Result<Option<Value>>;
}

/// Blocking HTTP fetcher speaking `application/ld+json`.
pub struct Mailman {
    client: Client,
}

impl Mailman {
    pub fn new() -> Mailman {
        Mailman {
            client: Client::builder()
                .http1_only()
                .user_agent(APP_USER_AGENT)
                .gzip(true)
                .timeout(Duration::from_secs(10))
                .build()
                .expect("blocking client options should be valid"),
        }
    }
}

impl Default for Mailman {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFetcher for Mailman {
    fn fetch(&self, iri: &str) -> Result<Option<Value>> {
        let response = self
            .client
            .get(iri)
            .header(header::ACCEPT, APPLICATION_LD_JSON)
            .send()?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: Value = response.json()?;
        if body.is_null() {
            return Ok(None);
        }
        Ok(Some(body))
    }
}
