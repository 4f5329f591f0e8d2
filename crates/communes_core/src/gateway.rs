//! Fetch gateway: one HTTP GET per department, no retries.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{CommuneRecord, DepartmentRef},
    error::FetchError,
    protocol::decode_communes,
};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://geo.api.gouv.fr";

#[async_trait]
pub trait CommunesGateway: Send + Sync {
    async fn fetch_communes(
        &self,
        department: &DepartmentRef,
    ) -> Result<Vec<CommuneRecord>, FetchError>;
}

pub struct HttpCommunesGateway {
    http: Client,
    base_url: Url,
}

impl HttpCommunesGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid communes api base url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!(
                "communes api base url '{base_url}' cannot carry a path"
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build communes http client")?;
        Ok(Self { http, base_url })
    }

    pub fn communes_url(&self, department_code: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Transport(format!("unusable base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(["departements", department_code.trim(), "communes"]);
        Ok(url)
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[async_trait]
impl CommunesGateway for HttpCommunesGateway {
    async fn fetch_communes(
        &self,
        department: &DepartmentRef,
    ) -> Result<Vec<CommuneRecord>, FetchError> {
        let url = self.communes_url(&department.code)?;
        tracing::debug!(department = %department.code, %url, "fetching communes");

        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        decode_communes(&body)
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
