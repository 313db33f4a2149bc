// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP client for Rancher's Steve (`/v1`) and Norman (`/v3`) collection APIs.

use super::retry::retry_request;
use super::urls::{resolve_next, with_limit};
use crate::constants::{rancher_request_timeout, USER_AGENT};
use crate::errors::{ConfigError, RancherError};
use crate::normalize::{normalize_host, normalize_machine};
use crate::types::{Host, Machine};
use crate::value::Field;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// One page of a Rancher collection response.
#[derive(Debug, Default, Deserialize)]
pub struct ListPage {
    /// Records of this page
    #[serde(default)]
    pub data: Option<Vec<Field>>,
    /// Link map (`links.next` on older APIs)
    #[serde(default)]
    pub links: Field,
    /// Pagination block (`pagination.next`)
    #[serde(default)]
    pub pagination: Field,
}

impl ListPage {
    /// Continuation link of this page, if any.
    #[must_use]
    pub fn next_link(&self) -> Option<String> {
        self.pagination
            .text("next")
            .or_else(|| self.links.text("next"))
    }
}

/// Client bound to one Rancher collection URL.
///
/// Every request carries `Accept: application/json`, the bearer token (when set) and a
/// fixed user agent, and is bounded by a 20 second timeout.
#[derive(Debug, Clone)]
pub struct RancherClient {
    base_url: Url,
    token: String,
    http: HttpClient,
}

impl RancherClient {
    /// Create a client for `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the URL is empty or invalid, or the TLS backend
    /// cannot be initialised.
    pub fn new(url: &str, token: &str, insecure_skip_tls_verify: bool) -> Result<Self, ConfigError> {
        if url.is_empty() {
            return Err(ConfigError::MissingCredential {
                what: "rancher URL",
                flag: "--rancher-url",
                env: "RANCHER_URL",
            });
        }
        let base_url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            what: "rancher",
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if insecure_skip_tls_verify {
            warn!(url = %base_url, "TLS certificate verification disabled for Rancher");
        }

        let http = HttpClient::builder()
            .timeout(rancher_request_timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .danger_accept_invalid_certs(insecure_skip_tls_verify)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            base_url,
            token: token.to_string(),
            http,
        })
    }

    /// Same token and TLS settings, different collection URL.
    #[must_use]
    pub fn with_base_url(&self, base_url: Url) -> Self {
        Self {
            base_url,
            token: self.token.clone(),
            http: self.http.clone(),
        }
    }

    /// Collection URL this client is bound to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch every record of the collection, following continuation links.
    ///
    /// Each page is fetched with the retry policy of [`retry_request`].
    ///
    /// # Errors
    ///
    /// Returns the first page error that survives retries.
    pub async fn list_all(&self, operation: &str) -> Result<Vec<Field>, RancherError> {
        let mut next = Some(with_limit(&self.base_url));
        let mut records = Vec::new();
        let mut page_count = 0;

        while let Some(url) = next.take() {
            page_count += 1;
            let page = retry_request(|| self.get_page(&url), operation, url.as_str()).await?;

            let items = page.data.as_ref().map_or(0, Vec::len);
            let link = page.next_link();
            records.extend(page.data.unwrap_or_default());

            debug!(
                operation = operation,
                page = page_count,
                items_in_page = items,
                total_items = records.len(),
                "Fetched page from Rancher API"
            );

            next = link
                .and_then(|link| resolve_next(&self.base_url, &link))
                .filter(|candidate| {
                    let repeats = *candidate == url;
                    if repeats {
                        warn!(url = %url, "Rancher returned the current page as next page, stopping");
                    }
                    !repeats
                });
        }

        debug!(
            operation = operation,
            total_pages = page_count,
            total_items = records.len(),
            "Completed paginated Rancher list"
        );

        Ok(records)
    }

    /// List and normalize all Elemental inventory records.
    ///
    /// # Errors
    ///
    /// See [`RancherClient::list_all`].
    pub async fn list_hosts(&self) -> Result<Vec<Host>, RancherError> {
        let records = self.list_all("list inventory").await?;
        Ok(records.iter().map(normalize_host).collect())
    }

    /// List and normalize all Cluster API machines.
    ///
    /// # Errors
    ///
    /// See [`RancherClient::list_all`].
    pub async fn list_machines(&self) -> Result<Vec<Machine>, RancherError> {
        let records = self.list_all("list machines").await?;
        Ok(records.iter().map(normalize_machine).collect())
    }

    async fn get_page(&self, url: &Url) -> Result<ListPage, RancherError> {
        let (status, body) = self.send(Method::GET, url).await?;
        serde_json::from_str(&body).map_err(|e| RancherError::Decode {
            status: status.as_u16(),
            reason: e.to_string(),
        })
    }

    /// Send one request without retries and return the status and body of a 2xx response.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &Url,
    ) -> Result<(StatusCode, String), RancherError> {
        debug!(method = %method, url = %url, "Rancher API request");

        let mut request = self.http.request(method, url.clone());
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await?;
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(RancherError::AuthenticationFailed),
            StatusCode::FORBIDDEN => return Err(RancherError::AuthorizationFailed),
            _ if !status.is_success() => {
                return Err(RancherError::Status {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let body = response.text().await.map_err(|e| RancherError::Decode {
            status: status.as_u16(),
            reason: e.to_string(),
        })?;
        Ok((status, body))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
