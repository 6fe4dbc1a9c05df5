//! JSON-over-HTTP clients for the contact directory and the outreach channel
//!
//! Both services authenticate with a bearer token supplied by the operator.
//! Acquiring that token is outside the scope of this tool.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use shared::{process_debug, process_warn, Candidate, ProcessId};
use url::Url;

use crate::core::SearchFilters;
use crate::error::{OutreachError, OutreachResult};
use crate::traits::{ContactDirectory, OutreachChannel};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse a base URL so that relative joins append to its path
fn base_url(raw: &str, field: &str) -> OutreachResult<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|e| OutreachError::config(format!("{field}: {e}")))
}

fn http_client() -> OutreachResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

fn authorized(request: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    people: Vec<Candidate>,
}

/// Contact directory reached over HTTP
pub struct HttpContactDirectory {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpContactDirectory {
    pub fn new(base_url: &str, token: Option<String>) -> OutreachResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: self::base_url(base_url, "directory url")?,
            token,
        })
    }

    fn search_url(&self, company: &str, limit: u32, filters: &SearchFilters) -> OutreachResult<Url> {
        let mut url = self
            .base_url
            .join("people/search")
            .map_err(|e| OutreachError::config(format!("directory url: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("company", company);
            query.append_pair("limit", &limit.to_string());
            for title in &filters.titles {
                query.append_pair("title", title);
            }
            for industry in &filters.industries {
                query.append_pair("industry", industry);
            }
            for excluded in &filters.exclude_titles {
                query.append_pair("exclude_title", excluded);
            }
            if filters.min_connections > 0 {
                query.append_pair("min_connections", &filters.min_connections.to_string());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ContactDirectory for HttpContactDirectory {
    async fn search(&self, company: &str, limit: u32, filters: &SearchFilters) -> OutreachResult<Vec<Candidate>> {
        let url = self.search_url(company, limit, filters)?;
        process_debug!(ProcessId::current(), "🔎 Directory search: {}", url);

        let response = authorized(self.client.get(url), self.token.as_deref())
            .send()
            .await
            .map_err(OutreachError::directory)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(OutreachError::directory(format!("authentication rejected ({status})")));
        }
        if !status.is_success() {
            return Err(OutreachError::directory(format!("search for '{company}' returned {status}")));
        }

        let body: SearchResponse = response.json().await.map_err(OutreachError::directory)?;
        let mut people = body.people;
        people.truncate(limit as usize);
        Ok(people)
    }
}

#[derive(Debug, Serialize)]
struct InvitationRequest<'a> {
    candidate_id: &'a str,
    message: &'a str,
}

/// Outreach channel reached over HTTP
pub struct HttpOutreachChannel {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpOutreachChannel {
    pub fn new(base_url: &str, token: Option<String>) -> OutreachResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: self::base_url(base_url, "channel url")?,
            token,
        })
    }
}

#[async_trait]
impl OutreachChannel for HttpOutreachChannel {
    async fn connect(&self, candidate_id: &str, message: &str) -> OutreachResult<bool> {
        let url = self
            .base_url
            .join("invitations")
            .map_err(|e| OutreachError::config(format!("channel url: {e}")))?;

        let response = authorized(self.client.post(url), self.token.as_deref())
            .json(&InvitationRequest { candidate_id, message })
            .send()
            .await
            .map_err(OutreachError::channel)?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            process_warn!(ProcessId::current(), "🐢 Channel throttled invitation to {}", candidate_id);
        } else {
            process_warn!(
                ProcessId::current(),
                "⚠️ Channel rejected invitation to {} ({})",
                candidate_id,
                status
            );
        }
        Ok(false)
    }
}
