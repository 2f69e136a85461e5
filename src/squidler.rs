//! Client for the Squidler problems API. Every call carries the server-side
//! API key as a bearer token; nothing is retried or cached.

use log::{error, info};
use reqwest::{header::CONTENT_TYPE, Client, Response, Url};
use serde_json::{json, Value};

use crate::routes::squidler_proxy::proxy_models::ProxyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemAction {
    Dismiss,
    Resolve,
}

impl ProblemAction {
    fn path_segment(self) -> &'static str {
        match self {
            ProblemAction::Dismiss => "dismiss",
            ProblemAction::Resolve => "resolve",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            ProblemAction::Dismiss => "Failed to dismiss problem",
            ProblemAction::Resolve => "Failed to resolve problem",
        }
    }
}

pub const LIST_FAILURE_MESSAGE: &str = "Failed to fetch problems from Squidler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemQuery {
    pub limit: String,
    pub offset: String,
    pub suite_type: Option<String>,
}

#[derive(Clone)]
pub struct SquidlerClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

/// A client whose API key is known to be present.
pub struct AuthorizedClient<'a> {
    client: &'a SquidlerClient,
    api_key: &'a str,
}

impl SquidlerClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn authorized(&self) -> Result<AuthorizedClient<'_>, ProxyError> {
        match self.api_key.as_deref() {
            Some(api_key) => Ok(AuthorizedClient { client: self, api_key }),
            None => {
                error!("SQUIDLER_API_KEY not configured");
                Err(ProxyError::NotConfigured)
            }
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProxyError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProxyError::Unexpected(format!("Invalid Squidler base URL: {e}")))?;

        url.path_segments_mut()
            .map_err(|_| ProxyError::Unexpected("Invalid Squidler base URL".into()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

impl AuthorizedClient<'_> {
    pub async fn list_problems(&self, query: &ProblemQuery) -> Result<Value, ProxyError> {
        let mut url = self.client.endpoint(&["api", "problems"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit);
            pairs.append_pair("offset", &query.offset);
            if let Some(suite_type) = query.suite_type.as_deref() {
                pairs.append_pair("suiteType", suite_type);
            }
        }
        info!("Calling Squidler API {}", url);

        let response = self
            .client
            .http
            .get(url)
            .bearer_auth(self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        relay(response, LIST_FAILURE_MESSAGE).await
    }

    pub async fn update_problem(&self, action: ProblemAction, problem_id: &str) -> Result<Value, ProxyError> {
        let url = self
            .client
            .endpoint(&["api", "problems", problem_id, action.path_segment()])?;
        info!("Calling Squidler API {}", url);

        let response = self
            .client
            .http
            .post(url)
            .bearer_auth(self.api_key)
            .json(&json!({ "problemId": problem_id }))
            .send()
            .await?;

        relay(response, action.failure_message()).await
    }
}

async fn relay(response: Response, failure_message: &'static str) -> Result<Value, ProxyError> {
    let status = response.status();
    info!("Squidler API response status {}", status);

    if !status.is_success() {
        let details = response.text().await?;
        error!("Squidler API error, status {}: {}", status, details);
        return Err(ProxyError::Upstream {
            status: status.as_u16(),
            message: failure_message,
            details,
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
