use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder, ResponseError};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::squidler::ProblemQuery;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Every proxy response, successful or not, carries these.
pub fn with_cors(builder: &mut HttpResponseBuilder) -> &mut HttpResponseBuilder {
    builder
        .insert_header(("Access-Control-Allow-Origin", ALLOW_ORIGIN))
        .insert_header(("Access-Control-Allow-Headers", ALLOW_HEADERS))
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Squidler API key not configured")]
    NotConfigured,

    #[error("{0} is required")]
    MissingParameter(&'static str),

    #[error("{message}")]
    Upstream {
        status: u16,
        message: &'static str,
        details: String,
    },

    #[error("{0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Unexpected(e.to_string())
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(e: serde_json::Error) -> Self {
        ProxyError::Unexpected(e.to_string())
    }
}

#[derive(Serialize, Deserialize)]
pub struct ProxyErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::NotConfigured | ProxyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ProxyError::Unexpected(message) = self {
            error!("Unexpected proxy error: {}", message);
        }

        let details = match self {
            ProxyError::Upstream { details, .. } => Some(details.clone()),
            _ => None,
        };

        with_cors(&mut HttpResponse::build(self.status_code())).json(ProxyErrorBody {
            error: self.to_string(),
            details,
        })
    }
}

const DEFAULT_LIMIT: &str = "50";
const DEFAULT_OFFSET: &str = "0";

/// `limit` and `offset` are forwarded verbatim: numbers and strings alike.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProblemsRequest {
    #[serde(default)]
    pub limit: Option<Value>,
    #[serde(default)]
    pub offset: Option<Value>,
    #[serde(default)]
    pub suite_type: Option<String>,
}

fn query_value(name: &'static str, value: Option<Value>, default: &str) -> Result<String, ProxyError> {
    match value {
        None => Ok(default.to_string()),
        Some(Value::String(text)) => Ok(text),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(other) => Err(ProxyError::Unexpected(format!("{name} must be a number or a string, got {other}"))),
    }
}

impl TryFrom<ListProblemsRequest> for ProblemQuery {
    type Error = ProxyError;

    fn try_from(req: ListProblemsRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            limit: query_value("limit", req.limit, DEFAULT_LIMIT)?,
            offset: query_value("offset", req.offset, DEFAULT_OFFSET)?,
            suite_type: req.suite_type.filter(|suite| !suite.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRequest {
    #[serde(default)]
    pub problem_id: Option<Value>,
}

impl ProblemRequest {
    /// Accepts a non-empty string or a number.
    pub fn problem_id(&self) -> Result<String, ProxyError> {
        match &self.problem_id {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(ProxyError::MissingParameter("problemId")),
        }
    }
}
