use serde_json::json;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};

/// Failures of the assistant proxies, each mapped onto one HTTP status.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("rate limit exceeded, try again later")]
    RateLimited,
    #[error("credits required, add funds to the AI gateway account")]
    PaymentRequired,
    #[error("server configuration error: {0}")]
    Configuration(String),
    #[error("AI gateway error: {0}")]
    Upstream(String),
    #[error("{0}")]
    Parse(String),
    #[error("No response from AI")]
    EmptyResponse,
    #[error("invalid command: {0}")]
    Validation(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            ProxyError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProxyError::Configuration(_)
            | ProxyError::Upstream(_)
            | ProxyError::Parse(_)
            | ProxyError::EmptyResponse => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reply for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        reply::with_status(reply::json(&json!({ "error": self.to_string() })), status)
            .into_response()
    }
}
