use thiserror::Error;

/// Failure of one backend request.
///
/// The rendered message never carries the request URL: it holds birth data
/// and search text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: u16,
    },

    #[error("could not decode {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    #[error("invalid request input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(*endpoint),
            Self::InvalidInput(_) => None,
        }
    }

    /// Stable failure class for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::InvalidInput(_) => "invalid_input",
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `error_code=.. [http_status=..]`, safe to log.
    pub fn log_fields(&self) -> String {
        match self.http_status() {
            Some(status) => format!("error_code={} http_status={status}", self.code()),
            None => format!("error_code={}", self.code()),
        }
    }
}
