// Error types for calls to the inventory (Stock) API
// Each failure maps onto one fixed sentence for the tool caller

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockApiError {
    // Upstream answered with a non-2xx status
    #[error("API request failed: {status} {reason}")]
    Status { status: u16, reason: String },
    // Never got a status back (DNS, refused connection, timeout...)
    #[error("Network error calling Stock API: {0}")]
    Network(String),
    // 2xx but the body was not JSON
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl StockApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            StockApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message returned to the tool caller.
    pub fn user_message(&self) -> String {
        match self {
            StockApiError::Status { status: 401 | 403, .. } => {
                "Authentication failed. Please check API configuration.".to_string()
            }
            StockApiError::Status { status: 404, .. } => {
                "Search endpoint not found. Please check API configuration.".to_string()
            }
            StockApiError::Status { status, .. } if *status >= 500 => {
                "Stock API is currently unavailable. Please try again later.".to_string()
            }
            StockApiError::Network(_) => {
                "Network error: Unable to connect to Stock API.".to_string()
            }
            other => format!("Search failed: {}", other),
        }
    }
}

impl From<reqwest::Error> for StockApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            StockApiError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            StockApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            }
        } else {
            StockApiError::Network(error.to_string())
        }
    }
}
