//! Fault taxonomy for backend interactions.
//!
//! Every backend call resolves to a payload or a [`Fault`]. Faults carry the
//! backend-provided message when the error body is structured, and a generic
//! message otherwise - markup from an HTML error page is never surfaced.
//!
//! `Fault` is deliberately flat (kind + message, no wrapped source errors):
//! coalesced cache readers observe a recorded failure as a clone of the fault
//! the fetching reader saw.

use serde::Deserialize;
use thiserror::Error;

/// A categorized failure from a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The request never produced a usable response (connect failure,
    /// transport timeout, or a backend error with no structured body).
    #[error("request failed: {0}")]
    Network(String),

    /// The backend rejected the request body. The message is the backend's,
    /// verbatim, and is suitable for direct display.
    #[error("{0}")]
    Validation(String),

    /// The backend treated the caller as unauthenticated or unauthorized.
    /// The stored token is not cleared here; that decision belongs to the
    /// caller reacting to the fault.
    #[error("authentication required")]
    Auth,

    /// The requested resource no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// A success response carried a body that could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Client-side invariant violation. Not produced by backend responses.
    #[error("internal client error: {0}")]
    Internal(String),
}

/// Structured error body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl Fault {
    /// Construct an internal fault.
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this fault means the caller should re-authenticate.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }

    /// Map a non-2xx response to a fault.
    ///
    /// The backend's structured `{"message": "..."}` body is passed through
    /// verbatim where the status warrants it; unstructured bodies (HTML error
    /// pages, proxy output) degrade to a generic message.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.message);

        match status {
            401 | 403 => Self::Auth,
            404 => Self::NotFound(
                message.unwrap_or_else(|| "the requested resource does not exist".to_string()),
            ),
            400 | 409 | 422 => Self::Validation(
                message.unwrap_or_else(|| "the request was rejected".to_string()),
            ),
            _ => Self::Network(
                message.unwrap_or_else(|| format!("backend error (HTTP {status})")),
            ),
        }
    }
}

impl From<reqwest::Error> for Fault {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timed out".to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Fault {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_message_passes_through_verbatim() {
        let fault = Fault::from_status(422, r#"{"message": "quantity must be at least 1"}"#);
        assert_eq!(
            fault,
            Fault::Validation("quantity must be at least 1".to_string())
        );
        assert_eq!(fault.to_string(), "quantity must be at least 1");
    }

    #[test]
    fn test_unstructured_body_degrades_to_generic_message() {
        let fault = Fault::from_status(500, "<html><body>Internal Server Error</body></html>");
        assert_eq!(fault, Fault::Network("backend error (HTTP 500)".to_string()));
    }

    #[test]
    fn test_auth_statuses() {
        assert!(Fault::from_status(401, "").is_auth());
        assert!(Fault::from_status(403, r#"{"message": "admin only"}"#).is_auth());
    }

    #[test]
    fn test_not_found_keeps_backend_message() {
        let fault = Fault::from_status(404, r#"{"message": "no such product"}"#);
        assert_eq!(fault, Fault::NotFound("no such product".to_string()));
    }

    #[test]
    fn test_bad_request_without_body() {
        let fault = Fault::from_status(400, "");
        assert_eq!(
            fault,
            Fault::Validation("the request was rejected".to_string())
        );
    }
}
