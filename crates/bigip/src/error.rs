//! Error types for appliance operations.
//!
//! Errors are categorized so callers can tell a missing object apart from a
//! conflict, a rejected payload, or a broken connection. Handlers map
//! [`ErrorCategory::NotFound`] to absence; every other category is final.

use std::fmt;

/// Result type alias for appliance operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of appliance errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, TLS or timeout failures.
    Network,
    /// The object does not exist on the appliance.
    NotFound,
    /// An object with the same name already exists.
    Conflict,
    /// The appliance rejected the payload.
    Validation,
    /// The response could not be decoded.
    Format,
    /// Local configuration is unusable.
    Config,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this category means "the object is absent" rather than a failure.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Object not found",
            Self::Conflict => "Object already exists",
            Self::Validation => "Rejected by the appliance",
            Self::Format => "Unexpected response format",
            Self::Config => "Invalid configuration",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the management address and that the appliance is reachable",
            Self::NotFound => "Verify the partition and name are correct",
            Self::Conflict => "Import the existing object or choose another name",
            Self::Validation => "Check the declared attributes against the appliance's API",
            Self::Format => "The appliance API version may not be supported",
            Self::Config => "Check the provider settings and environment variables",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the appliance.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure (no usable HTTP response).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The requested object does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// REST path that returned 404.
        path: String,
    },

    /// The object already exists (HTTP 409).
    #[error("conflict: {message}")]
    Conflict {
        /// Message reported by the appliance.
        message: String,
    },

    /// Any other non-success response.
    #[error("appliance returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the appliance.
        message: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded.
    #[error("failed to encode {context}: {source}")]
    Encode {
        /// What was being encoded.
        context: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An identity string is not a valid `/Partition/name`.
    #[error("invalid identity '{0}'")]
    InvalidId(String),

    /// A lifecycle call needs an identity the record does not have yet.
    #[error("{0} is not bound to an appliance object")]
    Unbound(String),

    /// No handler is registered for a resource type.
    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    /// Provider configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a decode error with context.
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Map a non-success HTTP status and body to an error.
    ///
    /// The appliance reports failures as `{"code": 409, "message": "..."}`;
    /// the message is extracted when present, otherwise the raw body is kept.
    pub fn from_status(status: u16, path: &str, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            404 => Self::NotFound {
                path: path.to_string(),
            },
            409 => Self::Conflict { message },
            _ => Self::Api { status, message },
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http(_) => ErrorCategory::Network,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Conflict { .. } => ErrorCategory::Conflict,
            Error::Api { status, .. } if (400..500).contains(status) => ErrorCategory::Validation,
            Error::Api { .. } => ErrorCategory::Other,
            Error::Decode { .. } | Error::Encode { .. } => ErrorCategory::Format,
            Error::InvalidId(_)
            | Error::Unbound(_)
            | Error::UnknownResourceType(_)
            | Error::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether this error means the object is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category().is_absence()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Api {
                status: code,
                message: format!("HTTP {code}"),
            },
            other => Self::Http(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_not_found() {
        let err = Error::from_status(404, "ltm/pool/~Common~web", "");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("~Common~web"));
    }

    #[test]
    fn test_from_status_conflict_extracts_message() {
        let body = r#"{"code":409,"message":"01020066:3: The requested Pool (/Common/web) already exists in partition Common.","errorStack":[]}"#;
        let err = Error::from_status(409, "ltm/pool", body);
        assert_eq!(err.category(), ErrorCategory::Conflict);
        match err {
            Error::Conflict { message } => assert!(message.contains("already exists")),
            _ => panic!("Expected Error::Conflict"),
        }
    }

    #[test]
    fn test_from_status_validation() {
        let body = r#"{"code":400,"message":"invalid property value \"loadBalancingMode\""}"#;
        let err = Error::from_status(400, "ltm/pool", body);
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("loadBalancingMode"));
    }

    #[test]
    fn test_from_status_plain_body() {
        let err = Error::from_status(500, "ltm/pool", "  internal error \n");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal error");
            }
            _ => panic!("Expected Error::Api"),
        }
    }

    #[test]
    fn test_decode_category() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::decode("pool", source);
        assert_eq!(err.category(), ErrorCategory::Format);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_category_text() {
        assert!(ErrorCategory::NotFound.is_absence());
        assert!(!ErrorCategory::Conflict.is_absence());
        assert!(!ErrorCategory::Network.advice().is_empty());
        assert!(format!("{}", ErrorCategory::Network).contains("Network"));
    }
}
