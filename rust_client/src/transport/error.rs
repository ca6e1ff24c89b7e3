//! Error types for transport operations.
//!
//! Every variant carries an [`ErrorContext`] describing which call failed and
//! for which job, so a failed search can be diagnosed from the message alone.

use std::fmt;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Structured context for transport errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "submit", "job_status")
    pub operation: Option<String>,
    /// The job type involved (e.g., "conjunctions")
    pub job_type: Option<String>,
    /// The job ID if one was assigned
    pub job_id: Option<String>,
    /// Extra diagnostics, e.g. the request URL
    pub details: Option<String>,
    /// Whether repeating the call might succeed
    pub retryable: bool,
}

impl ErrorContext {
    /// Mark this error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref job_type) = self.job_type {
            parts.push(format!("job_type={}", job_type));
        }
        if let Some(ref id) = self.job_id {
            parts.push(format!("job_id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not reach the backend.
    #[error("Connection error: {message} {context}")]
    Connection {
        message: String,
        context: ErrorContext,
    },

    /// A single request exceeded its timeout.
    #[error("Timeout error: {message} {context}")]
    Timeout {
        message: String,
        context: ErrorContext,
    },

    /// The backend answered with a status code the caller did not expect.
    /// `body` holds the raw response body.
    #[error("Unexpected HTTP status {status}: {body} {context}")]
    UnexpectedStatus {
        status: u16,
        body: String,
        context: ErrorContext,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {message} {context}")]
    Decode {
        message: String,
        context: ErrorContext,
    },

    /// Any other HTTP client failure.
    #[error("HTTP error: {message} {context}")]
    Http {
        message: String,
        context: ErrorContext,
    },
}

impl TransportError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create an unexpected-status error carrying the raw body.
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        let context = if status >= 500 {
            ErrorContext::default().retryable()
        } else {
            ErrorContext::default()
        };
        Self::UnexpectedStatus {
            status,
            body: body.into(),
            context,
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a generic HTTP error.
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Timeout { context, .. }
            | Self::UnexpectedStatus { context, .. }
            | Self::Decode { context, .. }
            | Self::Http { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Timeout { context, .. }
            | Self::UnexpectedStatus { context, .. }
            | Self::Decode { context, .. }
            | Self::Http { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Attach diagnostics such as the request URL.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.context_mut().details = Some(details.into());
        self
    }

    /// Record the job this error relates to.
    pub fn with_job(mut self, job_type: impl Into<String>, job_id: impl ToString) -> Self {
        let context = self.context_mut();
        context.job_type = Some(job_type.into());
        context.job_id = Some(job_id.to_string());
        self
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::connection(err.to_string())
        } else if err.is_decode() {
            TransportError::decode(err.to_string())
        } else {
            TransportError::http(err.to_string())
        }
    }
}
