//! Error codes and the error type carried across the codec boundary.

use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;

/// Boxed error used as the source of an [`Error`].
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Protocol-agnostic error code with a canonical wire name and HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// 400 Bad Request / INVALID_ARGUMENT
    InvalidArgument,
    /// 401 Unauthorized / UNAUTHENTICATED
    Unauthenticated,
    /// 403 Forbidden / PERMISSION_DENIED
    PermissionDenied,
    /// 404 Not Found / NOT_FOUND
    NotFound,
    /// 409 Conflict / ALREADY_EXISTS
    AlreadyExists,
    /// 409 Conflict / ABORTED
    Aborted,
    /// 400 Bad Request / FAILED_PRECONDITION
    FailedPrecondition,
    /// 400 Bad Request / OUT_OF_RANGE
    OutOfRange,
    /// 429 Too Many Requests / RESOURCE_EXHAUSTED
    ResourceExhausted,
    /// 499 Client Closed Request / CANCELLED
    Cancelled,
    /// 500 Internal Server Error / INTERNAL
    Internal,
    /// 500 Internal Server Error / DATA_LOSS
    DataLoss,
    /// 500 Internal Server Error / UNKNOWN
    Unknown,
    /// 501 Not Implemented / UNIMPLEMENTED
    Unimplemented,
    /// 503 Service Unavailable / UNAVAILABLE
    Unavailable,
    /// 504 Gateway Timeout / DEADLINE_EXCEEDED
    DeadlineExceeded,
}

impl ErrorCode {
    const ALL: [ErrorCode; 16] = [
        ErrorCode::InvalidArgument,
        ErrorCode::Unauthenticated,
        ErrorCode::PermissionDenied,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::Aborted,
        ErrorCode::FailedPrecondition,
        ErrorCode::OutOfRange,
        ErrorCode::ResourceExhausted,
        ErrorCode::Cancelled,
        ErrorCode::Internal,
        ErrorCode::DataLoss,
        ErrorCode::Unknown,
        ErrorCode::Unimplemented,
        ErrorCode::Unavailable,
        ErrorCode::DeadlineExceeded,
    ];

    /// Convert to HTTP status code
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument | ErrorCode::FailedPrecondition | ErrorCode::OutOfRange => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists | ErrorCode::Aborted => StatusCode::CONFLICT,
            ErrorCode::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            // Non-standard, used by nginx and grpc-gateway
            ErrorCode::Cancelled => StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
            ErrorCode::Internal | ErrorCode::DataLoss | ErrorCode::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Canonical code name, as carried in the failure envelope
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::Aborted => "ABORTED",
            ErrorCode::FailedPrecondition => "FAILED_PRECONDITION",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::DataLoss => "DATA_LOSS",
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::Unimplemented => "UNIMPLEMENTED",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
        }
    }

    /// Parse a canonical code name; anything unrecognized is `Unknown`.
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .unwrap_or(ErrorCode::Unknown)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for converting errors to protocol-agnostic error codes.
///
/// Implement this for your error types to plug them into
/// [`status_from_error`] and [`code_message_from_error`] via
/// [`Error::from_domain`].
pub trait IntoErrorCode {
    /// Get the error code for this error
    fn error_code(&self) -> ErrorCode;

    /// Get a human-readable message
    fn message(&self) -> String;
}

impl IntoErrorCode for std::io::Error {
    fn error_code(&self) -> ErrorCode {
        match self.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::NotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => ErrorCode::AlreadyExists,
            std::io::ErrorKind::InvalidInput | std::io::ErrorKind::InvalidData => {
                ErrorCode::InvalidArgument
            }
            std::io::ErrorKind::TimedOut => ErrorCode::DeadlineExceeded,
            _ => ErrorCode::Internal,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

/// An error with a machine-readable code and a human-readable message.
///
/// This is what request decoding fails with, what failure responses are
/// built from, and what the client side reconstructs from a failure
/// envelope. Two errors are equal when code and message are equal.
#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Error {
    code: String,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_code(code.as_str(), message)
    }

    /// An error with a code that need not be one of [`ErrorCode`].
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Malformed input from the client; keeps `source` for diagnostics.
    pub fn invalid_argument(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self {
            code: ErrorCode::InvalidArgument.as_str().to_string(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn internal(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self {
            code: ErrorCode::Internal.as_str().to_string(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Wrap a domain error, taking code and message from it.
    pub fn from_domain<E>(err: E) -> Self
    where
        E: IntoErrorCode + StdError + Send + Sync + 'static,
    {
        Self {
            code: err.error_code().as_str().to_string(),
            message: IntoErrorCode::message(&err),
            source: Some(Box::new(err)),
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The code as an [`ErrorCode`], `Unknown` for custom codes.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from_code(&self.code)
    }

    pub fn http_status(&self) -> StatusCode {
        self.error_code().http_status()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.message == other.message
    }
}

impl Eq for Error {}

impl IntoErrorCode for Error {
    fn error_code(&self) -> ErrorCode {
        Error::error_code(self)
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

/// Iterate over `err` and its chain of sources.
fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |e| (*e).source())
}

fn known_code<'a>(err: &'a (dyn StdError + 'static)) -> Option<(ErrorCode, &'a str, String)> {
    chain(err).find_map(|e| {
        if let Some(e) = e.downcast_ref::<Error>() {
            Some((e.error_code(), e.code(), e.message().to_string()))
        } else if let Some(io) = e.downcast_ref::<std::io::Error>() {
            let code = io.error_code();
            Some((code, code.as_str(), io.to_string()))
        } else {
            None
        }
    })
}

/// Default status-from-error lookup.
///
/// Follows the source chain to the first [`Error`] or `std::io::Error`;
/// anything else is a 500.
pub fn status_from_error(err: &(dyn StdError + 'static)) -> StatusCode {
    known_code(err)
        .map(|(code, _, _)| code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Default code/message-from-error lookup.
///
/// Unrecognized errors get the `UNKNOWN` code and their display text.
pub fn code_message_from_error(err: &(dyn StdError + 'static)) -> (String, String) {
    known_code(err)
        .map(|(_, code, message)| (code.to_string(), message))
        .unwrap_or_else(|| (ErrorCode::Unknown.as_str().to_string(), err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Opaque;

    impl fmt::Display for Opaque {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("opaque failure")
        }
    }

    impl StdError for Opaque {}

    #[derive(Debug)]
    struct Wrapper(Error);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped: {}", self.0)
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InvalidArgument.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::Cancelled.http_status().as_u16(), 499);
    }

    #[test]
    fn test_code_names_round_trip() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_code(code.as_str()), code);
        }
        assert_eq!(ErrorCode::from_code("PROFILE_GONE"), ErrorCode::Unknown);
    }

    #[test]
    fn test_error_equality_ignores_source() {
        let a = Error::new(ErrorCode::NotFound, "profile not found");
        let b = Error::with_code("NOT_FOUND", "profile not found").with_source(Opaque);
        assert_eq!(a, b);
        assert_ne!(a, Error::new(ErrorCode::NotFound, "other"));
    }

    #[test]
    fn test_invalid_argument_keeps_source() {
        let parse_err = "abc".parse::<i32>().unwrap_err();
        let err = Error::invalid_argument(parse_err);
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert!(err.source().is_some());
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_default_lookups() {
        let err = Error::new(ErrorCode::NotFound, "gone");
        assert_eq!(status_from_error(&err), StatusCode::NOT_FOUND);
        assert_eq!(
            code_message_from_error(&err),
            ("NOT_FOUND".to_string(), "gone".to_string())
        );

        assert_eq!(status_from_error(&Opaque), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            code_message_from_error(&Opaque),
            ("UNKNOWN".to_string(), "opaque failure".to_string())
        );
    }

    #[test]
    fn test_lookups_follow_source_chain() {
        let err = Wrapper(Error::new(ErrorCode::AlreadyExists, "duplicate"));
        assert_eq!(status_from_error(&err), StatusCode::CONFLICT);
        assert_eq!(code_message_from_error(&err).0, "ALREADY_EXISTS");
    }

    #[test]
    fn test_lookups_follow_nested_chain() {
        let err = Wrapper(Error::new(ErrorCode::Internal, "outer").with_source(Wrapper(
            Error::new(ErrorCode::NotFound, "inner"),
        )));
        // The first recognized error wins
        assert_eq!(status_from_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            code_message_from_error(&err),
            ("INTERNAL".to_string(), "outer".to_string())
        );
    }

    #[test]
    fn test_io_errors() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert_eq!(status_from_error(&err), StatusCode::NOT_FOUND);
    }
}
