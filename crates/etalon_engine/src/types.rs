use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Correlates a dispatched command with its settlement in the logs.
pub type RequestId = u64;

/// One artifact as reported by the device's list endpoint.
///
/// The device also reports a size per entry; unknown fields are ignored
/// since the client models nothing beyond the name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactEntry {
    pub file: String,
}

/// Settlement of one device operation, delivered over the engine's event
/// channel. Operations are independent; events arrive in settlement order,
/// not dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    ListFetched {
        request_id: RequestId,
        result: Result<Vec<ArtifactEntry>, ApiError>,
    },
    CreateSettled {
        request_id: RequestId,
        result: Result<(), ApiError>,
    },
    UploadSettled {
        request_id: RequestId,
        result: Result<(), ApiError>,
    },
    TestSettled {
        request_id: RequestId,
        result: Result<(), ApiError>,
    },
    DownloadSettled {
        request_id: RequestId,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The configured device address could not be parsed or joined.
    InvalidUrl,
    /// The device answered with a non-success HTTP status.
    HttpStatus(u16),
    /// The test payload carried a status other than the "ok" sentinel.
    TestRejected { status: String },
    /// The response body could not be parsed.
    MalformedPayload,
    /// An opt-in client timeout expired.
    Timeout,
    /// A download exceeded the configured byte cap.
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// The request could not be completed at the transport level.
    Network,
    /// A downloaded artifact could not be written locally.
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid device url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::TestRejected { status } => {
                write!(f, "device reported test status {status:?}")
            }
            FailureKind::MalformedPayload => write!(f, "malformed payload"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "local io error"),
        }
    }
}
