use ledgerutil_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the canonical [`ExError`]
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Coarse error taxonomy surfaced to callers.
///
/// Every [`ExErrorKind`] belongs to exactly one category. None of the
/// categories is recoverable inside a run: any error aborts the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Filesystem access failure
    Io,
    /// Malformed snapshot metadata or data, broken ordering, digest mismatch
    Format,
    /// Invalid caller-supplied configuration, rejected before any I/O
    Config,
    /// Serialization or programming errors
    Internal,
}

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and external reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    InvalidConfig,

    // Snapshot metadata
    /// Metadata file is missing, not UTF-8, not JSON, or structurally invalid
    InvalidMetadata,
    /// A required metadata field is absent
    MissingField,
    /// `format_version` is not supported by this build
    UnsupportedFormat,
    /// A digest or hash field is not valid hex
    InvalidDigest,

    // Snapshot data
    /// A data line could not be decoded into an entry
    InvalidEntry,
    /// A key is not strictly greater than its predecessor
    OrderingViolation,
    /// The requested namespace is not described by the snapshot metadata
    NamespaceNotFound,
    /// A namespace stream ended with a different number of entries than recorded
    EntryCountMismatch,
    /// A namespace stream hashed to a different digest than recorded
    DigestMismatch,
    /// The two snapshots belong to different channels or heights
    IncomparableSnapshots,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidMetadata => "ERR_INVALID_METADATA",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::UnsupportedFormat => "ERR_UNSUPPORTED_FORMAT",
            ExErrorKind::InvalidDigest => "ERR_INVALID_DIGEST",
            ExErrorKind::InvalidEntry => "ERR_INVALID_ENTRY",
            ExErrorKind::OrderingViolation => "ERR_ORDERING_VIOLATION",
            ExErrorKind::NamespaceNotFound => "ERR_NAMESPACE_NOT_FOUND",
            ExErrorKind::EntryCountMismatch => "ERR_ENTRY_COUNT_MISMATCH",
            ExErrorKind::DigestMismatch => "ERR_DIGEST_MISMATCH",
            ExErrorKind::IncomparableSnapshots => "ERR_INCOMPARABLE_SNAPSHOTS",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Get the category this kind belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExErrorKind::InvalidConfig => ErrorCategory::Config,
            ExErrorKind::InvalidMetadata
            | ExErrorKind::MissingField
            | ExErrorKind::UnsupportedFormat
            | ExErrorKind::InvalidDigest
            | ExErrorKind::InvalidEntry
            | ExErrorKind::OrderingViolation
            | ExErrorKind::NamespaceNotFound
            | ExErrorKind::EntryCountMismatch
            | ExErrorKind::DigestMismatch
            | ExErrorKind::IncomparableSnapshots => ErrorCategory::Format,
            ExErrorKind::Io => ErrorCategory::Io,
            ExErrorKind::Serialization | ExErrorKind::Internal => ErrorCategory::Internal,
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus enough context
/// (snapshot, namespace, location) to point at the offending input.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    snapshot: Option<String>,
    namespace: Option<String>,
    location: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            snapshot: None,
            namespace: None,
            location: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the label (usually the directory path) of the offending snapshot
    pub fn with_snapshot(mut self, snapshot: impl Into<String>) -> Self {
        self.snapshot = Some(snapshot.into());
        self
    }

    /// Add namespace context
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a location inside the snapshot, e.g. `line 17`
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the snapshot label, if any
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Get the namespace context, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the location context, if any
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(snapshot) = &self.snapshot {
            write!(f, " (snapshot: {})", snapshot)?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, " (namespace: {})", namespace)?;
        }
        if let Some(location) = &self.location {
            write!(f, " (at: {})", location)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Configuration errors, detected before any snapshot is opened
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The number of differences to record must not be negative
    #[error("first diffs must be zero or greater, got {value}")]
    NegativeSampleLimit { value: i64 },

    /// A snapshot path argument was empty
    #[error("snapshot path {position} is empty")]
    EmptySnapshotPath { position: u8 },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        ExError::new(ExErrorKind::InvalidConfig)
            .with_op("validate_config")
            .with_message(err.to_string())
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
