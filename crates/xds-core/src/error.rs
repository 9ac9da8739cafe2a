//! Error types for the control plane.
//!
//! [`XdsError`] covers subscription start-up, streaming watch failures,
//! snapshot consistency violations and discovery protocol errors, and
//! converts into [`tonic::Status`] for discovery responses.

/// Error type for every fallible control-plane operation.
///
/// Start-up errors are returned synchronously from `subscribe`, watch
/// errors are tagged with the namespace and resource type that produced
/// them, and consistency violations are plain values for the caller to
/// act on.
///
/// # Example
///
/// ```rust
/// use xds_core::XdsError;
///
/// fn validate_namespaces(namespaces: &[&str]) -> Result<(), XdsError> {
///     if namespaces.len() > 1 && namespaces.contains(&"") {
///         return Err(XdsError::InvalidNamespaces {
///             reason: "\"\" cannot be combined with other namespaces".to_string(),
///         });
///     }
///     Ok(())
/// }
///
/// assert!(validate_namespaces(&["", "default"]).is_err());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum XdsError {
    /// Malformed, unknown or unsupported type URL.
    #[error("invalid type URL: {type_url} - {reason}")]
    InvalidTypeUrl {
        /// The offending type URL.
        type_url: String,
        /// Why the type URL was rejected.
        reason: String,
    },

    /// The namespace list passed to a subscription is invalid.
    #[error(
        "the \"\" namespace is used to watch all namespaces and cannot be combined with \
         other namespaces: {reason}"
    )]
    InvalidNamespaces {
        /// Description of the rejected namespace list.
        reason: String,
    },

    /// The synchronous initial list for one namespace failed.
    #[error("initial {type_url} list failed in namespace {namespace:?}")]
    InitialList {
        /// Resource type being listed.
        type_url: String,
        /// Namespace being listed.
        namespace: String,
        /// Error reported by the resource client.
        #[source]
        source: Box<XdsError>,
    },

    /// Opening a watch for one namespace failed.
    #[error("starting {type_url} watch failed in namespace {namespace:?}")]
    WatchStart {
        /// Resource type being watched.
        type_url: String,
        /// Namespace being watched.
        namespace: String,
        /// Error reported by the resource client.
        #[source]
        source: Box<XdsError>,
    },

    /// A running watch reported an error.
    #[error("{namespace}-{kind}: {source}")]
    WatchStream {
        /// Resource type being watched.
        type_url: String,
        /// Short resource label (for example `virtualServices`).
        kind: String,
        /// Namespace the watch runs in.
        namespace: String,
        /// Error reported by the resource client.
        #[source]
        source: Box<XdsError>,
    },

    /// Error raised by a resource client.
    #[error("resource client error: {message}")]
    Client {
        /// Description of the failure.
        message: String,
    },

    /// A consistency check was asked to validate a missing snapshot.
    #[error("nil snapshot")]
    NilSnapshot,

    /// The number of distinct references into a collection differs from
    /// the number of resources it holds.
    #[error(
        "mismatched {type_url} reference and resource lengths: {references} references, \
         {resources} resources"
    )]
    InconsistentReferences {
        /// The referenced collection's type URL.
        type_url: String,
        /// Number of distinct references.
        references: usize,
        /// Number of resources in the collection.
        resources: usize,
    },

    /// A referenced resource is absent from its collection.
    #[error("{type_url} resource {name:?} is referenced but not found")]
    MissingReference {
        /// The referenced collection's type URL.
        type_url: String,
        /// Name of the missing resource.
        name: String,
    },

    /// Protobuf encoding failed.
    #[error("encoding error for {type_url}: {message}")]
    EncodingError {
        /// The type URL being encoded.
        type_url: String,
        /// Error message.
        message: String,
    },

    /// Protobuf decoding failed.
    #[error("decoding error for {type_url}: {message}")]
    DecodingError {
        /// The type URL being decoded.
        type_url: String,
        /// Error message.
        message: String,
    },

    /// A stream's receiving side went away.
    #[error("stream closed: {reason}")]
    StreamClosed {
        /// Reason for stream closure.
        reason: String,
    },

    /// The owning component is shutting down.
    #[error("shutting down")]
    Shutdown,

    /// Unexpected internal error.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl XdsError {
    /// Create an internal error from any error type.
    pub fn internal<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a resource client error.
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    /// Whether this error describes a snapshot consistency violation.
    #[must_use]
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            Self::NilSnapshot | Self::InconsistentReferences { .. } | Self::MissingReference { .. }
        )
    }
}

impl From<XdsError> for tonic::Status {
    fn from(err: XdsError) -> Self {
        match &err {
            XdsError::InvalidTypeUrl { .. }
            | XdsError::InvalidNamespaces { .. }
            | XdsError::EncodingError { .. }
            | XdsError::DecodingError { .. }
            | XdsError::Configuration(_) => tonic::Status::invalid_argument(err.to_string()),
            XdsError::NilSnapshot
            | XdsError::InconsistentReferences { .. }
            | XdsError::MissingReference { .. } => {
                tonic::Status::failed_precondition(err.to_string())
            }
            XdsError::InitialList { .. }
            | XdsError::WatchStart { .. }
            | XdsError::WatchStream { .. }
            | XdsError::Client { .. }
            | XdsError::StreamClosed { .. }
            | XdsError::Shutdown => tonic::Status::unavailable(err.to_string()),
            XdsError::Internal { .. } => tonic::Status::internal(err.to_string()),
        }
    }
}
