use crate::identifier::IdentifierKind;
use thiserror::Error;

/// Result type for graphschema operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for graphschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database could not be reached or rejected the credentials
    #[error("Connection error: {0}")]
    Connection(String),

    /// A label, relationship type or property name failed the identifier allow-list
    #[error("Unsafe {kind} identifier rejected: {value:?}")]
    UnsafeIdentifier { kind: IdentifierKind, value: String },

    /// The topology graph could not be decoded into records
    #[error("Decode error: {0}")]
    Decode(String),

    /// An existence probe failed structurally or timed out
    #[error("Probe failed for {owner} ({predicate}): {message}")]
    Probe {
        owner: String,
        predicate: String,
        message: String,
    },

    /// An introspection query failed
    #[error("Introspection of {aspect} failed: {message}")]
    Introspection { aspect: String, message: String },

    /// Writing the schema document failed
    #[error("Export error: {0}")]
    Export(String),

    /// Schema generation was cancelled before it completed
    #[error("Schema generation cancelled")]
    Cancelled,

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an unsafe identifier error
    pub fn unsafe_identifier(kind: IdentifierKind, value: impl Into<String>) -> Self {
        Self::UnsafeIdentifier {
            kind,
            value: value.into(),
        }
    }

    /// Creates a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a probe error naming the owner and the predicate that failed
    pub fn probe(
        owner: impl Into<String>,
        predicate: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Probe {
            owner: owner.into(),
            predicate: predicate.into(),
            message: message.into(),
        }
    }

    /// Creates an introspection error
    pub fn introspection(aspect: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Introspection {
            aspect: aspect.into(),
            message: message.into(),
        }
    }

    /// Creates an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Whether this error only disqualifies a single owner rather than a whole aspect
    pub fn is_owner_scoped(&self) -> bool {
        matches!(self, Self::UnsafeIdentifier { .. })
    }
}
