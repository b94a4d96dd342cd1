use imxdiff_core_types::ContainerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using ImxError
pub type Result<T> = std::result::Result<T, ImxError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every fatal error and every ledger diagnostic carries one of these kinds.
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    NotFound,
    AmbiguousLookup,

    // Ingestion diagnostics
    /// Same identifier produced more than one node within one ingestion
    DuplicateIdentifier,
    /// Extension record could not be attached to a base node
    UnconnectedExtension,
    /// A referenced identifier is absent from the graph
    DanglingReference,
    /// Line fragments did not merge into a single connected path
    GeometryMergeFailure,
    /// Referenced object exists but carries no geographic location
    MissingLocation,
    /// Structural parent missing during a pre-order build
    IntegrityViolation,

    // Repository
    VersionMismatch,
    UnknownContainer,
    DuplicateContainer,
    /// A CRITICAL ledger entry was reached while draining
    CriticalDiagnostic,

    // Integration/IO
    Io,
    Parse,
    MissingVersion,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousLookup => "ERR_AMBIGUOUS_LOOKUP",
            ExErrorKind::DuplicateIdentifier => "ERR_DUPLICATE_IDENTIFIER",
            ExErrorKind::UnconnectedExtension => "ERR_UNCONNECTED_EXTENSION",
            ExErrorKind::DanglingReference => "ERR_DANGLING_REFERENCE",
            ExErrorKind::GeometryMergeFailure => "ERR_GEOMETRY_MERGE_FAILURE",
            ExErrorKind::MissingLocation => "ERR_MISSING_LOCATION",
            ExErrorKind::IntegrityViolation => "ERR_INTEGRITY_VIOLATION",
            ExErrorKind::VersionMismatch => "ERR_VERSION_MISMATCH",
            ExErrorKind::UnknownContainer => "ERR_UNKNOWN_CONTAINER",
            ExErrorKind::DuplicateContainer => "ERR_DUPLICATE_CONTAINER",
            ExErrorKind::CriticalDiagnostic => "ERR_CRITICAL_DIAGNOSTIC",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::MissingVersion => "ERR_MISSING_VERSION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus free-form context
/// for humans.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    container_id: Option<ContainerId>,
    path: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            container_id: None,
            path: None,
            message: String::new(),
        }
    }

    /// Set the operation name
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Set the entity id (an object identifier)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Set the container the error relates to
    pub fn with_container_id(mut self, id: ContainerId) -> Self {
        self.container_id = Some(id);
        self
    }

    /// Set the file system path the error relates to
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the error message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn container_id(&self) -> Option<&ContainerId> {
        self.container_id.as_ref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

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
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (puic: {})", entity_id)?;
        }
        if let Some(container_id) = &self.container_id {
            write!(f, " (container_id: {})", container_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Fatal conditions raised by the core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImxError {
    /// Bulk iteration refused while identifiers are duplicated
    #[error("Duplicated puic in container: {}", puics.join(", "))]
    DuplicateIdentifiers { puics: Vec<String> },

    /// A single-node lookup hit more than one node
    #[error("Lookup of puic {puic} is ambiguous: {count} nodes")]
    AmbiguousLookup { puic: String, count: usize },

    /// Structural parent was not built before its child
    #[error("Integrity violation at puic {puic}: {message}")]
    IntegrityViolation { puic: String, message: String },

    /// Repositories of different schema versions in one multi-repository
    #[error("Schema versions differ: {}", versions.join(", "))]
    VersionMismatch { versions: Vec<String> },

    #[error("Container {container_id} is not part of this multi-repository")]
    UnknownContainer { container_id: ContainerId },

    #[error("Container {container_id} is already part of this multi-repository")]
    DuplicateContainer { container_id: ContainerId },

    /// A CRITICAL ledger entry was dispatched
    #[error("Critical diagnostic for puic {puic}: {message}")]
    CriticalDiagnostic { puic: String, message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

impl From<ImxError> for ExError {
    fn from(err: ImxError) -> Self {
        match err {
            ImxError::DuplicateIdentifiers { puics } => {
                ExError::new(ExErrorKind::DuplicateIdentifier)
                    .with_message(format!("Duplicated puic in container: {}", puics.join(", ")))
            }
            ImxError::AmbiguousLookup { puic, count } => {
                ExError::new(ExErrorKind::AmbiguousLookup)
                    .with_entity_id(puic)
                    .with_message(format!("{} nodes share this puic", count))
            }
            ImxError::IntegrityViolation { puic, message } => {
                ExError::new(ExErrorKind::IntegrityViolation)
                    .with_entity_id(puic)
                    .with_op("build")
                    .with_message(message)
            }
            ImxError::VersionMismatch { versions } => ExError::new(ExErrorKind::VersionMismatch)
                .with_message(format!("Schema versions differ: {}", versions.join(", "))),
            ImxError::UnknownContainer { container_id } => {
                ExError::new(ExErrorKind::UnknownContainer)
                    .with_container_id(container_id)
                    .with_message("Container not found")
            }
            ImxError::DuplicateContainer { container_id } => {
                ExError::new(ExErrorKind::DuplicateContainer)
                    .with_container_id(container_id)
                    .with_message("Container already present")
            }
            ImxError::CriticalDiagnostic { puic, message } => {
                ExError::new(ExErrorKind::CriticalDiagnostic)
                    .with_entity_id(puic)
                    .with_op("drain")
                    .with_message(message)
            }
            ImxError::InvalidInput { message } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            ImxError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to ImxError
impl From<serde_json::Error> for ImxError {
    fn from(err: serde_json::Error) -> Self {
        ImxError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_kind_codes() {
        let cases = [
            (ExErrorKind::DuplicateIdentifier, "ERR_DUPLICATE_IDENTIFIER"),
            (ExErrorKind::UnconnectedExtension, "ERR_UNCONNECTED_EXTENSION"),
            (ExErrorKind::DanglingReference, "ERR_DANGLING_REFERENCE"),
            (ExErrorKind::GeometryMergeFailure, "ERR_GEOMETRY_MERGE_FAILURE"),
            (ExErrorKind::MissingLocation, "ERR_MISSING_LOCATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_code_and_puic() {
        let err = ExError::new(ExErrorKind::AmbiguousLookup)
            .with_op("find")
            .with_entity_id("puic-1")
            .with_message("2 nodes share this puic");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_AMBIGUOUS_LOOKUP]"));
        assert!(rendered.contains("'find'"));
        assert!(rendered.contains("puic-1"));
    }

    #[test]
    fn test_unknown_container_carries_container_id() {
        let id = ContainerId::from_string("c-9");
        let ex: ExError = ImxError::UnknownContainer {
            container_id: id.clone(),
        }
        .into();
        assert_eq!(ex.kind(), ExErrorKind::UnknownContainer);
        assert_eq!(ex.container_id(), Some(&id));
    }
}
