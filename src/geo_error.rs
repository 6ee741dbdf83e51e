//! GeoSeqError: Unified error type for geoseq public APIs
//!
//! Every fallible operation in the crate (description loading, graph
//! building, sequencing, kernel dispatch and mesh extraction) reports through
//! this one enum so callers can match on the failure without unwinding.

use thiserror::Error;

/// Unified error type for geoseq operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoSeqError {
    /// An entity declared a `type` token the builder has no dependency shape for.
    #[error("Unsupported entity kind `{kind}` for entity `{entity}`")]
    UnsupportedEntityKind { entity: String, kind: String },
    /// An entity references an id that is not declared in the same description.
    #[error("Entity `{entity}` references undeclared entity `{missing}`")]
    DanglingReference { entity: String, missing: String },
    /// The same id was declared twice in one description.
    #[error("Entity `{0}` is declared more than once")]
    DuplicateEntity(String),
    /// The `data` of an entity does not have the shape its `type` requires.
    #[error("Malformed {kind} entity `{entity}`: {reason}")]
    MalformedEntity {
        entity: String,
        kind: String,
        reason: String,
    },
    /// No vertex became ready during a sequencing round; the remaining
    /// vertices form (or depend on) a cycle.
    #[error("Cyclic dependency among entities {remaining:?}")]
    CyclicDependency { remaining: Vec<String> },
    /// The kernel produced an element type code with no known node count.
    #[error("Unsupported element type {code} for entity `{entity}`")]
    UnsupportedElementType { entity: String, code: i32 },
    /// The node array of an element block does not split evenly into elements.
    #[error(
        "Malformed element block for entity `{entity}` (type {code}): expected {expected} node ids, got {got}"
    )]
    MalformedElementBlock {
        entity: String,
        code: i32,
        expected: usize,
        got: usize,
    },
    /// A dependency was sequenced but no kernel handle was recorded for it.
    #[error("No constructed handle for entity `{0}`")]
    MissingHandle(String),
    /// A kernel session was requested while another one is still held.
    #[error("Geometry kernel session is already active")]
    KernelSessionActive,
    /// Internal bookkeeping of a data structure is inconsistent.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    /// Failure reported by the geometry kernel implementation.
    #[error("Geometry kernel error: {0}")]
    Kernel(String),
    /// The description could not be decoded.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for GeoSeqError {
    fn from(e: serde_json::Error) -> Self {
        GeoSeqError::InvalidInput(e.to_string())
    }
}

impl From<std::io::Error> for GeoSeqError {
    fn from(e: std::io::Error) -> Self {
        GeoSeqError::InvalidInput(e.to_string())
    }
}
