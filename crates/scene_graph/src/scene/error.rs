//! Scene graph errors

use thiserror::Error;

use super::{NodeId, ValueType};
use crate::render::BackendError;

/// Result type for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while building, committing, rendering or serializing a graph
#[derive(Error, Debug)]
pub enum SceneError {
    /// No factory is registered for the requested type name
    #[error("Unknown node type: {0}")]
    UnknownType(String),

    /// A named child lookup missed
    #[error("Node '{parent}' has no child named '{child}'")]
    NoSuchChild {
        /// Name of the node that was searched
        parent: String,
        /// Requested child name
        child: String,
    },

    /// `add` under [`ChildPolicy::Reject`](super::ChildPolicy::Reject) found an existing entry
    #[error("Node '{parent}' already has a child named '{child}'")]
    DuplicateChild {
        /// Name of the parent node
        parent: String,
        /// Conflicting child name
        child: String,
    },

    /// A value (or min/max bound) disagrees with the node's declared type
    #[error("Type mismatch on '{node}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Name of the node
        node: String,
        /// Declared type
        expected: ValueType,
        /// Type that was supplied
        found: ValueType,
    },

    /// A typed operation reached a node of another registry type
    #[error("Node '{node}' is not a {expected}")]
    WrongNodeType {
        /// Name of the node
        node: String,
        /// Type the operation works on
        expected: &'static str,
    },

    /// A `REQUIRED` node reached commit without a value
    #[error("Required value missing on '{0}'")]
    RequiredValueMissing(String),

    /// The source locator changed on an importer that already committed another source
    #[error("Node '{node}' already committed source '{loaded}', re-import of '{requested}' is not supported")]
    ReimportUnsupported {
        /// Name of the importer node
        node: String,
        /// Source that was committed
        loaded: String,
        /// Source that was requested
        requested: String,
    },

    /// `set_min_max` on a node not flagged `VALID_MIN_MAX`
    #[error("Node '{0}' does not accept min/max bounds")]
    InvalidMinMax(String),

    /// The handle does not refer to a live node
    #[error("Node handle {0:?} is no longer live")]
    InvalidNode(NodeId),

    /// Malformed external description
    #[error("Invalid description for '{node}': {reason}")]
    Description {
        /// Name of the node being populated
        node: String,
        /// What was wrong
        reason: String,
    },

    /// The import collaborator failed
    #[error("Import of '{locator}' failed: {reason}")]
    Import {
        /// Source locator
        locator: String,
        /// Failure description
        reason: String,
    },

    /// Native backend failure
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Render reached a node whose native resource was never created
    #[error("Node '{0}' has no committed resource to render")]
    MissingResource(String),

    /// Snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors collected by a traversal that was not fail-fast
    #[error("Traversal failed with {} error(s)", .0.len())]
    Traversal(Vec<SceneError>),
}

impl SceneError {
    /// Fold errors collected by a non fail-fast pass into one result
    pub(crate) fn collected(mut errors: Vec<SceneError>) -> SceneResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(SceneError::Traversal(errors)),
        }
    }
}
