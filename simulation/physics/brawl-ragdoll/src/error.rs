use thiserror::Error;

/// Error types for ragdoll construction and simulation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RagdollError {
    /// The character scale must be positive and finite
    #[error("Invalid ragdoll scale: {0}")]
    InvalidScale(f32),

    /// A link or transform link refers to a node that does not exist
    #[error("Unknown node index {index} (graph has {count} nodes)")]
    UnknownNode { index: usize, count: usize },

    /// Both ends of a link are the same node
    #[error("Link connects node {0} to itself")]
    SelfLink(usize),
}

/// Result type using RagdollError
pub type Result<T> = std::result::Result<T, RagdollError>;
