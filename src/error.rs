//! Error types for the physics core

use thiserror::Error;

use crate::sim::grid::CellCoord;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, PhysicsError>;

/// Everything that can go wrong while building or stepping a simulation.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Normalizing a zero-length (or non-finite) vector, e.g. two coincident centers.
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// The grid does not hold `id` in the cell the caller expected.
    ///
    /// Means the index and the particle store disagree, which is a logic defect.
    #[error("particle {id} is not indexed in cell {cell:?}")]
    UnknownId { id: u32, cell: CellCoord },

    /// No particle with this id in the store.
    #[error("no particle with id {0}")]
    ParticleNotFound(u32),

    /// Rejected at construction: non-positive sizes, bad restitution, NaN input.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Negative or non-finite delta time handed to a tick.
    #[error("invalid timestep: {0}")]
    InvalidTimestep(f32),

    /// Malformed JSON configuration.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PhysicsError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PhysicsError::InvalidConfiguration(msg.into())
    }
}
