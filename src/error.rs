//! src/error.rs
//!
//! Foutentaxonomie van de oplosser. Alleen grensoperaties (graafopbouw,
//! handle-levenscyclus, parsen) kunnen falen; de zoekalgoritmes zelf zijn
//! infallibel. Annulering en tijdslimiet zijn géén fouten.

use thiserror::Error;

/// Alle fouten die via de publieke API gerapporteerd kunnen worden.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("vertex {vertex} out of range (graph has {n} vertices)")]
    VertexOutOfRange { vertex: usize, n: usize },

    #[error("self-loop on vertex {vertex} rejected")]
    SelfLoop { vertex: usize },

    #[error("graph is frozen: vertices and edges cannot be added once a run has started")]
    GraphFrozen,

    #[error("capacity exceeded: at most {limit} vertices are supported")]
    CapacityExceeded { limit: usize },

    #[error("weight {weight} rejected: total vertex weight {total} would overflow u64")]
    WeightOverflow { weight: u64, total: u64 },

    #[error("n_solutions must be at least 1")]
    InvalidPopulation,

    #[error("time limit must be finite and non-negative, got {0}")]
    InvalidTimeLimit(f64),

    #[error("solver already terminated; create a new solver for another run")]
    AlreadyTerminated,

    #[error("parse error on line {line}: {msg}")]
    Parse { line: usize, msg: String },
}

/// Resultaattype voor alle falende grensoperaties.
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(feature = "python")]
impl From<SolverError> for pyo3::PyErr {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::CapacityExceeded { .. } => {
                pyo3::exceptions::PyMemoryError::new_err(err.to_string())
            }
            SolverError::WeightOverflow { .. } => {
                pyo3::exceptions::PyOverflowError::new_err(err.to_string())
            }
            _ => pyo3::exceptions::PyValueError::new_err(err.to_string()),
        }
    }
}
