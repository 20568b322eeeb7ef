use thiserror::Error;

/// Errors that abort a reconstruction run outright.
///
/// Almost every error condition in this engine is recoverable locally —
/// a rank-deficient Procrustes fit returns a sentinel RMS, a triangle violation is
/// counted and warned about, a singular LU is treated as a degenerate rotation. Only
/// missing mandatory input and NaN propagation are fatal, and those are the only two
/// situations this type represents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FoldError {
    #[error("cannot reconstruct a zero-length chain")]
    EmptyChain,

    #[error("the alignment is empty: no sequences to derive restraints from")]
    EmptyAlignment,

    #[error("required input '{name}' was not supplied")]
    MissingInput { name: &'static str },

    #[error("NaN encountered in {context}; aborting (non-recoverable per spec)")]
    NonFiniteValue { context: String },

    #[error("residue index {index} is out of range for a chain of {chain_length} residues")]
    ResidueOutOfRange { index: usize, chain_length: usize },
}
