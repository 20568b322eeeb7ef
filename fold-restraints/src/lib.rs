//! Pair-restraint storage and compilation, and the per-iteration steric adjuster that
//! turns classified violations into distance-space or Euclidean-space corrections.

mod bound_matrix;
mod cluster;
mod compiler;
mod external;
mod flory;
mod score;
mod steric;

pub use bound_matrix::BoundMatrix;
pub use cluster::{Cluster, ClusterAssignment};
pub use compiler::{CompiledRestraints, RestraintCompiler};
pub use external::{ExternalRestraint, ExternalRestraintList};
pub use flory::{flory_upper_bound, r_exp, theta};
pub use score::{ScoreChannel, ScoreVector};
pub use steric::{
    apply_between_cluster_displacement, apply_distance_space, classify_pair, half_displacement,
    score_violation, DisplacementAccumulator, PairKind, Violation,
};
