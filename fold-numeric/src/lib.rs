//! Numeric kernel for the distance-geometry reconstruction engine: `Vec3`/`Matrix3x3`,
//! triangular-matrix storage, LU/SVD-backed linear algebra, weighted Procrustes fit, a
//! deterministic portable PRNG and cubic splines.
//!
//! Everything in this crate is pure, allocation-light numerics; it has no notion of a
//! residue, a chain, or a restraint — those live in `fold-polymer` and `fold-restraints`.

mod dense;
mod guards;
mod matrix3x3;
mod procrustes;
mod rng;
mod spline;
mod tri_matrix;
mod vec3;

pub use dense::{lu_determinant, svd_rank, symmetric_spectrum, LuResult, RANK_EPSILON, SymmetricSpectrum};
pub use guards::{assert_not_nan, clamp_finite, safe_div, safe_sqrt};
pub use matrix3x3::Matrix3x3;
pub use procrustes::{fit as procrustes_fit, weighted_centroid, ProcrustesFit};
pub use rng::PortableRng;
pub use spline::{BoundaryCondition, CubicSpline};
pub use tri_matrix::TriMatrix;
pub use vec3::{dihedral_angle4, planar_angle2, planar_angle3, Vec3};
