//! Weighted rigid-body (Procrustes) superposition, after McLachlan's best-rotation
//! algorithm rather than an unweighted Kabsch fit. Used by the secondary-structure
//! ideal-fit (§4.6), the between-cluster Euclidean steric adjustment (§4.7), and the
//! side-chain backbone superposition (§4.11).

use nalgebra::{Matrix3, SVD};

use crate::dense::svd_rank;
use crate::{Matrix3x3, Vec3};
use nalgebra::DMatrix;

/// Outcome of a weighted Procrustes fit of a `mobile` point set onto a `target` one.
pub struct ProcrustesFit {
    /// Rotation to apply to a centred `mobile` point to land it on `target`.
    pub rotation: Matrix3x3,
    /// Weighted centroid of the mobile set (subtract before rotating).
    pub mobile_centroid: Vec3,
    /// Weighted centroid of the target set (add after rotating).
    pub target_centroid: Vec3,
    /// Weighted RMS deviation after the fit, or the §7 sentinel `-1.0` when the point
    /// set was rank-deficient (fewer than 2 independent directions after centering —
    /// collinear points, or fewer than two distinct points) and no rotation could be
    /// determined.
    pub rmsd: f64,
    /// `true` if the cross-covariance determinant was negative, i.e. the optimal
    /// *unconstrained* rotation would have been a reflection.
    pub is_reflection: bool,
}

impl ProcrustesFit {
    pub fn is_degenerate(&self) -> bool { self.rmsd < 0.0 }

    /// Applies this fit to a point, i.e. `target_centroid + R * (p - mobile_centroid)`.
    pub fn apply(&self, p: &Vec3) -> Vec3 {
        let centred = Vec3::sub_s(p, &self.mobile_centroid);
        let rotated = self.rotation.apply(&centred);
        Vec3::add_s(&rotated, &self.target_centroid)
    }
}

/// Weighted centroid of a point set; mirrors `center_vectors()` from `bestrot.h`.
pub fn weighted_centroid(points: &[Vec3], weights: &[f64]) -> Vec3 {
    let mut total = 0.0;
    let mut c = Vec3::from_float(0.0);
    for (p, w) in points.iter().zip(weights.iter()) {
        let mut wp = *p;
        wp *= *w;
        c += &wp;
        total += w;
    }
    if total > 0.0 { c /= total; }
    c
}

/// Computes the best weighted rotation bringing `mobile` onto `target`.
///
/// `allow_reflection` mirrors the "explicit flip mode" of §4.12: when `true`, the fit
/// is allowed to return an improper rotation (a reflection) if that minimises RMS;
/// when `false`, a det < 0 solution is corrected back to a proper rotation by flipping
/// the sign of the smallest singular vector, as McLachlan's algorithm does.
pub fn fit(mobile: &[Vec3], target: &[Vec3], weights: &[f64], allow_reflection: bool) -> ProcrustesFit {
    assert_eq!(mobile.len(), target.len());
    assert_eq!(mobile.len(), weights.len());
    let n = mobile.len();

    let mobile_centroid = weighted_centroid(mobile, weights);
    let target_centroid = weighted_centroid(target, weights);

    // Cross-covariance H = sum_i w_i * (target_i - target_c) (mobile_i - mobile_c)^T
    let mut h = Matrix3::zeros();
    for i in 0..n {
        let m = Vec3::sub_s(&mobile[i], &mobile_centroid);
        let t = Vec3::sub_s(&target[i], &target_centroid);
        let w = weights[i];
        for r in 0..3 {
            for c in 0..3 {
                h[(r, c)] += w * t[r] * m[c];
            }
        }
    }

    // Centering always removes one degree of freedom, so an exact-3-point fit caps out
    // at rank 2 even for three perfectly non-collinear points — that is the expected,
    // fully-determined case, not a degenerate one. Only fewer than 2 independent
    // directions (collinear points, or fewer than two distinct points) leaves the
    // rotation genuinely underdetermined.
    let h_dyn = DMatrix::from_iterator(3, 3, h.iter().cloned());
    if svd_rank(&h_dyn) < 2 {
        return ProcrustesFit {
            rotation: Matrix3x3::identity(),
            mobile_centroid,
            target_centroid,
            rmsd: -1.0,
            is_reflection: false,
        };
    }

    // `nalgebra::SVD` on a square 3x3 matrix always returns full 3-column U/V bases, with
    // the null-space direction (when rank < 3) filled in consistently by the algorithm, so
    // U * V^T already completes the rotation for the rank-2 case via the same formula.
    let svd = SVD::new(h, true, true);
    let u = svd.u.expect("SVD of a 3x3 matrix must produce U");
    let v_t = svd.v_t.expect("SVD of a 3x3 matrix must produce V^T");
    let det_sign = (u.determinant() * v_t.determinant()).signum();
    let is_reflection = det_sign < 0.0;

    // An unconstrained least-squares fit (U * V^T) can be an improper rotation. Unless the
    // caller explicitly allows that, flip the smallest-variance axis to force det(R) = +1,
    // exactly as McLachlan's best_rot corrects for a reflection.
    let correct = is_reflection && !allow_reflection;
    let d = Matrix3::from_diagonal(&nalgebra::Vector3::new(1.0, 1.0, if correct { -1.0 } else { 1.0 }));

    let r = u * d * v_t;
    let rotation = Matrix3x3::from_array([
        r[(0, 0)], r[(0, 1)], r[(0, 2)],
        r[(1, 0)], r[(1, 1)], r[(1, 2)],
        r[(2, 0)], r[(2, 1)], r[(2, 2)],
    ]);

    let mut sum_sq = 0.0;
    let mut sum_w = 0.0;
    for i in 0..n {
        let m = Vec3::sub_s(&mobile[i], &mobile_centroid);
        let t = Vec3::sub_s(&target[i], &target_centroid);
        let fitted = rotation.apply(&m);
        sum_sq += weights[i] * fitted.distance_square_to(&t);
        sum_w += weights[i];
    }
    let rmsd = if sum_w > 0.0 { (sum_sq / sum_w).sqrt() } else { 0.0 };

    ProcrustesFit { rotation, mobile_centroid, target_centroid, rmsd, is_reflection }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitting_a_point_set_onto_itself_is_the_identity() {
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let weights = vec![1.0; 4];
        let result = fit(&pts, &pts, &weights, false);
        assert!(result.rmsd < 1e-9);
        for p in &pts {
            assert!(result.apply(p).distance_to(p) < 1e-9);
        }
    }

    #[test]
    fn fitting_a_rotated_copy_recovers_zero_rmsd() {
        let pts = vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        ];
        // rotate 90deg around z: (x,y,z) -> (-y,x,z)
        let rotated: Vec<Vec3> = pts.iter().map(|p| Vec3::new(-p.y, p.x, p.z)).collect();
        let weights = vec![1.0; 4];
        let result = fit(&pts, &rotated, &weights, false);
        assert!(result.rmsd < 1e-6);
    }

    #[test]
    fn collinear_points_are_rank_deficient() {
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        let weights = vec![1.0; 3];
        let result = fit(&pts, &pts, &weights, false);
        assert!(result.is_degenerate());
        assert_eq!(result.rmsd, -1.0);
    }
}
