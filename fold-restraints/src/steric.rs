use std::collections::HashMap;

use fold_numeric::{safe_sqrt, Vec3};

use crate::bound_matrix::BoundMatrix;
use crate::cluster::ClusterAssignment;
use crate::score::{ScoreChannel, ScoreVector};

/// Which kind of pair a violation was classified as, driving both its target
/// strictness and its [`ScoreChannel`] (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    Bond,
    Geminal,
    SecStr,
    Restraint,
    NonBond,
}

impl PairKind {
    fn score_channel(self) -> ScoreChannel {
        match self {
            PairKind::Bond | PairKind::Geminal => ScoreChannel::Bond,
            PairKind::SecStr => ScoreChannel::SecStr,
            PairKind::Restraint => ScoreChannel::Restraint,
            PairKind::NonBond => ScoreChannel::NonBond,
        }
    }

    /// Light strictness for an in-bound pair, unless it already carries its own
    /// (bonds, external restraints) — §4.7 "keep d and assign a light strictness (0.1)".
    fn default_in_bound_strictness(self) -> f64 {
        match self {
            PairKind::Bond => 2.0,
            PairKind::Geminal => 1.5,
            PairKind::Restraint | PairKind::SecStr => 0.1,
            PairKind::NonBond => 0.1,
        }
    }
}

/// One classified pair violation: the reflected ideal distance `d_star`, the amplified
/// strictness to apply, and the channel it scores into.
#[derive(Debug, Clone, Copy)]
pub struct Violation {
    pub i: usize,
    pub j: usize,
    pub d: f64,
    pub d_star: f64,
    pub strictness: f64,
    pub kind: PairKind,
}

/// Smoothly reflects an out-of-bound distance back toward `[low, up]` (§4.7).
fn reflect(d: f64, low: f64, up: f64) -> f64 {
    if d > up {
        let over = d - up;
        up - (up - low) * over / ((up - low) + over)
    } else if d < low {
        let under = low - d;
        let bumped = low + under + ((up - 2.0 * low) / (low * low).max(1e-12)) * under * under;
        bumped.min(0.99 * up)
    } else {
        d
    }
}

/// Classifies one Cα pair `(i, j)` against its bound-matrix entry and returns the
/// violation to apply, or `None` if the pair is within bounds and needs no adjustment
/// beyond the light default strictness bookkeeping the caller already has.
///
/// `kind` is supplied by the caller (derived from `|i-j|` and whether the pair carries
/// an external restraint or secondary-structure idealisation) since that classification
/// depends on context the bound matrix alone does not retain.
pub fn classify_pair(bounds: &BoundMatrix, i: usize, j: usize, kind: PairKind, d_squared: f64) -> Violation {
    let d = safe_sqrt(d_squared);
    let low = bounds.low(i, j);
    let up = bounds.up(i, j);

    if d >= low && d <= up {
        return Violation { i, j, d, d_star: d, strictness: kind.default_in_bound_strictness(), kind };
    }

    let d_star = reflect(d, low, up);
    let relerr = if d > 1e-12 { (d_star - d).abs() / d } else { 0.0 };
    let base_strictness = bounds.strictness(i, j).max(kind.default_in_bound_strictness());
    let amplified = if matches!(kind, PairKind::Bond | PairKind::Geminal) {
        base_strictness * (1.0 + relerr).powi(4)
    } else {
        base_strictness
    };

    Violation { i, j, d, d_star, strictness: amplified, kind }
}

/// Scores a violation into the running [`ScoreVector`].
pub fn score_violation(scores: &mut ScoreVector, violation: &Violation) {
    let relerr = if violation.d > 1e-12 { (violation.d_star - violation.d).abs() / violation.d } else { 0.0 };
    scores.accumulate(violation.kind.score_channel(), relerr, violation.strictness);
}

/// Distance-space application (§4.7): blends the squared distance toward the squared
/// ideal by the violation's strictness.
pub fn apply_distance_space(distances: &mut HashMap<(usize, usize), f64>, violation: &Violation) {
    let key = if violation.i < violation.j { (violation.i, violation.j) } else { (violation.j, violation.i) };
    let s = violation.strictness.min(1.0);
    let current = *distances.get(&key).unwrap_or(&(violation.d * violation.d));
    let target = violation.d_star * violation.d_star;
    distances.insert(key, (1.0 - s) * current + s * target);
}

/// Per-atom accumulated Euclidean displacement (§4.7 "Euclidean-space" mode): a
/// strictness-weighted running average plus the single largest displacement seen, used
/// to detect "frustrated" atoms.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplacementAccumulator {
    weighted_sum: Vec3,
    weight_total: f64,
    largest: Vec3,
    largest_mag: f64,
}

impl DisplacementAccumulator {
    pub fn add(&mut self, displacement: Vec3, weight: f64) {
        let mut w = displacement;
        w *= weight;
        self.weighted_sum += &w;
        self.weight_total += weight;
        let mag = displacement.length();
        if mag > self.largest_mag {
            self.largest_mag = mag;
            self.largest = displacement;
        }
    }

    /// Total accumulated strictness weight, used to decide whether this atom
    /// contributed enough evidence to enter a between-cluster rigid fit.
    pub fn weight(&self) -> f64 { self.weight_total }

    /// The resolved displacement for this atom: the weighted average, unless it is
    /// "frustrated" (averaged magnitude less than a fifth of the largest single
    /// contribution), in which case the largest displacement alone is used (§4.7).
    pub fn resolve(&self) -> Vec3 {
        if self.weight_total <= 0.0 { return Vec3::from_float(0.0); }
        let mut avg = self.weighted_sum;
        avg /= self.weight_total;
        if avg.length() < self.largest_mag / 5.0 {
            self.largest
        } else {
            avg
        }
    }
}

/// Computes the half-displacement of atom `i` along the `i -> j` axis implied by a
/// violation, proportional to `(d*/d - 1)` (§4.7).
pub fn half_displacement(position_i: &Vec3, position_j: &Vec3, violation: &Violation) -> Vec3 {
    if violation.d < 1e-12 { return Vec3::from_float(0.0); }
    let axis = Vec3::sub_s(position_i, position_j);
    let factor = 0.5 * (violation.d_star / violation.d - 1.0);
    let mut displacement = axis;
    displacement *= factor;
    displacement
}

/// Applies a per-cluster rigid transform built from its members' net weighted
/// displacements (§4.7 "apply the displacement field as a rigid-body fit": weighted
/// centroid + Procrustes rotation per cluster). Each member that accumulated any
/// strictness-weighted evidence votes, with that weight, for where the cluster's rigid
/// frame should move to; every member of the cluster (whether or not it voted) is then
/// carried along by the fitted rotation + translation. Three or more non-collinear
/// voters fully determine that rotation; only a cluster whose voters are collinear or
/// fewer than two falls back to [`ProcrustesFit`]'s own rank-deficiency handling, which
/// degrades gracefully to a translation by the weighted-centroid shift alone.
pub fn apply_between_cluster_displacement(
    positions: &mut HashMap<usize, Vec3>,
    clusters: &ClusterAssignment,
    accumulators: &HashMap<usize, DisplacementAccumulator>,
) {
    for cluster in clusters.clusters() {
        let members: Vec<usize> = cluster.residues().collect();
        if members.is_empty() { continue; }

        let mut original = Vec::new();
        let mut displaced = Vec::new();
        let mut weights = Vec::new();
        for &m in &members {
            let (Some(&p), Some(acc)) = (positions.get(&m), accumulators.get(&m)) else { continue };
            let w = acc.weight();
            if w <= 0.0 { continue; }
            original.push(p);
            displaced.push(Vec3::add_s(&p, &acc.resolve()));
            weights.push(w);
        }
        if original.is_empty() { continue; }

        let fit = fold_numeric::procrustes_fit(&original, &displaced, &weights, false);
        for &m in &members {
            if let Some(p) = positions.get_mut(&m) {
                *p = fit.apply(p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_in_bound_distance_needs_no_reflection() {
        let mut bounds = BoundMatrix::new(3);
        bounds.set_bound(1, 0, 3.0, 4.0, 1.0, false);
        let v = classify_pair(&bounds, 1, 0, PairKind::NonBond, 3.5 * 3.5);
        assert!((v.d_star - v.d).abs() < 1e-9);
    }

    #[test]
    fn an_over_long_distance_reflects_back_below_the_upper_bound() {
        let mut bounds = BoundMatrix::new(3);
        bounds.set_bound(1, 0, 3.0, 4.0, 1.0, false);
        let v = classify_pair(&bounds, 1, 0, PairKind::NonBond, 10.0 * 10.0);
        assert!(v.d_star < 4.0);
    }

    #[test]
    fn bond_violations_amplify_strictness_with_relative_error() {
        let mut bounds = BoundMatrix::new(3);
        bounds.set_bound(1, 0, 3.75, 3.85, 2.0, true);
        let v = classify_pair(&bounds, 1, 0, PairKind::Bond, 5.0 * 5.0);
        assert!(v.strictness > 2.0);
    }

    #[test]
    fn a_frustrated_atom_takes_the_largest_displacement() {
        let mut acc = DisplacementAccumulator::default();
        acc.add(Vec3::new(1.0, 0.0, 0.0), 1.0);
        acc.add(Vec3::new(-1.0, 0.0, 0.0), 1.0);
        acc.add(Vec3::new(5.0, 0.0, 0.0), 0.01);
        let resolved = acc.resolve();
        assert!(resolved.x > 4.0);
    }

    /// §4.7 "between clusters" mode applies the displacement field as a rigid-body fit:
    /// when three members of a cluster vote for displacements consistent with a 90-degree
    /// rotation about the cluster centroid, the whole cluster (including a member that
    /// cast no vote) is carried along rigidly, preserving pairwise distances.
    #[test]
    fn a_between_cluster_displacement_applies_as_one_rigid_transform() {
        use crate::cluster::{Cluster, ClusterAssignment};

        let original = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(2.0, 2.0, 2.0), // a non-voting member, still carried along
        ];
        // rotate 90 degrees about z: (x, y, z) -> (-y, x, z)
        let rotated: Vec<Vec3> = original.iter().map(|p| Vec3::new(-p.y, p.x, p.z)).collect();

        let mut positions = HashMap::new();
        for (i, p) in original.iter().enumerate() { positions.insert(i, *p); }

        let mut accumulators = HashMap::new();
        for i in 0..3 {
            let mut acc = DisplacementAccumulator::default();
            let delta = Vec3::sub_s(&rotated[i], &original[i]);
            acc.add(delta, 1.0);
            accumulators.insert(i, acc);
        }

        let cluster = Cluster::from_residues(4, [0, 1, 2, 3]);
        let assignment = ClusterAssignment::new(4, vec![cluster]);
        apply_between_cluster_displacement(&mut positions, &assignment, &accumulators);

        for i in 0..4 {
            assert!(positions[&i].distance_to(&rotated[i]) < 1e-6, "member {i}: {:?} vs expected {:?}", positions[&i], rotated[i]);
        }
        // pairwise distances within the cluster are preserved by a rigid transform
        assert!((positions[&0].distance_to(&positions[&3]) - original[0].distance_to(&original[3])).abs() < 1e-6);
    }
}
