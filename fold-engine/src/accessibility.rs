use std::collections::HashMap;

use fold_numeric::{planar_angle3, Vec3};
use fold_polymer::AminoAcid;
use log::debug;

/// Radius, Å, within which a residue's fake-β position counts as a neighbour when
/// computing another residue's cone-shieldedness (§4.10).
const NEIGHBOUR_RADIUS: f64 = 8.0;

/// The seven classes a residue's shieldedness score is bucketed into by the six
/// per-amino-acid percentile thresholds (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BurialClass {
    VeryExposed,
    MediumExposed,
    SlightlyExposed,
    Average,
    SlightlyBuried,
    MediumBuried,
    VeryBuried,
}

impl BurialClass {
    const ORDER: [BurialClass; 7] = [
        BurialClass::VeryExposed, BurialClass::MediumExposed, BurialClass::SlightlyExposed,
        BurialClass::Average, BurialClass::SlightlyBuried, BurialClass::MediumBuried,
        BurialClass::VeryBuried,
    ];

    /// Classifies a shieldedness score against six ascending percentile thresholds,
    /// giving seven classes (§4.10).
    pub fn classify(shieldedness: f64, thresholds: &[f64; 6]) -> BurialClass {
        let idx = thresholds.iter().filter(|&&t| shieldedness > t).count();
        Self::ORDER[idx]
    }
}

/// Six empirical percentile thresholds per amino acid, bracketing the seven
/// [`BurialClass`]es. Lacking a historical per-residue-type percentile table, this uses
/// one representative ascending set, scaled slightly by the residue's own hydrophobicity
/// (more hydrophobic residues bury more often, so their thresholds sit a little lower).
pub fn burial_thresholds(identity: AminoAcid, hydrophobicity: f64) -> [f64; 6] {
    let base = [-0.6, -0.3, -0.1, 0.1, 0.3, 0.6];
    let shift = -0.15 * (hydrophobicity - 0.5);
    let _ = identity; // kept for signature symmetry with a real per-type table
    let mut out = base;
    for t in out.iter_mut() { *t += shift; }
    out
}

/// A requested surface/buried assignment for a residue (§6 "Accessibility input").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAssignment {
    Surface,
    Buried,
}

/// The rescale factors the accessibility engine is allowed to choose among (§4.10).
const RESCALE_FACTORS: [f64; 7] = [0.90, 0.95, 0.99, 1.00, 1.01, 1.05, 1.10];
/// Extra outward pull applied to an assigned residue that participates in no modelled
/// hydrogen bond (§4.10).
const UNBONDED_PULL: f64 = 1.10;

/// Per-residue result of one shieldedness computation (§4.10).
#[derive(Debug, Clone, Copy)]
pub struct Shieldedness {
    pub value: f64,
    pub neighbour_count: usize,
}

/// Cone-shieldedness statistic and radial-rescale adjustment over fake-β positions
/// (§4.10). Operates purely on a position map (Cα or fake-β positions keyed by residue)
/// plus each residue's identity/hydrophobicity — it does not itself know about the
/// distance matrix or the restraint compiler.
pub struct AccessibilityEngine<'a> {
    identities: &'a [AminoAcid],
    hydrophobicity: &'a HashMap<AminoAcid, f64>,
}

impl<'a> AccessibilityEngine<'a> {
    pub fn new(identities: &'a [AminoAcid], hydrophobicity: &'a HashMap<AminoAcid, f64>) -> Self {
        AccessibilityEngine { identities, hydrophobicity }
    }

    fn neighbours_of(&self, k: usize, fake_beta: &HashMap<usize, Vec3>) -> Vec<usize> {
        let center = fake_beta[&k];
        fake_beta
            .iter()
            .filter(|&(&j, _)| j != k && j >= 1 && j <= self.identities.len())
            .filter(|&(_, p)| p.distance_to(&center) <= NEIGHBOUR_RADIUS)
            .map(|(&j, _)| j)
            .collect()
    }

    /// Computes the relative shieldedness `(theta_max - pi/2) / (pi/2)` of residue `k`:
    /// the largest angle any neighbour within 8 Å subtends at `k` around the common
    /// centroid of all such neighbours (§4.10). `None` if `k` has no neighbours (an
    /// isolated residue is neither exposed nor buried by this statistic).
    pub fn shieldedness(&self, k: usize, fake_beta: &HashMap<usize, Vec3>) -> Option<Shieldedness> {
        if !self.identities_has(k) { return None; }
        let neighbours = self.neighbours_of(k, fake_beta);
        if neighbours.is_empty() { return None; }

        let mut centroid = Vec3::from_float(0.0);
        for &j in &neighbours { centroid += &fake_beta[&j]; }
        centroid /= neighbours.len() as f64;

        let center = fake_beta[&k];
        let mut theta_max = 0.0f64;
        for &j in &neighbours {
            let angle = planar_angle3(&fake_beta[&j], &center, &centroid);
            if angle.is_finite() && angle > theta_max { theta_max = angle; }
        }

        let value = (theta_max - std::f64::consts::FRAC_PI_2) / std::f64::consts::FRAC_PI_2;
        Some(Shieldedness { value, neighbour_count: neighbours.len() })
    }

    fn identities_has(&self, k: usize) -> bool { k >= 1 && k <= self.identities.len() }

    /// Classifies residue `k` into a [`BurialClass`] from its current shieldedness.
    pub fn classify(&self, k: usize, fake_beta: &HashMap<usize, Vec3>) -> Option<BurialClass> {
        let s = self.shieldedness(k, fake_beta)?;
        let identity = self.identities[k - 1];
        let hydro = self.hydrophobicity.get(&identity).copied().unwrap_or(0.5);
        Some(BurialClass::classify(s.value, &burial_thresholds(identity, hydro)))
    }

    /// Picks the smallest-magnitude rescale factor (from [`RESCALE_FACTORS`]) that moves
    /// `current`'s class across the boundary toward `target`. Returns `1.00` (no change)
    /// if `current` already matches `target` or no listed factor would help.
    fn pick_rescale_factor(current: BurialClass, target: AccessAssignment) -> f64 {
        let moving_toward_surface = target == AccessAssignment::Surface;
        // Surface assignments pull a residue toward VeryExposed (rescale > 1, i.e. push
        // the Cα further out); buried assignments pull it toward VeryBuried (rescale < 1,
        // pull the Cα inward).
        let already_there = match (current, target) {
            (BurialClass::VeryExposed, AccessAssignment::Surface) => true,
            (BurialClass::VeryBuried, AccessAssignment::Buried) => true,
            _ => false,
        };
        if already_there { return 1.00; }

        let mut candidates: Vec<f64> = if moving_toward_surface {
            RESCALE_FACTORS.iter().copied().filter(|&f| f > 1.0).collect()
        } else {
            RESCALE_FACTORS.iter().copied().filter(|&f| f < 1.0).collect()
        };
        candidates.sort_by(|a, b| (a - 1.0).abs().partial_cmp(&(b - 1.0).abs()).unwrap());
        candidates.into_iter().next().unwrap_or(1.00)
    }

    /// Radially rescales every assigned residue's Cα position toward its prescribed
    /// surface/buried class (§4.10), recentring around the whole model's centroid.
    /// Residues flagged by the assignment but with no modelled hydrogen-bond partner
    /// (`hbonded` returns `false`) get an additional [`UNBONDED_PULL`] applied in the
    /// same outward/inward direction.
    pub fn rescale(
        &self,
        positions: &mut HashMap<usize, Vec3>,
        fake_beta: &HashMap<usize, Vec3>,
        assignments: &HashMap<usize, AccessAssignment>,
        is_hbonded: impl Fn(usize) -> bool,
    ) {
        if assignments.is_empty() { return; }

        let mut centroid = Vec3::from_float(0.0);
        let n = positions.len() as f64;
        for p in positions.values() { centroid += p; }
        if n > 0.0 { centroid /= n; }

        for (&residue, &target) in assignments.iter() {
            let Some(class) = self.classify(residue, fake_beta) else { continue };
            let mut factor = Self::pick_rescale_factor(class, target);
            if factor == 1.00 { continue; }
            if !is_hbonded(residue) {
                factor *= UNBONDED_PULL;
            }

            if let Some(p) = positions.get_mut(&residue) {
                let mut radial = Vec3::sub_s(p, &centroid);
                radial *= factor;
                *p = Vec3::add_s(&centroid, &radial);
            }
        }
        debug!("accessibility rescale applied to {} of {} assigned residues", assignments.len(), positions.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_residue_marked_both_surface_and_buried_is_cleared_by_the_caller() {
        // §6: "a residue marked both ways is cleared" is the *parser's* job (out of
        // scope here); this engine only ever sees a resolved, single-valued map. We
        // assert the simpler invariant: an empty assignment map rescales nothing.
        let identities = vec![AminoAcid::Ala, AminoAcid::Leu, AminoAcid::Val];
        let hydro = HashMap::new();
        let engine = AccessibilityEngine::new(&identities, &hydro);
        let mut positions = HashMap::new();
        positions.insert(1usize, Vec3::new(0.0, 0.0, 0.0));
        let before = positions.clone();
        engine.rescale(&mut positions, &HashMap::new(), &HashMap::new(), |_| true);
        assert_eq!(positions[&1].x, before[&1].x);
    }

    #[test]
    fn burial_classes_are_monotone_in_shieldedness() {
        let thresholds = [-0.6, -0.3, -0.1, 0.1, 0.3, 0.6];
        assert_eq!(BurialClass::classify(-0.9, &thresholds), BurialClass::VeryExposed);
        assert_eq!(BurialClass::classify(0.9, &thresholds), BurialClass::VeryBuried);
        assert_eq!(BurialClass::classify(0.0, &thresholds), BurialClass::Average);
    }

    #[test]
    fn picking_a_rescale_factor_toward_surface_picks_the_smallest_expansion() {
        let f = AccessibilityEngine::pick_rescale_factor(BurialClass::MediumBuried, AccessAssignment::Surface);
        assert_eq!(f, 1.01);
    }

    #[test]
    fn an_already_satisfied_class_needs_no_rescale() {
        let f = AccessibilityEngine::pick_rescale_factor(BurialClass::VeryBuried, AccessAssignment::Buried);
        assert_eq!(f, 1.00);
    }
}
