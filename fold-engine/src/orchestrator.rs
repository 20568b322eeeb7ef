use std::collections::HashMap;

use fold_numeric::{PortableRng, TriMatrix, Vec3};
use fold_polymer::{AminoAcid, Residue};
use fold_restraints::{
    apply_between_cluster_displacement, classify_pair, half_displacement, score_violation,
    Cluster, ClusterAssignment, DisplacementAccumulator, ExternalRestraintList, PairKind,
    RestraintCompiler, ScoreVector,
};
use fold_secstr::{reflect_through_x_axis, SecStrElement};
use log::{debug, info};

use crate::accessibility::{AccessAssignment, AccessibilityEngine};
use crate::config::EngineParams;
use crate::error::FoldError;
use crate::fakebeta::FakeBetaEngine;
use crate::hydrophobic::HydrophobicPredictor;
use crate::initializer::Initializer;
use crate::spectral::{embed, embedding_dimension};
use crate::specgrad;

/// Blend strength the whole-element ideal fit is applied with each outer iteration
/// (§4.6). Unlike the per-pair steric strictness, this is a single constant: the ideal
/// fit is a soft pull toward the template on every iteration, not a once-and-done snap.
const IDEAL_FIT_BLEND: f64 = 0.5;

/// Everything the orchestrator needs to run one reconstruction (§4.3 inputs).
pub struct ReconstructionRequest<'a> {
    pub identities: Vec<AminoAcid>,
    pub residue_table: &'a HashMap<AminoAcid, Residue>,
    pub secondary_structure: Vec<SecStrElement>,
    pub externals: ExternalRestraintList,
    pub accessibility: HashMap<usize, AccessAssignment>,
    /// Homology-derived Cα positions, keyed by target residue index, already resolved
    /// from the alignment and homologue structure upstream (§1, §6 `Homfnm`). Empty when
    /// no homologue is supplied.
    pub homologue_ca: HashMap<usize, Vec3>,
    pub params: EngineParams,
}

/// The reconstructed chain plus the bookkeeping the caller needs to judge quality
/// (§4.3 output). `positions` is keyed by chain-atom index, `0` and `len+1` the two
/// virtual termini, `1..=len` the residues' Cα coordinates.
#[derive(Debug, Clone)]
pub struct ReconstructionOutput {
    pub positions: HashMap<usize, Vec3>,
    pub scores: ScoreVector,
    pub iterations_run: u32,
    pub triangle_violations: usize,
}

/// Classifies one Cα pair for the steric adjuster (§4.7): bonded/geminal by sequence
/// separation, an explicit CA:CA external restraint or a homology-derived distance
/// (both score as RESTRAINT), a secondary-structure idealisation (recognised as a
/// non-bond/geminal pair the compiler nonetheless marked hard), else a plain non-bonded
/// pair.
fn classify_kind(bounds: &fold_restraints::BoundMatrix, externals: &ExternalRestraintList, i: usize, j: usize) -> PairKind {
    if j + 1 == i {
        return PairKind::Bond;
    }
    if j + 2 == i {
        return PairKind::Geminal;
    }
    let is_restrained = externals.iter().any(|r| {
        r.is_ca_ca() && ((r.residue1 == i && r.residue2 == j) || (r.residue1 == j && r.residue2 == i))
    });
    if is_restrained || bounds.is_homology(i, j) {
        return PairKind::Restraint;
    }
    if bounds.is_hard(i, j) {
        return PairKind::SecStr;
    }
    PairKind::NonBond
}

/// One rigid piece per secondary-structure element, plus one piece per maximal run of
/// residues covered by no element.
fn build_clusters(n: usize, residue_count: usize, elements: &[SecStrElement]) -> ClusterAssignment {
    let mut clusters = Vec::new();
    let mut covered = vec![false; residue_count + 1];

    for element in elements {
        let residues = element.residues();
        if residues.is_empty() {
            continue;
        }
        for &r in &residues {
            if r <= residue_count {
                covered[r] = true;
            }
        }
        clusters.push(Cluster::from_residues(n, residues));
    }

    let mut run = Vec::new();
    for r in 1..=residue_count {
        if covered[r] {
            if !run.is_empty() {
                clusters.push(Cluster::from_residues(n, run.drain(..)));
            }
        } else {
            run.push(r);
        }
    }
    if !run.is_empty() {
        clusters.push(Cluster::from_residues(n, run.drain(..)));
    }

    ClusterAssignment::new(n, clusters)
}

/// Derives each interior residue's fake-β (side-chain centroid) Cartesian position
/// directly from the current coordinates (§4.5 geometry, evaluated in Cartesian space
/// rather than from the squared-distance matrix since the accessibility engine needs
/// actual points to measure cone angles between). Mirrors [`crate::fakebeta::FakeBetaEngine`]'s
/// `H`/`mu` construction; glycine and the two termini (`target <= 0`) map to their own Cα.
fn fake_beta_cartesian(x: &[Vec3], targets: &[f64]) -> HashMap<usize, Vec3> {
    let n = x.len();
    let mut out = HashMap::with_capacity(n.saturating_sub(2));
    for i in 1..n.saturating_sub(1) {
        let t = targets[i];
        if t <= 0.0 {
            out.insert(i, x[i]);
            continue;
        }
        let h = Vec3::midpoint(&x[i - 1], &x[i + 1]);
        let axis = Vec3::sub_s(&x[i], &h);
        let len = axis.length();
        if len < 1e-9 {
            out.insert(i, x[i]);
            continue;
        }
        let mut j_offset = axis;
        j_offset *= t / len;
        out.insert(i, Vec3::add_s(&x[i], &j_offset));
    }
    out
}

fn squared_distance_matrix(x: &[Vec3]) -> TriMatrix {
    let n = x.len();
    let mut delta2 = TriMatrix::new(n, 0.0);
    for i in 1..n {
        for j in 0..i {
            delta2.set(i, j, x[i].distance_square_to(&x[j]));
        }
    }
    delta2
}

/// Runs one full reconstruction (§4.3): compiles restraints, draws an initial
/// distance matrix, then repeatedly re-embeds, idealises secondary structure, relaxes
/// steric violations and (when requested) rescales for accessibility, accepting each
/// outer iteration only if it lowers the total score by at least `min_change`, or
/// stopping once the score itself falls below `min_score`.
pub fn reconstruct(request: ReconstructionRequest) -> Result<ReconstructionOutput, FoldError> {
    if request.identities.is_empty() {
        return Err(FoldError::EmptyChain);
    }

    let mut params = request.params;
    params.validate();

    let residue_count = request.identities.len();
    let n = residue_count + 2;
    let mut secondary_structure = request.secondary_structure;
    let externals = request.externals;

    let compiler = RestraintCompiler::new(residue_count, params.density, request.residue_table, &request.identities);
    let compiled = compiler.compile(
        &mut secondary_structure,
        &externals,
        &request.homologue_ca,
        params.min_separ as usize,
        params.max_dist,
    );
    let bounds = compiled.bounds;

    let mut rng = PortableRng::new(params.rand_seed as i64);
    let initializer = Initializer::new(request.residue_table, params.density);
    let hydro = HydrophobicPredictor::default();
    let mut delta2 = initializer.initialize(&request.identities, &bounds, &hydro, &mut rng);

    let mut targets = vec![0.0; n];
    for (i, identity) in request.identities.iter().enumerate() {
        targets[i + 1] = request.residue_table.get(identity).map(|r| r.ca_scc_distance).unwrap_or(0.0);
    }
    let hydrophobicity: HashMap<AminoAcid, f64> = request.residue_table.iter().map(|(&id, r)| (id, r.hydrophobicity)).collect();

    let clusters = build_clusters(n, residue_count, &secondary_structure);
    let access_engine = AccessibilityEngine::new(&request.identities, &hydrophobicity);

    let mut x: Vec<Vec3> = embed(&delta2, embedding_dimension(residue_count, 0, params.tang_iter), params.evfract)
        .into_iter()
        .map(|c| Vec3::new(c.first().copied().unwrap_or(0.0), c.get(1).copied().unwrap_or(0.0), c.get(2).copied().unwrap_or(0.0)))
        .collect();

    let mut accepted_x = x.clone();
    let mut accepted_delta2 = delta2.clone();
    let mut accepted_scores = ScoreVector::new();
    let mut accepted_total = f64::INFINITY;
    let mut iterations_run = 0;

    for t in 0..params.max_iter {
        let d_t = embedding_dimension(residue_count, t, params.tang_iter);
        if t > 0 {
            x = embed(&delta2, d_t, params.evfract)
                .into_iter()
                .map(|c| Vec3::new(c.first().copied().unwrap_or(0.0), c.get(1).copied().unwrap_or(0.0), c.get(2).copied().unwrap_or(0.0)))
                .collect();
        }

        let mut model: HashMap<usize, Vec3> = (0..n).map(|i| (i, x[i])).collect();
        let mut good = 0usize;
        let mut bad = 0usize;
        for element in secondary_structure.iter_mut() {
            element.ideal_fit(&mut model, IDEAL_FIT_BLEND);
            let (g, b) = element.check_handedness(&model);
            good += g;
            bad += b;
        }
        if bad > good {
            debug!("iteration {t}: handedness check failed ({bad} bad vs {good} good), reflecting model");
            reflect_through_x_axis(&mut model);
        }
        for i in 0..n {
            x[i] = model[&i];
        }

        let mut scores = ScoreVector::new();
        if d_t == 3 {
            let mut target = TriMatrix::new(n, 0.0);
            let mut weight = TriMatrix::new(n, 0.0);
            for i in 1..n {
                for j in 0..i {
                    let kind = classify_kind(&bounds, &externals, i, j);
                    let violation = classify_pair(&bounds, i, j, kind, x[i].distance_square_to(&x[j]));
                    score_violation(&mut scores, &violation);
                    target.set(i, j, violation.d_star);
                    weight.set(i, j, violation.strictness);
                }
            }
            let (relaxed, stress) = specgrad::iterate(&target, &weight, &x, params.spec_eps, params.spec_iter);
            debug!("iteration {t}: spectral-gradient stress={stress:.6}");
            x = relaxed;
        } else {
            let mut within_acc: HashMap<usize, DisplacementAccumulator> = HashMap::new();
            let mut between_acc: HashMap<usize, DisplacementAccumulator> = HashMap::new();
            for i in 1..n {
                for j in 0..i {
                    let kind = classify_kind(&bounds, &externals, i, j);
                    let violation = classify_pair(&bounds, i, j, kind, x[i].distance_square_to(&x[j]));
                    score_violation(&mut scores, &violation);

                    let displacement = half_displacement(&x[i], &x[j], &violation);
                    let mut negated = displacement;
                    negated *= -1.0;
                    if clusters.is_within(i, j) {
                        within_acc.entry(i).or_default().add(displacement, violation.strictness);
                        within_acc.entry(j).or_default().add(negated, violation.strictness);
                    } else {
                        between_acc.entry(i).or_default().add(displacement, violation.strictness);
                        between_acc.entry(j).or_default().add(negated, violation.strictness);
                    }
                }
            }

            let mut positions: HashMap<usize, Vec3> = (0..n).map(|i| (i, x[i])).collect();
            for (&atom, acc) in within_acc.iter() {
                if let Some(p) = positions.get_mut(&atom) {
                    *p += &acc.resolve();
                }
            }
            apply_between_cluster_displacement(&mut positions, &clusters, &between_acc);
            for (&atom, acc) in between_acc.iter() {
                if clusters.clusters().iter().all(|c| !c.contains(atom)) {
                    if let Some(p) = positions.get_mut(&atom) {
                        *p += &acc.resolve();
                    }
                }
            }
            for i in 0..n {
                x[i] = positions[&i];
            }
        }

        if !request.accessibility.is_empty() {
            let fake_beta = fake_beta_cartesian(&x, &targets);
            let mut positions: HashMap<usize, Vec3> = (1..n - 1).map(|i| (i, x[i])).collect();
            let is_hbonded = |residue: usize| secondary_structure.iter().any(|e| e.hbond_partner(residue).is_some());
            access_engine.rescale(&mut positions, &fake_beta, &request.accessibility, is_hbonded);
            for (&residue, &p) in positions.iter() {
                x[residue] = p;
            }
        }

        delta2 = squared_distance_matrix(&x);
        let total = scores.total();
        iterations_run = t + 1;

        let improved = accepted_total - total;
        let converged_low = total < params.min_score;
        let converged_change = accepted_total.is_finite() && improved < params.min_change * accepted_total.max(1e-12);

        if t == 0 || total < accepted_total {
            accepted_x = x.clone();
            accepted_delta2 = delta2.clone();
            accepted_scores = scores;
            accepted_total = total;
        } else {
            debug!("iteration {t}: score did not improve ({total:.6} vs {accepted_total:.6}), rolling back");
            x = accepted_x.clone();
            delta2 = accepted_delta2.clone();
            break;
        }

        info!("iteration {t}: total score {total:.6}");
        if converged_low || (t > 0 && converged_change) {
            break;
        }
    }

    let fake_beta_engine = FakeBetaEngine::new(targets.clone());
    for i in 1..n - 1 {
        let realized = fake_beta_engine.ca_scc_distance(&accepted_delta2, i);
        debug!("residue {i}: realised Ca-SCC distance {realized:.3} (target {:.3})", targets[i]);
    }

    let positions: HashMap<usize, Vec3> = (0..n).map(|i| (i, accepted_x[i])).collect();
    Ok(ReconstructionOutput {
        positions,
        scores: accepted_scores,
        iterations_run,
        triangle_violations: compiled.triangle_violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fold_polymer::default_residue_table;

    /// §8 S1: a short poly-Ala chain with no secondary structure and no restraints still
    /// converges to a chain whose adjacent Cα-Cα distances sit in the compiled bond
    /// window, and the run reports at least one iteration.
    #[test]
    fn a_short_chain_reconstructs_with_bonds_in_window() {
        let table = default_residue_table();
        let identities = vec![AminoAcid::Ala, AminoAcid::Gly, AminoAcid::Leu, AminoAcid::Val, AminoAcid::Ser];
        let request = ReconstructionRequest {
            identities: identities.clone(),
            residue_table: &table,
            secondary_structure: Vec::new(),
            externals: ExternalRestraintList::new(),
            accessibility: HashMap::new(),
            homologue_ca: HashMap::new(),
            params: EngineParams { max_iter: 8, spec_iter: 15, ..EngineParams::default() },
        };
        let result = reconstruct(request).expect("reconstruction should succeed");
        assert!(result.iterations_run >= 1);
        for i in 1..=identities.len() {
            let d = result.positions[&i].distance_to(&result.positions[&(i - 1)]);
            assert!(d > 0.5 && d < 6.0, "bond {i} distance out of a sane range: {d}");
        }
    }

    #[test]
    fn an_empty_chain_is_rejected() {
        let table = default_residue_table();
        let request = ReconstructionRequest {
            identities: Vec::new(),
            residue_table: &table,
            secondary_structure: Vec::new(),
            externals: ExternalRestraintList::new(),
            accessibility: HashMap::new(),
            homologue_ca: HashMap::new(),
            params: EngineParams::default(),
        };
        assert!(matches!(reconstruct(request), Err(FoldError::EmptyChain)));
    }
}
