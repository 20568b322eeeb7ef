use std::collections::HashMap;

use fold_numeric::{PortableRng, TriMatrix};
use fold_polymer::{AminoAcid, Residue};
use fold_restraints::{r_exp, BoundMatrix};

use crate::hydrophobic::HydrophobicPredictor;

/// Builds the initial squared-distance matrix a reconstruction run starts minimisation
/// from (§4.2). For every atom pair it draws a Gaussian sample around the expected
/// freely-jointed-chain distance for their sequence separation, rejects out-of-bound
/// draws to a uniform fallback inside the compiled restraint window, and — for pairs
/// that aren't hard-restrained — blends in a hydrophobic-contact distance estimate
/// weighted by how conserved both residues are.
pub struct Initializer<'a> {
    residue_table: &'a HashMap<AminoAcid, Residue>,
    density: f64,
}

impl<'a> Initializer<'a> {
    pub fn new(residue_table: &'a HashMap<AminoAcid, Residue>, density: f64) -> Self {
        Initializer { residue_table, density }
    }

    /// `None` for the two virtual termini, `Some(identity)` for an interior atom index.
    fn residue_identity(&self, atom_index: usize, identities: &[AminoAcid]) -> Option<AminoAcid> {
        if atom_index == 0 || atom_index == identities.len() + 1 { None } else { Some(identities[atom_index - 1]) }
    }

    /// Builds the initial squared-distance matrix for a chain of `identities.len()`
    /// residues (plus the two virtual termini), consistent with `bounds`.
    pub fn initialize(&self, identities: &[AminoAcid], bounds: &BoundMatrix, hydro: &HydrophobicPredictor, rng: &mut PortableRng) -> TriMatrix {
        let n = identities.len() + 2;
        let mut delta2 = TriMatrix::new(n, 0.0);

        // §4.2: mean/variance are driven by the chain-wide R_exp, not a per-pair quantity.
        let r = r_exp(identities.len(), self.density);
        let mean = 36.0 * r / 35.0;
        let variance = 1.2 * r * r;

        for i in 1..n {
            for j in 0..i {

                let low = bounds.low(i, j);
                let up = bounds.up(i, j);
                let mut d = rng.normal(mean, variance);
                if d < low || d > up {
                    d = rng.uniform(low, up);
                }

                if !bounds.is_hard(i, j) {
                    if let (Some(id_i), Some(id_j)) = (self.residue_identity(i, identities), self.residue_identity(j, identities)) {
                        let res_i = &self.residue_table[&id_i];
                        let res_j = &self.residue_table[&id_j];
                        let weight = (res_i.conservation * res_j.conservation).clamp(0.0, 1.0);
                        if weight > 0.0 {
                            let hydro_estimate = hydro.predict(res_i.hydrophobicity + res_j.hydrophobicity);
                            d = (1.0 - weight) * d + weight * hydro_estimate;
                        }
                    }
                }

                let d = d.clamp(low, up).max(0.0);
                delta2.set(i, j, d * d);
            }
        }

        delta2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fold_restraints::BoundMatrix;

    #[test]
    fn initial_distances_never_escape_their_compiled_bounds() {
        let table = fold_polymer::default_residue_table();
        let identities = vec![AminoAcid::Ala, AminoAcid::Gly, AminoAcid::Leu, AminoAcid::Val];
        let n = identities.len() + 2;
        let mut bounds = BoundMatrix::new(n);
        for i in 1..n {
            for j in 0..i {
                bounds.set_bound(i, j, 2.0, 30.0, 1.0, false);
            }
        }

        let init = Initializer::new(&table, 0.00636);
        let hydro = HydrophobicPredictor::default();
        let mut rng = PortableRng::new(7);
        let delta2 = init.initialize(&identities, &bounds, &hydro, &mut rng);

        for i in 1..n {
            for j in 0..i {
                let d = delta2.get(i, j).sqrt();
                assert!(d >= 2.0 - 1e-9 && d <= 30.0 + 1e-9, "pair ({i},{j}) escaped its bound: {d}");
            }
        }
    }

    #[test]
    fn a_hard_restrained_pair_is_left_unblended() {
        let table = fold_polymer::default_residue_table();
        let identities = vec![AminoAcid::Ala, AminoAcid::Gly];
        let n = identities.len() + 2;
        let mut bounds = BoundMatrix::new(n);
        bounds.set_bound(1, 0, 1.47, 1.47, 2.0, true);
        bounds.set_bound(2, 1, 3.75, 3.85, 2.0, true);
        bounds.set_bound(2, 0, 2.0, 30.0, 1.0, false);
        bounds.set_bound(3, 0, 2.0, 30.0, 1.0, false);
        bounds.set_bound(3, 1, 2.0, 30.0, 1.0, false);
        bounds.set_bound(3, 2, 1.53, 1.53, 2.0, true);

        let init = Initializer::new(&table, 0.00636);
        let hydro = HydrophobicPredictor::default();
        let mut rng = PortableRng::new(3);
        let delta2 = init.initialize(&identities, &bounds, &hydro, &mut rng);
        assert!((delta2.get(1, 0).sqrt() - 1.47).abs() < 1e-6);
    }
}
