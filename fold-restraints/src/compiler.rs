use std::collections::HashMap;

use fold_numeric::Vec3;
use fold_polymer::{AminoAcid, Residue};
use fold_secstr::SecStrElement;

use crate::bound_matrix::BoundMatrix;
use crate::external::ExternalRestraintList;
use crate::flory::flory_upper_bound;

/// Fixed bond/geminal bounds, Å (§4.1 step 2).
const BOND_LOW: f64 = 3.75;
const BOND_UP: f64 = 3.85;
const BOND_STRICTNESS: f64 = 2.0;
const GEMINAL_LOW: f64 = 6.0;
const GEMINAL_UP: f64 = 7.0;
const GEMINAL_STRICTNESS: f64 = 1.5;
const N_TERM_BOND: f64 = 1.47;
const C_TERM_BOND: f64 = 1.54;
/// Strictness stamped onto a secondary-structure-idealised pair, when it exceeds the
/// pair's current strictness (§4.1 step 3).
const SECSTR_STRICTNESS: f64 = 1.8;
/// Fraction of its stamped strictness an idealisation relaxes to, on each side of the
/// ideal distance (§4.1 step 3: `[d*0.99, d*1.01]`).
const SECSTR_TOLERANCE: f64 = 0.01;
/// Strictness merged onto a homology-derived distance restraint (§1, §6 `Maxdist`/
/// `Minsepar`): moderate, like an external restraint, since the homologue's own
/// coordinates are only an approximate template for the target.
const HOMOLOGY_STRICTNESS: f64 = 0.6;
/// Fractional tolerance band merged around a homology-derived distance.
const HOMOLOGY_TOLERANCE: f64 = 0.1;

/// Outcome of compiling the full restraint set (§4.1): the bound matrix, plus the number
/// of triangle-inequality violations detected while smoothing (§7).
pub struct CompiledRestraints {
    pub bounds: BoundMatrix,
    pub triangle_violations: usize,
}

/// Builds the `N x N` (`N = residue_count + 2`) bound-pair matrix from the Flory
/// upper-bound schedule, fixed bond/geminal overrides, secondary-structure idealisation
/// and external restraints, then triangle-smooths it (§4.1).
pub struct RestraintCompiler<'a> {
    residue_count: usize,
    density: f64,
    residue_table: &'a HashMap<AminoAcid, Residue>,
    identities: &'a [AminoAcid],
}

impl<'a> RestraintCompiler<'a> {
    pub fn new(residue_count: usize, density: f64, residue_table: &'a HashMap<AminoAcid, Residue>, identities: &'a [AminoAcid]) -> Self {
        assert_eq!(identities.len(), residue_count);
        RestraintCompiler { residue_count, density, residue_table, identities }
    }

    fn n(&self) -> usize { self.residue_count + 2 }

    fn residue(&self, atom_index: usize) -> Option<&Residue> {
        if atom_index == 0 || atom_index == self.residue_count + 1 { return None; }
        self.residue_table.get(&self.identities[atom_index - 1])
    }

    /// §4.1 step 1.
    fn apply_flory_bounds(&self, bounds: &mut BoundMatrix) {
        let n = self.n();
        for i in 0..n {
            for j in 0..i {
                let up = flory_upper_bound(i - j, self.residue_count, self.density);
                bounds.set_bound(i, j, 0.0, up, 0.1, false);
            }
        }
    }

    /// §4.1 step 2.
    fn apply_bonds_and_geminals(&self, bounds: &mut BoundMatrix) {
        let n = self.n();
        for i in 1..n {
            let j = i - 1;
            let (low, up, strictness) = if j == 0 {
                (N_TERM_BOND, N_TERM_BOND, BOND_STRICTNESS)
            } else if i == n - 1 {
                (C_TERM_BOND, C_TERM_BOND, BOND_STRICTNESS)
            } else {
                (BOND_LOW, BOND_UP, BOND_STRICTNESS)
            };
            bounds.set_bound(i, j, low, up, strictness, true);
        }
        for i in 2..n {
            let j = i - 2;
            bounds.set_bound(i, j, GEMINAL_LOW, GEMINAL_UP, GEMINAL_STRICTNESS, true);
        }

        for i in 0..n {
            let bump_i = self.residue(i).map(|r| r.ca_bump_radius).unwrap_or(2.46);
            for j in 0..i {
                let bump_j = self.residue(j).map(|r| r.ca_bump_radius).unwrap_or(2.46);
                let floor = 2.0 * (bump_i + bump_j);
                if bounds.low(i, j) < floor && !bounds.is_hard(i, j) {
                    bounds.set_bound(i, j, floor.min(bounds.up(i, j)), bounds.up(i, j), bounds.strictness(i, j), false);
                }
            }
        }
    }

    /// §4.1 step 3: idealise pairs covered by a secondary-structure element.
    fn apply_secondary_structure(&self, bounds: &mut BoundMatrix, elements: &mut [SecStrElement]) {
        for element in elements.iter_mut() {
            let distances = element.ideal_distances();
            for (&(i, j), &d) in distances.iter() {
                if SECSTR_STRICTNESS > bounds.strictness(i, j) {
                    let low = d * (1.0 - SECSTR_TOLERANCE);
                    let up = d * (1.0 + SECSTR_TOLERANCE);
                    bounds.set_bound(i, j, low, up, SECSTR_STRICTNESS, true);
                }
            }
        }
    }

    /// §4.1 step 4: widen non-Cα/SCC external restraints by the residue's atom offset
    /// and merge into the matrix at half strictness; CA:CA restraints merge directly at
    /// full strictness. The caller is responsible for also keeping the external list
    /// around for direct per-iteration evaluation (§4.7).
    fn apply_external_restraints(&self, bounds: &mut BoundMatrix, externals: &ExternalRestraintList) {
        for restraint in externals.iter() {
            let offset1 = self.atom_offset_from_ca(restraint.residue1, &restraint.atom1);
            let offset2 = self.atom_offset_from_ca(restraint.residue2, &restraint.atom2);

            let bump_floor = self.residue(restraint.residue1).map(|r| r.ca_bump_radius).unwrap_or(2.46)
                + self.residue(restraint.residue2).map(|r| r.ca_bump_radius).unwrap_or(2.46);

            let widened_low = (restraint.low - offset1 - offset2).max(bump_floor);
            let widened_up = (restraint.up + offset1 + offset2).max(widened_low);
            let strictness = if restraint.is_ca_ca() { restraint.strictness } else { restraint.strictness * 0.5 };

            bounds.merge_bound(restraint.residue1, restraint.residue2, widened_low, widened_up, strictness);
        }
    }

    /// §1/§6 homology-derived distance restraints: for every pair of target residues
    /// both mapped (by the alignment, resolved upstream) onto a homologue Cα position,
    /// separated by at least `min_separ` in sequence, whose homologue-derived distance
    /// is no more than `max_dist`, merge a tight band around that distance into the
    /// bound matrix at [`HOMOLOGY_STRICTNESS`]. Pairs farther apart than `max_dist` in
    /// the homologue are not informative contacts and are left alone.
    fn apply_homology_distances(&self, bounds: &mut BoundMatrix, homologue_ca: &HashMap<usize, Vec3>, min_separ: usize, max_dist: f64) {
        let mut residues: Vec<usize> = homologue_ca.keys().copied().collect();
        residues.sort_unstable();
        for (idx, &i) in residues.iter().enumerate() {
            for &j in &residues[..idx] {
                if i.abs_diff(j) < min_separ { continue; }
                let d = homologue_ca[&i].distance_to(&homologue_ca[&j]);
                if d > max_dist { continue; }
                let low = d * (1.0 - HOMOLOGY_TOLERANCE);
                let up = d * (1.0 + HOMOLOGY_TOLERANCE);
                bounds.merge_bound(i, j, low, up, HOMOLOGY_STRICTNESS);
                bounds.mark_homology(i, j);
            }
        }
    }

    fn atom_offset_from_ca(&self, residue: usize, atom: &str) -> f64 {
        if atom == "CA" { return 0.0; }
        match self.residue(residue) {
            Some(r) if atom == "SCC" => r.ca_scc_distance,
            Some(r) => r.atom_offset(atom).map(|o| o.from_ca).unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Runs steps 1 through 5 and returns the compiled matrix.
    pub fn compile(
        &self,
        elements: &mut [SecStrElement],
        externals: &ExternalRestraintList,
        homologue_ca: &HashMap<usize, Vec3>,
        min_separ: usize,
        max_dist: f64,
    ) -> CompiledRestraints {
        let mut bounds = BoundMatrix::new(self.n());
        self.apply_flory_bounds(&mut bounds);
        self.apply_bonds_and_geminals(&mut bounds);
        self.apply_secondary_structure(&mut bounds, elements);
        self.apply_external_restraints(&mut bounds, externals);
        self.apply_homology_distances(&mut bounds, homologue_ca, min_separ, max_dist);
        let triangle_violations = bounds.smooth(100, 1e-6);
        CompiledRestraints { bounds, triangle_violations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fold_polymer::default_residue_table;

    #[test]
    fn a_compiled_bond_pair_lands_in_the_prescribed_window() {
        let table = default_residue_table();
        let identities = vec![AminoAcid::Ala; 10];
        let compiler = RestraintCompiler::new(10, 0.00636, &table, &identities);
        let mut elements: Vec<SecStrElement> = Vec::new();
        let externals = ExternalRestraintList::new();
        let homologue_ca = HashMap::new();
        let compiled = compiler.compile(&mut elements, &externals, &homologue_ca, 2, 5.0);
        assert!(compiled.bounds.low(2, 1) >= BOND_LOW - 1e-9);
        assert!(compiled.bounds.up(2, 1) <= BOND_UP + 1e-9);
    }

    #[test]
    fn compiling_a_simple_chain_keeps_adjacent_bounds_ordered() {
        let table = default_residue_table();
        let identities = vec![AminoAcid::Ala; 6];
        let compiler = RestraintCompiler::new(6, 0.00636, &table, &identities);
        let mut elements: Vec<SecStrElement> = Vec::new();
        let externals = ExternalRestraintList::new();
        let homologue_ca = HashMap::new();
        let compiled = compiler.compile(&mut elements, &externals, &homologue_ca, 2, 5.0);
        for i in 1..compiled.bounds.n() {
            assert!(compiled.bounds.low(i, i - 1) <= compiled.bounds.up(i, i - 1) + 1e-6);
        }
    }
}
