use fold_numeric::Vec3;

use crate::{AminoAcid, Residue};

/// Target Cα-Cα virtual bond length (§3 "Chain").
pub const CA_CA_BOND: f64 = 3.8;
/// Target distance from the N-terminal virtual pseudo-atom to residue 1's Cα.
pub const N_TERM_BOND: f64 = 1.47;
/// Target distance from the C-terminal virtual pseudo-atom to residue R's Cα.
pub const C_TERM_BOND: f64 = 1.54;

/// A single modelled position: a residue's Cα, or one of the two virtual terminal
/// pseudo-atoms that bracket the chain.
#[derive(Debug, Clone, Copy)]
pub enum ChainAtom {
    NTerminus,
    Ca(usize),
    CTerminus,
}

/// The ordered polypeptide being reconstructed: `R` residues plus an N-terminal and a
/// C-terminal virtual pseudo-atom, for `N = R + 2` total chain positions (§3 "Chain").
///
/// Residues are numbered `1..=R`; index `0` and index `R + 1` address the two virtual
/// termini. Coordinates are `None` until the initializer (§4.2) or a later stage fills
/// them in.
#[derive(Debug, Clone)]
pub struct Chain {
    sequence: Vec<AminoAcid>,
    coords: Vec<Option<Vec3>>,
}

impl Chain {
    /// Builds a new chain of `sequence.len()` residues, all coordinates unset.
    pub fn new(sequence: Vec<AminoAcid>) -> Self {
        let n = sequence.len() + 2;
        Chain { sequence, coords: vec![None; n] }
    }

    /// Number of real residues, `R`.
    pub fn num_residues(&self) -> usize { self.sequence.len() }

    /// Total number of chain positions, `N = R + 2`.
    pub fn num_atoms(&self) -> usize { self.coords.len() }

    pub fn residue_identity(&self, residue: usize) -> AminoAcid {
        self.sequence[residue - 1]
    }

    fn index(atom: ChainAtom, num_residues: usize) -> usize {
        match atom {
            ChainAtom::NTerminus => 0,
            ChainAtom::Ca(i) => {
                assert!(i >= 1 && i <= num_residues, "residue index out of range: {i}");
                i
            }
            ChainAtom::CTerminus => num_residues + 1,
        }
    }

    pub fn position(&self, atom: ChainAtom) -> Option<Vec3> {
        self.coords[Self::index(atom, self.num_residues())]
    }

    pub fn set_position(&mut self, atom: ChainAtom, p: Vec3) {
        let idx = Self::index(atom, self.num_residues());
        self.coords[idx] = Some(p);
    }

    pub fn is_fully_placed(&self) -> bool {
        self.coords.iter().all(|c| c.is_some())
    }

    /// Target virtual bond length between two chain-adjacent atoms, used by the
    /// restraint compiler's bond-restraint step (§4.1 step 2).
    pub fn bond_length(a: ChainAtom, b: ChainAtom) -> f64 {
        match (a, b) {
            (ChainAtom::NTerminus, ChainAtom::Ca(1)) | (ChainAtom::Ca(1), ChainAtom::NTerminus) => N_TERM_BOND,
            (ChainAtom::Ca(i), ChainAtom::Ca(j)) if i.abs_diff(j) == 1 => CA_CA_BOND,
            _ => CA_CA_BOND,
        }
    }

    pub fn lookup(&self, table: &std::collections::HashMap<AminoAcid, Residue>, residue: usize) -> Residue {
        table[&self.residue_identity(residue)].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_sequence(n: usize) -> Vec<AminoAcid> {
        (0..n).map(|_| AminoAcid::Ala).collect()
    }

    #[test]
    fn atom_count_is_r_plus_2() {
        let chain = Chain::new(toy_sequence(10));
        assert_eq!(chain.num_residues(), 10);
        assert_eq!(chain.num_atoms(), 12);
    }

    #[test]
    fn fresh_chain_is_not_fully_placed() {
        let chain = Chain::new(toy_sequence(3));
        assert!(!chain.is_fully_placed());
    }

    #[test]
    fn setting_every_position_marks_the_chain_placed() {
        let mut chain = Chain::new(toy_sequence(2));
        chain.set_position(ChainAtom::NTerminus, Vec3::new(0.0, 0.0, 0.0));
        chain.set_position(ChainAtom::Ca(1), Vec3::new(3.8, 0.0, 0.0));
        chain.set_position(ChainAtom::Ca(2), Vec3::new(7.6, 0.0, 0.0));
        chain.set_position(ChainAtom::CTerminus, Vec3::new(9.1, 0.0, 0.0));
        assert!(chain.is_fully_placed());
    }

    #[test]
    #[should_panic]
    fn residue_index_is_one_based_and_bounded() {
        let chain = Chain::new(toy_sequence(3));
        let _ = chain.position(ChainAtom::Ca(0));
    }
}
