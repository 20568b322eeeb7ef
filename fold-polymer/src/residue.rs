use std::collections::HashMap;

use crate::AminoAcid;

/// Offsets of a named side-chain atom from this residue's Cα and from its side-chain
/// centroid (SCC), in Ångströms. Used by the restraint compiler (§4.1 step 4) to widen
/// an external restraint on a non-Cα/SCC atom into a Cα-Cα bound, and by the side-chain
/// decoration pass (§4.11) to know which atoms a residue even has.
#[derive(Debug, Clone, Copy)]
pub struct AtomOffset {
    pub from_ca: f64,
    pub from_scc: f64,
}

/// A single entry of the polymer table (§3 "Residue (Polymer entry)").
///
/// Created once per residue identity from the built-in polymer parameters and treated as
/// immutable for the lifetime of a reconstruction run.
#[derive(Debug, Clone)]
pub struct Residue {
    pub identity: AminoAcid,
    pub hydrophobicity: f64,
    pub conservation: f64,
    /// target Cα-to-SCC distance; `0.0` for glycine, which has no side chain.
    pub ca_scc_distance: f64,
    pub ca_bump_radius: f64,
    pub scc_bump_radius: f64,
    pub ca_scc_bump_radius: f64,
    atom_offsets: HashMap<String, AtomOffset>,
}

impl Residue {
    pub fn new(
        identity: AminoAcid,
        hydrophobicity: f64,
        conservation: f64,
        ca_scc_distance: f64,
        ca_bump_radius: f64,
        scc_bump_radius: f64,
        ca_scc_bump_radius: f64,
    ) -> Self {
        Residue {
            identity,
            hydrophobicity,
            conservation,
            ca_scc_distance,
            ca_bump_radius,
            scc_bump_radius,
            ca_scc_bump_radius,
            atom_offsets: HashMap::new(),
        }
    }

    pub fn with_atom(mut self, name: &str, from_ca: f64, from_scc: f64) -> Self {
        self.atom_offsets.insert(name.to_string(), AtomOffset { from_ca, from_scc });
        self
    }

    pub fn atom_offset(&self, name: &str) -> Option<AtomOffset> {
        self.atom_offsets.get(name).copied()
    }

    pub fn has_atom(&self, name: &str) -> bool { self.atom_offsets.contains_key(name) }

    pub fn atom_names(&self) -> impl Iterator<Item = &str> { self.atom_offsets.keys().map(|s| s.as_str()) }

    pub fn is_glycine(&self) -> bool { self.identity == AminoAcid::Gly }
}

/// Built-in polymer table, keyed by amino acid identity.
///
/// Hydrophobicity values follow the Kyte–Doolittle scale (rescaled to `[0, 1]`);
/// Cα-SCC distances and bump radii are representative values for an extended side chain,
/// consistent with the ranges the restraint compiler expects in §4.1 step 2. This is the
/// engine's own intrinsic parameter table — distinct from the external `Phobfnm` /
/// `Volfnm` / `Adistfnm` / `Simfnm` override files, whose loading is a front-end concern.
pub fn default_residue_table() -> HashMap<AminoAcid, Residue> {
    use AminoAcid::*;
    let mut table = HashMap::new();

    let mut add = |aa: AminoAcid, hphob: f64, ca_scc: f64| {
        let r = Residue::new(aa, hphob, 0.5, ca_scc, 2.46, 1.80, 2.00)
            .with_atom("N", 1.47, ca_scc + 1.47)
            .with_atom("C", 1.53, ca_scc + 1.53)
            .with_atom("O", 2.40, ca_scc + 2.40)
            .with_atom("CB", ca_scc * 0.35, ca_scc * 0.65);
        table.insert(aa, r);
    };

    add(Gly, 0.36, 0.0);
    add(Ala, 0.42, 1.53);
    add(Val, 0.73, 2.20);
    add(Leu, 0.68, 2.80);
    add(Ile, 0.73, 2.80);
    add(Pro, 0.36, 2.00);
    add(Phe, 0.65, 3.30);
    add(Trp, 0.42, 3.90);
    add(Met, 0.55, 3.00);
    add(Cys, 0.49, 2.10);
    add(Ser, 0.28, 1.80);
    add(Thr, 0.34, 2.10);
    add(Asn, 0.21, 2.40);
    add(Gln, 0.26, 2.90);
    add(Tyr, 0.36, 3.90);
    add(Asp, 0.19, 2.40);
    add(Glu, 0.23, 2.90);
    add(Lys, 0.26, 3.90);
    add(Arg, 0.23, 4.30);
    add(His, 0.40, 3.00);
    add(Unk, 0.40, 2.50);

    // Side-chain atom offsets for the residues named in the §4.11 equivalence rules.
    if let Some(r) = table.remove(&Lys) {
        table.insert(Lys, r
            .with_atom("CG", 2.53, 1.37)
            .with_atom("CD", 3.10, 0.90)
            .with_atom("CE", 3.60, 0.60)
            .with_atom("NZ", 3.90, 0.30));
    }
    if let Some(r) = table.remove(&Arg) {
        table.insert(Arg, r
            .with_atom("CG", 2.53, 1.77)
            .with_atom("CD", 3.10, 1.30)
            .with_atom("NE", 3.60, 0.90)
            .with_atom("CZ", 3.90, 0.60)
            .with_atom("NH1", 4.20, 0.40)
            .with_atom("NH2", 4.20, 0.40));
    }
    if let Some(r) = table.remove(&Asp) {
        table.insert(Asp, r
            .with_atom("CG", 2.53, 0.88)
            .with_atom("OD1", 3.00, 0.60)
            .with_atom("OD2", 3.00, 0.60));
    }
    if let Some(r) = table.remove(&Leu) {
        table.insert(Leu, r
            .with_atom("CG", 2.53, 1.28)
            .with_atom("CD1", 3.00, 0.90)
            .with_atom("CD2", 3.00, 0.90));
    }
    if let Some(r) = table.remove(&Met) {
        table.insert(Met, r
            .with_atom("CG", 2.53, 1.47)
            .with_atom("SD", 3.20, 0.80)
            .with_atom("CE", 3.90, 0.30));
    }
    if let Some(r) = table.remove(&Phe) {
        table.insert(Phe, r
            .with_atom("CG", 2.53, 1.78)
            .with_atom("CD1", 2.90, 1.40)
            .with_atom("CD2", 2.90, 1.40)
            .with_atom("CE1", 3.40, 1.00)
            .with_atom("CE2", 3.40, 1.00)
            .with_atom("CZ", 3.80, 0.70));
    }
    if let Some(r) = table.remove(&Tyr) {
        table.insert(Tyr, r
            .with_atom("CG", 2.53, 2.38)
            .with_atom("CD1", 2.90, 1.90)
            .with_atom("CD2", 2.90, 1.90)
            .with_atom("CE1", 3.40, 1.40)
            .with_atom("CE2", 3.40, 1.40)
            .with_atom("CZ", 3.80, 1.00)
            .with_atom("OH", 4.30, 0.60));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glycine_has_no_scc_target_distance() {
        let table = default_residue_table();
        assert_eq!(table[&AminoAcid::Gly].ca_scc_distance, 0.0);
    }

    #[test]
    fn lysine_and_arginine_share_a_cb_cg_cd_path() {
        let table = default_residue_table();
        assert!(table[&AminoAcid::Lys].has_atom("CD"));
        assert!(table[&AminoAcid::Arg].has_atom("CD"));
    }
}
