use std::collections::HashMap;

use fold_numeric::{procrustes_fit, Vec3};
use fold_polymer::AminoAcid;

/// Backbone atom positions of one residue, in the order the weighted superposition of
/// §4.11 step 3 uses them: N, Cα, C, O.
#[derive(Debug, Clone, Copy)]
pub struct BackboneAtoms {
    pub n: Vec3,
    pub ca: Vec3,
    pub c: Vec3,
    pub o: Vec3,
}

impl BackboneAtoms {
    fn as_array(&self) -> [Vec3; 4] { [self.n, self.ca, self.c, self.o] }
}

/// Backbone-atom superposition weights (§4.11 step 3): N=0.5, Cα=1.0, C=0.5, O=0.2.
const BACKBONE_WEIGHTS: [f64; 4] = [0.5, 1.0, 0.5, 0.2];

/// One homologue residue aligned to a target column: its identity, its own backbone, and
/// its side-chain atoms in its own (unrotated) frame.
#[derive(Debug, Clone)]
pub struct HomologueResidue {
    pub identity: AminoAcid,
    pub backbone: BackboneAtoms,
    pub side_chain: HashMap<String, Vec3>,
}

/// Explicit non-identical-name atom equivalences (§4.11 step 2). Checked only when the
/// atom name does not already match literally between target and homologue (the literal
/// match already covers "main-chain + Cβ always shared", "γ shared between like
/// chemistries", and the shared Phe/Tyr ring-atom names).
///
/// Deliberately excludes any γ-branch cross-equivalence between Ile/Thr/Val, per §4.11:
/// those residues have no entry here.
fn cross_equivalent_atom(target: AminoAcid, target_atom: &str, homologue: AminoAcid) -> Option<&'static str> {
    use AminoAcid::*;
    match (target, target_atom, homologue) {
        // Asp/Leu share their delta pair via the D<->L substitution rule.
        (Asp, "OD1", Leu) => Some("CD1"),
        (Asp, "OD2", Leu) => Some("CD2"),
        (Leu, "CD1", Asp) => Some("OD1"),
        (Leu, "CD2", Asp) => Some("OD2"),

        // K/M/R share their delta position via name substitution.
        (Lys, "CD", Met) => Some("SD"),
        (Met, "SD", Lys) => Some("CD"),
        (Lys, "CD", Arg) => Some("CD"), // identical name; listed for symmetry with the rule
        (Met, "SD", Arg) => Some("CD"),
        (Arg, "CD", Met) => Some("SD"),

        // K/M/R share their epsilon position via name substitution.
        (Lys, "CE", Arg) => Some("NE"),
        (Arg, "NE", Lys) => Some("CE"),
        (Met, "CE", Arg) => Some("NE"),
        (Arg, "NE", Met) => Some("CE"),

        // K/R share their zeta position.
        (Lys, "NZ", Arg) => Some("CZ"),
        (Arg, "CZ", Lys) => Some("NZ"),

        _ => None,
    }
}

/// Resolves the homologue atom name equivalent to `target_atom` of residue `target`,
/// when the aligned residue has identity `homologue`. Literal name matches (main chain,
/// Cβ, shared γ/ring names) take priority; otherwise falls back to the explicit
/// substitution table.
pub fn equivalent_homologue_atom<'a>(
    target: AminoAcid,
    target_atom: &'a str,
    homologue: AminoAcid,
    homologue_has_atom: impl Fn(&str) -> bool,
) -> Option<String> {
    if matches!(target_atom, "N" | "CA" | "C" | "O" | "CB") {
        return Some(target_atom.to_string());
    }
    if homologue_has_atom(target_atom) {
        return Some(target_atom.to_string());
    }
    cross_equivalent_atom(target, target_atom, homologue).map(|s| s.to_string())
}

/// Transplants side-chain atoms onto one target residue's already-built backbone from a
/// set of aligned homologue residues (§4.11).
///
/// For each named side-chain atom the target residue identity is known to have (per
/// `target_atom_names`), every homologue is checked for a chemically equivalent atom
/// (§4.11 step 2); each homologue that has one contributes its own side-chain atom,
/// rigidly superposed from its own backbone frame onto the target's backbone (step 3,
/// weighted Procrustes over N/Cα/C/O), and the contributions are unweighted-averaged
/// (step 4). An atom absent from every homologue is left untouched (§8 invariant 8:
/// "decoration is a no-op on atoms not shared between target and any homologue").
pub fn decorate_residue(
    target_identity: AminoAcid,
    target_backbone: &BackboneAtoms,
    target_atom_names: &[String],
    homologues: &[HomologueResidue],
) -> HashMap<String, Vec3> {
    let target_points = target_backbone.as_array();
    let mut fits = Vec::with_capacity(homologues.len());
    for h in homologues {
        let mobile_points = h.backbone.as_array();
        let fit = procrustes_fit(&mobile_points, &target_points, &BACKBONE_WEIGHTS, false);
        fits.push(fit);
    }

    let mut decorated = HashMap::new();
    for atom in target_atom_names {
        let mut sum = Vec3::from_float(0.0);
        let mut count = 0;
        for (h, fit) in homologues.iter().zip(fits.iter()) {
            if fit.is_degenerate() { continue; }
            let Some(equiv) = equivalent_homologue_atom(target_identity, atom, h.identity, |n| h.side_chain.contains_key(n)) else { continue };
            let Some(&position) = h.side_chain.get(&equiv) else { continue };
            let fitted = fit.apply(&position);
            sum += &fitted;
            count += 1;
        }
        if count > 0 {
            sum /= count as f64;
            decorated.insert(atom.clone(), sum);
        }
    }
    decorated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_backbone() -> BackboneAtoms {
        BackboneAtoms {
            n: Vec3::new(-1.0, 0.0, 0.0),
            ca: Vec3::new(0.0, 0.0, 0.0),
            c: Vec3::new(1.0, 0.0, 0.0),
            o: Vec3::new(1.5, 1.0, 0.0),
        }
    }

    /// §8 S6: target 'K' aligned to homologue 'R': CB, CG, CD carry over by shared
    /// names, and NZ <- R's CZ by the zeta-substitution rule.
    #[test]
    fn lysine_decorated_from_an_aligned_arginine() {
        let target_backbone = identity_backbone();
        let mut arg_side_chain = HashMap::new();
        arg_side_chain.insert("CB".to_string(), Vec3::new(0.0, 1.0, 0.3));
        arg_side_chain.insert("CG".to_string(), Vec3::new(0.0, 2.0, 0.6));
        arg_side_chain.insert("CD".to_string(), Vec3::new(0.0, 3.0, 0.9));
        arg_side_chain.insert("NE".to_string(), Vec3::new(0.0, 4.0, 1.2));
        arg_side_chain.insert("CZ".to_string(), Vec3::new(0.0, 5.0, 1.5));

        let homologue = HomologueResidue {
            identity: AminoAcid::Arg,
            backbone: identity_backbone(), // already aligned, so the fit is the identity
            side_chain: arg_side_chain,
        };

        let target_atoms = vec!["CB".to_string(), "CG".to_string(), "CD".to_string(), "NZ".to_string(), "CE".to_string()];
        let decorated = decorate_residue(AminoAcid::Lys, &target_backbone, &target_atoms, &[homologue]);

        assert!(decorated.contains_key("CB"));
        assert!(decorated.contains_key("CG"));
        assert!(decorated.contains_key("CD"));
        assert!(decorated.contains_key("NZ"));
        // CE (Lys' epsilon atom) maps to Arg's NE via the K/M/R epsilon substitution rule.
        assert!(decorated.contains_key("CE"));
        let ce = decorated[&"CE".to_string()];
        assert!((ce.y - 4.0).abs() < 1e-9);

        // NZ should land at R's CZ position (identity transform here).
        let nz = decorated[&"NZ".to_string()];
        assert!((nz.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn an_atom_absent_from_every_homologue_is_left_undecorated() {
        let target_backbone = identity_backbone();
        let homologue = HomologueResidue {
            identity: AminoAcid::Gly,
            backbone: identity_backbone(),
            side_chain: HashMap::new(),
        };
        let target_atoms = vec!["CB".to_string()];
        let decorated = decorate_residue(AminoAcid::Ala, &target_backbone, &target_atoms, &[homologue]);
        assert!(decorated.is_empty());
    }
}
