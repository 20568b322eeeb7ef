use std::collections::HashMap;

use fold_engine::{decorate_residue, BackboneAtoms, HomologueResidue};
use fold_numeric::Vec3;
use fold_polymer::AminoAcid;

fn identity_backbone() -> BackboneAtoms {
    BackboneAtoms {
        n: Vec3::new(-1.0, 0.0, 0.0),
        ca: Vec3::new(0.0, 0.0, 0.0),
        c: Vec3::new(1.0, 0.0, 0.0),
        o: Vec3::new(1.5, 1.0, 0.0),
    }
}

/// spec.md §8 S6: target 'K' aligned to homologue 'R'. CB/CG/CD carry over by shared
/// atom names; NZ is transplanted from R's CZ via the K/R zeta-substitution rule.
#[test]
fn lysine_decorated_from_an_aligned_arginine_homologue() {
    let mut arg_side_chain = HashMap::new();
    arg_side_chain.insert("CB".to_string(), Vec3::new(0.0, 1.0, 0.3));
    arg_side_chain.insert("CG".to_string(), Vec3::new(0.0, 2.0, 0.6));
    arg_side_chain.insert("CD".to_string(), Vec3::new(0.0, 3.0, 0.9));
    arg_side_chain.insert("CZ".to_string(), Vec3::new(0.0, 5.0, 1.5));

    let homologue = HomologueResidue {
        identity: AminoAcid::Arg,
        backbone: identity_backbone(),
        side_chain: arg_side_chain,
    };

    let target_atoms = vec!["CB".to_string(), "CG".to_string(), "CD".to_string(), "NZ".to_string()];
    let decorated = decorate_residue(AminoAcid::Lys, &identity_backbone(), &target_atoms, std::slice::from_ref(&homologue));

    assert!(decorated.contains_key("CB"));
    assert!(decorated.contains_key("CG"));
    assert!(decorated.contains_key("CD"));
    let nz = decorated.get("NZ").expect("NZ should transplant from Arg's CZ");
    assert!((nz.y - 5.0).abs() < 1e-9);
}

/// spec.md §8 invariant 8: decoration is a no-op on atoms absent from every homologue.
#[test]
fn an_atom_missing_from_every_homologue_stays_undecorated() {
    let homologue = HomologueResidue {
        identity: AminoAcid::Gly,
        backbone: identity_backbone(),
        side_chain: HashMap::new(),
    };
    let target_atoms = vec!["CB".to_string()];
    let decorated = decorate_residue(AminoAcid::Ala, &identity_backbone(), &target_atoms, std::slice::from_ref(&homologue));
    assert!(decorated.is_empty());
}
