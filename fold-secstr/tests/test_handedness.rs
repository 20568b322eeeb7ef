use std::collections::HashMap;

use fold_numeric::Vec3;
use fold_polymer::{Helix, HelixType, Segment};
use fold_secstr::{ideal_helix_coordinates, reflect_through_x_axis, SecStrElement};

/// spec.md §8 S4: a mirror-imaged right-handed alpha helix fails the handedness check,
/// and reflecting the whole model through the X axis (the orchestrator's correction)
/// restores a passing check (§8 invariant 6: idempotent once handedness is correct).
#[test]
fn mirrored_alpha_helix_is_detected_and_corrected() {
    let helix = Helix::new(Segment::new(1, 8), HelixType::Alpha).unwrap();
    let elem = SecStrElement::from_helix(helix);

    let template = ideal_helix_coordinates(HelixType::Alpha, 8);
    let model: HashMap<usize, Vec3> = (1..=8).zip(template.iter().copied()).collect();

    let (good, bad) = elem.check_handedness(&model);
    assert!(good >= bad, "the ideal right-handed template should pass its own check");

    let mut mirrored = model.clone();
    reflect_through_x_axis(&mut mirrored);
    let (good_m, bad_m) = elem.check_handedness(&mirrored);
    assert!(bad_m > good_m, "mirroring should flip the majority to bad");

    reflect_through_x_axis(&mut mirrored);
    let (good_fixed, bad_fixed) = elem.check_handedness(&mirrored);
    assert_eq!(good_fixed, good);
    assert_eq!(bad_fixed, bad);
}
