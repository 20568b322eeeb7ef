use fold_numeric::Vec3;
use fold_polymer::HelixType;

/// Cylindrical parameters of one idealised helix type: radius of the Cα cylinder,
/// rise per residue along the helix axis, and turn per residue about it (§4.6).
#[derive(Debug, Clone, Copy)]
struct HelixGeometry {
    radius: f64,
    rise: f64,
    turn_deg: f64,
}

fn geometry_for(kind: HelixType) -> HelixGeometry {
    match kind {
        HelixType::H310 => HelixGeometry { radius: 1.9, rise: 2.0, turn_deg: 120.0 },
        HelixType::Alpha => HelixGeometry { radius: 2.3, rise: 1.5, turn_deg: 100.0 },
        HelixType::Pi => HelixGeometry { radius: 2.8, rise: 1.15, turn_deg: 87.0 },
    }
}

/// Builds `n` Cα positions of an idealised helix of the given type, laid along the Z
/// axis starting at the origin.
pub fn ideal_helix_coordinates(kind: HelixType, n: usize) -> Vec<Vec3> {
    let g = geometry_for(kind);
    let turn = g.turn_deg.to_radians();
    (0..n)
        .map(|i| {
            let theta = turn * i as f64;
            Vec3::new(g.radius * theta.cos(), g.radius * theta.sin(), g.rise * i as f64)
        })
        .collect()
}
