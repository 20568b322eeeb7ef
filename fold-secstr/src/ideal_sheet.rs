use fold_numeric::Vec3;
use fold_polymer::Sense;

/// Target Cα-Cα spacing between hydrogen-bonded strands, edge to edge (§4.6).
pub const STRAND_SEPARATION: f64 = 4.90;
/// Extension of each strand row along its own axis, per residue.
const RESIDUE_SPACING: f64 = 3.4;
/// Sheet twist applied per strand about the sheet normal, degrees (§4.6).
const TWIST_PER_STRAND_DEG: f64 = -20.0;

/// Lays `strand_lengths.len()` parallel rows of Cα positions `strand_separation` apart,
/// one row per strand, with a cumulative sense flip and a cumulative sheet twist about
/// the sheet normal (the Y axis here). Row `r` has `strand_lengths[r]` residues.
///
/// Each strand's chain direction is reversed relative to the *absolute* direction of row
/// 0, not just relative to its own declared `Sense`: a strand that is `Antiparallel` to an
/// already-reversed previous strand runs the same absolute direction as row 0 again, since
/// two direction flips cancel. Tracking only `senses[r]` in isolation would instead flip
/// every `Antiparallel` row regardless of its predecessor's accumulated direction, pulling
/// alternating-sense sheets of three or more strands out of register.
///
/// Returns one `Vec<Vec3>` per strand, residues in chain order.
pub fn ideal_sheet_coordinates(strand_lengths: &[usize], senses: &[Sense]) -> Vec<Vec<Vec3>> {
    assert_eq!(strand_lengths.len(), senses.len());
    let mut rows = Vec::with_capacity(strand_lengths.len());
    let mut reversed = false;
    for (r, &len) in strand_lengths.iter().enumerate() {
        reversed = match senses[r] {
            Sense::None => false,
            Sense::Antiparallel => !reversed,
            Sense::Parallel => reversed,
        };
        let y = r as f64 * STRAND_SEPARATION;
        let twist = (TWIST_PER_STRAND_DEG * r as f64).to_radians();
        let mut row = Vec::with_capacity(len);
        for k in 0..len {
            let along = if reversed { (len - 1 - k) as f64 } else { k as f64 };
            let x0 = along * RESIDUE_SPACING;
            // rotate the (x, y) row position about the sheet normal by the cumulative twist
            let x = x0 * twist.cos();
            let z = x0 * twist.sin();
            row.push(Vec3::new(x, y, z));
        }
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strands_are_separated_by_the_hbond_distance_before_twist() {
        let rows = ideal_sheet_coordinates(&[3, 3], &[Sense::None, Sense::Antiparallel]);
        let dy = rows[1][0].y - rows[0][0].y;
        assert!((dy - STRAND_SEPARATION).abs() < 1e-9);
    }

    /// Two direction flips cancel: a strand `Antiparallel` to an already-reversed strand
    /// runs the same absolute direction as row 0, so its first residue lands back near
    /// `x0 = 0` rather than at the reversed-again far end.
    #[test]
    fn a_third_strand_antiparallel_to_a_reversed_strand_cancels_back_to_row_zeros_direction() {
        let rows = ideal_sheet_coordinates(&[5, 5, 5], &[Sense::None, Sense::Antiparallel, Sense::Antiparallel]);
        assert!((rows[2][0].x).abs() < 1e-9, "expected the net-unreversed first residue near x=0, got {}", rows[2][0].x);
    }

    #[test]
    fn antiparallel_rows_run_in_reverse_residue_order() {
        let rows = ideal_sheet_coordinates(&[3, 3], &[Sense::None, Sense::Antiparallel]);
        assert!(rows[1][0].x > rows[1][2].x);
    }
}
