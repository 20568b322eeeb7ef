use fold_numeric::{symmetric_spectrum, TriMatrix, Vec3};
use log::debug;
use nalgebra::DMatrix;

/// Picks the embedding dimension for outer iteration `t`: `max(3, n - t)` while
/// detangling (`t < tang_iter`), pinned to 3 once detangling is over. Starting from a
/// high-dimensional embedding and stepping the dimension down by one each outer
/// iteration gives the chain room to untangle before
/// being forced flat into 3-space.
pub fn embedding_dimension(residue_count: usize, iteration: u32, tang_iter: u32) -> usize {
    if iteration >= tang_iter {
        3
    } else {
        (residue_count as isize - iteration as isize).max(3) as usize
    }
}

/// Classical multidimensional scaling (§4.4): double-centers the squared-distance matrix
/// into a Gram matrix, eigendecomposes it, keeps the leading eigenvectors that together
/// account for `evfract` of the total positive eigenvalue mass (but never more than
/// `max_dim` of them), and returns each point's coordinates in that reduced space scaled
/// by `sqrt(eigenvalue)`.
///
/// Points are returned as `Vec3`-padded triples only when `max_dim <= 3`; for higher
/// dimensions (used while detangling) the coordinates come back as a flat per-point
/// `Vec<f64>` of length `max_dim`, since `fold_numeric::Vec3` only has room for 3.
pub fn embed(delta2: &TriMatrix, max_dim: usize, evfract: f64) -> Vec<Vec<f64>> {
    let n = delta2.size();
    let mut gram = DMatrix::<f64>::zeros(n, n);

    // Row/column/grand means of the squared-distance matrix, for double centering.
    let mut row_mean = vec![0.0; n];
    let mut grand_mean = 0.0;
    for i in 0..n {
        let mut s = 0.0;
        for j in 0..n { s += delta2.get(i, j); }
        row_mean[i] = s / n as f64;
        grand_mean += s;
    }
    grand_mean /= (n * n) as f64;

    for i in 0..n {
        for j in 0..n {
            gram[(i, j)] = -0.5 * (delta2.get(i, j) - row_mean[i] - row_mean[j] + grand_mean);
        }
    }

    let spectrum = symmetric_spectrum(&gram);
    let total_positive: f64 = spectrum.values.iter().filter(|&&v| v > 0.0).sum();

    let mut kept = 0;
    let mut running = 0.0;
    while kept < spectrum.values.len() && kept < max_dim && spectrum.values[kept] > 0.0 {
        running += spectrum.values[kept];
        kept += 1;
        if total_positive <= 0.0 || running / total_positive >= evfract { break; }
    }
    debug!("spectral embedding: kept {kept} of {} dimensions, {:.4} of positive eigenvalue mass", spectrum.values.len(), running / total_positive.max(1e-300));

    let scales: Vec<f64> = spectrum.values[..kept].iter().map(|&v| v.max(0.0).sqrt()).collect();
    (0..n).map(|i| {
        (0..kept).map(|k| spectrum.columns[k][i] * scales[k]).collect()
    }).collect()
}

/// Convenience wrapper for the pinned-to-3 case: embeds directly into [`Vec3`] points.
pub fn embed3(delta2: &TriMatrix, evfract: f64) -> Vec<Vec3> {
    embed(delta2, 3, evfract).into_iter().map(|mut c| {
        c.resize(3, 0.0);
        Vec3::new(c[0], c[1], c[2])
    }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evenly_spaced_delta2(n: usize, spacing: f64) -> TriMatrix {
        let mut m = TriMatrix::new(n, 0.0);
        for i in 0..n {
            for j in 0..i {
                let d = (i - j) as f64 * spacing;
                m.set(i, j, d * d);
            }
        }
        m
    }

    #[test]
    fn an_evenly_spaced_chain_embeds_onto_a_line() {
        let delta2 = evenly_spaced_delta2(6, 3.8);
        let points = embed3(&delta2, 0.999);
        // a collinear input should recover (nearly) all its variance along one axis
        let spread: Vec<f64> = (0..6).map(|i| points[i].distance_to(&points[0])).collect();
        for i in 1..6 {
            let expected = i as f64 * 3.8;
            assert!((spread[i] - expected).abs() < 1e-6, "point {i}: got {}, expected {expected}", spread[i]);
        }
    }

    #[test]
    fn the_dimension_schedule_steps_down_then_pins_to_three() {
        assert_eq!(embedding_dimension(10, 0, 5), 10);
        assert_eq!(embedding_dimension(10, 4, 5), 6);
        assert_eq!(embedding_dimension(10, 5, 5), 3);
        assert_eq!(embedding_dimension(10, 9, 5), 3);
    }
}
