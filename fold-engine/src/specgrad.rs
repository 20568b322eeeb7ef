use fold_numeric::{safe_div, TriMatrix, Vec3};
use log::debug;
use nalgebra::DMatrix;

/// Weighted stress `F(X) = Σ_{i<j} w_ij·(|x_i - x_j| - d_ij)^2` (§4.8).
fn stress(target: &TriMatrix, weights: &TriMatrix, x: &[Vec3]) -> f64 {
    let n = x.len();
    let mut total = 0.0;
    for i in 1..n {
        for j in 0..i {
            let w = weights.get(i, j);
            if w == 0.0 { continue; }
            let diff = x[i].distance_to(&x[j]) - target.get(i, j);
            total += w * diff * diff;
        }
    }
    total
}

/// Builds the Laplacian `S` of the weight matrix.
fn laplacian(weights: &TriMatrix, n: usize) -> DMatrix<f64> {
    let mut s = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let mut row_sum = 0.0;
        for j in 0..n {
            if i == j { continue; }
            let w = weights.get(i, j);
            s[(i, j)] = -w;
            row_sum += w;
        }
        s[(i, i)] = row_sum;
    }
    s
}

/// Builds `B(X)`: off-diagonal entries `-w_ij·d_ij / |x_i - x_j|`, diagonal the negated
/// row sum so `B(X)` rows (like `S`'s) sum to zero.
fn guttman_b(target: &TriMatrix, weights: &TriMatrix, x: &[Vec3]) -> DMatrix<f64> {
    let n = x.len();
    let mut b = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let mut row_sum = 0.0;
        for j in 0..n {
            if i == j { continue; }
            let dist = x[i].distance_to(&x[j]);
            let entry = -weights.get(i, j) * target.get(i, j) * safe_div(1.0, dist);
            b[(i, j)] = entry;
            row_sum += entry;
        }
        b[(i, i)] = -row_sum;
    }
    b
}

/// Applies `2·(B - S)·X` to produce the descent direction `-∇F` at `X`, as a per-point
/// `Vec3` array.
fn descent_direction(s: &DMatrix<f64>, b: &DMatrix<f64>, x: &[Vec3]) -> Vec<Vec3> {
    let n = x.len();
    let mut xm = DMatrix::<f64>::zeros(n, 3);
    for i in 0..n {
        xm[(i, 0)] = x[i].x;
        xm[(i, 1)] = x[i].y;
        xm[(i, 2)] = x[i].z;
    }
    let dir = 2.0 * (b - s) * xm;
    (0..n).map(|i| Vec3::new(dir[(i, 0)], dir[(i, 1)], dir[(i, 2)])).collect()
}

fn dot(a: &[Vec3], b: &[Vec3]) -> f64 {
    a.iter().zip(b.iter()).map(|(p, q)| p.x * q.x + p.y * q.y + p.z * q.z).sum()
}

fn step(x: &[Vec3], direction: &[Vec3], alpha: f64) -> Vec<Vec3> {
    x.iter().zip(direction.iter()).map(|(p, d)| Vec3::new(p.x + alpha * d.x, p.y + alpha * d.y, p.z + alpha * d.z)).collect()
}

const MAX_BACKTRACKS: u32 = 20;

/// Minimises the weighted stress function by majorisation (§4.8) starting from `x0`,
/// using the Barzilai–Borwein step-size rule and a backtracking line search that only
/// accepts steps which decrease the stress. Stops after `max_iter` outer iterations or
/// once the relative stress change falls below `eps`. Returns the lowest-stress iterate
/// seen (which may be the starting configuration itself) together with its stress.
pub fn iterate(target: &TriMatrix, weights: &TriMatrix, x0: &[Vec3], eps: f64, max_iter: u32) -> (Vec<Vec3>, f64) {
    let n = x0.len();

    // Pre-normalise the weights so that Σ w_ij·d_ij^2 = 1.
    let mut total = 0.0;
    for i in 1..n {
        for j in 0..i {
            total += weights.get(i, j) * target.get(i, j).powi(2);
        }
    }
    let mut w = weights.clone();
    if total > 0.0 {
        for i in 1..n {
            for j in 0..i {
                w.set(i, j, weights.get(i, j) / total);
            }
        }
    }

    let mut x = x0.to_vec();
    let mut best_x = x.clone();
    let mut current_stress = stress(target, &w, &x);
    let mut best_stress = current_stress;

    let s = laplacian(&w, n);
    let b = guttman_b(target, &w, &x);
    let mut direction = descent_direction(&s, &b, &x);
    let mut prev_gradient: Vec<Vec3> = direction.iter().map(|d| Vec3::new(-d.x, -d.y, -d.z)).collect();
    let mut alpha = 1.0;

    for iteration in 0..max_iter {
        let mut candidate_alpha = alpha;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate_x = step(&x, &direction, candidate_alpha);
            let candidate_stress = stress(target, &w, &candidate_x);
            if candidate_stress < current_stress {
                accepted = Some((candidate_x, candidate_stress));
                break;
            }
            candidate_alpha *= 0.5;
        }

        let Some((new_x, new_stress)) = accepted else {
            debug!("spectral-gradient: no improving step found at iteration {iteration}, stopping");
            break;
        };

        let relative_change = safe_div((current_stress - new_stress).abs(), current_stress.max(1e-300));
        x = new_x;
        current_stress = new_stress;
        if current_stress < best_stress {
            best_stress = current_stress;
            best_x = x.clone();
        }

        let b_new = guttman_b(target, &w, &x);
        let new_direction = descent_direction(&s, &b_new, &x);
        let new_gradient: Vec<Vec3> = new_direction.iter().map(|d| Vec3::new(-d.x, -d.y, -d.z)).collect();

        let prev_norm_sq = dot(&prev_gradient, &prev_gradient);
        if prev_norm_sq > 1e-300 {
            alpha *= 1.0 - dot(&new_gradient, &prev_gradient) / prev_norm_sq;
            if !alpha.is_finite() || alpha <= 0.0 { alpha = candidate_alpha.max(1e-6); }
        } else {
            alpha = candidate_alpha;
        }

        prev_gradient = new_gradient;
        direction = new_direction;

        debug!("spectral-gradient iter {iteration}: stress={current_stress:.6}, alpha={alpha:.6}");
        if relative_change < eps { break; }
    }

    (best_x, best_stress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stress_decreases_on_a_noisy_random_configuration() {
        let mut rng = fold_numeric::PortableRng::new(99);
        let n = 50;
        let points: Vec<Vec3> = (0..n).map(|_| Vec3::new(rng.uniform(-10.0, 10.0), rng.uniform(-10.0, 10.0), rng.uniform(-10.0, 10.0))).collect();

        let mut target = TriMatrix::new(n, 0.0);
        let mut weights = TriMatrix::new(n, 0.0);
        for i in 1..n {
            for j in 0..i {
                let noisy = points[i].distance_to(&points[j]) + rng.normal(0.0, 0.01);
                target.set(i, j, noisy.max(0.01));
                weights.set(i, j, 1.0);
            }
        }

        let initial_stress = stress(&target, &weights, &points);
        let (_result, final_stress) = iterate(&target, &weights, &points, 1e-4, 200);
        assert!(final_stress < initial_stress, "expected stress to decrease: {initial_stress} -> {final_stress}");
    }

    #[test]
    fn a_perfectly_satisfied_configuration_is_already_optimal() {
        let points = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        let mut target = TriMatrix::new(3, 0.0);
        let mut weights = TriMatrix::new(3, 0.0);
        for i in 1..3 {
            for j in 0..i {
                target.set(i, j, points[i].distance_to(&points[j]));
                weights.set(i, j, 1.0);
            }
        }
        let (_result, final_stress) = iterate(&target, &weights, &points, 1e-4, 50);
        assert!(final_stress < 1e-8);
    }
}
