/// Virtual Cα-Cα bond length, Å.
const BOND_LENGTH: f64 = 3.8;
/// Virtual-bond angle for the freely-rotating-chain estimate, degrees (§4.1 step 1).
const BOND_ANGLE_DEG: f64 = 133.0;

/// Expected radius of gyration scale, `R_exp = cube_root(R / density)` (§4.1 step 1).
pub fn r_exp(chain_length: usize, density: f64) -> f64 {
    (chain_length as f64 / density).cbrt()
}

/// Freely-rotating-chain RMS end-to-end distance at sequence separation `d`, from the
/// virtual-bond angle and bond length (§4.1 step 1).
///
/// For a freely rotating chain of `d` bonds of length `l` and fixed supplement bond
/// angle `theta`, `<r^2> = d*l^2 * (1+cos(theta))/(1-cos(theta))`, saturating at the
/// fully extended length for small `d`.
pub fn theta(d: usize) -> f64 {
    if d == 0 { return 0.0; }
    let cos_theta = BOND_ANGLE_DEG.to_radians().cos();
    let mean_sq = d as f64 * BOND_LENGTH * BOND_LENGTH * (1.0 + cos_theta) / (1.0 - cos_theta);
    let extended = d as f64 * BOND_LENGTH;
    mean_sq.sqrt().min(extended)
}

/// The Flory upper bound for sequence separation `d`: `min(R_max * f(R), theta(d))`,
/// where `R_max = 2.5 * R_exp` and `f(R)` damps the bound for separations approaching
/// the full chain length (§4.1 step 1).
pub fn flory_upper_bound(d: usize, chain_length: usize, density: f64) -> f64 {
    let r_exp = r_exp(chain_length, density);
    let r_max = 2.5 * r_exp;
    let f_r = if chain_length == 0 { 1.0 } else { (d as f64 / chain_length as f64).sqrt().min(1.0) };
    (r_max * f_r).min(theta(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_grows_with_separation() {
        assert!(theta(10) > theta(2));
    }

    #[test]
    fn flory_bound_is_never_negative() {
        for d in 1..50 {
            assert!(flory_upper_bound(d, 100, 0.00636) >= 0.0);
        }
    }
}
