use log::warn;

/// The engine's own tunable parameter set (§6 "Parameter set (CLI-equivalent)") — the
/// subset of keys the core reconstruction loop itself consumes. The alignment/DSSP/
/// restraint/accessibility *file* keys (`Alnfnm`, `Sstrfnm`, ...) name inputs the core
/// consumes once parsed elsewhere and are not repeated here; this struct owns only the
/// numeric knobs that shape the orchestrator's own behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams {
    /// Outer iterations, range 1..=500.
    pub max_iter: u32,
    /// Detangling iterations, range 1..=100.
    pub tang_iter: u32,
    /// Spectral-gradient iterations, range 10..=100.
    pub spec_iter: u32,
    /// Spectral-gradient relative stress change, range 0.0001..=0.1.
    pub spec_eps: f64,
    /// Positive-eigenvalue fraction kept by spectral embedding, range 0..=1.
    pub evfract: f64,
    /// Residues per cubic Ångström, range 0.001..=0.012.
    pub density: f64,
    /// Maximum homology-restraint distance, Å.
    pub max_dist: f64,
    /// Minimal `|i-j|` for homology restraints.
    pub min_separ: u32,
    /// Convergence threshold on the absolute score.
    pub min_score: f64,
    /// Convergence threshold on the relative score change.
    pub min_change: f64,
    /// PRNG seed; `0` is remapped to `1` by [`fold_numeric::PortableRng`].
    pub rand_seed: u32,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            max_iter: 40,
            tang_iter: 5,
            spec_iter: 30,
            spec_eps: 0.02,
            evfract: 0.999,
            density: 0.00636,
            max_dist: 5.0,
            min_separ: 2,
            min_score: 1e-6,
            min_change: 1e-4,
            rand_seed: 0,
        }
    }
}

/// Clamps a field into its documented range, warning once if it had to move.
fn clamp_warn(key: &str, value: f64, low: f64, high: f64) -> f64 {
    if value < low || value > high {
        let clamped = value.clamp(low, high);
        warn!("{key}={value} is out of range [{low}, {high}]; clamped to {clamped}");
        clamped
    } else {
        value
    }
}

impl EngineParams {
    /// Clamps every field to its §6-documented range in place, matching the
    /// "recoverable" posture of §7 (out-of-range configuration warns rather than fails).
    pub fn validate(&mut self) {
        self.max_iter = clamp_warn("Maxiter", self.max_iter as f64, 1.0, 500.0) as u32;
        self.tang_iter = clamp_warn("Tangiter", self.tang_iter as f64, 1.0, 100.0) as u32;
        self.spec_iter = clamp_warn("Speciter", self.spec_iter as f64, 10.0, 100.0) as u32;
        self.spec_eps = clamp_warn("Speceps", self.spec_eps, 0.0001, 0.1);
        self.evfract = clamp_warn("Evfract", self.evfract, 0.0, 1.0);
        self.density = clamp_warn("Density", self.density, 0.001, 0.012);
        self.max_dist = clamp_warn("Maxdist", self.max_dist, 0.0, f64::MAX);
        self.min_separ = clamp_warn("Minsepar", self.min_separ as f64, 2.0, f64::MAX) as u32;
    }

    /// Parses the flat `KEY value` parameter-file format of §6: one key per line,
    /// `#`-prefixed or empty lines are comments, unrecognised keys are silently ignored.
    /// Values outside the documented range are clamped via [`EngineParams::validate`].
    pub fn parse(text: &str) -> EngineParams {
        let mut params = EngineParams::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') { continue; }
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else { continue };

            match key {
                "Maxiter" => if let Ok(v) = value.parse() { params.max_iter = v; },
                "Tangiter" => if let Ok(v) = value.parse() { params.tang_iter = v; },
                "Speciter" => if let Ok(v) = value.parse() { params.spec_iter = v; },
                "Speceps" => if let Ok(v) = value.parse() { params.spec_eps = v; },
                "Evfract" => if let Ok(v) = value.parse() { params.evfract = v; },
                "Density" => if let Ok(v) = value.parse() { params.density = v; },
                "Maxdist" => if let Ok(v) = value.parse() { params.max_dist = v; },
                "Minsepar" => if let Ok(v) = value.parse() { params.min_separ = v; },
                "Minscore" => if let Ok(v) = value.parse() { params.min_score = v; },
                "Minchange" => if let Ok(v) = value.parse() { params.min_change = v; },
                "Randseed" => if let Ok(v) = value.parse() { params.rand_seed = v; },
                _ => {} // unknown keys are silently ignored, per §6
            }
        }
        params.validate();
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let p = EngineParams::default();
        assert_eq!(p.max_iter, 40);
        assert_eq!(p.tang_iter, 5);
        assert!((p.evfract - 0.999).abs() < 1e-9);
    }

    #[test]
    fn comments_and_unknown_keys_are_ignored() {
        let text = "# a comment\nMaxiter 100\nBogusKey 7\n\nDensity 0.008\n";
        let p = EngineParams::parse(text);
        assert_eq!(p.max_iter, 100);
        assert!((p.density - 0.008).abs() < 1e-9);
    }

    #[test]
    fn an_out_of_range_value_is_clamped_not_rejected() {
        let text = "Maxiter 10000\n";
        let p = EngineParams::parse(text);
        assert_eq!(p.max_iter, 500);
    }
}
