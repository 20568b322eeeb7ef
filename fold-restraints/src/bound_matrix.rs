use fold_numeric::TriMatrix;

/// Pairwise Cα bound matrices (§3 "Pair restraint matrix"): a lower and an upper bound
/// plus a strictness, one entry per residue pair `(i, j)`, `0` and `N-1` included for the
/// two virtual termini.
///
/// `low` and `up` are kept as two separate [`TriMatrix`]es rather than packed into the
/// two triangular halves of one matrix, for clarity.
#[derive(Debug, Clone)]
pub struct BoundMatrix {
    low: TriMatrix,
    up: TriMatrix,
    strictness: TriMatrix,
    /// `true` for pairs whose bound must not be *tightened* by upper-pass smoothing:
    /// bonds, bumps and secondary-structure idealisations (§4.1 step 5).
    hard: Vec<bool>,
    /// `true` for pairs merged from a homology-derived distance (§1, §6 `Maxdist`/
    /// `Minsepar`), so the steric adjuster can score their violations into the
    /// RESTRAINT channel rather than NONBOND.
    homology: Vec<bool>,
    n: usize,
}

impl BoundMatrix {
    pub fn new(n: usize) -> Self {
        BoundMatrix {
            low: TriMatrix::new(n, 0.0),
            up: TriMatrix::new(n, f64::INFINITY),
            strictness: TriMatrix::new(n, 0.0),
            hard: vec![false; n * n],
            homology: vec![false; n * n],
            n,
        }
    }

    pub fn n(&self) -> usize { self.n }

    fn flag_index(&self, i: usize, j: usize) -> usize {
        let (r, c) = if i >= j { (i, j) } else { (j, i) };
        r * self.n + c
    }

    pub fn low(&self, i: usize, j: usize) -> f64 { self.low.get(i, j) }
    pub fn up(&self, i: usize, j: usize) -> f64 { self.up.get(i, j) }
    pub fn strictness(&self, i: usize, j: usize) -> f64 { self.strictness.get(i, j) }
    pub fn is_hard(&self, i: usize, j: usize) -> bool { self.hard[self.flag_index(i, j)] }

    /// Marks `(i, j)` as merged from a homology-derived distance (§1, §6).
    pub fn mark_homology(&mut self, i: usize, j: usize) {
        let idx = self.flag_index(i, j);
        self.homology[idx] = true;
    }

    pub fn is_homology(&self, i: usize, j: usize) -> bool { self.homology[self.flag_index(i, j)] }

    pub fn set_strictness(&mut self, i: usize, j: usize, s: f64) { self.strictness.set(i, j, s); }

    /// Sets `[low, up]` for pair `(i, j)` with the given strictness, optionally marking it
    /// hard (exempt from upper-pass tightening during smoothing).
    pub fn set_bound(&mut self, i: usize, j: usize, low: f64, up: f64, strictness: f64, hard: bool) {
        self.low.set(i, j, low);
        self.up.set(i, j, up);
        self.strictness.set(i, j, strictness);
        let idx = self.flag_index(i, j);
        self.hard[idx] = hard;
    }

    /// Intersects the existing bound for `(i, j)` with `[low, up]`, keeping the tighter
    /// interval, and raises the strictness to `strictness` if it is higher than the
    /// stored one (§4.1 step 4, "merge by intersection").
    pub fn merge_bound(&mut self, i: usize, j: usize, low: f64, up: f64, strictness: f64) {
        let new_low = self.low(i, j).max(low);
        let new_up = self.up(i, j).min(up);
        self.low.set(i, j, new_low);
        self.up.set(i, j, new_up);
        if strictness > self.strictness(i, j) {
            self.strictness.set(i, j, strictness);
        }
    }

    /// Triangle-inequality smoothing (§4.1 step 5). Returns the number of violations
    /// detected (`up(i,j) < low(i,j)` after a lower-pass update) — these are counted and
    /// reported, not treated as fatal (§7 "Triangle-inequality violation").
    pub fn smooth(&mut self, max_passes: usize, eps: f64) -> usize {
        let n = self.n;
        let mut violations = 0;
        for _ in 0..max_passes {
            let mut moved = 0.0f64;

            for i in 0..n {
                for j in 0..i {
                    if self.is_hard(i, j) { continue; }
                    let mut best = self.up(i, j);
                    for k in 0..n {
                        if k == i || k == j { continue; }
                        let candidate = self.up(i, k) + self.up(j, k);
                        if candidate < best { best = candidate; }
                    }
                    let delta = (self.up(i, j) - best).abs();
                    if delta > moved { moved = delta; }
                    self.up.set(i, j, best);
                }
            }

            for i in 0..n {
                for j in 0..i {
                    let mut best = self.low(i, j);
                    for k in 0..n {
                        if k == i || k == j { continue; }
                        let up_jk = self.up(j, k);
                        let up_ik = self.up(i, k);
                        if up_jk.is_finite() {
                            let a = self.low(i, k) - up_jk;
                            if a > best { best = a; }
                        }
                        if up_ik.is_finite() {
                            let b = self.low(j, k) - up_ik;
                            if b > best { best = b; }
                        }
                    }
                    if best < 0.0 { best = 0.0; }
                    let delta = (best - self.low(i, j)).abs();
                    if delta > moved { moved = delta; }
                    self.low.set(i, j, best);

                    if self.up(i, j) < self.low(i, j) {
                        violations += 1;
                    }
                }
            }

            if moved < eps { break; }
        }
        violations
    }
}
