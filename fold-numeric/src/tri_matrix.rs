/// A lower-triangular matrix (including the diagonal) with economical, contiguous storage.
///
/// Addressed by the row's own triangular offset, rather than a full `n*n` square. Used
/// throughout `fold-restraints` for the pair-bound matrices and throughout `fold-engine`
/// for the squared-distance working matrix — both are naturally symmetric, so only the
/// `row >= col` half is ever stored.
///
/// ```
/// use fold_numeric::TriMatrix;
/// let mut m = TriMatrix::new(4, 0.0);
/// m.set(2, 1, 5.0);
/// assert_eq!(m.get(2, 1), 5.0);
/// assert_eq!(m.get(1, 2), 5.0); // symmetric access
/// ```
#[derive(Clone, Debug)]
pub struct TriMatrix {
    size: usize,
    data: Vec<f64>,
}

impl TriMatrix {
    pub fn new(size: usize, fill: f64) -> Self {
        TriMatrix { size, data: vec![fill; Self::row_offset(size)] }
    }

    pub fn size(&self) -> usize { self.size }

    fn row_offset(row: usize) -> usize { row * (row + 1) / 2 }

    fn index(row: usize, col: usize) -> usize { Self::row_offset(row) + col }

    /// Returns `(row, col)` ordered so `row >= col`, the half that is actually stored.
    #[inline]
    fn canon(i: usize, j: usize) -> (usize, usize) { if i >= j { (i, j) } else { (j, i) } }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (r, c) = Self::canon(i, j);
        self.data[Self::index(r, c)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let (r, c) = Self::canon(i, j);
        self.data[Self::index(r, c)] = value;
    }

    pub fn fill(&mut self, value: f64) { self.data.iter_mut().for_each(|v| *v = value); }

    /// Iterates over every stored `(i, j, value)` triple with `i >= j`, diagonal included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.size).flat_map(move |i| (0..=i).map(move |j| (i, j, self.get(i, j))))
    }

    /// `true` once every off-diagonal entry is symmetric-finite and non-negative — the
    /// invariant §8 item 2 requires of the squared-distance matrix after every outer
    /// iteration.
    pub fn is_symmetric_nonnegative(&self, tol: f64) -> bool {
        self.iter().all(|(i, j, v)| {
            if i == j { v.abs() <= tol } else { v >= -tol && v.is_finite() }
        })
    }
}
