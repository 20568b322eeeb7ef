/// A rigid unit of residues moved together during one outer iteration (§3 "Cluster
/// (Piece)"). Backed by a bitmap rather than a contiguous range since a cluster need not
/// be a single segment (e.g. disjoint strands paired in one sheet).
#[derive(Debug, Clone)]
pub struct Cluster {
    member: Vec<bool>,
}

impl Cluster {
    pub fn new(n: usize) -> Self { Cluster { member: vec![false; n] } }

    pub fn from_residues(n: usize, residues: impl IntoIterator<Item = usize>) -> Self {
        let mut c = Cluster::new(n);
        for r in residues { c.insert(r); }
        c
    }

    pub fn insert(&mut self, residue: usize) {
        if residue < self.member.len() { self.member[residue] = true; }
    }

    pub fn contains(&self, residue: usize) -> bool {
        self.member.get(residue).copied().unwrap_or(false)
    }

    pub fn residues(&self) -> impl Iterator<Item = usize> + '_ {
        self.member.iter().enumerate().filter(|(_, &m)| m).map(|(i, _)| i)
    }

    pub fn len(&self) -> usize { self.member.iter().filter(|&&m| m).count() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// The full assignment of every residue to its current cluster, used to tell whether a
/// pair `(i, j)` is "within" (same cluster) or "between" pieces (§3, §4.7).
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    clusters: Vec<Cluster>,
    owner: Vec<Option<usize>>,
}

impl ClusterAssignment {
    pub fn new(n: usize, clusters: Vec<Cluster>) -> Self {
        let mut owner = vec![None; n];
        for (idx, cluster) in clusters.iter().enumerate() {
            for r in cluster.residues() {
                owner[r] = Some(idx);
            }
        }
        ClusterAssignment { clusters, owner }
    }

    pub fn clusters(&self) -> &[Cluster] { &self.clusters }

    /// `true` if `i` and `j` belong to the same cluster. Residues with no cluster
    /// assignment (singletons) are never "within" any pair including themselves.
    pub fn is_within(&self, i: usize, j: usize) -> bool {
        match (self.owner.get(i).copied().flatten(), self.owner.get(j).copied().flatten()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residues_in_the_same_cluster_are_within() {
        let a = Cluster::from_residues(10, [1, 2, 3]);
        let b = Cluster::from_residues(10, [5, 6, 7]);
        let assignment = ClusterAssignment::new(10, vec![a, b]);
        assert!(assignment.is_within(1, 2));
        assert!(!assignment.is_within(1, 5));
    }
}
