/// One user-supplied distance restraint between two named atoms (§3 "External restraint
/// record"). Atom names are PDB-style, or the pseudo-atom name `"SCC"` for the fake-β
/// centroid.
#[derive(Debug, Clone)]
pub struct ExternalRestraint {
    pub residue1: usize,
    pub atom1: String,
    pub residue2: usize,
    pub atom2: String,
    pub low: f64,
    pub up: f64,
    pub strictness: f64,
}

impl ExternalRestraint {
    /// Builds a restraint, silently swapping `low`/`up` if given reversed, as the
    /// external-restraint file format requires (§6 "External restraint input").
    pub fn new(residue1: usize, atom1: &str, residue2: usize, atom2: &str, low: f64, up: f64, strictness: f64) -> Self {
        let (low, up) = if low <= up { (low, up) } else { (up, low) };
        ExternalRestraint {
            residue1,
            atom1: atom1.to_string(),
            residue2,
            atom2: atom2.to_string(),
            low,
            up,
            strictness,
        }
    }

    pub fn is_ca_ca(&self) -> bool { self.atom1 == "CA" && self.atom2 == "CA" }
    pub fn involves_scc(&self) -> bool { self.atom1 == "SCC" || self.atom2 == "SCC" }
}

/// The maintained collection of external restraints: append-only, iterated in insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct ExternalRestraintList {
    restraints: Vec<ExternalRestraint>,
}

impl ExternalRestraintList {
    pub fn new() -> Self { ExternalRestraintList { restraints: Vec::new() } }

    pub fn push(&mut self, restraint: ExternalRestraint) { self.restraints.push(restraint); }

    pub fn iter(&self) -> impl Iterator<Item = &ExternalRestraint> { self.restraints.iter() }

    pub fn len(&self) -> usize { self.restraints.len() }
    pub fn is_empty(&self) -> bool { self.restraints.is_empty() }
}
