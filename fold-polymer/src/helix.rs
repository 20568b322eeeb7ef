use crate::Segment;

/// The three helix types the engine can idealise (§3 "Helix"), each defined by the
/// `i` to `i+k` hydrogen-bond offset `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelixType {
    H310,
    Alpha,
    Pi,
}

impl HelixType {
    /// The i, i+k hydrogen-bond offset for this helix type.
    pub fn hbond_offset(&self) -> usize {
        match self {
            HelixType::H310 => 2,
            HelixType::Alpha => 3,
            HelixType::Pi => 4,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("a {0:?} helix needs at least {1} residues (i, i+k hbond offset k={1}) but got {2}")]
pub struct HelixTooShort(pub HelixType, pub usize, pub usize);

/// A helical [`Segment`], typed by [`HelixType`].
#[derive(Debug, Clone, Copy)]
pub struct Helix {
    segment: Segment,
    kind: HelixType,
}

impl Helix {
    pub fn new(segment: Segment, kind: HelixType) -> Result<Self, HelixTooShort> {
        let min_len = kind.hbond_offset() + 1;
        if segment.len() < min_len {
            return Err(HelixTooShort(kind, min_len, segment.len()));
        }
        Ok(Helix { segment, kind })
    }

    pub fn segment(&self) -> &Segment { &self.segment }
    pub fn segment_mut(&mut self) -> &mut Segment { &mut self.segment }
    pub fn kind(&self) -> HelixType { self.kind }

    /// The residue hydrogen-bonded to residue `i` within this helix, if any.
    pub fn hbond_partner(&self, i: usize) -> Option<usize> {
        if !self.segment.contains(i) { return None; }
        let partner = i + self.kind.hbond_offset();
        if self.segment.contains(partner) { Some(partner) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_too_short_alpha_helix_is_rejected() {
        let seg = Segment::new(1, 3);
        assert!(Helix::new(seg, HelixType::Alpha).is_err());
    }

    #[test]
    fn hbond_partner_is_i_plus_k() {
        let helix = Helix::new(Segment::new(1, 10), HelixType::Alpha).unwrap();
        assert_eq!(helix.hbond_partner(2), Some(5));
        assert_eq!(helix.hbond_partner(9), None);
    }
}
