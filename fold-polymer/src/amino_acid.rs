/// The twenty standard amino acids plus `X` for an unknown / non-standard residue.
///
/// A small, exhaustively-listed `TYPES` array backs lookup by one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum AminoAcid {
    Ala, Arg, Asn, Asp, Cys, Gln, Glu, Gly, His, Ile,
    Leu, Lys, Met, Phe, Pro, Ser, Thr, Trp, Tyr, Val,
    Unk,
}

impl AminoAcid {
    pub const TYPES: [AminoAcid; 21] = [
        AminoAcid::Ala, AminoAcid::Arg, AminoAcid::Asn, AminoAcid::Asp, AminoAcid::Cys,
        AminoAcid::Gln, AminoAcid::Glu, AminoAcid::Gly, AminoAcid::His, AminoAcid::Ile,
        AminoAcid::Leu, AminoAcid::Lys, AminoAcid::Met, AminoAcid::Phe, AminoAcid::Pro,
        AminoAcid::Ser, AminoAcid::Thr, AminoAcid::Trp, AminoAcid::Tyr, AminoAcid::Val,
        AminoAcid::Unk,
    ];

    pub fn code1(&self) -> char {
        match self {
            AminoAcid::Ala => 'A', AminoAcid::Arg => 'R', AminoAcid::Asn => 'N',
            AminoAcid::Asp => 'D', AminoAcid::Cys => 'C', AminoAcid::Gln => 'Q',
            AminoAcid::Glu => 'E', AminoAcid::Gly => 'G', AminoAcid::His => 'H',
            AminoAcid::Ile => 'I', AminoAcid::Leu => 'L', AminoAcid::Lys => 'K',
            AminoAcid::Met => 'M', AminoAcid::Phe => 'F', AminoAcid::Pro => 'P',
            AminoAcid::Ser => 'S', AminoAcid::Thr => 'T', AminoAcid::Trp => 'W',
            AminoAcid::Tyr => 'Y', AminoAcid::Val => 'V', AminoAcid::Unk => 'X',
        }
    }

    pub fn code3(&self) -> &'static str {
        match self {
            AminoAcid::Ala => "ALA", AminoAcid::Arg => "ARG", AminoAcid::Asn => "ASN",
            AminoAcid::Asp => "ASP", AminoAcid::Cys => "CYS", AminoAcid::Gln => "GLN",
            AminoAcid::Glu => "GLU", AminoAcid::Gly => "GLY", AminoAcid::His => "HIS",
            AminoAcid::Ile => "ILE", AminoAcid::Leu => "LEU", AminoAcid::Lys => "LYS",
            AminoAcid::Met => "MET", AminoAcid::Phe => "PHE", AminoAcid::Pro => "PRO",
            AminoAcid::Ser => "SER", AminoAcid::Thr => "THR", AminoAcid::Trp => "TRP",
            AminoAcid::Tyr => "TYR", AminoAcid::Val => "VAL", AminoAcid::Unk => "UNK",
        }
    }
}

impl TryFrom<char> for AminoAcid {
    type Error = String;

    /// ```
    /// use fold_polymer::AminoAcid;
    /// assert_eq!(AminoAcid::try_from('K').unwrap(), AminoAcid::Lys);
    /// ```
    fn try_from(value: char) -> Result<Self, Self::Error> {
        AminoAcid::TYPES.iter().find(|t| t.code1() == value.to_ascii_uppercase())
            .copied()
            .ok_or_else(|| format!("unknown one-letter amino acid code: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_standard_code() {
        for aa in AminoAcid::TYPES {
            if aa == AminoAcid::Unk { continue; }
            assert_eq!(AminoAcid::try_from(aa.code1()).unwrap(), aa);
        }
    }
}
