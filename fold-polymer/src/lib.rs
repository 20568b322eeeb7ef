mod amino_acid;
mod chain;
mod helix;
mod residue;
mod segment;
mod strand_sheet;

pub use amino_acid::AminoAcid;
pub use chain::{Chain, ChainAtom, CA_CA_BOND, C_TERM_BOND, N_TERM_BOND};
pub use helix::{Helix, HelixTooShort, HelixType};
pub use residue::{default_residue_table, AtomOffset, Residue};
pub use segment::Segment;
pub use strand_sheet::{Sense, Sheet, SheetError, Strand};
