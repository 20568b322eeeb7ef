//! The reconstruction engine itself: coordinate initialisation, fake-β
//! derivation, the hydrophobic-contact distance model, the spectral embedding and
//! spectral-gradient stress majorisation, side-chain decoration, the accessibility
//! engine, and the orchestrator that ties them all into one outer relaxation loop.

mod accessibility;
mod config;
mod error;
mod fakebeta;
mod hydrophobic;
mod initializer;
mod orchestrator;
mod sidechain;
mod specgrad;
mod spectral;

pub use accessibility::{burial_thresholds, AccessAssignment, AccessibilityEngine, BurialClass, Shieldedness};
pub use config::EngineParams;
pub use error::FoldError;
pub use fakebeta::FakeBetaEngine;
pub use hydrophobic::HydrophobicPredictor;
pub use initializer::Initializer;
pub use orchestrator::{reconstruct, ReconstructionOutput, ReconstructionRequest};
pub use sidechain::{decorate_residue, equivalent_homologue_atom, BackboneAtoms, HomologueResidue};
pub use spectral::{embed, embed3, embedding_dimension};
