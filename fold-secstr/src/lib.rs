//! Secondary-structure geometry: ideal helix/sheet coordinate templates, ideal-distance
//! tables, rigid ideal-fit onto a model, and per-segment handedness checking, wrapped as
//! a tagged sum type rather than an inheritance hierarchy.

mod element;
mod ideal_helix;
mod ideal_sheet;

pub use element::{reflect_through_x_axis, IdealGeometry, SecStrElement};
pub use ideal_helix::ideal_helix_coordinates;
pub use ideal_sheet::{ideal_sheet_coordinates, STRAND_SEPARATION};
