//! # Descriptor Module
//!
//! Canonical naming, computation and column assembly of the molecular descriptors
//! used as regression features.
//!
//! - [`names`] - the versioned name-to-index tables for the 42 2D (MQN) descriptors
//!   and the 8 3D (MD3D) descriptors
//! - [`md3d`] - the 3D shape descriptor vector `[pmi1, pmi2, pmi3, rmd02 .. rmd8p]`
//!   computed from an `xyzmq` structure
//! - [`assembler`] - concatenation of both families into the 50-column feature vector
//!   and selection of named column subsets
//!
//! The 2D descriptors are computed from the molecular graph by an external toolkit and
//! are treated as opaque input here. Full vectors always place the 2D block first, so
//! 3D column indices are offset by 42.

pub mod assembler;
pub mod md3d;
pub mod names;
