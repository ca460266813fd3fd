//! # Core Models Module
//!
//! Plain data types that flow through the descriptor engine and the dataset layer.
//!
//! ## Key Components
//!
//! - [`structure`] - Per-atom coordinates, masses and charges of one 3D structure, and the
//!   mass-centered geometry derived from it
//! - [`record`] - One measured compound: CCS label, grouping metadata and its optional
//!   2D and 3D descriptor vectors
//!
//! ## Usage
//!
//! ```ignore
//! use dmimccs::core::io::xyzmq::XyzmqFile;
//! use dmimccs::core::geometry::inertia::center_on_mass;
//!
//! let structure = XyzmqFile::parse_str("-1 0 0 1.0 0\n1 0 0 1.0 0\n")?;
//! let geometry = center_on_mass(&structure);
//! assert_eq!(geometry.n_atoms(), 2);
//! ```

pub mod record;
pub mod structure;
