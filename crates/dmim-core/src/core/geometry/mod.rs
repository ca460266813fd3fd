//! Mass-weighted geometry of a single 3D structure.
//!
//! Everything here is a free function over plain nalgebra arrays with no shared
//! state, so structures can be processed independently (and in parallel).
//!
//! - [`inertia`] - center of mass, inertia tensor, principal-axis alignment and
//!   principal moments of inertia (PMI)
//! - [`radial`] - per-atom distances from the center of mass binned into the fixed
//!   radial mass distribution (RMD) histogram
//!
//! PMI are eigenvalues of a symmetric tensor and are therefore unchanged by any
//! proper or improper rotation of the input: mirror-image structures produce the
//! same descriptors. This is inherent to moment-of-inertia shape descriptors.

pub mod inertia;
pub mod radial;
