//! # dmimccs Core Library
//!
//! 3D molecular shape descriptors and reproducible dataset preparation for
//! collision cross section (CCS) regression of drug metabolites.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomicStructure`, `FeatureRecord`),
//!   pure numerics (inertia tensors, principal moments, radial mass distributions), the
//!   canonical descriptor name tables, file formats and regression metrics.
//!
//! - **[`engine`]: The Logic Core.** The stateful side of dataset preparation: feature-set
//!   configuration, the explicit featurized/split/scaled state, the label-stratified
//!   shuffle split and the standard scaler.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together: the
//!   `DatasetBuilder`, batch descriptor computation and featurization of novel compounds.

pub mod core;
pub mod engine;
pub mod workflows;
