//! # Core Module
//!
//! Stateless building blocks: data models, structure and record I/O, the inertia
//! geometry engine, and descriptor naming and assembly.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Atomic structures, centered geometries and compound records
//! - **File I/O** ([`io`]) - The `xyzmq` structure format and CSV record tables
//! - **Geometry** ([`geometry`]) - Center of mass, inertia tensor, principal-axis alignment
//!   and radial mass distribution
//! - **Descriptors** ([`descriptors`]) - Canonical descriptor names, the 3D descriptor vector,
//!   and feature vector assembly and selection
//! - **Metrics** ([`metrics`]) - Regression error summaries for evaluating CCS predictions
//!
//! All functions in this layer are pure: the same input always produces bit-identical output.

pub mod descriptors;
pub mod geometry;
pub mod io;
pub mod metrics;
pub mod models;
