//! # Workflows Module
//!
//! High-level entry points that tie the numerical core and the dataset engine
//! together.
//!
//! - **Dataset preparation** ([`dataset`]) - The featurize, split and scale builder and
//!   a one-call `prepare` driven by a [`DatasetConfig`](crate::engine::config::DatasetConfig).
//! - **Descriptor batches** ([`descriptors`]) - 3D descriptors for many structures, with
//!   per-structure failures collected instead of aborting.
//! - **Novel compounds** ([`predict`]) - Feature matrices for unlabeled compounds, scaled
//!   with a dataset's fitted transform.

pub mod dataset;
pub mod descriptors;
pub mod predict;
