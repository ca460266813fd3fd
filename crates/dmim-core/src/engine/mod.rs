//! # Engine Module
//!
//! Stateful machinery behind dataset preparation: the feature-set configuration,
//! the explicit dataset state, label-stratified splitting, standardization and
//! progress reporting.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Feature-set modes and the dataset parameter builder
//! - **State Tracking** ([`state`]) - Tagged dataset state carrying the arrays of each stage
//! - **Splitting** ([`split`]) - Quartile strata and the seeded stratified shuffle split
//! - **Scaling** ([`scaling`]) - Standard scaler fitted on the training partition
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Dataset error taxonomy

pub mod config;
pub mod error;
pub mod progress;
pub mod scaling;
pub mod split;
pub mod state;
