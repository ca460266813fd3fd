//! Provides input/output for structure text blocks and compound record tables.
//!
//! The `xyzmq` structure format is a headerless, whitespace-delimited table with one
//! atom per line (`x y z mass charge`). Record tables are CSV files that stand in for
//! the structural database the descriptors were originally stored in.

pub mod records;
pub mod traits;
pub mod xyzmq;
