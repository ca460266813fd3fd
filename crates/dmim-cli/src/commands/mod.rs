pub mod dataset;
pub mod descriptors;
