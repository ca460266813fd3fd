use crate::core::descriptors::md3d::{Descriptor3D, DescriptorError, compute_3d_descriptors};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One structure to featurize, identified by a caller-chosen id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureInput {
    pub id: String,
    pub text: String,
}

impl StructureInput {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Outcome of a batch: successes and failures, each in input order.
#[derive(Debug, Default)]
pub struct DescriptorBatch {
    pub descriptors: Vec<(String, Descriptor3D)>,
    pub failures: Vec<(String, DescriptorError)>,
}

impl DescriptorBatch {
    pub fn n_computed(&self) -> usize {
        self.descriptors.len()
    }

    pub fn n_failed(&self) -> usize {
        self.failures.len()
    }
}

type WorkResult = Result<Descriptor3D, DescriptorError>;

/// Computes 3D descriptors for every input.
///
/// Structures are independent, so with the `parallel` feature they are processed
/// on the rayon pool. A structure that fails is recorded and skipped; the rest of
/// the batch still runs.
#[instrument(skip_all, name = "descriptor_batch", fields(n = inputs.len()))]
pub fn run(inputs: &[StructureInput], reporter: &ProgressReporter) -> DescriptorBatch {
    reporter.report(Progress::BatchStart {
        total: inputs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = inputs.iter();

    #[cfg(feature = "parallel")]
    let iterator = inputs.par_iter();

    let results: Vec<WorkResult> = iterator
        .map(|input| {
            let result = compute_3d_descriptors(&input.text);
            reporter.report(Progress::BatchIncrement);
            result
        })
        .collect();

    let mut batch = DescriptorBatch::default();
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(descriptor) => batch.descriptors.push((input.id.clone(), descriptor)),
            Err(e) => {
                warn!(id = %input.id, "Skipping structure: {}", e);
                batch.failures.push((input.id.clone(), e));
            }
        }
    }

    if batch.n_failed() > 0 {
        let summary = format!("{} structures have no 3D descriptors", batch.n_failed());
        warn!("{}", summary);
        reporter.report(Progress::Message(summary));
    }
    reporter.report(Progress::BatchFinish {
        failed: batch.n_failed(),
    });
    info!(
        computed = batch.n_computed(),
        failed = batch.n_failed(),
        "3D descriptor batch finished."
    );
    batch
}
