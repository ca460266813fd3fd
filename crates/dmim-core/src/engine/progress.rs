/// A dataset preparation step, as reported to progress listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetStep {
    Featurize,
    Split,
    Scale,
}

#[derive(Debug, Clone)]
pub enum Progress {
    StepStart { step: DatasetStep },
    StepFinish { step: DatasetStep },

    BatchStart { total: u64 },
    BatchIncrement,
    BatchFinish { failed: usize },

    /// A one-line summary for the user, e.g. how many records were dropped.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
