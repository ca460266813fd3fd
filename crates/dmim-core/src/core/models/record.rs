use crate::core::descriptors::md3d::Descriptor3D;

/// Grouping metadata carried alongside each dataset row.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMeta {
    /// Compound name or structural annotation.
    pub name: String,
    /// Ionization adduct, e.g. `[M+H]+`.
    pub adduct: String,
    /// Metabolite number; `0` marks the parent compound.
    pub met_n: u32,
    /// Measured m/z.
    pub mz: f64,
}

impl RecordMeta {
    pub fn is_parent(&self) -> bool {
        self.met_n == 0
    }
}

/// One measured compound with whatever descriptors are available for it.
///
/// The 2D vector is expected to hold the 42 MQN counts in canonical order; a
/// missing vector means no descriptors could be computed for that compound and
/// the row is excluded from any feature set that needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub meta: RecordMeta,
    /// Measured collision cross section (the regression label).
    pub ccs: f64,
    pub mqn: Option<Vec<f64>>,
    pub md3d: Option<Descriptor3D>,
}

impl FeatureRecord {
    pub fn new(meta: RecordMeta, ccs: f64) -> Self {
        Self {
            meta,
            ccs,
            mqn: None,
            md3d: None,
        }
    }

    pub fn with_mqn(mut self, mqn: Vec<f64>) -> Self {
        self.mqn = Some(mqn);
        self
    }

    pub fn with_md3d(mut self, md3d: Descriptor3D) -> Self {
        self.md3d = Some(md3d);
        self
    }
}
