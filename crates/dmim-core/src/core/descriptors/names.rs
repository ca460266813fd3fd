use phf::{Map, phf_map};
use std::fmt;

pub const MQN_COUNT: usize = 42;
pub const MD3D_COUNT: usize = 8;
pub const FEATURE_COUNT: usize = MQN_COUNT + MD3D_COUNT;

/// The 42 molecular quantum numbers in canonical order.
pub static MQN_NAMES: [&str; MQN_COUNT] = [
    "c", "f", "cl", "br", "i", "s", "p", "an", "cn", "ao", "co", "hac", "hbam", "hba", "hbdm",
    "hbd", "neg", "pos", "asb", "adb", "atb", "csb", "cdb", "ctb", "rbc", "asv", "adv", "atv",
    "aqv", "cdv", "ctv", "cqv", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "rg10", "afr", "bfr",
];

/// The 8 3D shape descriptors in canonical order.
pub static MD3D_NAMES: [&str; MD3D_COUNT] = [
    "pmi1", "pmi2", "pmi3", "rmd02", "rmd24", "rmd46", "rmd68", "rmd8p",
];

static MQN_INDICES: Map<&'static str, usize> = phf_map! {
    "c" => 0, "f" => 1, "cl" => 2, "br" => 3,
    "i" => 4, "s" => 5, "p" => 6, "an" => 7,
    "cn" => 8, "ao" => 9, "co" => 10, "hac" => 11,
    "hbam" => 12, "hba" => 13, "hbdm" => 14,
    "hbd" => 15, "neg" => 16, "pos" => 17,
    "asb" => 18, "adb" => 19, "atb" => 20, "csb" => 21,
    "cdb" => 22, "ctb" => 23, "rbc" => 24,
    "asv" => 25, "adv" => 26, "atv" => 27, "aqv" => 28,
    "cdv" => 29, "ctv" => 30, "cqv" => 31, "r3" => 32,
    "r4" => 33, "r5" => 34, "r6" => 35, "r7" => 36,
    "r8" => 37, "r9" => 38, "rg10" => 39,
    "afr" => 40, "bfr" => 41,
};

static MD3D_INDICES: Map<&'static str, usize> = phf_map! {
    "pmi1" => 0, "pmi2" => 1, "pmi3" => 2,
    "rmd02" => 3, "rmd24" => 4, "rmd46" => 5, "rmd68" => 6, "rmd8p" => 7,
};

/// One of the two descriptor families making up a full feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorFamily {
    /// Topological 2D descriptors (molecular quantum numbers).
    Mqn,
    /// 3D shape descriptors (principal moments and radial mass distribution).
    Md3d,
}

impl DescriptorFamily {
    pub const ALL: [DescriptorFamily; 2] = [DescriptorFamily::Mqn, DescriptorFamily::Md3d];

    /// Canonical names of the family, in column order.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            DescriptorFamily::Mqn => &MQN_NAMES,
            DescriptorFamily::Md3d => &MD3D_NAMES,
        }
    }

    pub fn len(self) -> usize {
        match self {
            DescriptorFamily::Mqn => MQN_COUNT,
            DescriptorFamily::Md3d => MD3D_COUNT,
        }
    }

    /// Column of the family's first descriptor within a full feature vector.
    pub fn offset(self) -> usize {
        match self {
            DescriptorFamily::Mqn => 0,
            DescriptorFamily::Md3d => MQN_COUNT,
        }
    }

    /// Position of a descriptor within its own family.
    pub fn index_of(self, name: &str) -> Option<usize> {
        let table = match self {
            DescriptorFamily::Mqn => &MQN_INDICES,
            DescriptorFamily::Md3d => &MD3D_INDICES,
        };
        table.get(name).copied()
    }

    /// Column of a descriptor within a full feature vector.
    pub fn column_of(self, name: &str) -> Option<usize> {
        self.index_of(name).map(|i| i + self.offset())
    }
}

impl fmt::Display for DescriptorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorFamily::Mqn => write!(f, "2D (MQN)"),
            DescriptorFamily::Md3d => write!(f, "3D (MD3D)"),
        }
    }
}

/// Looks up a name in both families, returning its family and full-vector column.
pub fn lookup(name: &str) -> Option<(DescriptorFamily, usize)> {
    DescriptorFamily::ALL
        .into_iter()
        .find_map(|family| family.column_of(name).map(|column| (family, column)))
}

/// Name of the descriptor at a full-vector column.
pub fn name_of_column(column: usize) -> Option<&'static str> {
    if column < MQN_COUNT {
        Some(MQN_NAMES[column])
    } else {
        MD3D_NAMES.get(column - MQN_COUNT).copied()
    }
}
