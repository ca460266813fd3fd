use super::names::{self, DescriptorFamily, FEATURE_COUNT, MD3D_COUNT, MQN_COUNT};
use nalgebra::DMatrix;
use thiserror::Error;

/// Keyword that selects every descriptor of a family in canonical order.
pub const ALL_KEYWORD: &str = "all";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("Unknown feature name '{name}'")]
    UnknownName { name: String },
    #[error("'{name}' is not a {family} descriptor")]
    NotInFamily {
        name: String,
        family: DescriptorFamily,
    },
    #[error("Expected {expected} values for {what}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

/// A named subset of one descriptor family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSelection {
    /// Every descriptor of the family, in canonical order.
    All,
    /// The listed descriptors, in the order given.
    Names(Vec<String>),
}

impl NameSelection {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NameSelection::Names(names.into_iter().map(Into::into).collect())
    }

    /// Parses `"all"` or a comma-separated list of names.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case(ALL_KEYWORD) {
            NameSelection::All
        } else {
            Self::names(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            )
        }
    }

    /// Resolves the selection to full-vector columns of `family`, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotInFamily`] or [`FeatureError::UnknownName`] for the
    /// first name that is not a descriptor of `family`.
    pub fn resolve(&self, family: DescriptorFamily) -> Result<Vec<usize>, FeatureError> {
        match self {
            NameSelection::All => Ok((0..family.len()).map(|i| i + family.offset()).collect()),
            NameSelection::Names(list) => list
                .iter()
                .map(|name| {
                    family.column_of(name).ok_or_else(|| match names::lookup(name) {
                        Some(_) => FeatureError::NotInFamily {
                            name: name.clone(),
                            family,
                        },
                        None => FeatureError::UnknownName { name: name.clone() },
                    })
                })
                .collect(),
        }
    }
}

/// Concatenates a 2D and a 3D descriptor vector into the full feature vector.
///
/// # Errors
///
/// Returns [`FeatureError::LengthMismatch`] if either input has the wrong length.
pub fn assemble(mqn: &[f64], md3d: &[f64]) -> Result<[f64; FEATURE_COUNT], FeatureError> {
    if mqn.len() != MQN_COUNT {
        return Err(FeatureError::LengthMismatch {
            what: "2D descriptors",
            expected: MQN_COUNT,
            found: mqn.len(),
        });
    }
    if md3d.len() != MD3D_COUNT {
        return Err(FeatureError::LengthMismatch {
            what: "3D descriptors",
            expected: MD3D_COUNT,
            found: md3d.len(),
        });
    }
    let mut full = [0.0; FEATURE_COUNT];
    full[..MQN_COUNT].copy_from_slice(mqn);
    full[MQN_COUNT..].copy_from_slice(md3d);
    Ok(full)
}

/// Resolves feature names from either family to full-vector columns, in the given order.
pub fn resolve_columns<S: AsRef<str>>(names: &[S]) -> Result<Vec<usize>, FeatureError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            names::lookup(name)
                .map(|(_, column)| column)
                .ok_or_else(|| FeatureError::UnknownName {
                    name: name.to_string(),
                })
        })
        .collect()
}

/// Columns for a custom feature set: the 2D selection followed by the 3D selection.
pub fn custom_columns(
    custom_2d: &NameSelection,
    custom_3d: &NameSelection,
) -> Result<Vec<usize>, FeatureError> {
    let mut columns = custom_2d.resolve(DescriptorFamily::Mqn)?;
    columns.extend(custom_3d.resolve(DescriptorFamily::Md3d)?);
    Ok(columns)
}

/// Canonical names of full-vector columns.
pub fn column_names(columns: &[usize]) -> Vec<String> {
    columns
        .iter()
        .filter_map(|&c| names::name_of_column(c))
        .map(str::to_string)
        .collect()
}

/// Selects named entries of a full feature vector, in the order the names are given.
pub fn select<S: AsRef<str>>(full: &[f64], names: &[S]) -> Result<Vec<f64>, FeatureError> {
    if full.len() != FEATURE_COUNT {
        return Err(FeatureError::LengthMismatch {
            what: "full feature vector",
            expected: FEATURE_COUNT,
            found: full.len(),
        });
    }
    Ok(resolve_columns(names)?.into_iter().map(|c| full[c]).collect())
}

/// Selects named columns of a full feature matrix (one row per entry), in the given order.
pub fn select_columns<S: AsRef<str>>(
    full: &DMatrix<f64>,
    names: &[S],
) -> Result<DMatrix<f64>, FeatureError> {
    if full.ncols() != FEATURE_COUNT {
        return Err(FeatureError::LengthMismatch {
            what: "full feature matrix columns",
            expected: FEATURE_COUNT,
            found: full.ncols(),
        });
    }
    let columns = resolve_columns(names)?;
    Ok(full.select_columns(columns.iter()))
}
