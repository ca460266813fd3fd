use crate::core::descriptors::assembler::NameSelection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Unknown feature set '{0}' (expected one of: mz, mqn, md3d, combined, custom)")]
    UnknownFeatureSet(String),
}

/// Which descriptor columns make up the feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSet {
    /// Single m/z column baseline.
    Mz,
    /// All 42 MQNs.
    Mqn,
    /// All 8 3D descriptors.
    Md3d,
    /// MQNs followed by 3D descriptors.
    Combined,
    /// Caller-chosen subsets of both families.
    Custom,
}

impl FeatureSet {
    pub const ALL: [FeatureSet; 5] = [
        FeatureSet::Mz,
        FeatureSet::Mqn,
        FeatureSet::Md3d,
        FeatureSet::Combined,
        FeatureSet::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureSet::Mz => "mz",
            FeatureSet::Mqn => "mqn",
            FeatureSet::Md3d => "md3d",
            FeatureSet::Combined => "combined",
            FeatureSet::Custom => "custom",
        }
    }

    pub fn needs_mqn(self) -> bool {
        matches!(
            self,
            FeatureSet::Mqn | FeatureSet::Combined | FeatureSet::Custom
        )
    }

    pub fn needs_md3d(self) -> bool {
        matches!(
            self,
            FeatureSet::Md3d | FeatureSet::Combined | FeatureSet::Custom
        )
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FeatureSet::ALL
            .into_iter()
            .find(|set| set.as_str() == lowered)
            .ok_or_else(|| ConfigError::UnknownFeatureSet(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    pub feature_set: FeatureSet,
    pub custom_2d: Option<NameSelection>,
    pub custom_3d: Option<NameSelection>,
    pub test_fraction: f64,
    pub seed: u64,
}

#[derive(Default)]
pub struct DatasetConfigBuilder {
    feature_set: Option<FeatureSet>,
    custom_2d: Option<NameSelection>,
    custom_3d: Option<NameSelection>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
}

impl DatasetConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feature_set(mut self, feature_set: FeatureSet) -> Self {
        self.feature_set = Some(feature_set);
        self
    }
    pub fn custom_2d(mut self, selection: NameSelection) -> Self {
        self.custom_2d = Some(selection);
        self
    }
    pub fn custom_3d(mut self, selection: NameSelection) -> Self {
        self.custom_3d = Some(selection);
        self
    }
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = Some(fraction);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<DatasetConfig, ConfigError> {
        Ok(DatasetConfig {
            feature_set: self
                .feature_set
                .ok_or(ConfigError::MissingParameter("feature_set"))?,
            custom_2d: self.custom_2d,
            custom_3d: self.custom_3d,
            test_fraction: self.test_fraction.unwrap_or(DEFAULT_TEST_FRACTION),
            seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_set_parses_mode_strings() {
        assert_eq!("mqn".parse::<FeatureSet>().unwrap(), FeatureSet::Mqn);
        assert_eq!("MD3D".parse::<FeatureSet>().unwrap(), FeatureSet::Md3d);
        assert_eq!(" combined ".parse::<FeatureSet>().unwrap(), FeatureSet::Combined);
        assert_eq!(
            "bogus".parse::<FeatureSet>(),
            Err(ConfigError::UnknownFeatureSet("bogus".to_string()))
        );
        for set in FeatureSet::ALL {
            assert_eq!(set.to_string().parse::<FeatureSet>().unwrap(), set);
        }
    }

    #[test]
    fn feature_set_family_requirements() {
        assert!(!FeatureSet::Mz.needs_mqn() && !FeatureSet::Mz.needs_md3d());
        assert!(FeatureSet::Mqn.needs_mqn() && !FeatureSet::Mqn.needs_md3d());
        assert!(!FeatureSet::Md3d.needs_mqn() && FeatureSet::Md3d.needs_md3d());
        assert!(FeatureSet::Custom.needs_mqn() && FeatureSet::Custom.needs_md3d());
    }

    #[test]
    fn builder_defaults_test_fraction() {
        let config = DatasetConfigBuilder::new()
            .feature_set(FeatureSet::Combined)
            .seed(1234)
            .build()
            .unwrap();
        assert_eq!(config.test_fraction, DEFAULT_TEST_FRACTION);
        assert!(config.custom_2d.is_none());
    }

    #[test]
    fn builder_reports_missing_parameters() {
        let missing_set = DatasetConfigBuilder::new().seed(1).build();
        assert_eq!(missing_set, Err(ConfigError::MissingParameter("feature_set")));

        let missing_seed = DatasetConfigBuilder::new()
            .feature_set(FeatureSet::Mqn)
            .build();
        assert_eq!(missing_seed, Err(ConfigError::MissingParameter("seed")));
    }

    #[test]
    fn builder_keeps_custom_selections() {
        let config = DatasetConfigBuilder::new()
            .feature_set(FeatureSet::Custom)
            .custom_2d(NameSelection::names(["hac", "c"]))
            .custom_3d(NameSelection::All)
            .test_fraction(0.25)
            .seed(7)
            .build()
            .unwrap();
        assert_eq!(config.custom_2d, Some(NameSelection::names(["hac", "c"])));
        assert_eq!(config.custom_3d, Some(NameSelection::All));
        assert_eq!(config.test_fraction, 0.25);
    }
}
