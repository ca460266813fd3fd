use crate::cli::DatasetArgs;
use crate::error::{CliError, Result};
use dmimccs::core::descriptors::assembler::NameSelection;
use dmimccs::engine::config::{DatasetConfig, DatasetConfigBuilder, FeatureSet};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Seed used when neither the config file nor the command line sets one.
pub const DEFAULT_SEED: u64 = 420;

/// `"all"`, `"hac, c"` or `["hac", "c"]`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum PartialNameSelection {
    Keyword(String),
    List(Vec<String>),
}

impl From<PartialNameSelection> for NameSelection {
    fn from(p: PartialNameSelection) -> Self {
        match p {
            PartialNameSelection::Keyword(value) => NameSelection::parse(&value),
            PartialNameSelection::List(names) => NameSelection::Names(names),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDatasetSection {
    #[serde(rename = "feature-set")]
    feature_set: Option<String>,
    #[serde(rename = "custom-2d")]
    custom_2d: Option<PartialNameSelection>,
    #[serde(rename = "custom-3d")]
    custom_3d: Option<PartialNameSelection>,
    #[serde(rename = "test-fraction")]
    test_fraction: Option<f64>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialDatasetConfig {
    dataset: Option<PartialDatasetSection>,
}

impl PartialDatasetConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Applies `-S` overrides, then explicit flags, and builds the final configuration.
    pub fn merge_with_cli(mut self, args: &DatasetArgs) -> Result<DatasetConfig> {
        self.apply_set_values(&args.set_values)?;
        let section = self.dataset.take().unwrap_or_default();

        let feature_set_str = args
            .feature_set
            .clone()
            .or(section.feature_set)
            .ok_or_else(|| {
                CliError::Config(
                    "A value for 'feature-set' is required either in the config file or via CLI argument."
                        .to_string(),
                )
            })?;
        let feature_set: FeatureSet = feature_set_str.parse()?;

        let custom_2d = args
            .custom_2d
            .as_deref()
            .map(NameSelection::parse)
            .or(section.custom_2d.map(Into::into));
        let custom_3d = args
            .custom_3d
            .as_deref()
            .map(NameSelection::parse)
            .or(section.custom_3d.map(Into::into));

        let mut builder = DatasetConfigBuilder::new()
            .feature_set(feature_set)
            .seed(args.seed.or(section.seed).unwrap_or(DEFAULT_SEED));
        if let Some(fraction) = args.test_fraction.or(section.test_fraction) {
            builder = builder.test_fraction(fraction);
        }
        if let Some(selection) = custom_2d {
            builder = builder.custom_2d(selection);
        }
        if let Some(selection) = custom_3d {
            builder = builder.custom_3d(selection);
        }
        Ok(builder.build()?)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let section = self.dataset.get_or_insert_with(Default::default);

            match key.trim() {
                "dataset.feature-set" => {
                    section.feature_set = Some(value_str.trim().to_string());
                }
                "dataset.custom-2d" => {
                    section.custom_2d = Some(PartialNameSelection::Keyword(value_str.to_string()));
                }
                "dataset.custom-3d" => {
                    section.custom_3d = Some(PartialNameSelection::Keyword(value_str.to_string()));
                }
                "dataset.test-fraction" => {
                    section.test_fraction = Some(value_str.trim().parse().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
                }
                "dataset.seed" => {
                    section.seed = Some(value_str.trim().parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
