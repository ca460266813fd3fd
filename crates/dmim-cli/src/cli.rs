use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Dylan H. Ross",
    version,
    about = "dmim CLI - 3D molecular descriptors and train/test dataset preparation for collision cross section prediction of drug metabolites.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute PMI and RMD descriptors for one xyzmq structure or a directory of them.
    Descriptors(DescriptorsArgs),
    /// Featurize, split and scale a record table into train/test CSV files.
    Dataset(DatasetArgs),
}

/// Arguments for the `descriptors` subcommand.
#[derive(Args, Debug)]
pub struct DescriptorsArgs {
    /// A structure file, or a directory containing one structure file per compound.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output descriptor CSV.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// File extension of the structure files when the input is a directory.
    #[arg(long, default_value = "xyzmq", value_name = "EXT")]
    pub extension: String,
}

/// Arguments for the `dataset` subcommand.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Path to the record table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory that receives train.csv, test.csv and scaler.toml.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to a dataset configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the feature set (mz, mqn, md3d, combined, custom).
    #[arg(short, long, value_name = "MODE")]
    pub feature_set: Option<String>,

    /// Override the custom 2D selection ('all' or comma-separated names).
    #[arg(long = "custom-2d", value_name = "NAMES")]
    pub custom_2d: Option<String>,

    /// Override the custom 3D selection ('all' or comma-separated names).
    #[arg(long = "custom-3d", value_name = "NAMES")]
    pub custom_3d: Option<String>,

    /// Override the fraction of rows held out for testing.
    #[arg(short, long, value_name = "FLOAT")]
    pub test_fraction: Option<f64>,

    /// Override the random seed of the split.
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S dataset.seed=7
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptors_command() {
        let cli = Cli::parse_from(["dmim", "-vv", "descriptors", "-i", "xyzmq/", "-o", "md3d.csv"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Descriptors(args) => {
                assert_eq!(args.input, PathBuf::from("xyzmq/"));
                assert_eq!(args.extension, "xyzmq");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_dataset_overrides() {
        let cli = Cli::parse_from([
            "dmim",
            "dataset",
            "-i",
            "records.csv",
            "-o",
            "out",
            "--feature-set",
            "custom",
            "--custom-2d",
            "hac,c",
            "--custom-3d",
            "all",
            "-S",
            "dataset.seed=7",
            "-j",
            "4",
        ]);
        assert_eq!(cli.threads, Some(4));
        match cli.command {
            Commands::Dataset(args) => {
                assert!(args.config.is_none());
                assert_eq!(args.feature_set.as_deref(), Some("custom"));
                assert_eq!(args.custom_2d.as_deref(), Some("hac,c"));
                assert_eq!(args.set_values, ["dataset.seed=7"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["dmim", "-q", "-v", "descriptors", "-i", "a", "-o", "b"]);
        assert!(result.is_err());
    }
}
