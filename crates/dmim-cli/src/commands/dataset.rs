use crate::cli::DatasetArgs;
use crate::config::PartialDatasetConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use dmimccs::core::io::records::{RecordSource, RecordTable};
use dmimccs::core::models::record::RecordMeta;
use dmimccs::engine::progress::ProgressReporter;
use dmimccs::workflows::dataset::{self, DatasetBuilder};
use nalgebra::{DMatrix, DVector};
use std::path::Path;
use tracing::info;

const TRAIN_FILE: &str = "train.csv";
const TEST_FILE: &str = "test.csv";
const SCALER_FILE: &str = "scaler.toml";

pub fn run(args: DatasetArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialDatasetConfig::from_file(path)?,
        None => PartialDatasetConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    info!("Loading records from {:?}", &args.input);
    let table = RecordTable::load(&args.input).map_err(|e| CliError::FileParsing {
        path: args.input.clone(),
        source: e.into(),
    })?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Preparing '{}' dataset from {} records...",
        config.feature_set,
        table.len()
    );
    let builder = dataset::prepare(table, &config, &reporter)?;

    std::fs::create_dir_all(&args.output)?;
    write_outputs(&builder, &args.output)?;

    println!(
        "✓ {} rows ({} parent, {} metabolite), {} features: {} train / {} test",
        builder.n()?,
        builder.n_parent()?,
        builder.n_metab()?,
        builder.n_features()?,
        builder.n_train()?,
        builder.n_test()?
    );
    println!("  Outputs written to: {}", args.output.display());
    Ok(())
}

fn write_outputs<S: RecordSource>(builder: &DatasetBuilder<S>, dir: &Path) -> Result<()> {
    let meta = builder.meta()?;
    let names = builder.feature_names()?;

    write_partition(
        &dir.join(TRAIN_FILE),
        names,
        meta,
        builder.train_indices()?,
        builder.x_train_scaled()?,
        &builder.y_train()?,
    )?;
    write_partition(
        &dir.join(TEST_FILE),
        names,
        meta,
        builder.test_indices()?,
        builder.x_test_scaled()?,
        &builder.y_test()?,
    )?;

    let scaler_path = dir.join(SCALER_FILE);
    builder
        .scaler()?
        .save(&scaler_path)
        .map_err(|e| CliError::FileWriting {
            path: scaler_path.clone(),
            source: e.into(),
        })?;
    Ok(())
}

/// One row per partition member: metadata, label, then the scaled features.
fn write_partition(
    path: &Path,
    feature_names: &[String],
    meta: &[RecordMeta],
    indices: &[usize],
    x: &DMatrix<f64>,
    y: &DVector<f64>,
) -> Result<()> {
    let to_cli_error = |e: csv::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_cli_error)?;

    let mut header: Vec<&str> = vec!["name", "adduct", "met_n", "mz", "ccs"];
    header.extend(feature_names.iter().map(String::as_str));
    writer.write_record(&header).map_err(to_cli_error)?;

    for (row, &index) in indices.iter().enumerate() {
        let m = &meta[index];
        let mut record = vec![
            m.name.clone(),
            m.adduct.clone(),
            m.met_n.to_string(),
            m.mz.to_string(),
            y[row].to_string(),
        ];
        record.extend(x.row(row).iter().map(|v| v.to_string()));
        writer.write_record(&record).map_err(to_cli_error)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use dmimccs::engine::scaling::StandardScaler;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "name,adduct,met_n,mz,ccs,mqns,pmi1,pmi2,pmi3,rmd02,rmd24,rmd46,rmd68,rmd8p";

    fn write_records(path: &Path, n: usize) {
        let mut content = format!("{}\n", HEADER);
        for i in 0..n {
            let mqns = (0..42)
                .map(|j| ((i + j) % 7).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            content.push_str(&format!(
                "cmpd{},[M+H]+,{},{},{},{},{},{},{},0.25,0.1,0.05,0,0\n",
                i,
                i % 2,
                200.0 + i as f64,
                150.0 + ((i * 7) % n) as f64,
                mqns,
                10.0 + i as f64,
                20.0 + i as f64,
                25.0 + i as f64
            ));
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn writes_partitions_and_scaler() {
        let dir = tempdir().unwrap();
        let records = dir.path().join("records.csv");
        write_records(&records, 50);
        let out = dir.path().join("out");

        let cli = Cli::parse_from([
            "dmim",
            "dataset",
            "-i",
            records.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--feature-set",
            "custom",
            "--custom-2d",
            "hac,c",
            "--custom-3d",
            "pmi1,pmi3",
            "--seed",
            "3",
        ]);
        let Commands::Dataset(args) = cli.command else {
            panic!("Expected 'dataset' subcommand");
        };
        run(args).unwrap();

        let train = fs::read_to_string(out.join(TRAIN_FILE)).unwrap();
        let test = fs::read_to_string(out.join(TEST_FILE)).unwrap();
        assert_eq!(
            train.lines().next().unwrap(),
            "name,adduct,met_n,mz,ccs,hac,c,pmi1,pmi3"
        );
        assert_eq!(train.lines().count(), 1 + 40);
        assert_eq!(test.lines().count(), 1 + 10);

        let scaler = StandardScaler::load(&out.join(SCALER_FILE)).unwrap();
        assert_eq!(scaler.feature_names(), ["hac", "c", "pmi1", "pmi3"]);
    }

    #[test]
    fn missing_record_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let cli = Cli::parse_from([
            "dmim",
            "dataset",
            "-i",
            dir.path().join("missing.csv").to_str().unwrap(),
            "-o",
            dir.path().to_str().unwrap(),
            "--feature-set",
            "mz",
        ]);
        let Commands::Dataset(args) = cli.command else {
            panic!("Expected 'dataset' subcommand");
        };
        assert!(matches!(run(args), Err(CliError::FileParsing { .. })));
    }
}
