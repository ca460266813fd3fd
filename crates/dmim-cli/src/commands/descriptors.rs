use crate::cli::DescriptorsArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use dmimccs::core::descriptors::names::MD3D_NAMES;
use dmimccs::engine::progress::ProgressReporter;
use dmimccs::workflows::descriptors::{self, DescriptorBatch, StructureInput};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: DescriptorsArgs) -> Result<()> {
    let paths = collect_structure_files(&args.input, &args.extension)?;
    if paths.is_empty() {
        return Err(CliError::Argument(format!(
            "No '.{}' files found in {}",
            args.extension,
            args.input.display()
        )));
    }
    info!("Found {} structure files at {:?}", paths.len(), &args.input);

    let inputs = read_inputs(&paths)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Computing 3D descriptors for {} structures...", inputs.len());
    let batch = descriptors::run(&inputs, &reporter);

    write_descriptor_table(&args.output, &batch)?;
    println!(
        "✓ Wrote descriptors for {} structures to: {}",
        batch.n_computed(),
        args.output.display()
    );
    if batch.n_failed() > 0 {
        println!("  {} structures have no 3D descriptors:", batch.n_failed());
        for (id, e) in &batch.failures {
            println!("    {}: {}", id, e);
        }
    }
    Ok(())
}

/// A single file is taken as is; a directory yields its files with `extension`.
fn collect_structure_files(input: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<StructureInput>> {
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(id) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            warn!("Skipping file without a name: {:?}", path);
            continue;
        };
        let text = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        inputs.push(StructureInput::new(id, text));
    }
    Ok(inputs)
}

fn write_descriptor_table(path: &Path, batch: &DescriptorBatch) -> Result<()> {
    let to_cli_error = |e: csv::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(to_cli_error)?;

    let mut header = vec!["id"];
    header.extend(MD3D_NAMES.iter());
    writer.write_record(&header).map_err(to_cli_error)?;

    for (id, descriptor) in &batch.descriptors {
        let mut row = vec![id.clone()];
        row.extend(descriptor.to_array().iter().map(|v| v.to_string()));
        writer.write_record(&row).map_err(to_cli_error)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_descriptors_and_skips_failures() {
        let dir = tempdir().unwrap();
        let structures = dir.path().join("structures");
        fs::create_dir(&structures).unwrap();
        fs::write(structures.join("b_rod.xyzmq"), "-1 0 0 1.0 0\n1 0 0 1.0 0\n").unwrap();
        fs::write(structures.join("a_atom.xyzmq"), "0 0 0 1.0 0\n").unwrap();
        fs::write(structures.join("c_bad.xyzmq"), "0 0 zero 1.0 0\n").unwrap();
        fs::write(structures.join("notes.txt"), "ignored").unwrap();
        let output = dir.path().join("md3d.csv");

        let cli = Cli::parse_from([
            "dmim",
            "descriptors",
            "-i",
            structures.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        let Commands::Descriptors(args) = cli.command else {
            panic!("Expected 'descriptors' subcommand");
        };
        run(args).unwrap();

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "id,pmi1,pmi2,pmi3,rmd02,rmd24,rmd46,rmd68,rmd8p");
        assert_eq!(lines.len(), 3);
        let atom: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(atom[0], "a_atom");
        assert_eq!(atom[4].parse::<f64>().unwrap(), 0.5);
        let rod: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(rod[0], "b_rod");
        assert!((rod[3].parse::<f64>().unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_directory_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let args = DescriptorsArgs {
            input: dir.path().to_path_buf(),
            output: dir.path().join("out.csv"),
            extension: "xyzmq".to_string(),
        };
        assert!(matches!(run(args), Err(CliError::Argument(_))));
    }

    #[test]
    fn single_file_input_is_accepted() {
        let dir = tempdir().unwrap();
        let structure = dir.path().join("rod.txt");
        fs::write(&structure, "-1 0 0 1.0 0\n1 0 0 1.0 0\n").unwrap();
        let output = dir.path().join("md3d.csv");

        let args = DescriptorsArgs {
            input: structure,
            output: output.clone(),
            extension: "xyzmq".to_string(),
        };
        run(args).unwrap();

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("rod,"));
    }
}
