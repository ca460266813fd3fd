use crate::core::io::traits::StructureFile;
use crate::core::models::structure::{AtomicStructure, StructureError};
use std::io::{self, BufRead, Write};
use thiserror::Error;

const COLUMN_NAMES: [&str; 5] = ["x", "y", "z", "mass", "charge"];

#[derive(Debug, Error)]
pub enum StructureParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: StructureParseErrorKind,
    },
    #[error("Structure contains no atom rows")]
    Empty,
    #[error("Invalid structure: {0}")]
    Invalid(#[from] StructureError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructureParseErrorKind {
    #[error("Expected 5 columns (x y z mass charge), found {found}")]
    WrongColumnCount { found: usize },
    #[error("Invalid finite float in column '{column}' (value: '{value}')")]
    InvalidFloat { column: &'static str, value: String },
}

/// The `xyzmq` per-atom structure format.
pub struct XyzmqFile;

impl XyzmqFile {
    /// Parses a structure from an in-memory text block.
    pub fn parse_str(text: &str) -> Result<AtomicStructure, StructureParseError> {
        Self::read_from(&mut text.as_bytes())
    }
}

fn parse_row(line: &str, line_num: usize) -> Result<[f64; 5], StructureParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != COLUMN_NAMES.len() {
        return Err(StructureParseError::Parse {
            line: line_num,
            kind: StructureParseErrorKind::WrongColumnCount {
                found: fields.len(),
            },
        });
    }
    let mut row = [0.0; 5];
    for (i, (field, column)) in fields.iter().zip(COLUMN_NAMES).enumerate() {
        row[i] = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StructureParseError::Parse {
                line: line_num,
                kind: StructureParseErrorKind::InvalidFloat {
                    column,
                    value: field.to_string(),
                },
            })?;
    }
    Ok(row)
}

impl StructureFile for XyzmqFile {
    type Error = StructureParseError;

    fn read_from(reader: &mut impl BufRead) -> Result<AtomicStructure, Self::Error> {
        let mut rows = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(parse_row(&line, line_num + 1)?);
        }
        if rows.is_empty() {
            return Err(StructureParseError::Empty);
        }
        Ok(AtomicStructure::from_rows(&rows)?)
    }

    fn write_to(structure: &AtomicStructure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let coords = structure.coordinates();
        // `{}` is the shortest representation that parses back to the same f64
        for i in 0..structure.n_atoms() {
            writeln!(
                writer,
                "{} {} {} {} {}",
                coords[(0, i)],
                coords[(1, i)],
                coords[(2, i)],
                structure.masses()[i],
                structure.charges()[i]
            )?;
        }
        Ok(())
    }
}
