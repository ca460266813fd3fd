use crate::core::descriptors::md3d::Descriptor3D;
use crate::core::descriptors::names::MQN_COUNT;
use crate::core::models::record::{FeatureRecord, RecordMeta};
use serde::Deserialize;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid record on data row {row}: {message}")]
    Parse { row: usize, message: String },
}

/// Supplies the raw per-compound records a dataset is built from.
///
/// This is the seam to whatever store holds measurements and precomputed
/// descriptors (a structural database, an exported table, or memory).
pub trait RecordSource {
    fn load(&self) -> Result<Vec<FeatureRecord>, RecordLoadError>;
}

impl RecordSource for [FeatureRecord] {
    fn load(&self) -> Result<Vec<FeatureRecord>, RecordLoadError> {
        Ok(self.to_vec())
    }
}

impl RecordSource for Vec<FeatureRecord> {
    fn load(&self) -> Result<Vec<FeatureRecord>, RecordLoadError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    name: String,
    adduct: String,
    met_n: u32,
    mz: f64,
    ccs: f64,
    mqns: Option<String>,
    pmi1: Option<f64>,
    pmi2: Option<f64>,
    pmi3: Option<f64>,
    rmd02: Option<f64>,
    rmd24: Option<f64>,
    rmd46: Option<f64>,
    rmd68: Option<f64>,
    rmd8p: Option<f64>,
}

impl RecordRow {
    fn into_record(self, row: usize) -> Result<FeatureRecord, RecordLoadError> {
        let mqn = match self.mqns.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(parse_mqns(text, row)?),
        };

        let md3d_fields = [
            self.pmi1, self.pmi2, self.pmi3, self.rmd02, self.rmd24, self.rmd46, self.rmd68,
            self.rmd8p,
        ];
        let present = md3d_fields.iter().filter(|v| v.is_some()).count();
        let md3d = match present {
            0 => None,
            n if n == md3d_fields.len() => {
                Some(Descriptor3D::from_array(md3d_fields.map(|v| v.unwrap_or_default())))
            }
            n => {
                return Err(RecordLoadError::Parse {
                    row,
                    message: format!(
                        "3D descriptors must be all present or all empty ({} of {} present)",
                        n,
                        md3d_fields.len()
                    ),
                });
            }
        };

        Ok(FeatureRecord {
            meta: RecordMeta {
                name: self.name,
                adduct: self.adduct,
                met_n: self.met_n,
                mz: self.mz,
            },
            ccs: self.ccs,
            mqn,
            md3d,
        })
    }
}

fn parse_mqns(text: &str, row: usize) -> Result<Vec<f64>, RecordLoadError> {
    let values = text
        .split_whitespace()
        .map(|v| {
            v.parse::<f64>().map_err(|_| RecordLoadError::Parse {
                row,
                message: format!("invalid MQN value '{}'", v),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != MQN_COUNT {
        return Err(RecordLoadError::Parse {
            row,
            message: format!("expected {} MQN values, found {}", MQN_COUNT, values.len()),
        });
    }
    Ok(values)
}

/// Compound records read from a CSV table.
///
/// Expected header:
/// `name,adduct,met_n,mz,ccs,mqns,pmi1,pmi2,pmi3,rmd02,rmd24,rmd46,rmd68,rmd8p`,
/// where `mqns` holds 42 space-separated values. Descriptor columns may be left
/// empty for compounds without those descriptors.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<FeatureRecord>,
}

impl RecordTable {
    pub fn load(path: &Path) -> Result<Self, RecordLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let file = std::fs::File::open(path).map_err(|e| RecordLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        Self::from_reader(file, &path_str)
    }

    pub fn from_reader<R: io::Read>(reader: R, origin: &str) -> Result<Self, RecordLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();
        for (i, result) in csv_reader.deserialize::<RecordRow>().enumerate() {
            let row = result.map_err(|e| RecordLoadError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            records.push(row.into_record(i + 1)?);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for RecordTable {
    fn load(&self) -> Result<Vec<FeatureRecord>, RecordLoadError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "name,adduct,met_n,mz,ccs,mqns,pmi1,pmi2,pmi3,rmd02,rmd24,rmd46,rmd68,rmd8p";

    fn mqn_text() -> String {
        (0..42).map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn loads_rows_with_and_without_descriptors() {
        let csv = format!(
            "{}\n\
             cipro,[M+H]+,0,332.1410,180.2,{},100.5,400.25,480.0,0.2,0.15,0.05,0.0,0.0\n\
             cipro_m1,[M+H]+,1,348.1359,183.9,,,,,,,,,\n",
            HEADER,
            mqn_text()
        );
        let table = RecordTable::from_reader(csv.as_bytes(), "memory").unwrap();

        assert_eq!(table.len(), 2);
        let parent = &table.records()[0];
        assert_eq!(parent.meta.name, "cipro");
        assert!(parent.meta.is_parent());
        assert_eq!(parent.mqn.as_ref().unwrap()[41], 41.0);
        assert_eq!(parent.md3d.unwrap().pmi, [100.5, 400.25, 480.0]);

        let metabolite = &table.records()[1];
        assert_eq!(metabolite.meta.met_n, 1);
        assert_eq!(metabolite.ccs, 183.9);
        assert!(metabolite.mqn.is_none());
        assert!(metabolite.md3d.is_none());
    }

    #[test]
    fn rejects_partial_3d_descriptors() {
        let csv = format!("{}\nx,[M+H]+,0,100.0,120.0,,1.0,2.0,,,,,,\n", HEADER);
        let result = RecordTable::from_reader(csv.as_bytes(), "memory");
        assert!(matches!(result, Err(RecordLoadError::Parse { row: 1, .. })));
    }

    #[test]
    fn rejects_short_mqn_vectors() {
        let csv = format!("{}\nx,[M+H]+,0,100.0,120.0,1 2 3,,,,,,,,\n", HEADER);
        let result = RecordTable::from_reader(csv.as_bytes(), "memory");
        match result {
            Err(RecordLoadError::Parse { row, message }) => {
                assert_eq!(row, 1);
                assert!(message.contains("found 3"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn malformed_number_is_csv_error() {
        let csv = format!("{}\nx,[M+H]+,zero,100.0,120.0,,,,,,,,,\n", HEADER);
        let result = RecordTable::from_reader(csv.as_bytes(), "memory");
        assert!(matches!(result, Err(RecordLoadError::Csv { .. })));
    }

    #[test]
    fn load_from_path_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        fs::write(&path, format!("{}\nx,[M+Na]+,2,100.0,120.0,,,,,,,,,\n", HEADER)).unwrap();

        let table = RecordTable::load(&path).unwrap();
        assert_eq!(table.records()[0].meta.adduct, "[M+Na]+");
        assert_eq!(table.load().unwrap().len(), 1);

        let missing = RecordTable::load(&dir.path().join("missing.csv"));
        assert!(matches!(missing, Err(RecordLoadError::Io { .. })));
    }
}
