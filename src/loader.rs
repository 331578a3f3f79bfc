// Record source boundary: delimited-text reading.
//
// The pipeline consumes the CSV at its interface only: a header row naming
// one entity-identifier column (the first) and N category columns, then
// one raw record per line. All numeric coercion happens later, in the
// aggregator, so a bad field can be reported with its row and column.
use crate::error::PipelineError;
use crate::types::{Header, RawRecord};
use csv::ReaderBuilder;
use std::path::Path;

/// Read the header and all raw records from `path`.
///
/// Rows shorter than the header are padded with empty fields (treated as
/// zero downstream); columns beyond the header are ignored.
pub fn read_records(path: &Path) -> Result<(Header, Vec<RawRecord>), PipelineError> {
    let input_err = |source| PipelineError::Input {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path).map_err(input_err)?;

    let headers = rdr.headers().map_err(input_err)?.clone();
    let mut columns = headers.iter().map(|h| h.trim().to_string());
    let entity_column = match columns.next() {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(PipelineError::MissingHeader {
                path: path.to_path_buf(),
            })
        }
    };
    let categories: Vec<String> = columns.collect();
    let header = Header {
        entity_column,
        categories,
    };

    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(input_err)?;
        let entity = record.get(0).unwrap_or("").trim().to_string();
        let values = (1..=header.categories.len())
            .map(|j| record.get(j).unwrap_or("").to_string())
            .collect();
        records.push(RawRecord {
            row: i + 1,
            entity,
            values,
        });
    }

    Ok((header, records))
}

/// The demo dataset the original tooling shipped with.
///
/// Written when the caller passes `--sample` and the input file does not
/// exist yet; handy for trying the pipeline end to end.
pub const SAMPLE_DATA: &[[&str; 4]] = &[
    ["City", "Violent Crime", "Property Crime", "Drug Offenses"],
    ["New York", "500", "3000", "200"],
    ["Los Angeles", "800", "2500", "300"],
    ["Chicago", "600", "2000", "250"],
    ["Houston", "400", "1500", "150"],
    ["Phoenix", "300", "1200", "100"],
];

pub fn write_sample_csv(path: &Path) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in SAMPLE_DATA {
        wtr.write_record(row.iter())?;
    }
    wtr.flush()?;
    Ok(())
}
