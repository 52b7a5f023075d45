use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::domain::throughput::{InputError, ThroughputDataset};
use crate::services::throughput_yaml::deserialize_throughput_from_yaml_str;

/// Loads a throughput dataset from `path`.
///
/// `.yaml` / `.yml` files hold dated throughput records; anything else is
/// read as CSV whose cells are flattened into one list of values.
///
/// # Errors
/// - Returns an error when the file does not exist or cannot be read.
/// - Returns an error on malformed content, negative values, or when no
///   values are present.
pub fn load_throughput_dataset<P: AsRef<Path>>(path: P) -> Result<ThroughputDataset, InputError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(InputError::FileNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| InputError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    if is_yaml_file(path) {
        let records = deserialize_throughput_from_yaml_str(&contents)?;
        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            debug!(
                records = records.len(),
                from = %first.date,
                to = %last.date,
                "parsed throughput yaml"
            );
        }
        return ThroughputDataset::from_records(&records);
    }

    let values = parse_throughput_csv_str(&contents).map_err(|error| match error {
        CsvParseError::Csv(source) => InputError::Csv {
            path: path.to_path_buf(),
            source,
        },
        CsvParseError::Input(error) => error,
    })?;
    debug!(values = values.len(), "parsed throughput csv");
    ThroughputDataset::new(values)
}

fn is_yaml_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[derive(Debug)]
enum CsvParseError {
    Csv(csv::Error),
    Input(InputError),
}

/// Flattens every non-blank CSV cell into a throughput value. Rows may have
/// different lengths.
fn parse_throughput_csv_str(input: &str) -> Result<Vec<f64>, CsvParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input.as_bytes());

    let mut values = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(CsvParseError::Csv)?;
        for cell in record.iter().filter(|cell| !cell.is_empty()) {
            let value = cell.parse::<f64>().map_err(|_| {
                CsvParseError::Input(InputError::InvalidToken {
                    row: row + 1,
                    value: cell.to_string(),
                })
            })?;
            values.push(value);
        }
    }
    Ok(values)
}
