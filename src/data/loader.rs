use std::fs;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::{Dataset, Record, COLUMNS};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the startup dataset from a CSV file.
///
/// A path that does not exist yields [`Dataset::empty`], never an error.
/// Callers treat the empty dataset as "unavailable". Malformed content
/// (missing columns, unparsable or invalid rows) is a fatal error.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dataset file not found: {}", path.display());
            return Ok(Dataset::empty());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading dataset {}", path.display()));
        }
    };

    let dataset = parse_csv(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Serialize the dataset in the input layout, prefixed with a UTF-8 BOM.
pub fn export_csv(dataset: &Dataset) -> Result<Vec<u8>> {
    // header is written explicitly so an empty dataset still exports one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(UTF8_BOM.to_vec());
    writer.write_record(COLUMNS).context("writing CSV header")?;
    for record in dataset.records() {
        writer.serialize(SerializedRow::from(record)).context("writing CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))
}

/// Write [`export_csv`] output to `path`.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let bytes = export_csv(dataset)?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} records to {}", dataset.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Header must contain every dataset column; extra columns are ignored.
fn parse_csv(bytes: &[u8]) -> Result<Dataset> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for column in COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV missing '{column}' column");
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        validate(&record).with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn validate(record: &Record) -> Result<()> {
    let spends = [
        (COLUMNS[0], record.rd_spend),
        (COLUMNS[1], record.administration),
        (COLUMNS[2], record.marketing_spend),
    ];
    for (name, value) in spends {
        if !value.is_finite() || value < 0.0 {
            bail!("'{name}' must be a non-negative amount, got {value}");
        }
    }
    if !record.profit.is_finite() {
        bail!("'Profit' is not a finite number");
    }
    if record.state.trim().is_empty() {
        bail!("'State' is empty");
    }
    Ok(())
}

/// Borrowed view of a record so export does not clone the state label.
#[derive(serde::Serialize)]
struct SerializedRow<'a> {
    #[serde(rename = "R&D Spend")]
    rd_spend: f64,
    #[serde(rename = "Administration")]
    administration: f64,
    #[serde(rename = "Marketing Spend")]
    marketing_spend: f64,
    #[serde(rename = "State")]
    state: &'a str,
    #[serde(rename = "Profit")]
    profit: f64,
}

impl<'a> From<&'a Record> for SerializedRow<'a> {
    fn from(r: &'a Record) -> Self {
        SerializedRow {
            rd_spend: r.rd_spend,
            administration: r.administration,
            marketing_spend: r.marketing_spend,
            state: &r.state,
            profit: r.profit,
        }
    }
}
