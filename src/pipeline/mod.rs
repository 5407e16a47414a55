use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::fmt;
use std::io::{Cursor, Read};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

pub mod filter;

use crate::config::FilterOptions;
use crate::table::{Table, Value};

/// One named input: a filename (its extension decides how the bytes are
/// treated) and the file's full content.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub name: String,
    pub data: Vec<u8>,
}

impl FileSource {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        FileSource {
            name: name.into(),
            data,
        }
    }
}

/// A non-fatal, per-file notice. Collected and returned alongside the
/// result; processing of the remaining files continues.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub file: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Result of one pipeline run. `table` is `None` when no tabular file was
/// found in the whole batch; that is the "nothing to process" signal, not
/// an error.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub table: Option<Table>,
    pub warnings: Vec<Warning>,
}

/// Merge every CSV in `sources` (plain files and `.csv` entries inside
/// `.zip` archives, in caller order) into one table, then drop rows matching
/// the exclusion filters in `opts`.
///
/// The header row of the first successfully parsed CSV becomes the schema
/// for the whole batch. Every later CSV has its own header row discarded and
/// its columns renamed positionally to that schema, so all inputs must share
/// one column layout.
///
/// With `opts.strict_parsing` unset, a file that cannot be parsed is skipped
/// with a warning; set, it fails the run.
#[instrument(level = "info", skip_all, fields(files = sources.len()))]
pub fn process_files(sources: &[FileSource], opts: &FilterOptions) -> Result<ProcessOutcome> {
    let mut warnings: Vec<Warning> = Vec::new();

    // 1) Expand archives so the parse loop sees a flat, ordered list of
    //    CSV buffers.
    let mut csv_buffers: Vec<(String, Vec<u8>)> = Vec::new();
    for src in sources {
        let lower = src.name.to_lowercase();
        if lower.ends_with(".zip") {
            match expand_archive(src) {
                Ok(entries) => csv_buffers.extend(entries),
                Err(e) => {
                    if opts.strict_parsing {
                        return Err(e.context(format!("failed to open '{}'", src.name)));
                    }
                    push_warning(&mut warnings, &src.name, format!("failed to open: {:#}", e));
                }
            }
        } else if lower.ends_with(".csv") {
            csv_buffers.push((src.name.clone(), src.data.clone()));
        } else {
            push_warning(&mut warnings, &src.name, "unsupported file type".to_string());
        }
    }

    // 2) Parse in expansion order. The first success fixes the schema.
    let mut combined: Option<Table> = None;
    for (name, data) in &csv_buffers {
        let parsed = match &combined {
            None => parse_first_csv(data),
            Some(reference) => parse_followup_csv(data, reference.columns()),
        };
        match parsed {
            Ok(t) => {
                debug!(file = %name, rows = t.num_rows(), "parsed");
                match combined.as_mut() {
                    None => combined = Some(t),
                    Some(c) => c.append(t),
                }
            }
            Err(e) => {
                if opts.strict_parsing {
                    return Err(e.context(format!("failed to read '{}'", name)));
                }
                push_warning(&mut warnings, name, format!("failed to read: {:#}", e));
            }
        }
    }

    let Some(mut table) = combined else {
        info!("no tabular files found in batch");
        return Ok(ProcessOutcome {
            table: None,
            warnings,
        });
    };

    // 3) Exclusion filters, comment first then flight codes.
    let combined_rows = table.num_rows();
    filter::apply_filters(&mut table, opts)?;
    info!(
        combined = combined_rows,
        kept = table.num_rows(),
        "pipeline complete"
    );

    Ok(ProcessOutcome {
        table: Some(table),
        warnings,
    })
}

fn push_warning(warnings: &mut Vec<Warning>, file: &str, message: String) {
    warn!(file = %file, "{}", message);
    warnings.push(Warning {
        file: file.to_string(),
        message,
    });
}

/// Pull every `.csv` file entry out of the archive, in listing order. The
/// archive handle lives only as long as this call.
fn expand_archive(src: &FileSource) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive =
        ZipArchive::new(Cursor::new(&src.data[..])).context("not a readable ZIP archive")?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("failed to access ZIP entry #{}", i))?;
        let name = entry.name().to_string();
        if entry.is_file() && name.to_lowercase().ends_with(".csv") {
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buf)
                .with_context(|| format!("failed to read '{}' from archive", name))?;
            entries.push((format!("{}:{}", src.name, name), buf));
        }
    }
    Ok(entries)
}

/// Parse the batch's first CSV: its header row names the columns, and every
/// data row must have the same width.
fn parse_first_csv(data: &[u8]) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = rdr.records();
    let header = records
        .next()
        .ok_or_else(|| anyhow!("file is empty"))?
        .context("CSV parse error in header row")?;
    let columns: Vec<String> = header.iter().map(str::to_string).collect();
    let width = columns.len();

    let mut table = Table::new(columns);
    for (idx, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV parse error at data row {}", idx + 1))?;
        table.push_row(coerce_record(&record, width, idx + 1)?);
    }
    Ok(table)
}

/// Parse a later CSV against the established schema: the first row is a
/// header to discard, and every data row is coerced positionally, so its
/// width must match the reference schema exactly.
fn parse_followup_csv(data: &[u8], reference: &[String]) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = rdr.records();
    records
        .next()
        .ok_or_else(|| anyhow!("file is empty"))?
        .context("CSV parse error in header row")?;

    let mut table = Table::new(reference.to_vec());
    let mut saw_data = false;
    for (idx, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV parse error at data row {}", idx + 1))?;
        table.push_row(coerce_record(&record, reference.len(), idx + 1)?);
        saw_data = true;
    }
    if !saw_data {
        return Err(anyhow!("no data rows after header"));
    }
    Ok(table)
}

fn coerce_record(record: &csv::StringRecord, width: usize, row: usize) -> Result<Vec<Value>> {
    if record.len() != width {
        return Err(anyhow!(
            "data row {} has {} fields, expected {}",
            row,
            record.len(),
            width
        ));
    }
    Ok(record.iter().map(Value::parse).collect())
}
